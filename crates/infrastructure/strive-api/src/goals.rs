use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use strive_core::{Goal, GoalDraft, GoalId, GoalPatch, GoalSearch, PageQuery, ResultPage};

use crate::{decode_json, expect_success, ApiClient, ApiError};

/// Wire shape of a paginated list response.
#[derive(Debug, Deserialize)]
struct PageBody<T> {
    count: u64,
    next: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    previous: Option<String>,
    results: Vec<T>,
}

/// Goals endpoints plus the refresh hub list views reload on.
pub struct GoalsApi {
    api: ApiClient,
    refresh_tx: broadcast::Sender<()>,
}

impl GoalsApi {
    pub fn new(api: ApiClient) -> Self {
        let (refresh_tx, _) = broadcast::channel(strive_config::REFRESH_CHANNEL_CAPACITY);
        Self { api, refresh_tx }
    }

    /// Pulsed after every successful mutation, from any caller.
    pub fn subscribe_refresh(&self) -> broadcast::Receiver<()> {
        self.refresh_tx.subscribe()
    }

    pub async fn list(&self, query: &PageQuery<GoalSearch>) -> Result<ResultPage<Goal>, ApiError> {
        let url = self.api.url("goals/")?;
        let mut req = self.api.http().get(url).query(&[
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
        ]);

        let filter = &query.filter;
        if !filter.search.is_empty() {
            req = req.query(&[("search", filter.search.as_str())]);
        }
        if !query.order_field.is_empty() {
            req = req.query(&[("ordering", query.order_field.as_str())]);
        }
        if let Some(board) = filter.board {
            req = req.query(&[("board", board.to_string())]);
        }
        if !filter.category_in.is_empty() {
            req = req.query(&[("category__in", join_csv(&filter.category_in))]);
        }
        if !filter.priority_in.is_empty() {
            let csv = join_csv(filter.priority_in.iter().map(|p| p.as_str()));
            req = req.query(&[("priority__in", csv)]);
        }
        if !filter.status_in.is_empty() {
            let csv = join_csv(filter.status_in.iter().map(|s| s.as_str()));
            req = req.query(&[("status__in", csv)]);
        }
        if let Some(due) = filter.due_before {
            req = req.query(&[("due_date__lte", due.to_string())]);
        }
        if let Some(due) = filter.due_after {
            req = req.query(&[("due_date__gte", due.to_string())]);
        }

        let body: PageBody<Goal> = decode_json(req.send().await?).await?;
        Ok(ResultPage {
            has_more: body.next.is_some(),
            total: Some(body.count),
            items: body.results,
        })
    }

    pub async fn create(&self, draft: &GoalDraft) -> Result<Goal, ApiError> {
        let url = self.api.url("goals/")?;
        let resp = self.api.http().post(url).json(draft).send().await?;
        let goal = decode_json(resp).await?;
        self.pulse();
        Ok(goal)
    }

    /// Partial updates go out as PATCH, full replacements as PUT.
    pub async fn update(
        &self,
        id: GoalId,
        patch: &GoalPatch,
        partial: bool,
    ) -> Result<Goal, ApiError> {
        let url = self.api.url(&format!("goals/{id}/"))?;
        let req = if partial {
            self.api.http().patch(url)
        } else {
            self.api.http().put(url)
        };
        let resp = req.json(patch).send().await?;
        let goal = decode_json(resp).await?;
        self.pulse();
        Ok(goal)
    }

    pub async fn delete(&self, id: GoalId) -> Result<(), ApiError> {
        let url = self.api.url(&format!("goals/{id}/"))?;
        let resp = self.api.http().delete(url).send().await?;
        expect_success(&resp)?;
        self.pulse();
        Ok(())
    }

    fn pulse(&self) {
        // No receivers is fine: nobody has a board open.
        if self.refresh_tx.send(()).is_err() {
            debug!("refresh pulse with no subscribers");
        }
    }
}

fn join_csv<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: ToString,
{
    items
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
