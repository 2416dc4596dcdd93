use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use strive_api::{default_http_client, ApiClient, GoalsApi, UsersApi};
use strive_core::{BoardId, CategoryId, Goal, GoalSearch, GoalStatus};

use crate::board::GroupedBoard;
use crate::gateway::{GoalsGateway, UsersGateway};
use crate::session::Session;
use crate::source::{DataSource, SourceOptions};

/// Which category/board the active route points at. Passed explicitly to
/// every view that needs it.
#[derive(Debug, Clone, Default)]
pub struct BoardContext {
    pub category: Option<CategoryId>,
    pub board: Option<BoardId>,
}

impl BoardContext {
    pub fn initial_search(&self) -> GoalSearch {
        GoalSearch {
            board: self.board,
            category_in: self.category.into_iter().collect(),
            ..GoalSearch::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoadFailed,
    SaveFailed,
}

/// User-facing problem report. Display belongs to the embedding UI.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// One open goals board view: the query engine plus its grouped projection
/// and a merged notice stream.
pub struct GoalsBoard {
    pub source: DataSource<Goal, GoalSearch>,
    pub board: GroupedBoard<Goal>,
    notices_tx: broadcast::Sender<Notice>,
    cancel: CancellationToken,
}

impl GoalsBoard {
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices_tx.subscribe()
    }

    /// Tear the view down; no emissions afterwards. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
        self.source.destroy();
        self.board.destroy();
    }
}

/// Application wiring: shared HTTP client, API services, session.
pub struct StriveApplication {
    goals: Arc<GoalsApi>,
    users: Arc<UsersApi>,
    session: Session,
}

impl StriveApplication {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = default_http_client().context("Failed to build HTTP client")?;
        let api = ApiClient::new(client, base_url).context("Invalid API base URL")?;
        let goals = Arc::new(GoalsApi::new(api.clone()));
        let users = Arc::new(UsersApi::new(api));
        let session = Session::new(Arc::new(UsersGateway::new(users.clone())));
        Ok(Self {
            goals,
            users,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn goals_api(&self) -> &Arc<GoalsApi> {
        &self.goals
    }

    pub fn users_api(&self) -> &Arc<UsersApi> {
        &self.users
    }

    /// Open a goals board for the routed context. The board subscribes to
    /// the goals refresh hub, so any successful mutation elsewhere reloads
    /// it.
    pub fn open_goals_board(&self, ctx: &BoardContext) -> GoalsBoard {
        let gateway = Arc::new(GoalsGateway::new(self.goals.clone()));
        let source: DataSource<Goal, GoalSearch> = DataSource::spawn(
            ctx.initial_search(),
            SourceOptions {
                limit: strive_config::GOALS_PAGE_LIMIT,
                ..SourceOptions::default()
            },
            gateway.clone(),
            Some(self.goals.subscribe_refresh()),
        );
        let board: GroupedBoard<Goal> =
            GroupedBoard::spawn(source.results(), GoalStatus::ALL.to_vec(), gateway);

        let (notices_tx, _) = broadcast::channel(strive_config::ERROR_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        forward_notices(
            source.errors(),
            NoticeKind::LoadFailed,
            notices_tx.clone(),
            cancel.clone(),
        );
        forward_notices(
            board.errors(),
            NoticeKind::SaveFailed,
            notices_tx.clone(),
            cancel.clone(),
        );

        GoalsBoard {
            source,
            board,
            notices_tx,
            cancel,
        }
    }
}

fn forward_notices<E: std::fmt::Display + Clone + Send + 'static>(
    mut errors: broadcast::Receiver<E>,
    kind: NoticeKind,
    notices: broadcast::Sender<Notice>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                err = errors.recv() => match err {
                    Ok(err) => {
                        let _ = notices.send(Notice {
                            kind,
                            message: err.to_string(),
                        });
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });
}
