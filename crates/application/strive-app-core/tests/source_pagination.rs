use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};

use strive_app_core::{DataSource, LoadError, PageLoader, SourceOptions};
use strive_core::{Goal, GoalSearch, GoalStatus, PageQuery, Priority, ResultPage};

type Reply = oneshot::Sender<Result<ResultPage<Goal>, LoadError>>;

struct ChannelLoader {
    tx: mpsc::UnboundedSender<(PageQuery<GoalSearch>, Reply)>,
}

#[async_trait]
impl PageLoader<Goal, GoalSearch> for ChannelLoader {
    async fn load_page(&self, query: PageQuery<GoalSearch>) -> Result<ResultPage<Goal>, LoadError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send((query, reply_tx)).expect("test dropped requests");
        reply_rx
            .await
            .unwrap_or_else(|_| Err(LoadError::Transport("reply dropped".into())))
    }
}

fn titled_goal(id: i64, title: &str) -> Goal {
    Goal {
        id,
        title: title.to_string(),
        description: String::new(),
        status: GoalStatus::Backlog,
        priority: Priority::Medium,
        category: None,
        board: None,
        due_date: None,
        created_at: None,
    }
}

fn goal(id: i64) -> Goal {
    titled_goal(id, "goal")
}

fn page(items: Vec<Goal>, has_more: bool) -> ResultPage<Goal> {
    let total = items.len() as u64;
    ResultPage {
        items,
        total: Some(total),
        has_more,
    }
}

fn spawn_source(
    limit: usize,
) -> (
    DataSource<Goal, GoalSearch>,
    mpsc::UnboundedReceiver<(PageQuery<GoalSearch>, Reply)>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let source = DataSource::spawn(
        GoalSearch::default(),
        SourceOptions {
            limit,
            debounce: Duration::from_millis(300),
        },
        Arc::new(ChannelLoader { tx }),
        None,
    );
    (source, rx)
}

async fn wait_for_ids(results: &mut watch::Receiver<Arc<Vec<Goal>>>, expected: &[i64]) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let ids: Vec<i64> = results.borrow_and_update().iter().map(|g| g.id).collect();
                if ids == expected {
                    return;
                }
            }
            results.changed().await.expect("source gone");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("results never reached {expected:?}"))
}

#[tokio::test(start_paused = true)]
async fn next_page_appends_and_keeps_the_later_occurrence_of_duplicates() {
    let (source, mut requests) = spawn_source(2);
    let mut results = source.results();

    let (first, reply) = requests.recv().await.unwrap();
    assert_eq!(first.offset, 0);
    assert_eq!(first.limit, 2);
    reply
        .send(Ok(page(vec![goal(1), titled_goal(2, "old")], true)))
        .unwrap();
    wait_for_ids(&mut results, &[1, 2]).await;

    source.load_next_page();
    let (second, reply) = requests.recv().await.unwrap();
    assert_eq!(second.offset, 2);
    reply
        .send(Ok(page(vec![titled_goal(2, "new"), goal(3)], false)))
        .unwrap();
    wait_for_ids(&mut results, &[1, 2, 3]).await;

    let snapshot = results.borrow().clone();
    assert_eq!(snapshot[1].title, "new");
}

#[tokio::test(start_paused = true)]
async fn next_page_after_the_last_one_dispatches_nothing() {
    let (source, mut requests) = spawn_source(2);
    let mut results = source.results();

    let (_, reply) = requests.recv().await.unwrap();
    reply.send(Ok(page(vec![goal(1)], false))).unwrap();
    wait_for_ids(&mut results, &[1]).await;

    source.load_next_page();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(requests.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn filter_change_replaces_the_accumulated_list() {
    let (source, mut requests) = spawn_source(2);
    let mut results = source.results();

    let (_, reply) = requests.recv().await.unwrap();
    reply.send(Ok(page(vec![goal(1), goal(2)], true))).unwrap();
    wait_for_ids(&mut results, &[1, 2]).await;

    source.load_next_page();
    let (_, reply) = requests.recv().await.unwrap();
    reply.send(Ok(page(vec![goal(3)], false))).unwrap();
    wait_for_ids(&mut results, &[1, 2, 3]).await;

    source.apply_filter(|f| f.search = "x".into());
    let (query, reply) = requests.recv().await.unwrap();
    assert_eq!(query.offset, 0);
    assert_eq!(query.filter.search, "x");
    reply.send(Ok(page(vec![goal(9)], false))).unwrap();
    wait_for_ids(&mut results, &[9]).await;
}
