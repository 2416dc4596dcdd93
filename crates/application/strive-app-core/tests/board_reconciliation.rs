use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use strive_app_core::{
    DataSource, GroupedBoard, LoadError, PageLoader, PersistError, SourceOptions, StatusWriter,
};
use strive_core::{
    Goal, GoalId, GoalSearch, GoalStatus, GroupedView, PageQuery, Priority, ResultPage,
};

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

struct RecordingWriter {
    calls: mpsc::UnboundedSender<(GoalId, GoalStatus)>,
}

#[async_trait]
impl StatusWriter<Goal> for RecordingWriter {
    async fn update_status(&self, id: GoalId, status: GoalStatus) -> Result<Goal, PersistError> {
        self.calls.send((id, status)).expect("test dropped calls");
        Ok(goal(id, status))
    }
}

fn goal(id: i64, status: GoalStatus) -> Goal {
    Goal {
        id,
        title: format!("goal {id}"),
        description: String::new(),
        status,
        priority: Priority::Medium,
        category: None,
        board: None,
        due_date: None,
        created_at: None,
    }
}

fn page(items: Vec<Goal>) -> ResultPage<Goal> {
    let total = items.len() as u64;
    ResultPage {
        items,
        total: Some(total),
        has_more: false,
    }
}

async fn wait_for_bucket(
    view: &mut watch::Receiver<GroupedView<Goal>>,
    status: GoalStatus,
    expected: &[i64],
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let ids: Vec<i64> = view
                    .borrow_and_update()
                    .bucket(status)
                    .iter()
                    .map(|g| g.id)
                    .collect();
                if ids == expected {
                    return;
                }
            }
            view.changed().await.expect("board gone");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("bucket {status:?} never reached {expected:?}"))
}

#[tokio::test(start_paused = true)]
async fn optimistic_move_is_reconciled_by_the_next_refresh() {
    let (req_tx, mut requests) = mpsc::unbounded_channel();
    let (hub, hub_rx) = broadcast::channel(16);
    let (calls_tx, mut calls) = mpsc::unbounded_channel();

    let source: DataSource<Goal, GoalSearch> = DataSource::spawn(
        GoalSearch::default(),
        SourceOptions {
            limit: 300,
            debounce: Duration::from_millis(300),
        },
        Arc::new(ChannelLoader { tx: req_tx }),
        Some(hub_rx),
    );
    let board = GroupedBoard::spawn(
        source.results(),
        GoalStatus::ALL.to_vec(),
        Arc::new(RecordingWriter { calls: calls_tx }),
    );
    let mut view_rx = board.view();

    let (_, reply) = requests.recv().await.unwrap();
    reply
        .send(Ok(page(vec![goal(7, GoalStatus::Backlog)])))
        .unwrap();
    wait_for_bucket(&mut view_rx, GoalStatus::Backlog, &[7]).await;

    // Optimistic drag to the in-progress column, visible synchronously.
    board
        .move_item(&7, GoalStatus::Backlog, GoalStatus::InProgress, 0, 0)
        .unwrap();
    assert_eq!(
        view_rx.borrow_and_update().bucket(GoalStatus::InProgress)[0].id,
        7
    );
    assert_eq!(calls.recv().await.unwrap(), (7, GoalStatus::InProgress));

    // A refresh pulse arrives; the server (another client undid the change)
    // reports the goal back in the backlog. The reload is authoritative and
    // overwrites the locally patched view.
    hub.send(()).unwrap();
    let (query, reply) = requests.recv().await.unwrap();
    assert_eq!(query.offset, 0);
    reply
        .send(Ok(page(vec![goal(7, GoalStatus::Backlog)])))
        .unwrap();
    wait_for_bucket(&mut view_rx, GoalStatus::Backlog, &[7]).await;

    let view = view_rx.borrow();
    assert!(view.bucket(GoalStatus::InProgress).is_empty());
    assert_eq!(view.bucket(GoalStatus::Backlog)[0].id, 7);
}
