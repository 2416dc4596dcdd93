use std::future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, Instant, Sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use strive_core::{ListItem, PageQuery, QueryState, ResultPage};

use crate::ports::{LoadError, PageLoader};

/// Tuning for one data source instance.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Fixed page size for every load this source dispatches.
    pub limit: usize,
    /// Quiet interval before a debounced filter edit commits.
    pub debounce: Duration,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            limit: strive_config::DEFAULT_PAGE_LIMIT,
            debounce: strive_config::search_debounce(),
        }
    }
}

enum Command<F> {
    PatchDebounced(Box<dyn FnOnce(&mut F) + Send>),
    PatchNow(Box<dyn FnOnce(&mut F) + Send>),
    SetOrderField(String),
    LoadNextPage,
    Refresh,
}

struct PageOutcome<T> {
    seq: u64,
    offset: usize,
    result: Result<ResultPage<T>, LoadError>,
}

/// A reactive, paginated list query.
///
/// The handle fronts a worker task that merges debounced filter edits,
/// order changes, pagination requests, and external refresh pulses into one
/// stream of accumulated result snapshots. Every dispatched load carries a
/// monotonically increasing sequence number; a result is applied only while
/// its number is still current, so a slow stale response can never overwrite
/// fresher data.
pub struct DataSource<T: ListItem, F> {
    cmd_tx: mpsc::Sender<Command<F>>,
    results_rx: watch::Receiver<Arc<Vec<T>>>,
    loading_rx: watch::Receiver<bool>,
    errors_tx: broadcast::Sender<LoadError>,
    cancel: CancellationToken,
}

impl<T, F> DataSource<T, F>
where
    T: ListItem,
    F: Clone + Send + Sync + 'static,
{
    /// Start the worker and dispatch the initial load.
    pub fn spawn(
        filter: F,
        options: SourceOptions,
        loader: Arc<dyn PageLoader<T, F>>,
        refresh: Option<broadcast::Receiver<()>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(strive_config::COMMAND_CHANNEL_CAPACITY);
        let (results_tx, results_rx) = watch::channel(Arc::new(Vec::new()));
        let (loading_tx, loading_rx) = watch::channel(false);
        let (errors_tx, _) = broadcast::channel(strive_config::ERROR_CHANNEL_CAPACITY);
        let (page_tx, page_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        let worker = SourceWorker {
            query: QueryState::new(filter),
            limit: options.limit,
            seq: 0,
            has_more: false,
            list: Vec::new(),
            loader,
            results_tx,
            loading_tx,
            errors_tx: errors_tx.clone(),
            page_tx,
        };
        tokio::spawn(worker.run(options.debounce, cmd_rx, page_rx, refresh, cancel.clone()));

        Self {
            cmd_tx,
            results_rx,
            loading_rx,
            errors_tx,
            cancel,
        }
    }

    /// Accumulated snapshots; a new value is published after every
    /// authoritative page load. Late subscribers see the latest snapshot.
    pub fn results(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.results_rx.clone()
    }

    /// True from dispatch until the most recent load settles.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading_rx.clone()
    }

    /// Load failures. The accumulated list is never touched by a failure.
    pub fn errors(&self) -> broadcast::Receiver<LoadError> {
        self.errors_tx.subscribe()
    }

    /// Debounced filter edit, for free-text input. Consecutive edits within
    /// the quiet interval coalesce into a single committed query.
    pub fn update_filter(&self, patch: impl FnOnce(&mut F) + Send + 'static) {
        self.send(Command::PatchDebounced(Box::new(patch)));
    }

    /// Immediate filter edit, for discrete selections. Folds in any pending
    /// debounced edit and commits right away.
    pub fn apply_filter(&self, patch: impl FnOnce(&mut F) + Send + 'static) {
        self.send(Command::PatchNow(Box::new(patch)));
    }

    pub fn set_order_field(&self, field: impl Into<String>) {
        self.send(Command::SetOrderField(field.into()));
    }

    /// Request the next page. Ignored while the last received page reported
    /// no further results.
    pub fn load_next_page(&self) {
        self.send(Command::LoadNextPage);
    }

    /// Re-query from the first page with the current filter and order.
    pub fn refresh_now(&self) {
        self.send(Command::Refresh);
    }

    /// Stop the worker. Idempotent; nothing is emitted afterwards, and any
    /// in-flight response is discarded.
    pub fn destroy(&self) {
        self.cancel.cancel();
    }

    fn send(&self, cmd: Command<F>) {
        if self.cancel.is_cancelled() {
            return;
        }
        if self.cmd_tx.try_send(cmd).is_err() {
            warn!("data source command dropped (worker gone or channel full)");
        }
    }
}

struct SourceWorker<T: ListItem, F> {
    query: QueryState<F>,
    limit: usize,
    seq: u64,
    has_more: bool,
    list: Vec<T>,
    loader: Arc<dyn PageLoader<T, F>>,
    results_tx: watch::Sender<Arc<Vec<T>>>,
    loading_tx: watch::Sender<bool>,
    errors_tx: broadcast::Sender<LoadError>,
    page_tx: mpsc::Sender<PageOutcome<T>>,
}

impl<T, F> SourceWorker<T, F>
where
    T: ListItem,
    F: Clone + Send + Sync + 'static,
{
    async fn run(
        mut self,
        debounce: Duration,
        mut cmd_rx: mpsc::Receiver<Command<F>>,
        mut page_rx: mpsc::Receiver<PageOutcome<T>>,
        mut refresh: Option<broadcast::Receiver<()>>,
        cancel: CancellationToken,
    ) {
        let timer = time::sleep(Duration::ZERO);
        tokio::pin!(timer);
        let mut armed = false;
        let mut pending: Option<F> = None;

        self.dispatch();

        loop {
            // Biased so that cancellation wins over a simultaneously ready
            // page result: a destroyed source must never apply one.
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(
                        cmd,
                        &mut pending,
                        &mut armed,
                        timer.as_mut(),
                        debounce,
                    ),
                    None => break,
                },

                _ = timer.as_mut(), if armed => {
                    armed = false;
                    if let Some(filter) = pending.take() {
                        self.query = self.query.with_filter(filter);
                        self.dispatch();
                    }
                }

                pulse = recv_refresh(&mut refresh) => match pulse {
                    Some(()) => {
                        self.query = self.query.reset();
                        self.dispatch();
                    }
                    None => refresh = None,
                },

                Some(outcome) = page_rx.recv() => self.apply(outcome),
            }
        }
    }

    fn handle_command(
        &mut self,
        cmd: Command<F>,
        pending: &mut Option<F>,
        armed: &mut bool,
        timer: Pin<&mut Sleep>,
        debounce: Duration,
    ) {
        match cmd {
            Command::PatchDebounced(patch) => {
                let mut filter = pending
                    .take()
                    .unwrap_or_else(|| self.query.filter.clone());
                patch(&mut filter);
                *pending = Some(filter);
                timer.reset(Instant::now() + debounce);
                *armed = true;
            }
            Command::PatchNow(patch) => {
                let mut filter = pending
                    .take()
                    .unwrap_or_else(|| self.query.filter.clone());
                patch(&mut filter);
                *armed = false;
                self.query = self.query.with_filter(filter);
                self.dispatch();
            }
            Command::SetOrderField(field) => {
                self.query = self.query.with_order_field(field);
                self.dispatch();
            }
            Command::LoadNextPage => {
                if !self.has_more {
                    debug!("next page ignored: last page reported no more results");
                    return;
                }
                self.query = self.query.with_next_offset(self.limit);
                self.dispatch();
            }
            Command::Refresh => {
                self.query = self.query.reset();
                self.dispatch();
            }
        }
    }

    fn dispatch(&mut self) {
        self.seq += 1;
        let seq = self.seq;
        let page_query = PageQuery {
            offset: self.query.offset,
            limit: self.limit,
            filter: self.query.filter.clone(),
            order_field: self.query.order_field.clone(),
        };
        let offset = page_query.offset;
        let _ = self.loading_tx.send(true);

        let loader = self.loader.clone();
        let tx = self.page_tx.clone();
        tokio::spawn(async move {
            let result = loader.load_page(page_query).await;
            let _ = tx.send(PageOutcome { seq, offset, result }).await;
        });
    }

    fn apply(&mut self, outcome: PageOutcome<T>) {
        if outcome.seq != self.seq {
            debug!(
                seq = outcome.seq,
                current = self.seq,
                "discarding superseded page result"
            );
            return;
        }
        let _ = self.loading_tx.send(false);

        match outcome.result {
            Ok(page) => {
                self.has_more = page.has_more;
                if outcome.offset == 0 {
                    self.list = page.items;
                } else {
                    // Later pages can overlap the accumulated list when items
                    // shifted server-side; the later occurrence wins.
                    for item in page.items {
                        if let Some(pos) = self.list.iter().position(|x| x.id() == item.id()) {
                            self.list.remove(pos);
                        }
                        self.list.push(item);
                    }
                }
                let _ = self.results_tx.send(Arc::new(self.list.clone()));
            }
            Err(err) => {
                warn!(%err, "page load failed; keeping previous results");
                let _ = self.errors_tx.send(err);
            }
        }
    }
}

async fn recv_refresh(rx: &mut Option<broadcast::Receiver<()>>) -> Option<()> {
    match rx {
        Some(inner) => match inner.recv().await {
            Ok(()) => Some(()),
            // Missed pulses still mean the data is stale.
            Err(broadcast::error::RecvError::Lagged(_)) => Some(()),
            Err(broadcast::error::RecvError::Closed) => None,
        },
        None => future::pending().await,
    }
}
