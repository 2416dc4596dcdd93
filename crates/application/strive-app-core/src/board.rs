use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use strive_core::{Grouped, GroupedView, ListItem, MoveError, MoveOutcome};

use crate::ports::{PersistError, StatusWriter};

/// Column projection over a data source's results, with optimistic drag
/// support.
///
/// The view is recomputed from every results snapshot. A drag move mutates
/// it synchronously instead; the projection stays suppressed until the next
/// snapshot arrives, at which point server truth wins again.
pub struct GroupedBoard<T: Grouped> {
    view_tx: Arc<watch::Sender<GroupedView<T>>>,
    writer: Arc<dyn StatusWriter<T>>,
    errors_tx: broadcast::Sender<PersistError>,
    cancel: CancellationToken,
}

impl<T: Grouped> GroupedBoard<T> {
    pub fn spawn(
        mut results: watch::Receiver<Arc<Vec<T>>>,
        columns: Vec<T::Status>,
        writer: Arc<dyn StatusWriter<T>>,
    ) -> Self {
        let initial = GroupedView::project(&results.borrow_and_update(), &columns);
        let (view_tx, _) = watch::channel(initial);
        let view_tx = Arc::new(view_tx);
        let (errors_tx, _) = broadcast::channel(strive_config::ERROR_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let task_tx = view_tx.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    changed = results.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let list = results.borrow_and_update().clone();
                        let _ = task_tx.send(GroupedView::project(&list, &columns));
                    }
                }
            }
        });

        Self {
            view_tx,
            writer,
            errors_tx,
            cancel,
        }
    }

    /// Latest grouped view; late subscribers see the current value.
    pub fn view(&self) -> watch::Receiver<GroupedView<T>> {
        self.view_tx.subscribe()
    }

    /// Persistence failures from optimistic moves. The local move stands;
    /// the next authoritative reload restores server truth.
    pub fn errors(&self) -> broadcast::Receiver<PersistError> {
        self.errors_tx.subscribe()
    }

    /// Apply a drag move. The view mutation is synchronous and immediately
    /// visible; a cross-column transfer additionally persists the status
    /// change in the background.
    pub fn move_item(
        &self,
        id: &T::Id,
        from: T::Status,
        to: T::Status,
        from_index: usize,
        to_index: usize,
    ) -> Result<(), MoveError> {
        let mut moved: Result<MoveOutcome<T>, MoveError> = Ok(MoveOutcome::Unchanged);
        self.view_tx.send_if_modified(|view| {
            moved = view.move_item(id, from, to, from_index, to_index);
            matches!(
                moved,
                Ok(MoveOutcome::Reordered | MoveOutcome::Transferred { .. })
            )
        });

        match moved {
            Ok(MoveOutcome::Transferred { item }) => {
                self.persist(item);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(err) => {
                error!(%err, item = ?id, "rejected board move");
                Err(err)
            }
        }
    }

    fn persist(&self, item: T) {
        let writer = self.writer.clone();
        let errors = self.errors_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = writer.update_status(item.id(), item.status()).await {
                warn!(%err, "failed to persist status change");
                let _ = errors.send(err);
            }
        });
    }

    /// Stop recomputing the projection. Idempotent.
    pub fn destroy(&self) {
        self.cancel.cancel();
    }
}
