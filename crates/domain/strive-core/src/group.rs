use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A record with a stable identifier, suitable for list accumulation.
pub trait ListItem: Clone + Send + Sync + 'static {
    type Id: Debug + PartialEq + Clone + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// A list item carrying a discrete status used for column grouping.
pub trait Grouped: ListItem {
    type Status: Debug + Copy + Eq + Hash + Send + Sync + 'static;

    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
}

/// Result of a board move.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome<T> {
    /// Same bucket, same position.
    Unchanged,
    /// Repositioned within one bucket. Cross-bucket order has no server-side
    /// meaning, so nothing needs to be persisted.
    Reordered,
    /// Moved across buckets; the item now carries the target status and the
    /// change must be persisted.
    Transferred { item: T },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("item is not present in the source bucket")]
    ItemNotFound,
    #[error("bucket is not part of this view")]
    UnknownBucket,
}

/// A partition of a result list into one ordered bucket per status value.
///
/// Items whose status is not part of the configured column order are dropped.
#[derive(Debug, Clone)]
pub struct GroupedView<T: Grouped> {
    order: Vec<T::Status>,
    buckets: HashMap<T::Status, Vec<T>>,
}

impl<T: Grouped> GroupedView<T> {
    pub fn empty(order: &[T::Status]) -> Self {
        Self {
            order: order.to_vec(),
            buckets: order.iter().map(|s| (*s, Vec::new())).collect(),
        }
    }

    /// Recompute the partition from scratch, preserving list order within
    /// each bucket.
    pub fn project(items: &[T], order: &[T::Status]) -> Self {
        let mut view = Self::empty(order);
        for item in items {
            if let Some(bucket) = view.buckets.get_mut(&item.status()) {
                bucket.push(item.clone());
            }
        }
        view
    }

    pub fn statuses(&self) -> &[T::Status] {
        &self.order
    }

    pub fn bucket(&self, status: T::Status) -> &[T] {
        self.buckets.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items concatenated in column order.
    pub fn flattened(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for status in &self.order {
            if let Some(bucket) = self.buckets.get(status) {
                out.extend(bucket.iter().cloned());
            }
        }
        out
    }

    /// Apply a drag move. The item is located by id in the source bucket;
    /// the caller-supplied source index is a hint from the rendered view and
    /// is only checked in debug builds. The target index is clamped to the
    /// destination bucket.
    ///
    /// Validation happens before any mutation, so a failed move leaves the
    /// view untouched.
    pub fn move_item(
        &mut self,
        id: &T::Id,
        from: T::Status,
        to: T::Status,
        from_index: usize,
        to_index: usize,
    ) -> Result<MoveOutcome<T>, MoveError> {
        if !self.buckets.contains_key(&from) || !self.buckets.contains_key(&to) {
            return Err(MoveError::UnknownBucket);
        }

        let source = self.buckets.get_mut(&from).expect("bucket checked above");
        let pos = source
            .iter()
            .position(|item| item.id() == *id)
            .ok_or(MoveError::ItemNotFound)?;
        debug_assert_eq!(
            pos, from_index,
            "source index hint disagrees with item position"
        );

        if from == to {
            let target = to_index.min(source.len().saturating_sub(1));
            if pos == target {
                return Ok(MoveOutcome::Unchanged);
            }
            let item = source.remove(pos);
            source.insert(target, item);
            return Ok(MoveOutcome::Reordered);
        }

        let mut item = source.remove(pos);
        item.set_status(to);
        let dest = self.buckets.get_mut(&to).expect("bucket checked above");
        let target = to_index.min(dest.len());
        dest.insert(target, item.clone());
        Ok(MoveOutcome::Transferred { item })
    }
}
