use serde::{Deserialize, Serialize};

/// The filter, sort, and pagination cursor driving a list load.
///
/// Every change produces a new value; the offset goes back to zero whenever
/// the filter or the order field changes, and only advances through
/// [`QueryState::with_next_offset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<F> {
    pub filter: F,
    pub order_field: String,
    pub offset: usize,
}

impl<F: Clone> QueryState<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            order_field: String::new(),
            offset: 0,
        }
    }

    pub fn with_filter(&self, filter: F) -> Self {
        Self {
            filter,
            order_field: self.order_field.clone(),
            offset: 0,
        }
    }

    pub fn with_order_field(&self, field: impl Into<String>) -> Self {
        Self {
            filter: self.filter.clone(),
            order_field: field.into(),
            offset: 0,
        }
    }

    pub fn with_next_offset(&self, step: usize) -> Self {
        Self {
            filter: self.filter.clone(),
            order_field: self.order_field.clone(),
            offset: self.offset + step,
        }
    }

    /// Same filter and ordering, cursor back at the first page.
    pub fn reset(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            order_field: self.order_field.clone(),
            offset: 0,
        }
    }
}

/// A single page request handed to the page loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery<F> {
    pub offset: usize,
    pub limit: usize,
    pub filter: F,
    pub order_field: String,
}

/// One page of results as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub has_more: bool,
}

impl<T> ResultPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Some(0),
            has_more: false,
        }
    }
}
