//! Central configuration constants for query and transport defaults.

use std::time::Duration;

/// Page size requested by the goals board view.
pub const GOALS_PAGE_LIMIT: usize = 300;

/// Default page size for list views that do not override it.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Quiet interval before a free-text filter edit is committed.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Capacity of a data source's command channel. Commands are user-driven
/// (keystrokes, clicks), so this bound is never approached in practice.
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the refresh broadcast hub.
pub const REFRESH_CHANNEL_CAPACITY: usize = 16;

/// Capacity of the error broadcast channels.
pub const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Request timeout applied to the shared HTTP client.
pub const API_TIMEOUT_SECS: u64 = 30;

/// Convenience accessor for the debounce interval as a `Duration`.
pub fn search_debounce() -> Duration {
    Duration::from_millis(SEARCH_DEBOUNCE_MS)
}
