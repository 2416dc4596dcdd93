use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod group;
pub mod query;
pub mod user;

pub use group::{Grouped, GroupedView, ListItem, MoveError, MoveOutcome};
pub use query::{PageQuery, QueryState, ResultPage};
pub use user::{Credentials, PasswordChange, Registration, User, UserData};

pub type GoalId = i64;
pub type BoardId = i64;
pub type CategoryId = i64;

/// Composite server-side ordering: priority first, then deadline.
pub const ORDER_DEFAULT: &str = "";
pub const ORDER_PRIORITY: &str = "priority";
pub const ORDER_DUE_DATE: &str = "due_date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Backlog,
    InProgress,
    Done,
}

impl GoalStatus {
    /// Column order on the board.
    pub const ALL: [GoalStatus; 3] = [GoalStatus::Backlog, GoalStatus::InProgress, GoalStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Backlog => "backlog",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: GoalStatus,
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub board: Option<BoardId>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ListItem for Goal {
    type Id = GoalId;

    fn id(&self) -> GoalId {
        self.id
    }
}

impl Grouped for Goal {
    type Status = GoalStatus;

    fn status(&self) -> GoalStatus {
        self.status
    }

    fn set_status(&mut self, status: GoalStatus) {
        self.status = status;
    }
}

/// Search form shape for the goals board. Field names follow the filter
/// controls: free text plus discrete selections and date bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalSearch {
    pub search: String,
    pub board: Option<BoardId>,
    pub priority_in: Vec<Priority>,
    pub category_in: Vec<CategoryId>,
    pub status_in: Vec<GoalStatus>,
    pub due_before: Option<NaiveDate>,
    pub due_after: Option<NaiveDate>,
}

/// Payload for creating a goal. The server assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: GoalStatus,
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub board: Option<BoardId>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Default for GoalDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: GoalStatus::Backlog,
            priority: Priority::Medium,
            category: None,
            board: None,
            due_date: None,
        }
    }
}

/// Partial update payload. Only set fields are serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl GoalPatch {
    /// Patch carrying only a status change, as issued by a board move.
    pub fn status(status: GoalStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
