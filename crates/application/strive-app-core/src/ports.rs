use async_trait::async_trait;

use strive_core::{
    Credentials, Goal, GoalDraft, GoalId, GoalPatch, Grouped, ListItem, PageQuery, PasswordChange,
    Registration, ResultPage, User, UserData,
};

/// Page fetch failure. The accumulated list is left untouched when one of
/// these surfaces; retry policy belongs to the loader, not the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Single-item update/delete failure. An optimistic local mutation is not
/// rolled back on one of these; the next reload restores server truth.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PageLoader<T: ListItem, F>: Send + Sync + 'static {
    async fn load_page(&self, query: PageQuery<F>) -> Result<ResultPage<T>, LoadError>;
}

/// Persists the status change behind a cross-column move as a partial update.
#[async_trait]
pub trait StatusWriter<T: Grouped>: Send + Sync + 'static {
    async fn update_status(&self, id: T::Id, status: T::Status) -> Result<T, PersistError>;
}

#[async_trait]
pub trait GoalsRepo: Send + Sync + 'static {
    async fn create(&self, draft: &GoalDraft) -> Result<Goal, PersistError>;
    async fn update(&self, id: GoalId, patch: &GoalPatch, partial: bool)
        -> Result<Goal, PersistError>;
    async fn delete(&self, id: GoalId) -> Result<(), PersistError>;
}

#[async_trait]
pub trait UserGateway: Send + Sync + 'static {
    async fn profile(&self) -> Result<User, PersistError>;
    async fn login(&self, creds: &Credentials) -> Result<User, PersistError>;
    async fn sign_up(&self, reg: &Registration) -> Result<User, PersistError>;
    async fn update_profile(&self, data: &UserData) -> Result<User, PersistError>;
    async fn update_password(&self, change: &PasswordChange) -> Result<(), PersistError>;
}
