use std::sync::Arc;

use async_trait::async_trait;

use strive_api::{ApiError, GoalsApi, UsersApi};
use strive_core::{
    Credentials, Goal, GoalDraft, GoalId, GoalPatch, GoalSearch, GoalStatus, PageQuery,
    PasswordChange, Registration, ResultPage, User, UserData,
};

use crate::ports::{GoalsRepo, LoadError, PageLoader, PersistError, StatusWriter, UserGateway};

fn load_error(err: ApiError) -> LoadError {
    match err {
        ApiError::Status(status) => LoadError::Status {
            status: status.as_u16(),
        },
        ApiError::Decode(msg) => LoadError::Decode(msg),
        other => LoadError::Transport(other.to_string()),
    }
}

fn persist_error(err: ApiError) -> PersistError {
    match err {
        ApiError::Status(status) => PersistError::Status {
            status: status.as_u16(),
        },
        ApiError::Decode(msg) => PersistError::Decode(msg),
        other => PersistError::Transport(other.to_string()),
    }
}

/// Port adapter over the goals HTTP service.
pub struct GoalsGateway {
    api: Arc<GoalsApi>,
}

impl GoalsGateway {
    pub fn new(api: Arc<GoalsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageLoader<Goal, GoalSearch> for GoalsGateway {
    async fn load_page(&self, query: PageQuery<GoalSearch>) -> Result<ResultPage<Goal>, LoadError> {
        self.api.list(&query).await.map_err(load_error)
    }
}

#[async_trait]
impl StatusWriter<Goal> for GoalsGateway {
    async fn update_status(&self, id: GoalId, status: GoalStatus) -> Result<Goal, PersistError> {
        self.api
            .update(id, &GoalPatch::status(status), true)
            .await
            .map_err(persist_error)
    }
}

#[async_trait]
impl GoalsRepo for GoalsGateway {
    async fn create(&self, draft: &GoalDraft) -> Result<Goal, PersistError> {
        self.api.create(draft).await.map_err(persist_error)
    }

    async fn update(
        &self,
        id: GoalId,
        patch: &GoalPatch,
        partial: bool,
    ) -> Result<Goal, PersistError> {
        self.api
            .update(id, patch, partial)
            .await
            .map_err(persist_error)
    }

    async fn delete(&self, id: GoalId) -> Result<(), PersistError> {
        self.api.delete(id).await.map_err(persist_error)
    }
}

/// Port adapter over the users HTTP service.
pub struct UsersGateway {
    api: Arc<UsersApi>,
}

impl UsersGateway {
    pub fn new(api: Arc<UsersApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UserGateway for UsersGateway {
    async fn profile(&self) -> Result<User, PersistError> {
        self.api.profile().await.map_err(persist_error)
    }

    async fn login(&self, creds: &Credentials) -> Result<User, PersistError> {
        self.api.login(creds).await.map_err(persist_error)
    }

    async fn sign_up(&self, reg: &Registration) -> Result<User, PersistError> {
        self.api.sign_up(reg).await.map_err(persist_error)
    }

    async fn update_profile(&self, data: &UserData) -> Result<User, PersistError> {
        self.api.update_profile(data).await.map_err(persist_error)
    }

    async fn update_password(&self, change: &PasswordChange) -> Result<(), PersistError> {
        self.api.update_password(change).await.map_err(persist_error)
    }
}
