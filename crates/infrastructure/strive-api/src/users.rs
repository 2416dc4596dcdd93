use strive_core::{Credentials, PasswordChange, Registration, User, UserData};

use crate::{decode_json, expect_success, ApiClient, ApiError};

/// Account and profile endpoints.
pub struct UsersApi {
    api: ApiClient,
}

impl UsersApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, creds: &Credentials) -> Result<User, ApiError> {
        let url = self.api.url("auth/login/")?;
        let resp = self.api.http().post(url).json(creds).send().await?;
        decode_json(resp).await
    }

    pub async fn sign_up(&self, reg: &Registration) -> Result<User, ApiError> {
        let url = self.api.url("auth/sign-up/")?;
        let resp = self.api.http().post(url).json(reg).send().await?;
        decode_json(resp).await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let url = self.api.url("users/me/")?;
        let resp = self.api.http().get(url).send().await?;
        decode_json(resp).await
    }

    pub async fn update_profile(&self, data: &UserData) -> Result<User, ApiError> {
        let url = self.api.url("users/me/")?;
        let resp = self.api.http().patch(url).json(data).send().await?;
        decode_json(resp).await
    }

    pub async fn update_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        let url = self.api.url("users/me/password/")?;
        let resp = self.api.http().post(url).json(change).send().await?;
        expect_success(&resp)
    }
}
