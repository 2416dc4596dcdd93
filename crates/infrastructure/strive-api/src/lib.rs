use std::time::Duration;

use reqwest::Client;

pub mod error;
pub mod goals;
pub mod users;

pub use error::ApiError;
pub use goals::GoalsApi;
pub use users::UsersApi;

/// Shared HTTP client with the defaults the API services expect.
pub fn default_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(strive_config::API_TIMEOUT_SECS))
        .build()
        .map_err(ApiError::from)
}

/// Base URL plus client, shared by the concrete API services.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: reqwest::Url,
}

impl ApiClient {
    /// Accepts a base with or without a trailing slash.
    ///
    /// The base must be treated as a *directory*: without the trailing
    /// slash, `Url::join("goals/")` would replace the last path segment
    /// instead of appending to it.
    pub fn new(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let mut base = reqwest::Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self { client, base })
    }

    pub(crate) fn url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{path}: {e}")))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn expect_success(resp: &reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }
    Ok(())
}
