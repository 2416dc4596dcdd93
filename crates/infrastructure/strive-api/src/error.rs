#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Numeric status for non-2xx responses, if that is what failed.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status(status) => Some(status.as_u16()),
            ApiError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
