//! Error types for the search client.

use thiserror::Error;

/// Errors that can occur when talking to the search service.
#[derive(Error, Debug)]
pub enum SearchClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No client credentials configured
    #[error("Search credentials are not configured")]
    MissingCredentials,

    /// Token exchange rejected or token revoked
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

impl SearchClientError {
    /// Whether the failure happened while obtaining a token
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::AuthFailed(_))
    }
}

impl From<SearchClientError> for forza_core::PlayerError {
    fn from(err: SearchClientError) -> Self {
        if err.is_auth() {
            forza_core::PlayerError::auth(err.to_string())
        } else {
            forza_core::PlayerError::art(err.to_string())
        }
    }
}

/// Result type for search client operations.
pub type Result<T> = std::result::Result<T, SearchClientError>;
