//! Error types for catalog sources.

use forza_core::{FeedError, PlayerError};
use thiserror::Error;

/// Errors raised while fetching a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Source returned an error response
    #[error("Server error ({status}) for {url}")]
    ServerError { status: u16, url: String },

    /// Invalid source URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The manifest parsed but listed no playable entries
    #[error("Manifest contains no playable entries")]
    EmptyManifest,

    /// Feed-level failure
    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<CatalogError> for PlayerError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Feed(feed) => feed.into(),
            other => PlayerError::source_unavailable(other.to_string()),
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
