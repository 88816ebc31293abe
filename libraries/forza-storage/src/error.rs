/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from redb
    #[error(transparent)]
    Database(#[from] redb::Error),

    /// I/O error preparing the database location
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn database(err: impl Into<redb::Error>) -> Self {
        Self::Database(err.into())
    }
}

impl From<StorageError> for forza_core::PlayerError {
    fn from(err: StorageError) -> Self {
        forza_core::PlayerError::storage(err.to_string())
    }
}
