//! Error types for playback coordination

use forza_core::PlayerError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Failure reported by a collaborator
    #[error(transparent)]
    Core(#[from] PlayerError),

    /// Operation not valid in the current configuration
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
