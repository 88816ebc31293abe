/// Core error types for Forza Radio
use thiserror::Error;

/// Result type alias using `PlayerError`
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Error taxonomy shared by the player core
///
/// Only an exhausted catalog ever reaches the listener, and even then as a
/// placeholder state. Everything else is absorbed by the component that hit it.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Catalog fetch or parsing failed; the prior catalog stays active
    #[error("Track source unavailable: {0}")]
    SourceUnavailable(String),

    /// Decode or network failure on the active track
    #[error("Audio load failed: {0}")]
    AudioLoadFailure(String),

    /// A step of the art chain failed
    #[error("Art resolution failed: {0}")]
    ArtResolutionFailure(String),

    /// Token exchange failed or credentials are missing
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// The runtime refused to start playback (autoplay policy)
    #[error("Playback rejected: {0}")]
    PlaybackPolicyRejection(String),

    /// Preference storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlayerError {
    /// Create a source-unavailable error
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create an audio load error
    pub fn audio_load(msg: impl Into<String>) -> Self {
        Self::AudioLoadFailure(msg.into())
    }

    /// Create an art resolution error
    pub fn art(msg: impl Into<String>) -> Self {
        Self::ArtResolutionFailure(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthFailure(msg.into())
    }

    /// Create a playback policy rejection
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::PlaybackPolicyRejection(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether this error came from the token exchange
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthFailure(_))
    }
}

/// Failures reported by a remote feed provider while loading its catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The feed answered without a usable document
    #[error("No data returned from feed")]
    NoData,

    /// The feed answered but no entry was playable
    #[error("No playable items in feed")]
    NoItems,

    /// Transport failure talking to the feed
    #[error("Feed transport error: {0}")]
    Transport(String),
}

impl From<FeedError> for PlayerError {
    fn from(err: FeedError) -> Self {
        Self::SourceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SourceUnavailable(format!("malformed document: {err}"))
    }
}
