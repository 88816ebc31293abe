/// Playback-related shared types
use serde::{Deserialize, Serialize};

/// Track advance policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Forward one position, wrapping to the start
    #[default]
    Sequential,

    /// Consume a uniform random permutation, reshuffling when exhausted
    Shuffled,

    /// Advancement delegated to a remote feed provider (radio)
    ExternalFeed,
}

/// Readiness tiers reported by an audio backend
///
/// Ordered so `>=` comparisons express "at least this ready".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Readiness {
    /// Nothing buffered yet
    NoData,

    /// Enough data to render the current position
    SomeData,

    /// Enough data to play to the end without stalling
    CanPlayThrough,
}

impl Readiness {
    /// Whether playback can start at this tier
    pub fn is_playable(self) -> bool {
        self >= Self::SomeData
    }
}
