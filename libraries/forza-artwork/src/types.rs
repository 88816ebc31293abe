use crate::filter::DEFAULT_DENYLIST;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Art resolution settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtworkConfig {
    /// Upper bound on each external search call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Singles below this popularity are rejected
    #[serde(default = "default_track_popularity_floor")]
    pub track_popularity_floor: u32,

    /// Artists below this popularity are rejected
    #[serde(default = "default_artist_popularity_floor")]
    pub artist_popularity_floor: u32,

    /// Case-insensitive moderation markers
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_track_popularity_floor() -> u32 {
    20
}

fn default_artist_popularity_floor() -> u32 {
    10
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(ToString::to_string).collect()
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            track_popularity_floor: default_track_popularity_floor(),
            artist_popularity_floor: default_artist_popularity_floor(),
            denylist: default_denylist(),
        }
    }
}

/// Search steps of the resolution chain, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    TrackAndArtist,
    Title,
    Artist,
}

impl fmt::Display for SearchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TrackAndArtist => "track+artist",
            Self::Title => "title",
            Self::Artist => "artist",
        };
        f.write_str(name)
    }
}

/// Where a resolved image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtSource {
    Search(SearchStep),
    Fallback,
}

/// A resolved image and its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub source: ArtSource,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.source == ArtSource::Fallback
    }
}
