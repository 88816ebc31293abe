/// Art search request and response types
use serde::{Deserialize, Serialize};

/// Track search request shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackQuery {
    /// Search by track title and artist
    TrackAndArtist { title: String, artist: String },

    /// Search by track title alone
    Title(String),
}

/// A track returned by the art search service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCandidate {
    /// Track display name
    pub name: String,

    /// Album display name
    pub album_name: String,

    /// Album type as reported by the service ("album", "single", ...)
    pub album_type: Option<String>,

    /// Explicit-content flag
    pub explicit: bool,

    /// Popularity score (0-100)
    pub popularity: u32,

    /// Image URLs ordered by decreasing resolution
    pub images: Vec<String>,
}

impl TrackCandidate {
    /// Largest available image
    pub fn best_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the album is a single release
    pub fn is_single(&self) -> bool {
        self.album_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("single"))
    }
}

/// An artist returned by the art search service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCandidate {
    /// Artist display name
    pub name: String,

    /// Popularity score (0-100)
    pub popularity: u32,

    /// Image URLs ordered by decreasing resolution
    pub images: Vec<String>,
}

impl ArtistCandidate {
    /// Largest available image
    pub fn best_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
