//! Types for search service requests and responses.

use forza_core::{ArtistCandidate, TrackCandidate};
use serde::{Deserialize, Serialize};

/// Search service connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Client-credentials id
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client-credentials secret
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Token exchange endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Base URL of the search API (without trailing slash)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Maximum candidates requested per search
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Whole-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_search_limit() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            search_limit: default_search_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SearchConfig {
    /// Default endpoints with the given credentials.
    pub fn with_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            ..Self::default()
        }
    }

    /// Point both endpoints at another host (used by tests and proxies).
    #[must_use]
    pub fn with_endpoints(mut self, token_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_base_url = api_base_url.into();
        self
    }

    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Response from the client-credentials exchange.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Token validity in seconds
    pub expires_in: u64,
}

// =============================================================================
// Search Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Page<TrackItem>>,
    #[serde(default)]
    pub artists: Option<Page<ArtistItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Image {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub album_type: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub popularity: u32,
    pub album: Option<AlbumItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl From<TrackItem> for TrackCandidate {
    fn from(item: TrackItem) -> Self {
        let (album_name, album_type, images) = match item.album {
            Some(album) => (
                album.name,
                album.album_type,
                album.images.into_iter().map(|i| i.url).collect(),
            ),
            None => (String::new(), None, Vec::new()),
        };

        Self {
            name: item.name,
            album_name,
            album_type,
            explicit: item.explicit,
            popularity: item.popularity,
            images,
        }
    }
}

impl From<ArtistItem> for ArtistCandidate {
    fn from(item: ArtistItem) -> Self {
        Self {
            name: item.name,
            popularity: item.popularity,
            images: item.images.into_iter().map(|i| i.url).collect(),
        }
    }
}
