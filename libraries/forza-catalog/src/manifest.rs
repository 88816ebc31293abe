//! Static track manifest

use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use forza_core::text::UNKNOWN_ARTIST;
use forza_core::{ManifestSource, Track};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const UNKNOWN_TITLE: &str = "Unknown Title";

/// Manifest location settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestConfig {
    /// Absolute URL of the manifest; relative filenames resolve against it
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl ManifestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One manifest entry as written by the manifest generator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
}

/// Client for the static `songs.json` manifest
pub struct ManifestClient {
    http: Client,
    url: Url,
}

impl ManifestClient {
    pub fn new(config: ManifestConfig) -> Result<Self> {
        let url = Url::parse(&config.url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("ForzaRadio/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, url })
    }

    /// Fetch and parse the manifest.
    pub async fn load(&self) -> Result<Vec<Track>> {
        debug!(url = %self.url, "Fetching manifest");

        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let entries: Vec<ManifestEntry> = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse manifest: {}", e))
        })?;

        let tracks: Vec<Track> = entries
            .into_iter()
            .filter_map(|entry| self.resolve_entry(entry))
            .collect();

        if tracks.is_empty() {
            return Err(CatalogError::EmptyManifest);
        }

        info!(count = tracks.len(), "Loaded manifest");
        Ok(tracks)
    }

    fn resolve_entry(&self, entry: ManifestEntry) -> Option<Track> {
        let title = non_blank(entry.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let artist = non_blank(entry.artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let locator = match (non_blank(entry.audio_url), non_blank(entry.filename)) {
            (Some(audio_url), _) => audio_url,
            (None, Some(filename)) => match self.url.join(&filename) {
                Ok(resolved) => resolved.to_string(),
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Skipping unresolvable manifest entry");
                    return None;
                }
            },
            (None, None) => {
                warn!(title = %title, "Skipping manifest entry without audio");
                return None;
            }
        };

        Some(Track::new(title, artist, locator))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl ManifestSource for ManifestClient {
    async fn fetch(&self) -> forza_core::Result<Vec<Track>> {
        Ok(self.load().await?)
    }
}
