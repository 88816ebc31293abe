//! Internet Archive feed provider
//!
//! Lists an uploader's items through the advanced search endpoint, keeps the
//! ones whose identifier carries the music prefix, and resolves the first
//! `.mp3` of each item through the metadata endpoint.

mod titles;

pub use titles::{parse_item_title, SongInfo};

use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use forza_core::{FeedError, FeedProvider, Track};
use rand::seq::SliceRandom;
use rand::thread_rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use titles::extract_song_info;
use tracing::{debug, info, warn};
use url::Url;

/// Archive endpoints and collection selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    /// Uploader whose items make up the feed
    pub uploader: String,

    #[serde(default = "default_search_url")]
    pub search_url: String,

    #[serde(default = "default_metadata_base")]
    pub metadata_base: String,

    #[serde(default = "default_download_base")]
    pub download_base: String,

    /// Items whose identifier lacks this prefix are ignored
    #[serde(default = "default_identifier_prefix")]
    pub identifier_prefix: String,

    #[serde(default = "default_rows")]
    pub rows: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_url() -> String {
    "https://archive.org/advancedsearch.php".to_string()
}

fn default_metadata_base() -> String {
    "https://archive.org/metadata".to_string()
}

fn default_download_base() -> String {
    "https://archive.org/download".to_string()
}

fn default_identifier_prefix() -> String {
    "music".to_string()
}

fn default_rows() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    20
}

impl ArchiveConfig {
    pub fn new(uploader: impl Into<String>) -> Self {
        Self {
            uploader: uploader.into(),
            search_url: default_search_url(),
            metadata_base: default_metadata_base(),
            download_base: default_download_base(),
            identifier_prefix: default_identifier_prefix(),
            rows: default_rows(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Serve every endpoint from one base URL (mirrors, tests)
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.search_url = format!("{base}/advancedsearch.php");
        self.metadata_base = format!("{base}/metadata");
        self.download_base = format!("{base}/download");
        self
    }
}

// Archive responses use a string or a list of strings for most fields
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn first(&self) -> Option<&str> {
        match self {
            Self::One(value) => Some(value.as_str()),
            Self::Many(values) => values.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: Option<SearchDocs>,
}

#[derive(Debug, Deserialize)]
struct SearchDocs {
    docs: Option<Vec<SearchDoc>>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    identifier: String,
    #[serde(default)]
    title: Option<OneOrMany>,
    #[serde(default)]
    creator: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
struct ItemMetadata {
    #[serde(default)]
    files: Vec<ItemFile>,
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    name: String,
}

/// Remote feed of archive items with its own cursor and shuffle order
pub struct ArchiveFeed {
    http: Client,
    config: ArchiveConfig,
    songs: Vec<Track>,
    /// Play order over `songs`; identity unless shuffled
    order: Vec<usize>,
    /// Position in `order`; `None` sits before the first slot
    cursor: Option<usize>,
    shuffle: bool,
}

impl ArchiveFeed {
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        for url in [&config.search_url, &config.metadata_base, &config.download_base] {
            Url::parse(url)?;
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("ForzaRadio/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            songs: Vec::new(),
            order: Vec::new(),
            cursor: None,
            shuffle: false,
        })
    }

    /// Whether the provider's own shuffle order is active
    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    async fn search_items(&self) -> Result<Vec<SearchDoc>> {
        let q = format!("uploader:{}", self.config.uploader);
        let rows = self.config.rows.to_string();
        debug!(url = %self.config.search_url, q = %q, "Searching archive");

        let response = self
            .http
            .get(&self.config.search_url)
            .query(&[
                ("q", q.as_str()),
                ("fl[]", "identifier"),
                ("fl[]", "title"),
                ("fl[]", "creator"),
                ("output", "json"),
                ("rows", rows.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Transport(format!("search returned {}", status.as_u16())).into());
        }

        let envelope: SearchEnvelope = response.json().await.map_err(|e| {
            warn!(error = %e, "Malformed archive search response");
            FeedError::NoData
        })?;

        envelope
            .response
            .and_then(|r| r.docs)
            .ok_or_else(|| FeedError::NoData.into())
    }

    async fn first_mp3(&self, identifier: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.config.metadata_base.trim_end_matches('/'), identifier);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                url,
            });
        }

        let metadata: ItemMetadata = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse item metadata: {}", e))
        })?;

        Ok(metadata
            .files
            .into_iter()
            .map(|f| f.name)
            .find(|name| name.to_lowercase().ends_with(".mp3")))
    }

    fn download_url(&self, identifier: &str, file: &str) -> Result<String> {
        let mut url = Url::parse(&self.config.download_base)?;
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.config.download_base.clone()))?
            .pop_if_empty()
            .push(identifier)
            .extend(file.split('/'));
        Ok(url.to_string())
    }

    async fn item_track(&self, doc: &SearchDoc) -> Result<Option<Track>> {
        let Some(mp3) = self.first_mp3(&doc.identifier).await? else {
            return Ok(None);
        };

        let info = extract_song_info(
            &doc.identifier,
            doc.title.as_ref().and_then(OneOrMany::first),
            doc.creator.as_ref().and_then(OneOrMany::first),
            &mp3,
        );
        let locator = self.download_url(&doc.identifier, &mp3)?;
        debug!(id = %doc.identifier, song = %info.song, artist = %info.artist, "Extracted item");

        Ok(Some(
            Track::new(info.song, info.artist, locator).with_source_id(doc.identifier.clone()),
        ))
    }

    /// Fetch the uploader's items and build tracks, in search order
    pub async fn fetch_tracks(&self) -> Result<Vec<Track>> {
        let docs = self.search_items().await?;
        let prefix = &self.config.identifier_prefix;
        let music: Vec<&SearchDoc> = docs
            .iter()
            .filter(|doc| doc.identifier.starts_with(prefix.as_str()))
            .collect();

        if music.is_empty() {
            return Err(FeedError::NoItems.into());
        }

        let mut tracks = Vec::with_capacity(music.len());
        for doc in music {
            match self.item_track(doc).await {
                Ok(Some(track)) => tracks.push(track),
                Ok(None) => debug!(id = %doc.identifier, "Item has no mp3, skipping"),
                Err(e) => warn!(id = %doc.identifier, error = %e, "Failed to resolve item"),
            }
        }

        if tracks.is_empty() {
            return Err(FeedError::NoItems.into());
        }
        Ok(tracks)
    }

    /// Replace the song list, keeping the cursor on the same song when it
    /// survives the refresh
    ///
    /// A first load starts on the top slot. When the current song vanished
    /// the cursor moves before the first slot, so the next advance plays the
    /// top of the new order.
    fn install(&mut self, songs: Vec<Track>) {
        let first_load = self.songs.is_empty();
        let current_key = self.current_song().map(|t| t.key());
        self.songs = songs;
        self.rebuild_order();

        self.cursor = if first_load {
            (!self.songs.is_empty()).then_some(0)
        } else {
            current_key
                .and_then(|key| self.songs.iter().position(|t| t.key() == key))
                .and_then(|index| self.position_of(index))
        };
    }

    fn rebuild_order(&mut self) {
        self.order = (0..self.songs.len()).collect();
        if self.shuffle {
            self.order.shuffle(&mut thread_rng());
        }
    }

    fn index_at(&self, cursor: usize) -> Option<usize> {
        self.order.get(cursor).copied()
    }

    fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    #[cfg(test)]
    fn with_songs(config: ArchiveConfig, songs: Vec<Track>) -> Result<Self> {
        let mut feed = Self::new(config)?;
        feed.install(songs);
        Ok(feed)
    }
}

#[async_trait]
impl FeedProvider for ArchiveFeed {
    async fn load_catalog(&mut self) -> forza_core::Result<Vec<Track>> {
        let songs = self.fetch_tracks().await?;
        info!(count = songs.len(), uploader = %self.config.uploader, "Loaded archive feed");
        self.install(songs.clone());
        Ok(songs)
    }

    fn current_song(&self) -> Option<Track> {
        self.current_index()
            .and_then(|index| self.songs.get(index))
            .cloned()
    }

    fn current_index(&self) -> Option<usize> {
        self.cursor.and_then(|cursor| self.index_at(cursor))
    }

    fn advance_and_get(&mut self) -> Option<Track> {
        if self.songs.is_empty() {
            return None;
        }
        let len = self.songs.len();
        self.cursor = Some(self.cursor.map_or(0, |cursor| (cursor + 1) % len));
        self.current_song()
    }

    fn step_back(&mut self) -> Option<Track> {
        if self.songs.is_empty() {
            return None;
        }
        let last = self.songs.len() - 1;
        self.cursor = Some(
            self.cursor
                .and_then(|cursor| cursor.checked_sub(1))
                .unwrap_or(last),
        );
        self.current_song()
    }

    fn song_by_index(&self, index: usize) -> Option<Track> {
        self.songs.get(index).cloned()
    }

    fn select(&mut self, index: usize) -> Option<Track> {
        self.cursor = Some(self.position_of(index)?);
        self.current_song()
    }

    fn all_songs(&self) -> Vec<Track> {
        self.songs.clone()
    }

    fn peek_next(&self) -> Option<(usize, Track)> {
        if self.songs.is_empty() {
            return None;
        }
        let len = self.songs.len();
        let index = self.index_at(self.cursor.map_or(0, |cursor| (cursor + 1) % len))?;
        self.songs.get(index).cloned().map(|t| (index, t))
    }

    fn toggle_shuffle(&mut self) -> bool {
        let current = self.current_index();
        self.shuffle = !self.shuffle;
        self.rebuild_order();
        self.cursor = current.and_then(|index| self.position_of(index));
        info!(shuffle = self.shuffle, "Feed shuffle toggled");
        self.shuffle
    }
}
