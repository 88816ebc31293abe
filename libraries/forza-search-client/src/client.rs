//! Search service client.

use crate::auth::{AuthClient, TokenCache};
use crate::error::{Result, SearchClientError};
use crate::types::{SearchConfig, SearchResponse};
use async_trait::async_trait;
use forza_core::{ArtSearch, ArtistCandidate, PreferenceStore, TrackCandidate, TrackQuery};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the cover art search service.
///
/// Cheap to share behind an `Arc`; the token cache is internal.
pub struct SearchClient {
    http: Client,
    config: SearchConfig,
    tokens: TokenCache,
}

impl SearchClient {
    /// Create a client without durable token storage.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a client that persists its token through `prefs`.
    pub fn with_preferences(config: SearchConfig, prefs: Arc<dyn PreferenceStore>) -> Result<Self> {
        Self::build(config, Some(prefs))
    }

    fn build(config: SearchConfig, prefs: Option<Arc<dyn PreferenceStore>>) -> Result<Self> {
        for url in [&config.token_url, &config.api_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SearchClientError::InvalidUrl(format!(
                    "{url} must start with http:// or https://"
                )));
            }
        }

        let config = SearchConfig {
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            ..config
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(5)))
            .user_agent(format!("ForzaRadio/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            tokens: TokenCache::new(prefs),
        })
    }

    /// Whether client credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.config.credentials().is_some()
    }

    async fn search(&self, q: &str, kind: &str) -> Result<SearchResponse> {
        let token = self
            .tokens
            .get_or_fetch(AuthClient::new(&self.http, &self.config))
            .await?;

        let url = format!("{}/search", self.config.api_base_url);
        debug!(url = %url, q = %q, kind, "Searching");

        let limit = self.config.search_limit.to_string();
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", q), ("type", kind), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                SearchClientError::ParseError(format!("Failed to parse search response: {}", e))
            })
        } else if status == StatusCode::UNAUTHORIZED {
            warn!("Search token rejected, clearing cache");
            self.tokens.invalidate().await;
            Err(SearchClientError::AuthFailed("token rejected".to_string()))
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            warn!(retry_after_secs, "Search rate limited");
            Err(SearchClientError::RateLimited { retry_after_secs })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(SearchClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Search tracks, returning this crate's error type.
    pub async fn find_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackCandidate>> {
        let q = match query {
            TrackQuery::TrackAndArtist { title, artist } => format!("track:{title} artist:{artist}"),
            TrackQuery::Title(title) => format!("track:{title}"),
        };

        let response = self.search(&q, "track").await?;
        Ok(response
            .tracks
            .map(|page| page.items.into_iter().map(TrackCandidate::from).collect())
            .unwrap_or_default())
    }

    /// Search artists, returning this crate's error type.
    pub async fn find_artists(&self, artist: &str) -> Result<Vec<ArtistCandidate>> {
        let response = self.search(&format!("artist:{artist}"), "artist").await?;
        Ok(response
            .artists
            .map(|page| page.items.into_iter().map(ArtistCandidate::from).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ArtSearch for SearchClient {
    async fn search_tracks(&self, query: &TrackQuery) -> forza_core::Result<Vec<TrackCandidate>> {
        Ok(self.find_tracks(query).await?)
    }

    async fn search_artists(&self, artist: &str) -> forza_core::Result<Vec<ArtistCandidate>> {
        Ok(self.find_artists(artist).await?)
    }
}
