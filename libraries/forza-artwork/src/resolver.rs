use crate::error::{ArtworkError, Result};
use crate::fallback::gradient_image;
use crate::filter::ContentFilter;
use crate::types::{ArtSource, ArtworkConfig, Resolution, SearchStep};
use forza_core::text::{clean_artist_name, clean_song_name, UNKNOWN_ARTIST, UNKNOWN_SONG};
use forza_core::{ArtKey, ArtSearch, ArtistCandidate, TrackCandidate, TrackQuery};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Image Resolution Cache
///
/// Entries never expire. Each key owns a `OnceCell`, so the first caller
/// runs the chain and every concurrent caller for the same key awaits that
/// one resolution.
pub struct ArtResolver {
    search: Option<Arc<dyn ArtSearch>>,
    filter: ContentFilter,
    request_timeout: Duration,
    cache: Mutex<HashMap<ArtKey, Arc<OnceCell<Resolution>>>>,
}

impl ArtResolver {
    /// Create a resolver backed by an art search service
    pub fn new(search: Arc<dyn ArtSearch>, config: ArtworkConfig) -> Self {
        Self::build(Some(search), &config)
    }

    /// Create a resolver that only generates fallback images
    pub fn offline(config: ArtworkConfig) -> Self {
        Self::build(None, &config)
    }

    fn build(search: Option<Arc<dyn ArtSearch>>, config: &ArtworkConfig) -> Self {
        Self {
            search,
            filter: ContentFilter::from_config(config),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the image URL for a track; never fails
    pub async fn resolve(&self, title: &str, artist: &str) -> String {
        self.resolve_with_source(title, artist).await.url
    }

    /// Resolve and report which step produced the image
    pub async fn resolve_with_source(&self, title: &str, artist: &str) -> Resolution {
        let key = ArtKey::new(title, artist);
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(key).or_default())
        };

        cell.get_or_init(|| self.run_chain(title, artist))
            .await
            .clone()
    }

    /// Already-resolved URL for a track, without triggering a lookup
    pub fn cached(&self, title: &str, artist: &str) -> Option<String> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(&ArtKey::new(title, artist))
            .and_then(|cell| cell.get())
            .map(|resolution| resolution.url.clone())
    }

    /// Number of completed resolutions held
    pub fn cached_len(&self) -> usize {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.values().filter(|cell| cell.initialized()).count()
    }

    async fn run_chain(&self, title: &str, artist: &str) -> Resolution {
        let song = clean_song_name(title);
        let artist_name = clean_artist_name(artist);
        debug!(song = %song, artist = %artist_name, "Resolving art");

        if let Some(search) = &self.search {
            for step in [SearchStep::TrackAndArtist, SearchStep::Title, SearchStep::Artist] {
                if !step_applies(step, &song, &artist_name) {
                    continue;
                }

                match self.run_step(search.as_ref(), step, &song, &artist_name).await {
                    Ok(url) => {
                        info!(song = %song, artist = %artist_name, %step, "Found art");
                        return Resolution {
                            url,
                            source: ArtSource::Search(step),
                        };
                    }
                    Err(e) if e.is_auth() => {
                        // Every remaining step needs the same token
                        warn!(error = %e, "No search token, using generated art");
                        break;
                    }
                    Err(e @ ArtworkError::NoMatch { .. }) => debug!(error = %e, "Art step missed"),
                    Err(e) => warn!(error = %e, "Art step failed"),
                }
            }
        }

        debug!(song = %song, artist = %artist_name, "Generating fallback art");
        Resolution {
            url: gradient_image(title, artist),
            source: ArtSource::Fallback,
        }
    }

    async fn run_step(
        &self,
        search: &dyn ArtSearch,
        step: SearchStep,
        song: &str,
        artist: &str,
    ) -> Result<String> {
        let found = match step {
            SearchStep::TrackAndArtist => {
                let query = TrackQuery::TrackAndArtist {
                    title: song.to_string(),
                    artist: artist.to_string(),
                };
                let candidates = self.bounded(step, search.search_tracks(&query)).await?;
                // Only the top hit is trusted for the exact search
                candidates.first().and_then(|c| self.accepted_track(c))
            }
            SearchStep::Title => {
                let query = TrackQuery::Title(song.to_string());
                let candidates = self.bounded(step, search.search_tracks(&query)).await?;
                candidates.iter().find_map(|c| self.accepted_track(c))
            }
            SearchStep::Artist => {
                let candidates = self.bounded(step, search.search_artists(artist)).await?;
                candidates.iter().find_map(|c| self.accepted_artist(c))
            }
        };

        found.ok_or(ArtworkError::NoMatch { step })
    }

    async fn bounded<T>(
        &self,
        step: SearchStep,
        call: impl Future<Output = forza_core::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ArtworkError::Search { step, source }),
            Err(_) => Err(ArtworkError::Timeout {
                step,
                after_ms: self.request_timeout.as_millis() as u64,
            }),
        }
    }

    fn accepted_track(&self, candidate: &TrackCandidate) -> Option<String> {
        match self.filter.check_track(candidate) {
            Ok(()) => candidate.best_image().map(str::to_owned),
            Err(reason) => {
                debug!(name = %candidate.name, %reason, "Rejected track candidate");
                None
            }
        }
    }

    fn accepted_artist(&self, candidate: &ArtistCandidate) -> Option<String> {
        match self.filter.check_artist(candidate) {
            Ok(()) => candidate.best_image().map(str::to_owned),
            Err(reason) => {
                debug!(name = %candidate.name, %reason, "Rejected artist candidate");
                None
            }
        }
    }
}

fn step_applies(step: SearchStep, song: &str, artist: &str) -> bool {
    match step {
        SearchStep::TrackAndArtist => true,
        SearchStep::Title => !song.is_empty() && song != UNKNOWN_SONG,
        SearchStep::Artist => artist != UNKNOWN_ARTIST,
    }
}
