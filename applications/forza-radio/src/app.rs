//! Composition root
//!
//! Builds the collaborators described by [`AppConfig`]. Optional services
//! degrade instead of failing: no search credentials means generated art
//! only, and an unopenable preference file means in-memory preferences.

use crate::config::{AppConfig, SourceKind, StorageSettings};
use anyhow::{Context, Result};
use forza_artwork::ArtResolver;
use forza_catalog::{ArchiveFeed, ManifestClient};
use forza_core::PreferenceStore;
use forza_playback::{PlayerCommand, PlayerEvent, TrackSource};
use forza_search_client::SearchClient;
use forza_storage::{MemoryPreferences, RedbPreferences};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Open the preference store
pub fn open_preferences(settings: &StorageSettings) -> Arc<dyn PreferenceStore> {
    if settings.in_memory {
        return Arc::new(MemoryPreferences::new());
    }
    match RedbPreferences::open(&settings.preferences_path) {
        Ok(store) => {
            info!(path = ?settings.preferences_path, "Preferences opened");
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                path = ?settings.preferences_path,
                error = %e,
                "Failed to open preferences, keeping them in memory"
            );
            Arc::new(MemoryPreferences::new())
        }
    }
}

/// Build the track source for the configured catalog
pub fn build_source(config: &AppConfig) -> Result<TrackSource> {
    match config.source.kind {
        SourceKind::Manifest => {
            let manifest = config
                .source
                .manifest
                .clone()
                .context("Manifest source needs source.manifest.url")?;
            info!(url = %manifest.url, "Using manifest catalog");
            let client = ManifestClient::new(manifest).context("Invalid manifest settings")?;
            Ok(TrackSource::from_manifest(
                Arc::new(client),
                config.player.initial_mode,
            ))
        }
        SourceKind::Archive => {
            let archive = config
                .source
                .archive
                .clone()
                .context("Archive source needs source.archive.uploader")?;
            info!(uploader = %archive.uploader, "Using archive feed");
            let feed = ArchiveFeed::new(archive).context("Invalid archive settings")?;
            Ok(TrackSource::from_feed(Box::new(feed)))
        }
    }
}

/// Build the art resolver, searching only when credentials are configured
pub fn build_resolver(config: &AppConfig, prefs: Arc<dyn PreferenceStore>) -> Result<ArtResolver> {
    let client = SearchClient::with_preferences(config.search.clone(), prefs)
        .context("Invalid search settings")?;

    if client.has_credentials() {
        info!("Art search enabled");
        Ok(ArtResolver::new(Arc::new(client), config.artwork.clone()))
    } else {
        info!("No search credentials, using generated art only");
        Ok(ArtResolver::offline(config.artwork.clone()))
    }
}

/// How the headless host reacts to player events
///
/// Counts finished tracks and asks for shutdown once `max_tracks` is reached.
/// An empty catalog also shuts the host down: nothing here would ever
/// trigger a refresh.
#[derive(Debug, Default)]
pub struct HostPolicy {
    finished: usize,
    max_tracks: Option<usize>,
}

impl HostPolicy {
    pub fn new(max_tracks: Option<usize>) -> Self {
        Self {
            finished: 0,
            max_tracks,
        }
    }

    /// Tracks finished so far
    pub fn finished(&self) -> usize {
        self.finished
    }

    /// Log an event and return the command the host sends back, if any
    pub fn observe(&mut self, event: &PlayerEvent) -> Option<PlayerCommand> {
        match event {
            PlayerEvent::Progress(progress) => {
                debug!(elapsed = %progress.elapsed, total = %progress.total, "Progress");
                None
            }
            PlayerEvent::TrackChanged { index, track } => {
                info!(index, title = track.title(), artist = track.artist(), "Now playing");
                None
            }
            PlayerEvent::TrackFinished { .. } => {
                self.finished += 1;
                match self.max_tracks {
                    Some(max) if self.finished >= max => Some(PlayerCommand::Shutdown),
                    _ => None,
                }
            }
            // No image decoding here; every preload counts as loaded
            PlayerEvent::ArtPreload { request, url } => {
                info!(url = %truncate(url, 80), "Art");
                Some(PlayerCommand::ArtLoaded(*request))
            }
            PlayerEvent::NoTracks { title, .. } => {
                warn!(%title, "Nothing to play, exiting");
                Some(PlayerCommand::Shutdown)
            }
            other => {
                info!(event = ?other, "Player event");
                None
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forza_catalog::ManifestConfig;
    use forza_core::PlaybackMode;

    #[test]
    fn test_preferences_fall_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file
        let settings = StorageSettings {
            preferences_path: dir.path().to_path_buf(),
            in_memory: false,
        };
        let prefs = open_preferences(&settings);
        prefs.set("k", "v").unwrap();
        assert_eq!(prefs.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_preferences_persist_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StorageSettings {
            preferences_path: dir.path().join("prefs.redb"),
            in_memory: false,
        };
        open_preferences(&settings).set("k", "v").unwrap();
        assert_eq!(
            open_preferences(&settings).get("k").unwrap().as_deref(),
            Some("v")
        );
    }

    #[test]
    fn test_manifest_source_uses_initial_mode() {
        let mut config = AppConfig::default();
        config.source.manifest = Some(ManifestConfig::new("https://radio.example/songs.json"));
        config.player.initial_mode = PlaybackMode::Shuffled;

        let source = build_source(&config).unwrap();
        assert_eq!(source.mode(), PlaybackMode::Shuffled);
        assert!(source.is_empty());
    }

    #[test]
    fn test_archive_source_is_feed_driven() {
        let mut config = AppConfig::default();
        config.source.kind = SourceKind::Archive;
        config.source.archive = Some(forza_catalog::ArchiveConfig::new("dj@example.com"));

        let source = build_source(&config).unwrap();
        assert_eq!(source.mode(), PlaybackMode::ExternalFeed);
    }

    #[test]
    fn test_resolver_offline_without_credentials() {
        let config = AppConfig::default();
        let resolver = build_resolver(&config, Arc::new(MemoryPreferences::new())).unwrap();
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_empty_catalog_shuts_host_down() {
        let mut host = HostPolicy::new(None);
        let command = host.observe(&PlayerEvent::NoTracks {
            title: "No tracks".to_string(),
            art_url: String::new(),
        });
        assert_eq!(command, Some(PlayerCommand::Shutdown));
        assert_eq!(host.finished(), 0);
    }

    #[test]
    fn test_host_stops_after_track_limit() {
        let mut host = HostPolicy::new(Some(2));
        let finished = PlayerEvent::TrackFinished { index: Some(0) };
        assert_eq!(host.observe(&finished), None);
        assert_eq!(host.observe(&finished), Some(PlayerCommand::Shutdown));
        assert_eq!(host.finished(), 2);

        let mut unlimited = HostPolicy::new(None);
        for _ in 0..5 {
            assert_eq!(unlimited.observe(&finished), None);
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 80), "short");
    }
}
