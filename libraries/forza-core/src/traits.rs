/// Collaborator traits consumed by the player core
use crate::error::Result;
use crate::types::{ArtistCandidate, Readiness, Track, TrackCandidate, TrackQuery};
use async_trait::async_trait;

/// Audio decode/playback backend
///
/// One instance is the audible output owned by the playback controller;
/// another is the silent buffering sink used for preloading. Readiness and
/// timing are reported by polling; the audible sink additionally pushes
/// media events through whatever channel the composition root wires up.
#[async_trait]
pub trait AudioSink: Send {
    /// Point the sink at a new locator and start buffering
    ///
    /// Returns immediately; readiness is observed via `readiness()`.
    ///
    /// # Errors
    /// Returns `AudioLoadFailure` if the locator is rejected outright
    fn load(&mut self, locator: &str) -> Result<()>;

    /// Take over the source already buffered by `buffered`
    ///
    /// The default re-points this sink at the buffered locator, which a
    /// backend with a shared HTTP cache resolves without a second fetch.
    /// Backends that can move decoded buffers should override this.
    ///
    /// # Errors
    /// Returns `AudioLoadFailure` if the buffered source cannot be adopted
    fn adopt_from(&mut self, buffered: &mut dyn AudioSink) -> Result<()> {
        let locator = buffered
            .locator()
            .map(str::to_owned)
            .ok_or_else(|| crate::error::PlayerError::audio_load("buffer has no source"))?;
        self.load(&locator)
    }

    /// Locator currently loaded, if any
    fn locator(&self) -> Option<&str>;

    /// Current readiness tier
    fn readiness(&self) -> Readiness;

    /// Playback position in seconds
    fn current_time(&self) -> f64;

    /// Track duration in seconds; `NaN` until metadata is known
    fn duration(&self) -> f64;

    /// Start or resume playback
    ///
    /// # Errors
    /// Returns `PlaybackPolicyRejection` when the runtime blocks playback
    async fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Whether the sink is paused
    fn is_paused(&self) -> bool;

    /// Move the playback position
    fn set_current_time(&mut self, seconds: f64);

    /// Set output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f32);
}

/// External art search service
#[async_trait]
pub trait ArtSearch: Send + Sync {
    /// Search tracks, returning candidates in the service's ranking order
    ///
    /// # Errors
    /// Returns `AuthFailure` when no token can be obtained, otherwise
    /// `ArtResolutionFailure`
    async fn search_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackCandidate>>;

    /// Search artists by name
    ///
    /// # Errors
    /// Same as [`ArtSearch::search_tracks`]
    async fn search_artists(&self, artist: &str) -> Result<Vec<ArtistCandidate>>;
}

/// Remote feed that owns cursor movement in ExternalFeed mode
///
/// `current_index` always names the catalog position of the current song,
/// regardless of the provider's own shuffle order.
#[async_trait]
pub trait FeedProvider: Send {
    /// Fetch the feed and replace the provider's song list
    ///
    /// # Errors
    /// Returns `SourceUnavailable` (from `FeedError::NoData` / `NoItems`)
    /// when the feed yields nothing playable; the prior list is kept
    async fn load_catalog(&mut self) -> Result<Vec<Track>>;

    /// Song under the cursor
    fn current_song(&self) -> Option<Track>;

    /// Catalog position of the song under the cursor
    fn current_index(&self) -> Option<usize>;

    /// Move forward one step, wrapping, and return the new current song
    fn advance_and_get(&mut self) -> Option<Track>;

    /// Move back one step, wrapping, and return the new current song
    fn step_back(&mut self) -> Option<Track>;

    /// Song at a catalog position
    fn song_by_index(&self, index: usize) -> Option<Track>;

    /// Place the cursor on a catalog position and return that song
    fn select(&mut self, index: usize) -> Option<Track>;

    /// All songs in catalog order
    fn all_songs(&self) -> Vec<Track>;

    /// Song the next `advance_and_get` will return, without moving
    fn peek_next(&self) -> Option<(usize, Track)> {
        None
    }

    /// Toggle the provider's own shuffle order, returning the new state
    fn toggle_shuffle(&mut self) -> bool {
        false
    }
}

/// Static manifest fetched once per refresh
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch and parse the manifest
    ///
    /// # Errors
    /// Returns `SourceUnavailable` for transport failures, malformed
    /// documents, or an empty list
    async fn fetch(&self) -> Result<Vec<Track>>;
}

/// Durable key-value preference storage
pub trait PreferenceStore: Send + Sync {
    /// Read a value
    ///
    /// # Errors
    /// Returns `Storage` if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    ///
    /// # Errors
    /// Returns `Storage` if the backend cannot be written
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    ///
    /// # Errors
    /// Returns `Storage` if the backend cannot be written
    fn remove(&self, key: &str) -> Result<()>;
}
