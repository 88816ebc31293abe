//! Track source: where the next track comes from
//!
//! Local modes keep a play order (identity or a shuffle permutation) and a
//! `next_pos` cursor naming the order slot that plays next. ExternalFeed mode
//! hands cursor movement to the [`FeedProvider`].

use crate::shuffle::{sequential_indices, shuffled_indices};
use forza_core::{
    Catalog, FeedProvider, ManifestSource, PlaybackMode, PlayerError, Result, Track,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces the next track under the active advance policy
pub struct TrackSource {
    catalog: Catalog,
    mode: PlaybackMode,
    manifest: Option<Arc<dyn ManifestSource>>,
    feed: Option<Box<dyn FeedProvider>>,

    /// Play order over catalog positions
    order: Vec<usize>,
    /// Order slot that plays next; `order.len()` means the cycle is done
    next_pos: usize,
    /// Shuffled mode: the permutation for the following cycle, drawn early
    /// so the track after a wrap can be previewed
    upcoming: Vec<usize>,
    /// Catalog position of the current track
    current: Option<usize>,
}

impl TrackSource {
    /// Source over a fixed catalog
    pub fn from_catalog(catalog: Catalog, mode: PlaybackMode) -> Self {
        let mode = if mode == PlaybackMode::ExternalFeed {
            warn!("ExternalFeed mode needs a feed provider, using Sequential");
            PlaybackMode::Sequential
        } else {
            mode
        };
        let mut source = Self {
            catalog,
            mode,
            manifest: None,
            feed: None,
            order: Vec::new(),
            next_pos: 0,
            upcoming: Vec::new(),
            current: None,
        };
        source.rebuild_order();
        source
    }

    /// Source backed by a manifest; the catalog is empty until `refresh`
    pub fn from_manifest(manifest: Arc<dyn ManifestSource>, mode: PlaybackMode) -> Self {
        let mut source = Self::from_catalog(Catalog::empty(), mode);
        source.manifest = Some(manifest);
        source
    }

    /// Source driven by a remote feed; the catalog is empty until `refresh`
    pub fn from_feed(feed: Box<dyn FeedProvider>) -> Self {
        let mut source = Self::from_catalog(Catalog::empty(), PlaybackMode::Sequential);
        source.feed = Some(feed);
        source.mode = PlaybackMode::ExternalFeed;
        source
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Active catalog snapshot
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// All tracks in catalog order
    pub fn all(&self) -> Vec<Track> {
        match (&self.feed, self.mode) {
            (Some(feed), PlaybackMode::ExternalFeed) => feed.all_songs(),
            _ => self.catalog.tracks().to_vec(),
        }
    }

    /// Track at a catalog position
    pub fn by_index(&self, index: usize) -> Option<Track> {
        match (&self.feed, self.mode) {
            (Some(feed), PlaybackMode::ExternalFeed) => feed.song_by_index(index),
            _ => self.catalog.get(index).cloned(),
        }
    }

    /// Catalog position of the current track
    pub fn current_index(&self) -> Option<usize> {
        match (&self.feed, self.mode) {
            (Some(feed), PlaybackMode::ExternalFeed) => feed.current_index(),
            _ => self.current,
        }
    }

    /// Current track
    pub fn current(&self) -> Option<Track> {
        match (&self.feed, self.mode) {
            (Some(feed), PlaybackMode::ExternalFeed) => feed.current_song(),
            _ => self.current.and_then(|i| self.catalog.get(i).cloned()),
        }
    }

    /// The track to start with
    ///
    /// Local modes advance onto the first order slot; a feed starts on its
    /// own current song, or on its top slot when the cursor sits before it.
    pub fn begin(&mut self) -> Option<(usize, Track)> {
        if let (Some(feed), PlaybackMode::ExternalFeed) = (&self.feed, self.mode) {
            if let (Some(track), Some(index)) = (feed.current_song(), feed.current_index()) {
                return Some((index, track));
            }
        }
        self.advance()
    }

    /// Move to the next track and return it
    ///
    /// Wraps at the end of the order; a shuffled cycle rolls over into a new
    /// permutation.
    pub fn advance(&mut self) -> Option<(usize, Track)> {
        if let (Some(feed), PlaybackMode::ExternalFeed) = (&mut self.feed, self.mode) {
            let track = feed.advance_and_get()?;
            let index = feed.current_index()?;
            return Some((index, track));
        }

        if self.catalog.is_empty() {
            return None;
        }
        if self.next_pos >= self.order.len() {
            self.start_new_cycle();
        }
        let index = self.order[self.next_pos];
        self.next_pos += 1;
        self.current = Some(index);
        self.catalog.get(index).cloned().map(|track| (index, track))
    }

    /// Move to the previous track and return it
    ///
    /// Local modes step the cursor back two slots (floored at the start of
    /// the order) and advance once, landing on the slot before the one that
    /// was playing. A feed steps back one song.
    pub fn previous(&mut self) -> Option<(usize, Track)> {
        if let (Some(feed), PlaybackMode::ExternalFeed) = (&mut self.feed, self.mode) {
            let track = feed.step_back()?;
            let index = feed.current_index()?;
            return Some((index, track));
        }
        self.next_pos = self.next_pos.saturating_sub(2);
        self.advance()
    }

    /// Jump to a catalog position
    pub fn select(&mut self, index: usize) -> Option<(usize, Track)> {
        if let (Some(feed), PlaybackMode::ExternalFeed) = (&mut self.feed, self.mode) {
            let track = feed.select(index)?;
            return Some((index, track));
        }

        let track = self.catalog.get(index).cloned()?;
        self.current = Some(index);
        self.next_pos = self
            .order
            .iter()
            .position(|&i| i == index)
            .map_or(0, |pos| pos + 1);
        Some((index, track))
    }

    /// Track the next `advance` will return, without moving
    pub fn peek_next(&self) -> Option<(usize, Track)> {
        if let (Some(feed), PlaybackMode::ExternalFeed) = (&self.feed, self.mode) {
            return feed.peek_next();
        }

        let index = if self.next_pos < self.order.len() {
            self.order[self.next_pos]
        } else if self.mode == PlaybackMode::Shuffled {
            *self.upcoming.first()?
        } else {
            *self.order.first()?
        };
        self.catalog.get(index).cloned().map(|track| (index, track))
    }

    /// Switch advance policy
    ///
    /// Entering Shuffled starts a fresh permutation. Leaving it continues
    /// sequentially after the current track.
    pub fn set_mode(&mut self, mode: PlaybackMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }

        match mode {
            PlaybackMode::ExternalFeed => {
                let feed = self.feed.as_mut().ok_or_else(|| {
                    PlayerError::InvalidInput("no feed provider configured".to_string())
                })?;
                if let Some(index) = self.current {
                    feed.select(index);
                }
            }
            PlaybackMode::Sequential | PlaybackMode::Shuffled => {
                if let (Some(feed), PlaybackMode::ExternalFeed) = (&self.feed, self.mode) {
                    self.catalog = Catalog::new(feed.all_songs());
                    self.current = feed.current_index();
                }
            }
        }

        debug!(from = ?self.mode, to = ?mode, "Switching playback mode");
        self.mode = mode;
        self.rebuild_order();
        Ok(())
    }

    /// Ask the feed to toggle its own shuffle order
    ///
    /// Returns `None` outside ExternalFeed mode.
    pub fn toggle_feed_shuffle(&mut self) -> Option<bool> {
        match (&mut self.feed, self.mode) {
            (Some(feed), PlaybackMode::ExternalFeed) => Some(feed.toggle_shuffle()),
            _ => None,
        }
    }

    /// Re-fetch from the backing manifest or feed
    ///
    /// On failure the prior catalog stays active. A source over a fixed
    /// catalog returns it unchanged.
    pub async fn refresh(&mut self) -> Result<Catalog> {
        let fetched = if let Some(feed) = self.feed.as_mut() {
            feed.load_catalog().await
        } else if let Some(manifest) = &self.manifest {
            manifest.fetch().await
        } else {
            return Ok(self.catalog.clone());
        };

        match fetched {
            Ok(tracks) if tracks.is_empty() => {
                warn!("Catalog refresh returned no tracks, keeping the previous catalog");
                Err(PlayerError::source_unavailable("empty catalog"))
            }
            Ok(tracks) => {
                self.replace_catalog(Catalog::new(tracks));
                info!(tracks = self.catalog.len(), "Catalog refreshed");
                Ok(self.catalog.clone())
            }
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed, keeping the previous catalog");
                Err(e)
            }
        }
    }

    /// Install a new catalog, re-pointing the cursor at the same track by
    /// identity
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        let current_key = self.current().map(|t| t.key());
        self.catalog = catalog;

        if let (Some(feed), PlaybackMode::ExternalFeed) = (&self.feed, self.mode) {
            self.current = feed.current_index();
            return;
        }

        self.current = current_key.and_then(|key| self.catalog.position_of(&key));
        if self.current.is_none() {
            debug!("Current track is not part of the new catalog");
        }
        self.rebuild_order();
    }

    fn rebuild_order(&mut self) {
        let len = self.catalog.len();
        match self.mode {
            PlaybackMode::Shuffled => {
                self.order = shuffled_indices(len);
                self.upcoming = shuffled_indices(len);
                self.next_pos = 0;
            }
            PlaybackMode::Sequential | PlaybackMode::ExternalFeed => {
                self.order = sequential_indices(len);
                self.upcoming.clear();
                self.next_pos = self.current.map_or(0, |i| i + 1);
            }
        }
    }

    fn start_new_cycle(&mut self) {
        if self.mode == PlaybackMode::Shuffled {
            let fresh = shuffled_indices(self.catalog.len());
            self.order = std::mem::replace(&mut self.upcoming, fresh);
            debug!("Shuffle cycle complete, starting a new permutation");
        }
        self.next_pos = 0;
    }
}
