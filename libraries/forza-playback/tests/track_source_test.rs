//! Track source advancement properties and feed delegation

mod common;

use async_trait::async_trait;
use common::{tracks, FakeManifest};
use forza_core::{Catalog, FeedProvider, PlaybackMode, Result, Track};
use forza_playback::TrackSource;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn catalog(n: usize) -> Catalog {
    Catalog::new(
        (0..n)
            .map(|i| Track::new(format!("Song {i}"), "Artist", format!("{i}.mp3")))
            .collect(),
    )
}

proptest! {
    #[test]
    fn sequential_returns_to_start_after_full_period(n in 1usize..40) {
        let mut source = TrackSource::from_catalog(catalog(n), PlaybackMode::Sequential);
        let indices: Vec<usize> = (0..=n).filter_map(|_| source.advance()).map(|(i, _)| i).collect();
        prop_assert_eq!(indices.len(), n + 1);
        prop_assert_eq!(indices[0], indices[n]);
    }

    #[test]
    fn shuffle_visits_every_track_once_per_cycle(n in 1usize..40, cycles in 1usize..4) {
        let mut source = TrackSource::from_catalog(catalog(n), PlaybackMode::Shuffled);
        for _ in 0..cycles {
            let seen: HashSet<usize> = (0..n).filter_map(|_| source.advance()).map(|(i, _)| i).collect();
            prop_assert_eq!(seen.len(), n);
        }
    }

    #[test]
    fn previous_never_leaves_catalog(n in 1usize..20, steps in proptest::collection::vec(any::<bool>(), 1..60)) {
        let mut source = TrackSource::from_catalog(catalog(n), PlaybackMode::Shuffled);
        for forward in steps {
            let next = if forward { source.advance() } else { source.previous() };
            let (index, track) = next.unwrap();
            prop_assert!(index < n);
            prop_assert_eq!(source.by_index(index), Some(track));
        }
    }
}

#[tokio::test]
async fn test_manifest_refresh_replaces_catalog() {
    let manifest = FakeManifest::new(tracks(&["A", "B"]));
    let mut source = TrackSource::from_manifest(Arc::new(manifest.clone()), PlaybackMode::Sequential);
    assert!(source.is_empty());

    source.refresh().await.unwrap();
    assert_eq!(source.len(), 2);

    manifest.set(Some(Vec::new()));
    assert!(source.refresh().await.is_err());
    assert_eq!(source.len(), 2);
}

/// Feed with a plain cursor over a fixed list
struct ListFeed {
    songs: Vec<Track>,
    cursor: usize,
    shuffle: bool,
}

#[async_trait]
impl FeedProvider for ListFeed {
    async fn load_catalog(&mut self) -> Result<Vec<Track>> {
        Ok(self.songs.clone())
    }

    fn current_song(&self) -> Option<Track> {
        self.songs.get(self.cursor).cloned()
    }

    fn current_index(&self) -> Option<usize> {
        (!self.songs.is_empty()).then_some(self.cursor)
    }

    fn advance_and_get(&mut self) -> Option<Track> {
        self.cursor = (self.cursor + 1) % self.songs.len();
        self.current_song()
    }

    fn step_back(&mut self) -> Option<Track> {
        self.cursor = (self.cursor + self.songs.len() - 1) % self.songs.len();
        self.current_song()
    }

    fn song_by_index(&self, index: usize) -> Option<Track> {
        self.songs.get(index).cloned()
    }

    fn select(&mut self, index: usize) -> Option<Track> {
        let song = self.songs.get(index).cloned()?;
        self.cursor = index;
        Some(song)
    }

    fn all_songs(&self) -> Vec<Track> {
        self.songs.clone()
    }

    fn peek_next(&self) -> Option<(usize, Track)> {
        let index = (self.cursor + 1) % self.songs.len();
        self.songs.get(index).cloned().map(|t| (index, t))
    }

    fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }
}

fn feed_source() -> TrackSource {
    TrackSource::from_feed(Box::new(ListFeed {
        songs: tracks(&["A", "B", "C"]),
        cursor: 0,
        shuffle: false,
    }))
}

#[tokio::test]
async fn test_feed_drives_cursor() {
    let mut source = feed_source();
    assert_eq!(source.mode(), PlaybackMode::ExternalFeed);
    source.refresh().await.unwrap();

    assert_eq!(source.begin().map(|(i, _)| i), Some(0));
    assert_eq!(source.peek_next().map(|(i, _)| i), Some(1));
    assert_eq!(source.advance().map(|(i, _)| i), Some(1));
    assert_eq!(source.advance().map(|(i, _)| i), Some(2));
    // A feed's cursor names the current song, so previous is one step
    assert_eq!(source.previous().map(|(i, _)| i), Some(1));
    assert_eq!(source.select(0).map(|(_, t)| t.title().to_string()), Some("A".into()));
    assert_eq!(source.toggle_feed_shuffle(), Some(true));
}

#[tokio::test]
async fn test_leaving_feed_keeps_position() {
    let mut source = feed_source();
    source.refresh().await.unwrap();
    source.advance();

    source.set_mode(PlaybackMode::Sequential).unwrap();
    assert_eq!(source.current_index(), Some(1));
    assert_eq!(source.advance().map(|(i, _)| i), Some(2));

    source.set_mode(PlaybackMode::ExternalFeed).unwrap();
    assert_eq!(source.current_index(), Some(2));
}
