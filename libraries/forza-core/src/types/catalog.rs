/// Catalog: the ordered collection of tracks currently available
use super::{Track, TrackKey};
use std::sync::Arc;

/// Ordered, read-only sequence of tracks
///
/// Cloning is cheap; holders share the same snapshot. Replacing a catalog
/// means building a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tracks: Arc<Vec<Track>>,
}

impl Catalog {
    /// Create a catalog from an ordered list of tracks
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: Arc::new(tracks),
        }
    }

    /// Empty catalog
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the catalog has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Iterate tracks in order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Position of the track with identity `key`
    pub fn position_of(&self, key: &TrackKey) -> Option<usize> {
        self.tracks.iter().position(|t| &t.key() == key)
    }
}

impl From<Vec<Track>> for Catalog {
    fn from(tracks: Vec<Track>) -> Self {
        Self::new(tracks)
    }
}
