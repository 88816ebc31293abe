/// Track domain type
use crate::text::normalize_key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A playable track
///
/// Immutable once constructed: a catalog refresh replaces whole collections
/// instead of editing entries in place, so fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    title: String,
    artist: String,
    audio_locator: String,
    source_id: Option<String>,
}

impl Track {
    /// Create a track without a source identifier
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_locator: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            audio_locator: audio_locator.into(),
            source_id: None,
        }
    }

    /// Attach the identifier the backing source uses for this track
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        let id = source_id.into();
        self.source_id = if id.trim().is_empty() { None } else { Some(id) };
        self
    }

    /// Track title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Artist name
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Locator handed to the audio backend (URL or relative filename)
    pub fn audio_locator(&self) -> &str {
        &self.audio_locator
    }

    /// Identifier assigned by the backing source, if any
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Identity key: the source id when present, otherwise the normalized
    /// `(title, artist, locator)` tuple
    pub fn key(&self) -> TrackKey {
        match &self.source_id {
            Some(id) => TrackKey::Source(id.clone()),
            None => TrackKey::Tuple {
                title: normalize_key(&self.title),
                artist: normalize_key(&self.artist),
                locator: self.audio_locator.trim().to_string(),
            },
        }
    }

    /// Key used by the image resolution cache
    pub fn art_key(&self) -> ArtKey {
        ArtKey::new(&self.title, &self.artist)
    }
}

/// Track identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKey {
    /// Identifier assigned by the backing source
    Source(String),

    /// Normalized metadata tuple for sources without identifiers
    Tuple {
        title: String,
        artist: String,
        locator: String,
    },
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(id) => write!(f, "{id}"),
            Self::Tuple {
                title,
                artist,
                locator,
            } => write!(f, "{title}|{artist}|{locator}"),
        }
    }
}

/// Normalized `(title, artist)` pair keying cached artwork
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtKey {
    title: String,
    artist: String,
}

impl ArtKey {
    /// Build a key from raw display strings
    pub fn new(title: &str, artist: &str) -> Self {
        Self {
            title: normalize_key(title),
            artist: normalize_key(artist),
        }
    }

    /// Normalized title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Normalized artist
    pub fn artist(&self) -> &str {
        &self.artist
    }
}

impl fmt::Display for ArtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.title, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_id_wins_over_metadata() {
        let a = Track::new("Song", "Artist", "a.mp3").with_source_id("music-42");
        let b = Track::new("Other", "Someone", "b.mp3").with_source_id("music-42");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), TrackKey::Source("music-42".to_string()));
    }

    #[test]
    fn blank_source_id_is_ignored() {
        let track = Track::new("Song", "Artist", "a.mp3").with_source_id("  ");
        assert!(track.source_id().is_none());
        assert!(matches!(track.key(), TrackKey::Tuple { .. }));
    }

    #[test]
    fn tuple_key_is_normalized() {
        let a = Track::new("  Kerosene ", "CRYSTAL   Castles", "k.mp3");
        let b = Track::new("kerosene", "crystal castles", "k.mp3");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn tuple_key_distinguishes_locators() {
        let a = Track::new("Song", "Artist", "a.mp3");
        let b = Track::new("Song", "Artist", "b.mp3");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn art_key_ignores_locator_and_case() {
        let a = Track::new("Song", "Artist", "a.mp3");
        let b = Track::new("SONG", "artist", "b.mp3");
        assert_eq!(a.art_key(), b.art_key());
        assert_eq!(a.art_key().to_string(), "song-artist");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn padded(words: &[String], gap: &str) -> String {
            format!("{gap}{}{gap}", words.join(gap))
        }

        proptest! {
            /// Case and whitespace variations never change track identity
            #[test]
            fn tuple_key_ignores_case_and_spacing(
                title in prop::collection::vec("[A-Za-z0-9]{1,8}", 1..5),
                artist in prop::collection::vec("[A-Za-z0-9]{1,8}", 1..4),
                gap in "[ \t]{1,3}",
            ) {
                let plain = Track::new(title.join(" "), artist.join(" "), "song.mp3");
                let noisy = Track::new(
                    padded(&title, &gap).to_uppercase(),
                    padded(&artist, &gap).to_lowercase(),
                    "song.mp3",
                );
                prop_assert_eq!(plain.key(), noisy.key());
                prop_assert_eq!(plain.art_key(), noisy.art_key());
            }

            /// Normalized art keys are lowercase with single spaces
            #[test]
            fn art_key_is_canonical(title in "[A-Za-z \t]{0,24}", artist in "[A-Za-z \t]{0,24}") {
                let key = ArtKey::new(&title, &artist);
                for part in [key.title(), key.artist()] {
                    prop_assert_eq!(part, part.to_lowercase());
                    prop_assert!(!part.contains("  ") && !part.contains('\t'));
                    prop_assert_eq!(part, part.trim());
                }
                prop_assert_eq!(ArtKey::new(key.title(), key.artist()), key.clone());
            }
        }
    }
}
