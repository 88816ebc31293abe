//! Appropriateness filter for art search candidates

use crate::types::ArtworkConfig;
use forza_core::{ArtistCandidate, TrackCandidate};
use std::fmt;

/// Moderation markers rejected in track, album and artist names
pub const DEFAULT_DENYLIST: &[&str] = &[
    "explicit",
    "explicit content",
    "parental advisory",
    "clean version",
    "radio edit",
    "clean edit",
    "censored",
    "uncensored",
];

/// Why a candidate was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    ExplicitFlag,
    Denylisted(String),
    LowPopularitySingle(u32),
    LowPopularityArtist(u32),
    NoImage,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitFlag => f.write_str("explicit flag set"),
            Self::Denylisted(marker) => write!(f, "contains \"{marker}\""),
            Self::LowPopularitySingle(p) => write!(f, "low popularity single ({p})"),
            Self::LowPopularityArtist(p) => write!(f, "low popularity artist ({p})"),
            Self::NoImage => f.write_str("no image"),
        }
    }
}

/// Content filter applied before a candidate's image is accepted
#[derive(Debug, Clone)]
pub struct ContentFilter {
    denylist: Vec<String>,
    track_popularity_floor: u32,
    artist_popularity_floor: u32,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::from_config(&ArtworkConfig::default())
    }
}

impl ContentFilter {
    pub fn from_config(config: &ArtworkConfig) -> Self {
        Self {
            denylist: config.denylist.iter().map(|m| m.to_lowercase()).collect(),
            track_popularity_floor: config.track_popularity_floor,
            artist_popularity_floor: config.artist_popularity_floor,
        }
    }

    fn marker_in(&self, names: &[&str]) -> Option<&str> {
        let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        self.denylist
            .iter()
            .find(|marker| lowered.iter().any(|name| name.contains(marker.as_str())))
            .map(String::as_str)
    }

    /// Check a track candidate
    ///
    /// # Errors
    /// Returns the first reason the candidate is unacceptable
    pub fn check_track(&self, candidate: &TrackCandidate) -> Result<(), Rejection> {
        if candidate.explicit {
            return Err(Rejection::ExplicitFlag);
        }
        if let Some(marker) = self.marker_in(&[&candidate.name, &candidate.album_name]) {
            return Err(Rejection::Denylisted(marker.to_string()));
        }
        if candidate.is_single() && candidate.popularity < self.track_popularity_floor {
            return Err(Rejection::LowPopularitySingle(candidate.popularity));
        }
        if candidate.best_image().is_none() {
            return Err(Rejection::NoImage);
        }
        Ok(())
    }

    /// Check an artist candidate
    ///
    /// # Errors
    /// Returns the first reason the candidate is unacceptable
    pub fn check_artist(&self, candidate: &ArtistCandidate) -> Result<(), Rejection> {
        if let Some(marker) = self.marker_in(&[&candidate.name]) {
            return Err(Rejection::Denylisted(marker.to_string()));
        }
        if candidate.popularity < self.artist_popularity_floor {
            return Err(Rejection::LowPopularityArtist(candidate.popularity));
        }
        if candidate.best_image().is_none() {
            return Err(Rejection::NoImage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, album: &str) -> TrackCandidate {
        TrackCandidate {
            name: name.into(),
            album_name: album.into(),
            album_type: Some("album".into()),
            explicit: false,
            popularity: 50,
            images: vec!["https://img.example/a.jpg".into()],
        }
    }

    #[test]
    fn clean_track_passes() {
        assert_eq!(ContentFilter::default().check_track(&track("Song", "Album")), Ok(()));
    }

    #[test]
    fn explicit_flag_rejected_first() {
        let mut candidate = track("Song (Radio Edit)", "Album");
        candidate.explicit = true;
        assert_eq!(
            ContentFilter::default().check_track(&candidate),
            Err(Rejection::ExplicitFlag)
        );
    }

    #[test]
    fn markers_match_case_insensitively_in_either_name() {
        let filter = ContentFilter::default();
        assert!(matches!(
            filter.check_track(&track("Song - RADIO EDIT", "Album")),
            Err(Rejection::Denylisted(m)) if m == "radio edit"
        ));
        assert!(matches!(
            filter.check_track(&track("Song", "Parental Advisory Hits")),
            Err(Rejection::Denylisted(m)) if m == "parental advisory"
        ));
        assert!(filter.check_track(&track("Song", "Uncensored")).is_err());
    }

    #[test]
    fn low_popularity_single_rejected() {
        let filter = ContentFilter::default();
        let mut single = track("Song", "Song");
        single.album_type = Some("single".into());
        single.popularity = 19;
        assert_eq!(filter.check_track(&single), Err(Rejection::LowPopularitySingle(19)));

        single.popularity = 20;
        assert_eq!(filter.check_track(&single), Ok(()));

        // Albums are not held to the floor
        let mut album = track("Song", "Album");
        album.popularity = 0;
        assert_eq!(filter.check_track(&album), Ok(()));
    }

    #[test]
    fn candidates_without_images_rejected() {
        let mut candidate = track("Song", "Album");
        candidate.images.clear();
        assert_eq!(ContentFilter::default().check_track(&candidate), Err(Rejection::NoImage));
    }

    #[test]
    fn artist_rules() {
        let filter = ContentFilter::default();
        let artist = |name: &str, popularity| ArtistCandidate {
            name: name.into(),
            popularity,
            images: vec!["https://img.example/x.jpg".into()],
        };

        assert_eq!(filter.check_artist(&artist("Grimes", 10)), Ok(()));
        assert_eq!(
            filter.check_artist(&artist("Grimes", 9)),
            Err(Rejection::LowPopularityArtist(9))
        );
        assert!(filter.check_artist(&artist("Censored Band", 90)).is_err());
    }
}
