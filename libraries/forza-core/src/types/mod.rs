//! Domain types for Forza Radio

mod catalog;
mod playback;
mod search;
mod track;

pub use catalog::Catalog;
pub use playback::{PlaybackMode, Readiness};
pub use search::{ArtistCandidate, TrackCandidate, TrackQuery};
pub use track::{ArtKey, Track, TrackKey};
