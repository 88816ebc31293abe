//! Forza Radio Core
//!
//! Platform-agnostic types, collaborator traits, and error handling shared by
//! every Forza Radio crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Catalog`, `PlaybackMode`, art search candidates
//! - **Collaborator Traits**: `AudioSink`, `ArtSearch`, `FeedProvider`,
//!   `ManifestSource`, `PreferenceStore`
//! - **Error Handling**: the `PlayerError` taxonomy and `Result` alias
//! - **Text helpers**: name cleaning applied before art lookups
//!
//! # Example
//!
//! ```rust
//! use forza_core::{Catalog, Track};
//!
//! let catalog = Catalog::new(vec![
//!     Track::new("Kerosene", "Crystal Castles", "https://example.com/kerosene.mp3"),
//!     Track::new("Celestica", "Crystal Castles", "celestica.mp3"),
//! ]);
//!
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.position_of(&catalog.tracks()[1].key()), Some(1));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod text;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{FeedError, PlayerError, Result};
pub use traits::{ArtSearch, AudioSink, FeedProvider, ManifestSource, PreferenceStore};
pub use types::{
    ArtKey, ArtistCandidate, Catalog, PlaybackMode, Readiness, Track, TrackCandidate, TrackKey,
    TrackQuery,
};
