//! Forza Radio - Playback Coordination
//!
//! The playback/preload/metadata core of the player.
//!
//! This crate provides:
//! - Track Source: sequential, shuffled and feed-driven track advancement
//! - Preload Coordinator: buffers the next track's audio and art while the
//!   current one plays, and decides whether that buffer may be adopted
//! - Playback Controller: the play/pause/seek state machine, error recovery
//!   and the single source of truth for what is loaded
//! - Progress & Transition Reporter: display-ready progress and art
//!   cross-fade sequencing
//! - Volume preference with mute and persistence
//!
//! # Architecture
//!
//! Audio output, art search, catalogs and preference storage are all
//! collaborators behind `forza-core` traits. The controller never touches a
//! platform API directly; it is driven by commands, media events and timer
//! ticks, and reports back through [`PlayerEvent`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use forza_artwork::{ArtResolver, ArtworkConfig};
//! use forza_core::{AudioSink, Catalog, PlaybackMode, Track};
//! use forza_playback::{PlaybackController, PlayerConfig, TrackSource};
//! use std::sync::Arc;
//!
//! # async fn example(audio: Box<dyn AudioSink>, buffer: Box<dyn AudioSink>) {
//! let catalog = Catalog::new(vec![
//!     Track::new("Kerosene", "Crystal Castles", "https://example.com/kerosene.mp3"),
//!     Track::new("Celestica", "Crystal Castles", "https://example.com/celestica.mp3"),
//! ]);
//! let source = TrackSource::from_catalog(catalog, PlaybackMode::Sequential);
//! let art = Arc::new(ArtResolver::offline(ArtworkConfig::default()));
//!
//! let mut player = PlaybackController::new(PlayerConfig::default(), source, audio, buffer, art);
//! player.start().await;
//! player.play_pause().await;
//!
//! for event in player.drain_events() {
//!     println!("{event:?}");
//! }
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod events;
pub mod preload;
pub mod progress;
pub mod shuffle;
pub mod track_source;
pub mod types;
pub mod volume;

// Re-export main types
pub use controller::{ArtUpdate, PlaybackController};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use preload::{locators_match, Claim, PreloadCoordinator, PreloadSlot, PreloadState};
pub use progress::{format_time, ArtCrossfade, ArtSwap, ProgressReporter, ProgressSnapshot};
pub use track_source::TrackSource;
pub use types::{
    Direction, MediaEvent, PlaybackSession, PlaybackStatus, PlayerCommand, PlayerConfig,
    PlayerState, SeekTarget,
};
pub use volume::{Volume, VolumeTier, VOLUME_KEY};
