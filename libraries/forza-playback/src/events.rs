//! Player Events
//!
//! Event-based communication with the presentation layer. The controller
//! queues events while handling a command or media event; the host drains
//! them afterwards and renders whatever changed.

use crate::progress::{ArtSwap, ProgressSnapshot};
use crate::types::PlayerState;
use crate::volume::VolumeTier;
use forza_core::{PlaybackMode, Track};
use serde::Serialize;

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayerEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A new track was loaded
    ///
    /// Title and artist are final at this point; art follows separately.
    TrackChanged {
        /// Catalog position of the new track
        index: usize,
        /// The new track
        track: Track,
    },

    /// Track reached its end (natural or detected by the liveness check)
    TrackFinished {
        /// Catalog position of the finished track
        index: Option<usize>,
    },

    /// The buffer for the upcoming track became playable
    NextTrackPrepared {
        /// Catalog position of the buffered track
        index: usize,
    },

    /// Display-ready progress
    Progress(ProgressSnapshot),

    /// Preload this image off-screen and report back with
    /// `ArtLoaded(request)` or `ArtFailed(request)`
    ArtPreload {
        /// Request id to echo back
        request: u64,
        /// Image to load
        url: String,
    },

    /// Swap the visible art with a cross-fade
    ArtSwap(ArtSwap),

    /// Volume or mute changed
    VolumeChanged {
        /// Stored level in `[0, 1]`
        level: f32,
        /// Whether output is muted
        muted: bool,
        /// Icon tier for the effective volume
        tier: VolumeTier,
    },

    /// The active catalog was replaced
    CatalogChanged {
        /// Number of tracks now available
        len: usize,
    },

    /// Advance policy changed
    ModeChanged {
        /// The new mode
        mode: PlaybackMode,
    },

    /// Nothing can be played; show a placeholder
    NoTracks {
        /// Placeholder title
        title: String,
        /// Placeholder image
        art_url: String,
    },
}
