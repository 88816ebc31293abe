//! Core types for playback coordination

use forza_core::{PlaybackMode, Track};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Elapsed seconds of the current track before the next one is buffered
    pub preload_after_secs: f64,

    /// Delay before skipping past a track that failed to load
    pub error_backoff_ms: u64,

    /// Period of the missed-end liveness check
    pub liveness_interval_ms: u64,

    /// A playing track this close to its duration counts as ended
    pub end_tolerance_secs: f64,

    /// Advance policy the host builds its track source with
    pub initial_mode: PlaybackMode,

    /// Volume used when no preference is stored
    pub default_volume: f32,

    /// Start playing the first track without a user gesture
    pub autoplay: bool,

    /// Art cross-fade duration
    pub art_fade_ms: u64,

    /// Delay between fade-out start and the visible image swap
    pub art_swap_delay_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            preload_after_secs: 7.0,
            error_backoff_ms: 1000,
            liveness_interval_ms: 1000,
            end_tolerance_secs: 0.1,
            initial_mode: PlaybackMode::Sequential,
            default_volume: 1.0,
            autoplay: false,
            art_fade_ms: 500,
            art_swap_delay_ms: 250,
        }
    }
}

impl PlayerConfig {
    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms.max(1))
    }
}

/// Playback controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No catalog, nothing loaded
    Idle,
    /// Track selected, audio not yet playable
    Loading,
    /// Playable and paused
    Ready,
    /// Playing audio
    Playing,
    /// Position change in flight
    Seeking,
    /// Natural end reached; the next track is about to load
    Ended,
    /// Load or decode failure; recovery is scheduled
    Error,
}

/// Cursor movement requested by the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Seek request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Fraction of the duration, e.g. from a progress bar click
    Fraction(f64),
    /// Absolute offset in seconds
    Seconds(f64),
}

/// Notifications from the audible sink
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Enough data to start playing
    CanPlay,
    /// Duration became known
    LoadedMetadata,
    /// Position advanced
    TimeUpdate,
    /// Reached the end of the media
    Ended,
    /// Load or decode failure
    Error(String),
}

/// Commands from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    PlayPause,
    Next,
    Previous,
    Seek(SeekTarget),
    PlayIndex(usize),
    SetVolume(f32),
    ToggleMute,
    SetMode(PlaybackMode),
    ToggleShuffle,
    RefreshCatalog,
    /// The off-screen art preload with this request id finished loading
    ArtLoaded(u64),
    /// The off-screen art preload with this request id failed
    ArtFailed(u64),
    Shutdown,
}

/// What is loaded right now
///
/// `current_index` is `None` while idle, and while the playing track is no
/// longer part of a refreshed catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub playing: bool,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub mode: PlaybackMode,
}

impl PlaybackSession {
    pub(crate) fn new(mode: PlaybackMode) -> Self {
        Self {
            current_track: None,
            current_index: None,
            playing: false,
            position_seconds: 0.0,
            duration_seconds: f64::NAN,
            mode,
        }
    }
}

/// Diagnostic snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub mode: PlaybackMode,
    pub catalog_len: usize,
    pub current_index: Option<usize>,
    pub state: PlayerState,
    pub volume: f32,
    pub muted: bool,
}
