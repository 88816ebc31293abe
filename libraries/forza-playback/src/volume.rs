//! Volume preference with mute
//!
//! The stored level survives a mute, so unmuting restores it. Only the level
//! is persisted; mute is per-session.

use forza_core::PreferenceStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Preference key for the persisted volume level
pub const VOLUME_KEY: &str = "forza_radio_volume";

/// Icon tier for a volume level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTier {
    Off,
    Low,
    High,
}

/// Volume level in `[0, 1]` plus mute state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: f32,
    muted: bool,
}

impl Volume {
    /// Create a volume at `level`, clamped to `[0, 1]`
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
            muted: false,
        }
    }

    /// Read the persisted level, falling back to `default` when missing or
    /// unparseable
    pub fn load(prefs: &dyn PreferenceStore, default: f32) -> Self {
        match prefs.get(VOLUME_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<f32>() {
                Ok(level) if level.is_finite() => Self::new(level),
                _ => {
                    warn!(value = %raw, "Ignoring unparseable volume preference");
                    Self::new(default)
                }
            },
            Ok(None) => Self::new(default),
            Err(e) => {
                warn!(error = %e, "Failed to read volume preference");
                Self::new(default)
            }
        }
    }

    /// Persist the level; failures are logged and otherwise ignored
    pub fn persist(&self, prefs: &dyn PreferenceStore) {
        if let Err(e) = prefs.set(VOLUME_KEY, &self.level.to_string()) {
            warn!(error = %e, "Failed to persist volume preference");
        }
    }

    /// Stored level (unaffected by mute)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Set the level and unmute
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
        self.muted = false;
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level handed to the sink: 0 while muted
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    /// Icon tier for the effective level
    pub fn tier(&self) -> VolumeTier {
        let effective = self.effective();
        if effective <= 0.0 {
            VolumeTier::Off
        } else if effective < 0.5 {
            VolumeTier::Low
        } else {
            VolumeTier::High
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        return 1.0;
    }
    level.clamp(0.0, 1.0)
}
