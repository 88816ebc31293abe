//! Progress & transition reporting
//!
//! Turns raw sink timing into display-ready values and sequences art
//! cross-fades so that a slow image never overwrites a newer one.

use serde::Serialize;
use std::time::Duration;

/// Format seconds as `m:ss`
///
/// Non-finite or negative input formats as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Progress values ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Fill fraction in `[0, 1]`
    pub fraction: f64,
    pub elapsed: String,
    pub total: String,
}

impl ProgressSnapshot {
    /// Snapshot shown while a new track loads
    pub fn zero() -> Self {
        Self {
            fraction: 0.0,
            elapsed: format_time(0.0),
            total: format_time(0.0),
        }
    }
}

/// Converts sink timing into [`ProgressSnapshot`]s
pub struct ProgressReporter;

impl ProgressReporter {
    /// Build a snapshot, or `None` while the duration is unknown
    pub fn snapshot(current: f64, duration: f64) -> Option<ProgressSnapshot> {
        if !duration.is_finite() || duration <= 0.0 {
            return None;
        }
        let current = if current.is_finite() {
            current.clamp(0.0, duration)
        } else {
            0.0
        };
        Some(ProgressSnapshot {
            fraction: current / duration,
            elapsed: format_time(current),
            total: format_time(duration),
        })
    }
}

/// Instruction to swap the visible art
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtSwap {
    pub url: String,
    /// Total fade duration
    pub fade: Duration,
    /// When to swap the image after the fade-out starts
    pub swap_delay: Duration,
}

/// Art cross-fade sequencing
///
/// Each art change gets a request id. The image is preloaded off-screen and
/// swapped in only if its request is still the latest one once it loads. A
/// failed load keeps the current image.
#[derive(Debug)]
pub struct ArtCrossfade {
    fade: Duration,
    swap_delay: Duration,
    next_request: u64,
    pending: Option<(u64, String)>,
    visible: Option<String>,
}

impl ArtCrossfade {
    pub fn new(fade: Duration, swap_delay: Duration) -> Self {
        Self {
            fade,
            swap_delay,
            next_request: 0,
            pending: None,
            visible: None,
        }
    }

    /// Start an art change; returns the request id to preload under, or
    /// `None` when `url` is already visible
    pub fn request(&mut self, url: &str) -> Option<u64> {
        if self.visible.as_deref() == Some(url) {
            self.pending = None;
            return None;
        }
        self.next_request += 1;
        self.pending = Some((self.next_request, url.to_string()));
        Some(self.next_request)
    }

    /// The off-screen preload for `request` finished
    pub fn loaded(&mut self, request: u64) -> Option<ArtSwap> {
        match self.pending.take() {
            Some((id, url)) if id == request => {
                self.visible = Some(url.clone());
                Some(ArtSwap {
                    url,
                    fade: self.fade,
                    swap_delay: self.swap_delay,
                })
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// The off-screen preload for `request` failed
    pub fn failed(&mut self, request: u64) {
        if matches!(&self.pending, Some((id, _)) if *id == request) {
            self.pending = None;
        }
    }

    /// Image currently shown
    pub fn visible(&self) -> Option<&str> {
        self.visible.as_deref()
    }
}
