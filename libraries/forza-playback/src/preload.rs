//! Preload coordinator
//!
//! Buffers the upcoming track in a silent sink once the current track has
//! played long enough, and decides at the next transition whether that
//! buffer may be adopted. Every slot carries an epoch; anything that
//! invalidates the slot bumps the epoch so late art results for it are
//! ignored.

use forza_core::{AudioSink, Result, Track};
use tracing::{debug, info, warn};

/// Preload lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadState {
    /// Nothing buffered
    Idle,
    /// Buffer loading
    Armed,
    /// Buffer playable
    Ready,
}

/// What is buffered, and for which catalog position
#[derive(Debug, Clone, PartialEq)]
pub struct PreloadSlot {
    pub for_index: usize,
    pub locator: String,
    pub art_url: Option<String>,
    pub epoch: u64,
}

/// Outcome of claiming the slot for a track about to play
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claim {
    /// The buffer holds this track and is playable
    pub adopt: bool,
    /// Art resolved while preloading
    pub art_url: Option<String>,
}

/// Two locators name the same audio
///
/// Relative and absolute forms of one file match by suffix. Empty locators
/// never match.
pub fn locators_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.ends_with(b) || b.ends_with(a)
}

/// Owns the buffering sink and the preload slot
pub struct PreloadCoordinator {
    buffer: Box<dyn AudioSink>,
    slot: Option<PreloadSlot>,
    epoch: u64,
    threshold_secs: f64,
    /// Set once the current track has armed, successfully or not
    armed_for_track: bool,
    reported_ready: bool,
}

impl PreloadCoordinator {
    pub fn new(buffer: Box<dyn AudioSink>, threshold_secs: f64) -> Self {
        Self {
            buffer,
            slot: None,
            epoch: 0,
            threshold_secs,
            armed_for_track: false,
            reported_ready: false,
        }
    }

    pub fn state(&self) -> PreloadState {
        match &self.slot {
            None => PreloadState::Idle,
            Some(slot) if self.buffer_holds(&slot.locator) => PreloadState::Ready,
            Some(_) => PreloadState::Armed,
        }
    }

    pub fn slot(&self) -> Option<&PreloadSlot> {
        self.slot.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a progress update at `elapsed` seconds should arm
    ///
    /// Arms at most once per track, only while the listener intends to play.
    pub fn should_arm(&self, elapsed: f64, intends_to_play: bool) -> bool {
        intends_to_play
            && !self.armed_for_track
            && self.slot.is_none()
            && elapsed.is_finite()
            && elapsed >= self.threshold_secs
    }

    /// Start buffering `track` for catalog position `index`
    ///
    /// Returns the slot epoch to tag the art lookup with.
    pub fn arm(&mut self, index: usize, track: &Track) -> Result<u64> {
        self.armed_for_track = true;
        self.reported_ready = false;
        let locator = track.audio_locator().to_string();

        if let Err(e) = self.buffer.load(&locator) {
            warn!(index, error = %e, "Preload failed to start");
            return Err(e);
        }

        self.epoch += 1;
        debug!(index, epoch = self.epoch, %locator, "Preloading next track");
        self.slot = Some(PreloadSlot {
            for_index: index,
            locator,
            art_url: None,
            epoch: self.epoch,
        });
        Ok(self.epoch)
    }

    /// Attach resolved art to the slot it was requested for
    ///
    /// Returns `false` when the slot has since been discarded or replaced.
    pub fn record_art(&mut self, epoch: u64, index: usize, url: String) -> bool {
        match self.slot.as_mut() {
            Some(slot) if slot.epoch == epoch && slot.for_index == index => {
                slot.art_url = Some(url);
                true
            }
            _ => {
                debug!(index, epoch, "Dropping art for a stale preload");
                false
            }
        }
    }

    /// Report the slot's index once, the first time the buffer is playable
    pub fn poll_ready(&mut self) -> Option<usize> {
        if self.reported_ready || self.state() != PreloadState::Ready {
            return None;
        }
        self.reported_ready = true;
        self.slot.as_ref().map(|slot| slot.for_index)
    }

    /// Consume the slot for the track about to play at `index`
    ///
    /// The buffer is adoptable only when the slot was armed for this index,
    /// its locator still matches what the catalog reports for the index, and
    /// the buffer is playable. Any other slot is stale and discarded. Either
    /// way the coordinator resets for the new track.
    pub fn claim(&mut self, index: usize, track: &Track) -> Claim {
        let claim = match self.slot.take() {
            Some(slot)
                if slot.for_index == index
                    && locators_match(&slot.locator, track.audio_locator()) =>
            {
                let adopt = self.buffer_holds(&slot.locator);
                if adopt {
                    info!(index, "Adopting preloaded audio");
                } else {
                    debug!(index, "Preloaded audio not ready, loading fresh");
                }
                Claim {
                    adopt,
                    art_url: slot.art_url,
                }
            }
            Some(slot) => {
                debug!(
                    slot_index = slot.for_index,
                    index, "Discarding stale preload"
                );
                Claim::default()
            }
            None => Claim::default(),
        };
        self.epoch += 1;
        self.armed_for_track = false;
        self.reported_ready = false;
        claim
    }

    /// Drop the slot; the current track may arm again
    pub fn discard(&mut self) {
        if self.slot.take().is_some() {
            debug!(epoch = self.epoch, "Preload discarded");
        }
        self.epoch += 1;
        self.armed_for_track = false;
        self.reported_ready = false;
    }

    /// The buffering sink, for adoption
    pub fn buffer_mut(&mut self) -> &mut dyn AudioSink {
        self.buffer.as_mut()
    }

    fn buffer_holds(&self, locator: &str) -> bool {
        self.buffer.readiness().is_playable()
            && self
                .buffer
                .locator()
                .is_some_and(|loaded| locators_match(loaded, locator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forza_core::Readiness;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct BufferState {
        locator: Option<String>,
        readiness: Option<Readiness>,
        loads: usize,
    }

    struct Buffer(Arc<Mutex<BufferState>>);

    #[async_trait]
    impl AudioSink for Buffer {
        fn load(&mut self, locator: &str) -> Result<()> {
            let mut state = self.0.lock().unwrap();
            state.locator = Some(locator.to_string());
            state.readiness = Some(Readiness::NoData);
            state.loads += 1;
            Ok(())
        }

        fn locator(&self) -> Option<&str> {
            None
        }

        fn readiness(&self) -> Readiness {
            self.0.lock().unwrap().readiness.unwrap_or(Readiness::NoData)
        }

        fn current_time(&self) -> f64 {
            0.0
        }

        fn duration(&self) -> f64 {
            f64::NAN
        }

        async fn play(&mut self) -> Result<()> {
            Ok(())
        }

        fn pause(&mut self) {}

        fn is_paused(&self) -> bool {
            true
        }

        fn set_current_time(&mut self, _seconds: f64) {}

        fn set_volume(&mut self, _volume: f32) {}
    }

    #[test]
    fn test_locators_match() {
        assert!(locators_match("a.mp3", "a.mp3"));
        assert!(locators_match("https://host/music/a.mp3", "music/a.mp3"));
        assert!(locators_match("a.mp3", "https://host/a.mp3"));
        assert!(!locators_match("a.mp3", "b.mp3"));
        assert!(!locators_match("", "a.mp3"));
        assert!(!locators_match("", ""));
    }

    #[test]
    fn test_should_arm_threshold() {
        let state = Arc::new(Mutex::new(BufferState::default()));
        let mut preload = PreloadCoordinator::new(Box::new(Buffer(state.clone())), 7.0);

        assert!(!preload.should_arm(6.9, true));
        assert!(!preload.should_arm(7.0, false));
        assert!(!preload.should_arm(f64::NAN, true));
        assert!(preload.should_arm(7.0, true));

        preload.arm(1, &Track::new("B", "X", "b.mp3")).unwrap();
        assert!(!preload.should_arm(8.0, true));
        assert_eq!(state.lock().unwrap().loads, 1);
        assert_eq!(preload.state(), PreloadState::Armed);
    }

    #[test]
    fn test_claim_with_changed_locator_is_stale() {
        let state = Arc::new(Mutex::new(BufferState::default()));
        let mut preload = PreloadCoordinator::new(Box::new(Buffer(state.clone())), 7.0);
        let epoch = preload.arm(1, &Track::new("B", "X", "b.mp3")).unwrap();
        assert!(preload.record_art(epoch, 1, "art-b.png".into()));

        let claim = preload.claim(1, &Track::new("Z", "X", "z.mp3"));
        assert_eq!(claim, Claim::default());
        assert_eq!(preload.state(), PreloadState::Idle);
    }

    #[test]
    fn test_claim_keeps_art_for_unready_buffer() {
        let state = Arc::new(Mutex::new(BufferState::default()));
        let mut preload = PreloadCoordinator::new(Box::new(Buffer(state)), 7.0);
        let track = Track::new("B", "X", "b.mp3");
        let epoch = preload.arm(1, &track).unwrap();
        preload.record_art(epoch, 1, "art-b.png".into());

        let claim = preload.claim(1, &track);
        assert!(!claim.adopt);
        assert_eq!(claim.art_url.as_deref(), Some("art-b.png"));
    }

    #[test]
    fn test_discard_rejects_late_art() {
        let state = Arc::new(Mutex::new(BufferState::default()));
        let mut preload = PreloadCoordinator::new(Box::new(Buffer(state)), 7.0);
        let epoch = preload.arm(2, &Track::new("C", "X", "c.mp3")).unwrap();
        preload.discard();
        assert!(!preload.record_art(epoch, 2, "late.png".into()));
        assert!(preload.should_arm(9.0, true));
    }
}
