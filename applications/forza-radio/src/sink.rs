//! Simulated audio backend
//!
//! Stands in for a decoder: a load becomes playable after a fixed delay,
//! every track lasts the configured length, and position advances with the
//! tokio clock while playing. The audible sink pushes media events from a
//! background clock task; the buffering sink is silent.

use crate::config::SimulationSettings;
use async_trait::async_trait;
use forza_core::{AudioSink, PlayerError, Readiness, Result};
use forza_playback::MediaEvent;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

#[derive(Debug)]
struct SimState {
    locator: Option<String>,
    ready_at: Option<Instant>,
    announced: bool,
    position: f64,
    track_secs: f64,
    load_delay: Duration,
    paused: bool,
    ended: bool,
    volume: f32,
}

impl SimState {
    fn is_ready(&self) -> bool {
        self.ready_at.is_some_and(|at| Instant::now() >= at)
    }

    fn point_at(&mut self, locator: &str, delay: Duration) {
        self.locator = Some(locator.to_string());
        self.ready_at = Some(Instant::now() + delay);
        self.announced = false;
        self.position = 0.0;
        self.paused = true;
        self.ended = false;
    }
}

/// Simulated [`AudioSink`]
pub struct SimulatedSink {
    state: Arc<Mutex<SimState>>,
    locator: Option<String>,
}

impl SimulatedSink {
    /// Audible sink reporting media events on `events`
    ///
    /// Must be called inside a tokio runtime. The clock task stops once the
    /// sink is dropped or the receiver closes.
    pub fn audible(settings: &SimulationSettings, events: mpsc::Sender<MediaEvent>) -> Self {
        let sink = Self::silent(settings);
        let tick = Duration::from_millis(settings.tick_ms.max(1));
        tokio::spawn(run_clock(Arc::downgrade(&sink.state), events, tick));
        sink
    }

    /// Silent sink for preloading
    pub fn silent(settings: &SimulationSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                locator: None,
                ready_at: None,
                announced: false,
                position: 0.0,
                track_secs: settings.track_secs,
                load_delay: Duration::from_millis(settings.load_delay_ms),
                paused: true,
                ended: false,
                volume: 1.0,
            })),
            locator: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AudioSink for SimulatedSink {
    fn load(&mut self, locator: &str) -> Result<()> {
        if locator.trim().is_empty() {
            return Err(PlayerError::audio_load("empty locator"));
        }
        debug!(%locator, "Simulated load");
        let mut state = self.lock();
        let delay = state.load_delay;
        state.point_at(locator, delay);
        drop(state);
        self.locator = Some(locator.to_string());
        Ok(())
    }

    /// A playable buffer hands over instantly
    fn adopt_from(&mut self, buffered: &mut dyn AudioSink) -> Result<()> {
        let locator = buffered
            .locator()
            .map(str::to_owned)
            .ok_or_else(|| PlayerError::audio_load("buffer has no source"))?;
        let delay = if buffered.readiness().is_playable() {
            Duration::ZERO
        } else {
            self.lock().load_delay
        };
        self.lock().point_at(&locator, delay);
        self.locator = Some(locator);
        Ok(())
    }

    fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    fn readiness(&self) -> Readiness {
        if self.lock().is_ready() {
            Readiness::CanPlayThrough
        } else {
            Readiness::NoData
        }
    }

    fn current_time(&self) -> f64 {
        self.lock().position
    }

    fn duration(&self) -> f64 {
        let state = self.lock();
        if state.is_ready() {
            state.track_secs
        } else {
            f64::NAN
        }
    }

    async fn play(&mut self) -> Result<()> {
        let mut state = self.lock();
        if !state.is_ready() {
            return Err(PlayerError::rejected("no playable source"));
        }
        state.paused = false;
        state.ended = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.lock();
        state.position = seconds.clamp(0.0, state.track_secs);
        state.ended = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.lock().volume = volume;
    }
}

async fn run_clock(state: Weak<Mutex<SimState>>, events: mpsc::Sender<MediaEvent>, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        let Some(state) = state.upgrade() else {
            break;
        };

        let mut batch = Vec::new();
        {
            let mut sim = lock_state(&state);
            if sim.is_ready() && !sim.announced {
                sim.announced = true;
                batch.push(MediaEvent::LoadedMetadata);
                batch.push(MediaEvent::CanPlay);
            }
            if sim.is_ready() && !sim.paused && !sim.ended {
                sim.position = (sim.position + tick.as_secs_f64()).min(sim.track_secs);
                batch.push(MediaEvent::TimeUpdate);
                if sim.position >= sim.track_secs {
                    sim.ended = true;
                    sim.paused = true;
                    batch.push(MediaEvent::Ended);
                }
            }
        }
        drop(state);

        for event in batch {
            trace!(?event, "Simulated media event");
            if events.send(event).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SimulationSettings {
        SimulationSettings {
            track_secs: 2.0,
            tick_ms: 500,
            load_delay_ms: 100,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_becomes_playable_after_delay() {
        let mut sink = SimulatedSink::silent(&settings());
        sink.load("a.mp3").unwrap();
        assert_eq!(sink.readiness(), Readiness::NoData);
        assert!(sink.duration().is_nan());
        assert!(sink.play().await.is_err());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(sink.readiness(), Readiness::CanPlayThrough);
        assert_eq!(sink.duration(), 2.0);
        assert!(sink.play().await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_locator_fails() {
        let mut sink = SimulatedSink::silent(&settings());
        assert!(sink.load("  ").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_audible_sink_reports_until_end() {
        let (tx, mut rx) = mpsc::channel(32);
        let mut sink = SimulatedSink::audible(&settings(), tx);
        sink.load("a.mp3").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        sink.play().await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = event == MediaEvent::Ended;
            events.push(event);
            if done {
                break;
            }
        }

        assert_eq!(events[0], MediaEvent::LoadedMetadata);
        assert_eq!(events[1], MediaEvent::CanPlay);
        assert_eq!(events.last(), Some(&MediaEvent::Ended));
        assert_eq!(sink.current_time(), 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_adopting_ready_buffer_is_instant() {
        let mut buffer = SimulatedSink::silent(&settings());
        buffer.load("b.mp3").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;

        let mut audible = SimulatedSink::silent(&settings());
        audible.adopt_from(&mut buffer).unwrap();
        assert_eq!(audible.locator(), Some("b.mp3"));
        assert!(audible.readiness().is_playable());
    }
}
