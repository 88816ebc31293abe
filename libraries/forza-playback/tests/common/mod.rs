//! Shared fakes for playback tests
#![allow(dead_code)]

use async_trait::async_trait;
use forza_core::{AudioSink, ManifestSource, PlayerError, Readiness, Result, Track};
use std::sync::{Arc, Mutex, MutexGuard};

/// Observable state behind a [`FakeSink`]
#[derive(Debug)]
pub struct SinkState {
    pub locator: Option<String>,
    pub readiness: Readiness,
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    pub volume: f32,
    /// Readiness reached immediately after `load`
    pub ready_on_load: bool,
    pub reject_play: bool,
    pub fail_load: bool,
    pub loads: Vec<String>,
    pub adopted: Vec<String>,
    pub plays: usize,
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            locator: None,
            readiness: Readiness::NoData,
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            volume: 1.0,
            ready_on_load: true,
            reject_play: false,
            fail_load: false,
            loads: Vec::new(),
            adopted: Vec::new(),
            plays: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct SinkHandle(Arc<Mutex<SinkState>>);

impl SinkHandle {
    pub fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.0.lock().unwrap()
    }
}

/// In-memory audio sink
///
/// `locator()` must hand out a borrowed str, so the sink keeps its own copy
/// next to the shared state.
pub struct FakeSink {
    state: SinkHandle,
    locator: Option<String>,
}

impl FakeSink {
    pub fn new() -> (Self, SinkHandle) {
        let handle = SinkHandle::default();
        (
            Self {
                state: handle.clone(),
                locator: None,
            },
            handle,
        )
    }

    pub fn with_ready_on_load(ready: bool) -> (Self, SinkHandle) {
        let (sink, handle) = Self::new();
        handle.lock().ready_on_load = ready;
        (sink, handle)
    }

    fn point_at(&mut self, locator: &str) {
        self.locator = Some(locator.to_string());
        let mut state = self.state.lock();
        state.locator = Some(locator.to_string());
        state.current_time = 0.0;
        state.duration = f64::NAN;
        state.paused = true;
        state.readiness = if state.ready_on_load {
            Readiness::CanPlayThrough
        } else {
            Readiness::NoData
        };
    }
}

#[async_trait]
impl AudioSink for FakeSink {
    fn load(&mut self, locator: &str) -> Result<()> {
        if self.state.lock().fail_load {
            return Err(PlayerError::audio_load(format!("cannot load {locator}")));
        }
        self.point_at(locator);
        self.state.lock().loads.push(locator.to_string());
        Ok(())
    }

    fn adopt_from(&mut self, buffered: &mut dyn AudioSink) -> Result<()> {
        let locator = buffered
            .locator()
            .map(str::to_owned)
            .ok_or_else(|| PlayerError::audio_load("buffer has no source"))?;
        let readiness = buffered.readiness();
        self.point_at(&locator);
        let mut state = self.state.lock();
        state.readiness = readiness;
        state.adopted.push(locator);
        Ok(())
    }

    fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    fn readiness(&self) -> Readiness {
        self.state.lock().readiness
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    async fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_play {
            return Err(PlayerError::rejected("autoplay blocked"));
        }
        state.paused = false;
        state.plays += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.state.lock().current_time = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume;
    }
}

/// Manifest whose contents the test can swap between fetches
#[derive(Clone, Default)]
pub struct FakeManifest {
    tracks: Arc<Mutex<Option<Vec<Track>>>>,
}

impl FakeManifest {
    pub fn new(tracks: Vec<Track>) -> Self {
        let manifest = Self::default();
        manifest.set(Some(tracks));
        manifest
    }

    /// `None` makes the next fetch fail
    pub fn set(&self, tracks: Option<Vec<Track>>) {
        *self.tracks.lock().unwrap() = tracks;
    }
}

#[async_trait]
impl ManifestSource for FakeManifest {
    async fn fetch(&self) -> Result<Vec<Track>> {
        self.tracks
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PlayerError::source_unavailable("manifest unreachable"))
    }
}

pub fn track(name: &str) -> Track {
    Track::new(name, "Test Artist", format!("music/{}.mp3", name.to_lowercase()))
}

pub fn tracks(names: &[&str]) -> Vec<Track> {
    names.iter().map(|n| track(n)).collect()
}
