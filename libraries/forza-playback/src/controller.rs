//! Playback controller
//!
//! Single owner of what is loaded and whether it plays. Driven by three
//! inputs: listener commands, media events from the audible sink, and timer
//! ticks (liveness check and error recovery). Results go out as queued
//! [`PlayerEvent`]s.
//!
//! # Load order
//!
//! On every track change the title and artist are published first, art
//! resolution starts second, and audio is loaded last, so the metadata a
//! listener sees never lags the audio.

use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::preload::PreloadCoordinator;
use crate::progress::{ArtCrossfade, ProgressReporter, ProgressSnapshot};
use crate::track_source::TrackSource;
use crate::types::{
    Direction, MediaEvent, PlaybackSession, PlaybackStatus, PlayerCommand, PlayerConfig,
    PlayerState, SeekTarget,
};
use crate::volume::Volume;
use forza_artwork::{placeholder_image, ArtResolver};
use forza_core::{AudioSink, PlaybackMode, PreferenceStore, Track};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Title shown when nothing can be played
const NO_TRACKS_TITLE: &str = "No songs available";

/// Resolved art delivered back to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ArtUpdate {
    /// Art for the track loaded under `generation`
    Current { generation: u64, url: String },
    /// Art for the preload slot `epoch` at catalog position `index`
    Preloaded { epoch: u64, index: usize, url: String },
}

/// Playback state machine
pub struct PlaybackController {
    config: PlayerConfig,
    source: TrackSource,
    audio: Box<dyn AudioSink>,
    preload: PreloadCoordinator,
    art: Arc<ArtResolver>,
    prefs: Option<Arc<dyn PreferenceStore>>,
    volume: Volume,

    state: PlayerState,
    session: PlaybackSession,

    /// Listener wants audio; survives load, seek and error recovery
    intends_to_play: bool,
    /// Play requested before the sink was playable
    play_deferred: bool,
    /// End already handled for the loaded track
    end_handled: bool,
    /// Liveness finished a track before its `Ended` arrived
    late_end_expected: bool,
    /// Bumped on every load; tags async art results
    generation: u64,
    recovery_at: Option<Instant>,

    art_tx: mpsc::UnboundedSender<ArtUpdate>,
    art_rx: mpsc::UnboundedReceiver<ArtUpdate>,
    crossfade: ArtCrossfade,

    pending_events: Vec<PlayerEvent>,
}

impl PlaybackController {
    /// Create a controller
    ///
    /// `audio` is the audible sink; `buffer` is the silent sink used for
    /// preloading.
    pub fn new(
        config: PlayerConfig,
        source: TrackSource,
        audio: Box<dyn AudioSink>,
        buffer: Box<dyn AudioSink>,
        art: Arc<ArtResolver>,
    ) -> Self {
        let (art_tx, art_rx) = mpsc::unbounded_channel();
        let session = PlaybackSession::new(source.mode());
        let crossfade = ArtCrossfade::new(
            Duration::from_millis(config.art_fade_ms),
            Duration::from_millis(config.art_swap_delay_ms),
        );

        Self {
            preload: PreloadCoordinator::new(buffer, config.preload_after_secs),
            volume: Volume::new(config.default_volume),
            config,
            source,
            audio,
            art,
            prefs: None,
            state: PlayerState::Idle,
            session,
            intends_to_play: false,
            play_deferred: false,
            end_handled: false,
            late_end_expected: false,
            generation: 0,
            recovery_at: None,
            art_tx,
            art_rx,
            crossfade,
            pending_events: Vec::new(),
        }
    }

    /// Persist the volume level in `prefs`, starting from the stored value
    #[must_use]
    pub fn with_preferences(mut self, prefs: Arc<dyn PreferenceStore>) -> Self {
        self.volume = Volume::load(prefs.as_ref(), self.config.default_volume);
        self.prefs = Some(prefs);
        self
    }

    // ===== Accessors =====

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn source(&self) -> &TrackSource {
        &self.source
    }

    pub fn preload(&self) -> &PreloadCoordinator {
        &self.preload
    }

    /// When the scheduled error recovery fires, if one is pending
    pub fn recovery_deadline(&self) -> Option<Instant> {
        self.recovery_at
    }

    /// Diagnostic snapshot
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            mode: self.source.mode(),
            catalog_len: self.source.len(),
            current_index: self.session.current_index,
            state: self.state,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        }
    }

    // ===== Lifecycle =====

    /// Load the catalog and the first track
    ///
    /// An unreachable or empty catalog leaves the controller idle with a
    /// placeholder; `refresh_catalog` can recover later.
    pub async fn start(&mut self) {
        self.audio.set_volume(self.volume.effective());
        if let Err(e) = self.source.refresh().await {
            warn!(error = %e, "Initial catalog load failed");
        }
        self.emit(PlayerEvent::CatalogChanged {
            len: self.source.len(),
        });

        match self.source.begin() {
            Some((index, track)) => {
                info!(tracks = self.source.len(), "Player ready");
                self.load_track(index, track, self.config.autoplay).await;
            }
            None => self.enter_idle(),
        }
    }

    /// Re-fetch the catalog
    ///
    /// The playing track keeps playing; only the cursor and the preload are
    /// re-pointed. On failure the prior catalog stays active.
    pub async fn refresh_catalog(&mut self) -> Result<()> {
        let catalog = self.source.refresh().await?;
        self.preload.discard();
        self.session.current_index = self.source.current_index();
        self.emit(PlayerEvent::CatalogChanged { len: catalog.len() });

        if self.state == PlayerState::Idle {
            if let Some((index, track)) = self.source.begin() {
                self.load_track(index, track, self.config.autoplay).await;
            }
        }
        Ok(())
    }

    /// Apply a listener command
    pub async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::PlayPause => self.play_pause().await,
            PlayerCommand::Next => self.advance(Direction::Next).await,
            PlayerCommand::Previous => self.advance(Direction::Previous).await,
            PlayerCommand::Seek(target) => {
                self.seek(target).await;
            }
            PlayerCommand::PlayIndex(index) => self.play_index(index).await,
            PlayerCommand::SetVolume(level) => self.set_volume(level),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::SetMode(mode) => {
                if let Err(e) = self.set_mode(mode) {
                    warn!(error = %e, "Mode change rejected");
                }
            }
            PlayerCommand::ToggleShuffle => {
                self.toggle_shuffle();
            }
            PlayerCommand::RefreshCatalog => {
                if let Err(e) = self.refresh_catalog().await {
                    warn!(error = %e, "Catalog refresh failed");
                }
            }
            PlayerCommand::ArtLoaded(request) => self.art_loaded(request),
            PlayerCommand::ArtFailed(request) => self.art_failed(request),
            PlayerCommand::Shutdown => {
                self.audio.pause();
                self.intends_to_play = false;
            }
        }
    }

    /// Apply a media event from the audible sink
    pub async fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::CanPlay => self.on_can_play().await,
            MediaEvent::LoadedMetadata => {
                self.session.duration_seconds = self.audio.duration();
                self.report_progress();
            }
            MediaEvent::TimeUpdate => self.on_time_update(),
            MediaEvent::Ended => {
                if std::mem::take(&mut self.late_end_expected) && !self.sink_near_end() {
                    debug!("Ignoring late end of a track already finished");
                    return;
                }
                self.on_ended().await;
            }
            MediaEvent::Error(message) => self.on_media_error(&message),
        }
    }

    // ===== Transport =====

    /// Toggle between playing and paused
    ///
    /// Play on a sink that is not yet playable is deferred until it is.
    pub async fn play_pause(&mut self) {
        match self.state {
            PlayerState::Idle => debug!("Nothing to play"),
            PlayerState::Error => {
                // Recovery picks up the intent
                self.intends_to_play = !self.intends_to_play;
            }
            _ if self.intends_to_play => self.pause(),
            _ => {
                self.intends_to_play = true;
                self.request_play().await;
            }
        }
    }

    /// Move to the next or previous track
    pub async fn advance(&mut self, direction: Direction) {
        let autoplay = self.intends_to_play;
        self.advance_with(direction, autoplay).await;
    }

    /// Jump to a catalog position and play it
    pub async fn play_index(&mut self, index: usize) {
        match self.source.select(index) {
            Some((index, track)) => self.load_track(index, track, true).await,
            None => warn!(index, "No track at index"),
        }
    }

    /// Seek and resume playback
    ///
    /// The target is clamped to `[0, duration]`. Ignored while the duration
    /// is unknown. Returns the position actually applied.
    pub async fn seek(&mut self, target: SeekTarget) -> Option<f64> {
        let duration = self.audio.duration();
        if !duration.is_finite() || duration <= 0.0 {
            debug!("Seek ignored, duration unknown");
            return None;
        }

        let seconds = match target {
            SeekTarget::Fraction(fraction) => fraction * duration,
            SeekTarget::Seconds(seconds) => seconds,
        };
        if seconds.is_nan() {
            return None;
        }
        let seconds = seconds.clamp(0.0, duration);

        self.set_state(PlayerState::Seeking);
        self.audio.set_current_time(seconds);
        self.session.position_seconds = seconds;
        self.report_progress();

        self.intends_to_play = true;
        self.request_play().await;
        Some(seconds)
    }

    // ===== Volume & mode =====

    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    /// Switch advance policy; any preload targets the old order and is
    /// dropped
    pub fn set_mode(&mut self, mode: PlaybackMode) -> Result<()> {
        if mode == self.source.mode() {
            return Ok(());
        }
        self.source
            .set_mode(mode)
            .map_err(|e| PlaybackError::InvalidOperation(e.to_string()))?;
        self.preload.discard();
        self.session.mode = mode;
        self.emit(PlayerEvent::ModeChanged { mode });
        Ok(())
    }

    /// Toggle shuffle: Sequential and Shuffled swap locally, a feed toggles
    /// its own order. Returns whether shuffle is now on.
    pub fn toggle_shuffle(&mut self) -> bool {
        if let Some(on) = self.source.toggle_feed_shuffle() {
            self.preload.discard();
            return on;
        }
        let mode = match self.source.mode() {
            PlaybackMode::Shuffled => PlaybackMode::Sequential,
            _ => PlaybackMode::Shuffled,
        };
        if let Err(e) = self.set_mode(mode) {
            warn!(error = %e, "Shuffle toggle rejected");
        }
        self.source.mode() == PlaybackMode::Shuffled
    }

    // ===== Timers =====

    /// Detect a missed end: playing, within tolerance of the duration, and
    /// no end handled yet
    pub async fn liveness_check(&mut self) {
        if self.state != PlayerState::Playing || self.end_handled {
            return;
        }
        if self.sink_near_end() {
            warn!("Missed end of track detected");
            self.late_end_expected = true;
            self.on_ended().await;
        }
    }

    /// The sink's position is within the end tolerance of a known duration
    fn sink_near_end(&self) -> bool {
        let duration = self.audio.duration();
        duration.is_finite()
            && duration > 0.0
            && self.audio.current_time() >= duration - self.config.end_tolerance_secs
    }

    /// Run the scheduled error recovery if its deadline has passed
    pub async fn recover(&mut self) {
        let Some(deadline) = self.recovery_at else {
            return;
        };
        if Instant::now() < deadline {
            return;
        }
        self.recovery_at = None;
        info!("Recovering from playback error");
        let autoplay = self.intends_to_play;
        self.advance_with(Direction::Next, autoplay).await;
    }

    // ===== Art =====

    /// Apply a resolved art result
    ///
    /// Results for a track or preload slot that is no longer current are
    /// dropped.
    pub fn handle_art_update(&mut self, update: ArtUpdate) {
        match update {
            ArtUpdate::Current { generation, url } => {
                if generation == self.generation {
                    self.show_art(&url);
                } else {
                    debug!(generation, current = self.generation, "Dropping stale art");
                }
            }
            ArtUpdate::Preloaded { epoch, index, url } => {
                self.preload.record_art(epoch, index, url);
            }
        }
    }

    /// Wait for the next art result and apply it
    pub async fn settle_art(&mut self) {
        if let Some(update) = self.art_rx.recv().await {
            self.handle_art_update(update);
        }
    }

    /// Run until `Shutdown` or the command channel closes
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayerCommand>,
        mut media: mpsc::Receiver<MediaEvent>,
        events: mpsc::UnboundedSender<PlayerEvent>,
    ) {
        let mut liveness = tokio::time::interval(self.config.liveness_interval());
        liveness.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let recovery = self.recovery_at;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(PlayerCommand::Shutdown) | None => {
                        self.handle_command(PlayerCommand::Shutdown).await;
                        info!("Player shutting down");
                        break;
                    }
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = media.recv() => self.on_media_event(event).await,
                Some(update) = self.art_rx.recv() => self.handle_art_update(update),
                _ = liveness.tick() => self.liveness_check().await,
                () = wait_until(recovery) => self.recover().await,
            }

            for event in self.drain_events() {
                if events.send(event).is_err() {
                    debug!("Event receiver dropped");
                    return;
                }
            }
        }

        for event in self.drain_events() {
            let _ = events.send(event);
        }
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "State change");
            self.state = state;
            self.emit(PlayerEvent::StateChanged { state });
        }
    }

    // ===== Internals =====

    async fn advance_with(&mut self, direction: Direction, autoplay: bool) {
        let next = match direction {
            Direction::Next => self.source.advance(),
            Direction::Previous => self.source.previous(),
        };
        match next {
            Some((index, track)) => self.load_track(index, track, autoplay).await,
            None => self.enter_idle(),
        }
    }

    async fn load_track(&mut self, index: usize, track: Track, autoplay: bool) {
        self.generation += 1;
        self.end_handled = false;
        self.play_deferred = false;
        self.recovery_at = None;

        // Metadata first
        info!(index, title = track.title(), artist = track.artist(), "Loading track");
        self.session.current_track = Some(track.clone());
        self.session.current_index = Some(index);
        self.session.position_seconds = 0.0;
        self.session.duration_seconds = f64::NAN;
        self.session.playing = false;
        self.emit(PlayerEvent::TrackChanged {
            index,
            track: track.clone(),
        });
        self.emit(PlayerEvent::Progress(ProgressSnapshot::zero()));
        self.set_state(PlayerState::Loading);

        // Art second
        let claim = self.preload.claim(index, &track);
        if let Some(url) = claim
            .art_url
            .or_else(|| self.art.cached(track.title(), track.artist()))
        {
            self.show_art(&url);
        } else {
            self.spawn_current_art(&track);
        }

        // Audio last
        let loaded = if claim.adopt {
            self.audio.adopt_from(self.preload.buffer_mut())
        } else {
            self.audio.load(track.audio_locator())
        };
        if let Err(e) = loaded {
            self.intends_to_play = self.intends_to_play || autoplay;
            self.on_media_error(&e.to_string());
            return;
        }
        self.audio.set_volume(self.volume.effective());

        if autoplay {
            self.intends_to_play = true;
            self.request_play().await;
        } else {
            self.intends_to_play = false;
            if self.audio.readiness().is_playable() {
                self.set_state(PlayerState::Ready);
            }
        }
    }

    async fn request_play(&mut self) {
        if self.audio.readiness().is_playable() {
            self.play_deferred = false;
            self.start_audio().await;
        } else {
            debug!("Sink not ready, deferring play");
            self.play_deferred = true;
        }
    }

    async fn start_audio(&mut self) {
        match self.audio.play().await {
            Ok(()) => {
                self.session.playing = true;
                self.set_state(PlayerState::Playing);
            }
            Err(e) => {
                warn!(error = %e, "Playback rejected");
                self.intends_to_play = false;
                self.session.playing = false;
                self.audio.pause();
                self.set_state(PlayerState::Ready);
            }
        }
    }

    fn pause(&mut self) {
        self.audio.pause();
        self.intends_to_play = false;
        self.play_deferred = false;
        self.session.playing = false;
        if self.audio.readiness().is_playable() {
            self.set_state(PlayerState::Ready);
        }
    }

    async fn on_can_play(&mut self) {
        if !matches!(self.state, PlayerState::Loading | PlayerState::Seeking) {
            return;
        }
        if self.play_deferred && self.intends_to_play {
            self.play_deferred = false;
            self.start_audio().await;
        } else if !self.intends_to_play {
            self.set_state(PlayerState::Ready);
        }
    }

    fn on_time_update(&mut self) {
        let current = self.audio.current_time();
        self.session.position_seconds = current;
        self.session.duration_seconds = self.audio.duration();
        self.report_progress();

        if self.preload.should_arm(current, self.intends_to_play) {
            if let Some((index, track)) = self.source.peek_next() {
                if let Ok(epoch) = self.preload.arm(index, &track) {
                    self.spawn_preload_art(epoch, index, &track);
                }
            }
        }
        if let Some(index) = self.preload.poll_ready() {
            self.emit(PlayerEvent::NextTrackPrepared { index });
        }
    }

    async fn on_ended(&mut self) {
        if self.end_handled || matches!(self.state, PlayerState::Idle | PlayerState::Loading) {
            return;
        }
        self.end_handled = true;
        self.session.playing = false;
        self.set_state(PlayerState::Ended);
        self.emit(PlayerEvent::TrackFinished {
            index: self.session.current_index,
        });
        self.advance_with(Direction::Next, true).await;
    }

    fn on_media_error(&mut self, message: &str) {
        warn!(
            error = message,
            track = ?self.session.current_track.as_ref().map(|t| t.title()),
            "Media error"
        );
        self.session.playing = false;
        self.play_deferred = false;
        self.set_state(PlayerState::Error);
        if self.recovery_at.is_none() {
            self.recovery_at = Some(Instant::now() + self.config.error_backoff());
        }
    }

    fn enter_idle(&mut self) {
        self.audio.pause();
        self.intends_to_play = false;
        self.play_deferred = false;
        self.recovery_at = None;
        self.session.current_track = None;
        self.session.current_index = None;
        self.session.playing = false;
        self.set_state(PlayerState::Idle);
        self.emit(PlayerEvent::NoTracks {
            title: NO_TRACKS_TITLE.to_string(),
            art_url: placeholder_image(NO_TRACKS_TITLE),
        });
    }

    fn report_progress(&mut self) {
        if let Some(snapshot) =
            ProgressReporter::snapshot(self.audio.current_time(), self.audio.duration())
        {
            self.emit(PlayerEvent::Progress(snapshot));
        }
    }

    fn apply_volume(&mut self) {
        self.audio.set_volume(self.volume.effective());
        if let Some(prefs) = &self.prefs {
            self.volume.persist(prefs.as_ref());
        }
        self.emit(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
            tier: self.volume.tier(),
        });
    }

    fn show_art(&mut self, url: &str) {
        if let Some(request) = self.crossfade.request(url) {
            self.emit(PlayerEvent::ArtPreload {
                request,
                url: url.to_string(),
            });
        }
    }

    fn art_loaded(&mut self, request: u64) {
        if let Some(swap) = self.crossfade.loaded(request) {
            self.emit(PlayerEvent::ArtSwap(swap));
        }
    }

    fn art_failed(&mut self, request: u64) {
        debug!(request, "Art image failed to load, keeping current");
        self.crossfade.failed(request);
    }

    fn spawn_current_art(&self, track: &Track) {
        let art = Arc::clone(&self.art);
        let tx = self.art_tx.clone();
        let generation = self.generation;
        let (title, artist) = (track.title().to_string(), track.artist().to_string());
        tokio::spawn(async move {
            let url = art.resolve(&title, &artist).await;
            let _ = tx.send(ArtUpdate::Current { generation, url });
        });
    }

    fn spawn_preload_art(&self, epoch: u64, index: usize, track: &Track) {
        let art = Arc::clone(&self.art);
        let tx = self.art_tx.clone();
        let (title, artist) = (track.title().to_string(), track.artist().to_string());
        tokio::spawn(async move {
            let url = art.resolve(&title, &artist).await;
            let _ = tx.send(ArtUpdate::Preloaded { epoch, index, url });
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
