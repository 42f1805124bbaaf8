//! The playback controller
//!
//! Owns the render surface, the current adaptive session and all
//! playback state. Everything here runs on one event-dispatch turn at
//! a time: native media events, engine events and timer callbacks all
//! re-enter through channels, never concurrently.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::session::{
    AdaptiveEngineFactory, AdaptiveSession, EngineEvent, MediaEvent, MediaSurface, SessionId,
    SessionTransition,
};
use crate::source::{classify, StreamKind};
use crate::utils::config::Config;
use crate::utils::error::{LiveframeError, Result};
use crate::utils::timer::TimerHandle;

use super::state::{PlayerState, StateSnapshot};
use super::{ErrorKind, Phase, PlaybackError};

/// Internal commands re-entering the controller from timers or the
/// embedding caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// A retry backoff timer elapsed. Carries the load generation it
    /// was scheduled under so retries for a replaced source are
    /// discarded.
    RetryElapsed { generation: u64 },
    /// The controls auto-hide timer elapsed.
    HideControls,
    Shutdown,
}

/// Retry backoff: 1000, 2000, 4000, 8000 then capped at 10000 ms.
pub fn backoff_delay(retry_count: u32) -> Duration {
    let ms = 1000u64.saturating_mul(1u64 << retry_count.min(16));
    Duration::from_millis(ms.min(10_000))
}

type StateCallback = Box<dyn Fn(&StateSnapshot) + Send>;

pub struct PlayerController {
    surface: Arc<dyn MediaSurface>,
    media_events: UnboundedReceiver<MediaEvent>,
    engine_factory: Arc<dyn AdaptiveEngineFactory>,
    config: Config,

    state: PlayerState,
    session: Option<AdaptiveSession>,
    source_url: Option<String>,

    /// Bumped on every load and reset; stale retry commands carry an
    /// older value and are dropped.
    generation: u64,
    last_error_at: Option<Instant>,

    retry_timer: TimerHandle,
    controls_timer: TimerHandle,

    command_tx: UnboundedSender<PlayerCommand>,
    command_rx: UnboundedReceiver<PlayerCommand>,

    subscribers: Vec<StateCallback>,
}

enum Wakeup {
    Command(Option<PlayerCommand>),
    Media(Option<MediaEvent>),
    Engine(Option<(SessionId, EngineEvent)>),
}

impl PlayerController {
    pub fn new(
        surface: Arc<dyn MediaSurface>,
        media_events: UnboundedReceiver<MediaEvent>,
        engine_factory: Arc<dyn AdaptiveEngineFactory>,
        config: Config,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = PlayerState::new(config.player.default_volume);

        Self {
            surface,
            media_events,
            engine_factory,
            config,
            state,
            session: None,
            source_url: None,
            generation: 0,
            last_error_at: None,
            retry_timer: TimerHandle::new(),
            controls_timer: TimerHandle::new(),
            command_tx,
            command_rx,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Sender half of the command channel, for embedding callers that
    /// need to shut the run loop down.
    pub fn command_sender(&self) -> UnboundedSender<PlayerCommand> {
        self.command_tx.clone()
    }

    /// Identifier of the current adaptive session, if one is attached.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    /// Register a state-change callback. Called with a snapshot after
    /// every observable transition.
    pub fn on_state_change<F>(&mut self, callback: F)
    where
        F: Fn(&StateSnapshot) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    fn emit_state(&self) {
        let snapshot = self.state.snapshot();
        for subscriber in &self.subscribers {
            subscriber(&snapshot);
        }
    }

    /// (Re)initialize playback for a URL. Any prior session is torn
    /// down first.
    pub fn load_source(&mut self, url: &str) {
        info!("Loading source: {}", url);

        self.generation += 1;
        self.retry_timer.cancel();
        self.last_error_at = None;
        self.session = None;

        self.state.reset_stream_state();
        self.source_url = Some(url.to_string());

        let kind = classify(url);
        self.state.stream_kind = Some(kind);

        match kind {
            StreamKind::RawNetwork => {
                self.state.phase = Phase::Error;
                self.state.last_error = Some(PlaybackError::terminal(
                    "Raw network streams cannot be played directly; convert the stream first",
                ));
            }
            _ => {
                self.state.phase = Phase::Loading;
                self.attach_strategy(url);
            }
        }

        self.emit_state();
    }

    /// Attach the playback strategy for an already-classified URL.
    fn attach_strategy(&mut self, url: &str) {
        match classify(url) {
            StreamKind::Adaptive if self.engine_factory.is_supported() => {
                match AdaptiveSession::new(
                    self.engine_factory.as_ref(),
                    &self.config.session,
                    Arc::clone(&self.surface),
                    url,
                    Duration::from_millis(self.config.player.error_debounce_ms),
                ) {
                    Ok(session) => self.session = Some(session),
                    Err(e) => {
                        warn!("Failed to create adaptive session: {}", e);
                        self.state.phase = Phase::Error;
                        self.state.last_error = Some(PlaybackError::terminal(e.to_string()));
                    }
                }
            }
            StreamKind::Adaptive if self.surface.supports_native_adaptive() => {
                debug!("No adaptive engine, using native playback");
                self.surface.set_source(url);
            }
            StreamKind::Adaptive => {
                self.state.phase = Phase::Error;
                self.state.last_error = Some(PlaybackError::terminal(
                    "Adaptive streams are not supported in this environment",
                ));
            }
            StreamKind::DirectFile => {
                self.surface.set_source(url);
            }
            StreamKind::RawNetwork => {
                // Rejected in load_source before reaching here
            }
        }
    }

    /// Hard recovery: destroy everything and reload the current source
    /// from a clean slate.
    pub fn reset(&mut self) {
        info!("Resetting player");
        self.controls_timer.cancel();
        match self.source_url.clone() {
            Some(url) => self.load_source(&url),
            None => {
                self.retry_timer.cancel();
                self.session = None;
                self.state.reset_stream_state();
                self.emit_state();
            }
        }
    }

    pub async fn play(&mut self) -> Result<()> {
        if !self.state.can_play && !self.state.is_ready {
            return Err(LiveframeError::Player(
                "Stream is still loading, please wait".to_string(),
            ));
        }
        self.surface.play().await
    }

    pub async fn pause(&mut self) -> Result<()> {
        self.surface.pause().await
    }

    /// Seek to an absolute position in seconds.
    pub fn seek(&mut self, seconds: f64) {
        let target = if self.state.duration.is_finite() {
            seconds.clamp(0.0, self.state.duration)
        } else {
            seconds.max(0.0)
        };
        self.surface.set_current_time(target);
        self.state.current_time = target;
        self.update_live_flags();
        self.emit_state();
    }

    /// Seek to a fraction of the duration. No-op on unbounded streams.
    pub fn seek_fraction(&mut self, fraction: f64) {
        if self.state.duration.is_finite() {
            self.seek(fraction.clamp(0.0, 1.0) * self.state.duration);
        }
    }

    /// Jump to the live edge. Only valid on live streams.
    pub fn go_live(&mut self) {
        if self.state.is_live_stream && self.state.duration.is_finite() {
            self.seek(self.state.duration);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        if volume > 0.0 {
            self.state.previous_volume = volume;
            if self.state.muted {
                self.state.muted = false;
                self.surface.set_muted(false);
            }
        } else {
            self.state.muted = true;
            self.surface.set_muted(true);
        }
        self.surface.set_volume(volume);
        self.emit_state();
    }

    pub fn set_muted(&mut self, muted: bool) {
        if muted == self.state.muted {
            return;
        }
        if muted {
            if self.state.volume > 0.0 {
                self.state.previous_volume = self.state.volume;
            }
            self.state.muted = true;
        } else {
            self.state.muted = false;
            self.state.volume = self.state.previous_volume;
            self.surface.set_volume(self.state.volume);
        }
        self.surface.set_muted(muted);
        self.emit_state();
    }

    /// Independent of playback phase; no effect on retry or error
    /// state.
    pub fn toggle_fullscreen(&mut self) {
        self.state.fullscreen = !self.state.fullscreen;
        self.emit_state();
    }

    /// Show the controls and, while playing, arm the auto-hide timer.
    pub fn show_controls(&mut self) {
        self.state.controls_visible = true;
        if self.state.phase == Phase::Playing {
            let tx = self.command_tx.clone();
            self.controls_timer.schedule(
                Duration::from_millis(self.config.player.controls_hide_ms),
                async move {
                    let _ = tx.send(PlayerCommand::HideControls);
                },
            );
        } else {
            self.controls_timer.cancel();
        }
    }

    fn update_live_flags(&mut self) {
        self.state.update_live_flags(
            self.config.player.live_duration_threshold_secs,
            self.config.player.live_edge_threshold_secs,
        );
    }

    fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Play => {
                self.state.phase = Phase::Playing;
                self.show_controls();
                self.emit_state();
            }
            MediaEvent::Pause => {
                if self.state.phase == Phase::Playing {
                    self.state.phase = Phase::Paused;
                }
                self.state.controls_visible = true;
                self.controls_timer.cancel();
                self.emit_state();
            }
            MediaEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                self.state.current_time = current_time;
                if !duration.is_nan() {
                    self.state.duration = duration;
                }
                self.update_live_flags();
                self.emit_state();
            }
            MediaEvent::DurationChange { duration } => {
                self.state.duration = duration;
                self.update_live_flags();
                self.emit_state();
            }
            MediaEvent::VolumeChange { volume, muted } => {
                self.state.volume = volume;
                self.state.muted = muted;
                self.emit_state();
            }
            MediaEvent::CanPlay => {
                self.state.can_play = true;
                if self.state.phase == Phase::Loading {
                    self.state.phase = Phase::Ready;
                }
                self.emit_state();
            }
            MediaEvent::CanPlayThrough => {
                self.state.can_play = true;
                self.state.is_ready = true;
                if self.state.phase == Phase::Loading {
                    self.state.phase = Phase::Ready;
                }
                self.emit_state();
            }
            MediaEvent::LoadStart | MediaEvent::LoadedData => {}
            MediaEvent::Ended => {
                self.state.phase = Phase::Ended;
                self.retry_timer.cancel();
                self.session = None;
                self.emit_state();
            }
            MediaEvent::Error { message } => {
                warn!("Native playback error: {}", message);
                self.enter_error(PlaybackError::network(message));
            }
            MediaEvent::FullscreenChange { fullscreen } => {
                self.state.fullscreen = fullscreen;
                self.emit_state();
            }
        }
    }

    /// Apply an engine event. Events carrying the id of a destroyed
    /// session are discarded without touching current state.
    pub fn handle_engine_event(&mut self, session_id: SessionId, event: EngineEvent) {
        let playing = self.state.phase == Phase::Playing;
        let transition = match self.session.as_mut() {
            Some(session) if session.id() == session_id => session.translate(event, playing),
            _ => {
                debug!("Discarding event from stale session {:?}", session_id);
                return;
            }
        };

        match transition {
            SessionTransition::None => {}
            SessionTransition::Ready => {
                if matches!(self.state.phase, Phase::Idle | Phase::Loading | Phase::Error) {
                    self.state.phase = Phase::Ready;
                }
                self.emit_state();
            }
            SessionTransition::Playable => {
                self.state.retry_count = 0;
                self.state.can_play = true;
                self.emit_state();
            }
            SessionTransition::BufferHealthy => {
                let transient = matches!(
                    self.state.last_error.as_ref().map(|e| e.kind),
                    Some(ErrorKind::RecoverableNetwork) | Some(ErrorKind::RecoverableMedia)
                );
                if transient {
                    self.state.last_error = None;
                    self.emit_state();
                }
            }
            SessionTransition::Ended => {
                info!("Stream ended");
                self.state.phase = Phase::Ended;
                self.retry_timer.cancel();
                self.session = None;
                self.emit_state();
            }
            SessionTransition::NudgeForward => {
                let target = self.state.current_time + self.config.session.nudge_offset_secs;
                debug!("Buffer stall, nudging playhead to {:.1}", target);
                self.surface.set_current_time(target);
            }
            SessionTransition::RecoverMedia => {
                let recovery = self
                    .session
                    .as_mut()
                    .map(|s| s.recover_media_error())
                    .unwrap_or(Ok(()));
                if let Err(e) = recovery {
                    warn!("In-engine media recovery failed: {}", e);
                    self.enter_error(PlaybackError {
                        kind: ErrorKind::RecoverableMedia,
                        message: e.to_string(),
                    });
                }
            }
            SessionTransition::Retry { error } => {
                self.enter_error(error);
            }
        }
    }

    /// Error entry point shared by engine and native error paths.
    fn enter_error(&mut self, error: PlaybackError) {
        if error.kind == ErrorKind::Terminal {
            self.retry_timer.cancel();
            self.state.phase = Phase::Error;
            self.state.last_error = Some(error);
            self.emit_state();
            return;
        }

        // A second error shortly after the first does not restart the
        // retry timer; it only updates the user-facing message.
        let now = Instant::now();
        let window = Duration::from_millis(self.config.player.error_debounce_ms);
        if let Some(at) = self.last_error_at {
            if now.duration_since(at) < window {
                debug!("Error within debounce window, reporting as unstable");
                self.state.last_error = Some(PlaybackError {
                    kind: error.kind,
                    message: "Connection unstable".to_string(),
                });
                self.emit_state();
                return;
            }
        }
        self.last_error_at = Some(now);

        if self.state.retry_count >= self.config.player.max_retries {
            warn!(
                "Retry budget exhausted after {} attempts",
                self.state.retry_count
            );
            self.retry_timer.cancel();
            self.state.phase = Phase::Error;
            self.state.last_error = Some(PlaybackError::terminal(format!(
                "Playback failed after {} attempts; reset to try again",
                self.state.retry_count
            )));
            self.emit_state();
            return;
        }

        let delay = backoff_delay(self.state.retry_count);
        self.state.retry_count += 1;
        self.state.phase = Phase::Error;
        self.state.last_error = Some(error);
        info!(
            "Scheduling retry {} of {} in {:?}",
            self.state.retry_count, self.config.player.max_retries, delay
        );

        let tx = self.command_tx.clone();
        let generation = self.generation;
        self.retry_timer.schedule(delay, async move {
            let _ = tx.send(PlayerCommand::RetryElapsed { generation });
        });
        self.emit_state();
    }

    /// Rebuild the session for the current source, keeping the retry
    /// count.
    fn retry_now(&mut self) {
        let Some(url) = self.source_url.clone() else {
            return;
        };
        info!("Retrying playback of {}", url);
        self.session = None;
        self.state.phase = Phase::Loading;
        self.state.last_error = None;
        self.state.can_play = false;
        self.state.is_ready = false;
        self.attach_strategy(&url);
        self.emit_state();
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::RetryElapsed { generation } => {
                if generation != self.generation {
                    debug!("Dropping retry for a replaced source");
                    return;
                }
                self.retry_now();
            }
            PlayerCommand::HideControls => {
                if self.state.phase == Phase::Playing {
                    self.state.controls_visible = false;
                    self.emit_state();
                }
            }
            PlayerCommand::Shutdown => {}
        }
    }

    /// Drain every queued command, media event and engine event.
    /// Processing order within one call is commands, media, engine,
    /// repeated until all queues are empty.
    pub fn process_pending(&mut self) {
        loop {
            let mut progressed = false;

            if let Ok(command) = self.command_rx.try_recv() {
                self.handle_command(command);
                progressed = true;
            }

            if let Ok(event) = self.media_events.try_recv() {
                self.handle_media_event(event);
                progressed = true;
            }

            if let Some(session) = self.session.as_mut() {
                let id = session.id();
                if let Some(event) = session.try_next_event() {
                    self.handle_engine_event(id, event);
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }
    }

    /// Run the event loop until shutdown.
    pub async fn run(&mut self) {
        loop {
            let wakeup = {
                let Self {
                    command_rx,
                    media_events,
                    session,
                    ..
                } = &mut *self;

                tokio::select! {
                    command = command_rx.recv() => Wakeup::Command(command),
                    media = media_events.recv() => Wakeup::Media(media),
                    engine = async {
                        match session.as_mut() {
                            Some(s) => {
                                let id = s.id();
                                s.next_event().await.map(|e| (id, e))
                            }
                            None => std::future::pending().await,
                        }
                    } => Wakeup::Engine(engine),
                }
            };

            match wakeup {
                Wakeup::Command(None) | Wakeup::Command(Some(PlayerCommand::Shutdown)) => break,
                Wakeup::Command(Some(command)) => self.handle_command(command),
                Wakeup::Media(None) => break,
                Wakeup::Media(Some(event)) => self.handle_media_event(event),
                Wakeup::Engine(None) => {
                    debug!("Engine event channel closed");
                    self.session = None;
                }
                Wakeup::Engine(Some((id, event))) => self.handle_engine_event(id, event),
            }
        }
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.retry_timer.cancel();
        self.controls_timer.cancel();
        self.session = None;
    }
}
