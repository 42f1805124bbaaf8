//! Session lifecycle and event translation
//!
//! One [`AdaptiveSession`] owns one engine instance bound to one
//! render surface. It is created per stream URL, never mutated in
//! place when the URL changes, and destroyed before a replacement is
//! attached. Engine events are translated into neutral transitions the
//! player controller acts on.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::player::{ErrorKind, PlaybackError};
use crate::utils::error::Result;

use super::events::{EngineError, EngineErrorType, EngineEvent};
use super::{AdaptiveEngine, AdaptiveEngineFactory, MediaSurface, SessionConfig, SessionId};

/// What the player controller should do with an engine event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionTransition {
    /// Nothing to act on
    None,
    /// Manifest parsed, stream structure known
    Ready,
    /// A segment arrived, playback can proceed and the retry budget
    /// resets
    Playable,
    /// Buffer advanced, clear any transient error
    BufferHealthy,
    /// Engine signaled end of stream
    Ended,
    /// Buffer stalled while playing, nudge the playhead forward
    NudgeForward,
    /// Fatal media error, ask the engine to recover in place
    RecoverMedia,
    /// Fatal condition, enter the retry path
    Retry { error: PlaybackError },
}

pub struct AdaptiveSession {
    id: SessionId,
    engine: Box<dyn AdaptiveEngine>,
    events: UnboundedReceiver<EngineEvent>,
    error_debounce: Duration,
    last_error_signature: Option<String>,
    last_error_at: Option<Instant>,
    media_recovery_attempted: bool,
}

impl AdaptiveSession {
    /// Create an engine, attach it to the surface and start loading.
    pub fn new(
        factory: &dyn AdaptiveEngineFactory,
        config: &SessionConfig,
        surface: Arc<dyn MediaSurface>,
        url: &str,
        error_debounce: Duration,
    ) -> Result<Self> {
        let (mut engine, events) = factory.create(config)?;
        engine.attach_media(surface);
        engine.load_source(url);

        let id = SessionId::next();
        info!("Adaptive session {:?} loading {}", id, url);

        Ok(Self {
            id,
            engine,
            events,
            error_debounce,
            last_error_signature: None,
            last_error_at: None,
            media_recovery_attempted: false,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Next engine event without waiting. `None` when the queue is
    /// empty or the engine side is gone.
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next engine event.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.recv().await
    }

    /// Ask the engine to recover from a fatal media error in place.
    pub fn recover_media_error(&mut self) -> Result<()> {
        self.engine.recover_media_error()
    }

    /// Translate an engine event into a player transition.
    ///
    /// `playing` is whether the player is currently in the playing
    /// phase; it gates the stall nudge.
    pub fn translate(&mut self, event: EngineEvent, playing: bool) -> SessionTransition {
        match event {
            EngineEvent::ManifestParsed => SessionTransition::Ready,
            EngineEvent::FragmentLoaded => SessionTransition::Playable,
            EngineEvent::BufferAppended => SessionTransition::BufferHealthy,
            EngineEvent::BufferEos => SessionTransition::Ended,
            EngineEvent::LevelLoaded => SessionTransition::None,
            EngineEvent::LevelSwitching { level } => {
                debug!("Switching to quality level {}", level);
                SessionTransition::None
            }
            EngineEvent::Error(error) => self.translate_error(error, playing),
        }
    }

    fn translate_error(&mut self, error: EngineError, playing: bool) -> SessionTransition {
        if error.is_ignorable() {
            debug!("Ignoring transient engine event: {:?}", error.details);
            return SessionTransition::None;
        }

        // Identical signatures within the debounce window collapse to
        // one report.
        let signature = error.signature();
        let now = Instant::now();
        if self.last_error_signature.as_deref() == Some(&signature) {
            if let Some(at) = self.last_error_at {
                if now.duration_since(at) < self.error_debounce {
                    debug!("Coalescing repeated engine error: {}", signature);
                    return SessionTransition::None;
                }
            }
        }
        self.last_error_signature = Some(signature);
        self.last_error_at = Some(now);

        if error.details.as_deref() == Some("bufferStalledError") && !error.is_fatal() {
            return if playing {
                SessionTransition::NudgeForward
            } else {
                SessionTransition::None
            };
        }

        if !error.is_fatal() {
            debug!("Non-fatal engine error, engine retries internally: {:?}", error);
            return SessionTransition::None;
        }

        // A manifest or level 404 on a live stream means the broadcast
        // is over, not that playback failed.
        if error.details.as_deref() == Some("levelLoadError")
            && error.response_code == Some(404)
        {
            info!("Level playlist gone (404), treating stream as ended");
            return SessionTransition::Ended;
        }

        match error.error_type {
            Some(EngineErrorType::Media) if !self.media_recovery_attempted => {
                self.media_recovery_attempted = true;
                warn!("Fatal media error, attempting in-engine recovery");
                SessionTransition::RecoverMedia
            }
            kind => {
                warn!("Fatal engine error ({:?}): {:?}", kind, error.details);
                SessionTransition::Retry {
                    error: PlaybackError {
                        kind: match kind {
                            Some(EngineErrorType::Media) => ErrorKind::RecoverableMedia,
                            _ => ErrorKind::RecoverableNetwork,
                        },
                        message: error
                            .details
                            .unwrap_or_else(|| "Stream error".to_string()),
                    },
                }
            }
        }
    }
}

impl Drop for AdaptiveSession {
    fn drop(&mut self) {
        debug!("Destroying adaptive session {:?}", self.id);
        self.engine.destroy();
    }
}
