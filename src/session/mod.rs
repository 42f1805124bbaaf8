//! Adaptive playback session
//!
//! Seams to the render surface and the adaptive-streaming engine, the
//! engine event model, and the session lifecycle that translates
//! engine events into player state transitions.

pub mod config;
pub mod events;
pub mod mock;
#[allow(clippy::module_inception)]
pub mod session;

pub use config::SessionConfig;
pub use events::{EngineError, EngineErrorType, EngineEvent, MediaEvent};
pub use session::{AdaptiveSession, SessionTransition};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::utils::error::Result;

/// Unique identifier for one session instance.
///
/// Late events from a destroyed session carry its id and are discarded
/// instead of being matched against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The playback sink: one media element / render surface.
///
/// Play and pause complete asynchronously; their effects come back as
/// [`MediaEvent`]s rather than return values.
#[async_trait]
pub trait MediaSurface: Send + Sync {
    async fn play(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;

    fn set_current_time(&self, seconds: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;

    fn set_volume(&self, volume: f32);
    fn set_muted(&self, muted: bool);

    /// Assign a directly playable source URL.
    fn set_source(&self, url: &str);
    fn clear_source(&self);

    /// Whether the surface can play adaptive manifests natively,
    /// without the engine.
    fn supports_native_adaptive(&self) -> bool;
}

/// One adaptive-streaming engine instance.
pub trait AdaptiveEngine: Send {
    fn load_source(&mut self, url: &str);
    fn attach_media(&mut self, surface: Arc<dyn MediaSurface>);

    /// Ask the engine to recover from a fatal media error in place.
    fn recover_media_error(&mut self) -> Result<()>;

    /// Release the engine. Must be called before a new engine is
    /// attached to the same surface.
    fn destroy(&mut self);
}

/// Creates engine instances and their event streams.
pub trait AdaptiveEngineFactory: Send + Sync {
    /// Whether the adaptive engine is available in this environment.
    fn is_supported(&self) -> bool;

    fn create(
        &self,
        config: &SessionConfig,
    ) -> Result<(Box<dyn AdaptiveEngine>, UnboundedReceiver<EngineEvent>)>;
}
