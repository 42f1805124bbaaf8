//! Integration test utilities for Liveframe
//!
//! Wires a player controller to the scriptable surface and engine
//! doubles and provides helpers for driving the paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use liveframe::player::PlayerController;
use liveframe::session::mock::{MockEngineFactory, MockEngineHandle, MockMediaSurface};
use liveframe::session::{
    AdaptiveEngineFactory, EngineError, EngineErrorType, EngineEvent, MediaSurface,
};
use liveframe::utils::Config;

/// A controller wired to mock collaborators.
pub struct PlayerFixture {
    pub controller: PlayerController,
    pub surface: Arc<MockMediaSurface>,
    pub factory: Arc<MockEngineFactory>,
}

impl PlayerFixture {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let (surface, media_events) = MockMediaSurface::new();
        let factory = Arc::new(MockEngineFactory::new());
        let controller = PlayerController::new(
            Arc::clone(&surface) as Arc<dyn MediaSurface>,
            media_events,
            Arc::clone(&factory) as Arc<dyn AdaptiveEngineFactory>,
            config,
        );
        Self {
            controller,
            surface,
            factory,
        }
    }

    /// Load a source and drain the resulting events.
    pub fn load(&mut self, url: &str) {
        self.controller.load_source(url);
        self.controller.process_pending();
    }

    /// Handle onto the most recently created engine.
    pub fn engine(&self) -> MockEngineHandle {
        self.factory
            .last_handle()
            .expect("no engine has been created")
    }

    /// Raise an engine event and process it.
    pub fn emit_engine(&mut self, event: EngineEvent) {
        self.engine().emit(event);
        self.controller.process_pending();
    }

    /// Walk through manifest-parsed and first-segment events so the
    /// player becomes playable.
    pub fn make_playable(&mut self) {
        self.emit_engine(EngineEvent::ManifestParsed);
        self.emit_engine(EngineEvent::FragmentLoaded);
    }
}

impl Default for PlayerFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A fatal network-layer engine error.
pub fn fatal_network_error(details: &str) -> EngineEvent {
    EngineEvent::Error(EngineError {
        error_type: Some(EngineErrorType::Network),
        details: Some(details.to_string()),
        fatal: Some(true),
        ..Default::default()
    })
}

/// Let spawned timer tasks run after the paused clock advances.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock and let pending tasks run. Settles first
/// so freshly spawned timer tasks register their deadlines before the
/// clock moves.
pub async fn advance(duration: Duration) {
    settle().await;
    tokio::time::advance(duration).await;
    settle().await;
}
