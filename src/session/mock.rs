//! Scriptable engine and surface doubles
//!
//! Used by unit tests, the integration suite and the headless harness
//! to drive the player without a browser media element or a real
//! adaptive engine.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::utils::error::{LiveframeError, Result};

use super::events::{EngineEvent, MediaEvent};
use super::{AdaptiveEngine, AdaptiveEngineFactory, MediaSurface, SessionConfig};

/// Render surface double. Mirrors control calls back as media events,
/// the way a native media element raises `play`/`pause` events after
/// the corresponding calls.
pub struct MockMediaSurface {
    state: Mutex<SurfaceState>,
    events: UnboundedSender<MediaEvent>,
}

#[derive(Debug)]
struct SurfaceState {
    current_time: f64,
    duration: f64,
    volume: f32,
    muted: bool,
    source: Option<String>,
    native_adaptive: bool,
}

impl MockMediaSurface {
    pub fn new() -> (Arc<Self>, UnboundedReceiver<MediaEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let surface = Arc::new(Self {
            state: Mutex::new(SurfaceState {
                current_time: 0.0,
                duration: f64::NAN,
                volume: 1.0,
                muted: false,
                source: None,
                native_adaptive: false,
            }),
            events: tx,
        });
        (surface, rx)
    }

    /// Script the reported duration, as if metadata arrived.
    pub fn set_duration(&self, duration: f64) {
        self.state.lock().unwrap().duration = duration;
        let _ = self.events.send(MediaEvent::DurationChange { duration });
    }

    /// Raise an arbitrary media event, as the element would.
    pub fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    pub fn source(&self) -> Option<String> {
        self.state.lock().unwrap().source.clone()
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    pub fn muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }

    /// Make `supports_native_adaptive` return true.
    pub fn enable_native_adaptive(&self) {
        self.state.lock().unwrap().native_adaptive = true;
    }
}

#[async_trait]
impl MediaSurface for MockMediaSurface {
    async fn play(&self) -> Result<()> {
        let _ = self.events.send(MediaEvent::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let _ = self.events.send(MediaEvent::Pause);
        Ok(())
    }

    fn set_current_time(&self, seconds: f64) {
        let mut state = self.state.lock().unwrap();
        state.current_time = seconds;
        let duration = state.duration;
        drop(state);
        let _ = self.events.send(MediaEvent::TimeUpdate {
            current_time: seconds,
            duration,
        });
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().current_time
    }

    fn duration(&self) -> f64 {
        self.state.lock().unwrap().duration
    }

    fn set_volume(&self, volume: f32) {
        let mut state = self.state.lock().unwrap();
        state.volume = volume;
        let muted = state.muted;
        drop(state);
        let _ = self.events.send(MediaEvent::VolumeChange { volume, muted });
    }

    fn set_muted(&self, muted: bool) {
        let mut state = self.state.lock().unwrap();
        state.muted = muted;
        let volume = state.volume;
        drop(state);
        let _ = self.events.send(MediaEvent::VolumeChange { volume, muted });
    }

    fn set_source(&self, url: &str) {
        self.state.lock().unwrap().source = Some(url.to_string());
        let _ = self.events.send(MediaEvent::LoadStart);
    }

    fn clear_source(&self) {
        self.state.lock().unwrap().source = None;
    }

    fn supports_native_adaptive(&self) -> bool {
        self.state.lock().unwrap().native_adaptive
    }
}

#[derive(Debug, Default)]
struct EngineState {
    loaded_url: Option<String>,
    attached: bool,
    destroyed: bool,
    recover_calls: u32,
    fail_recovery: bool,
}

/// Handle onto one created engine: feeds it events and inspects what
/// the player did to it.
#[derive(Clone)]
pub struct MockEngineHandle {
    events: UnboundedSender<EngineEvent>,
    state: Arc<Mutex<EngineState>>,
}

impl MockEngineHandle {
    /// Raise an engine event toward the session.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    pub fn loaded_url(&self) -> Option<String> {
        self.state.lock().unwrap().loaded_url.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().unwrap().attached
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().unwrap().destroyed
    }

    pub fn recover_calls(&self) -> u32 {
        self.state.lock().unwrap().recover_calls
    }

    /// Make subsequent in-engine recovery attempts fail.
    pub fn fail_recovery(&self) {
        self.state.lock().unwrap().fail_recovery = true;
    }
}

struct MockEngine {
    state: Arc<Mutex<EngineState>>,
}

impl AdaptiveEngine for MockEngine {
    fn load_source(&mut self, url: &str) {
        self.state.lock().unwrap().loaded_url = Some(url.to_string());
    }

    fn attach_media(&mut self, _surface: Arc<dyn MediaSurface>) {
        self.state.lock().unwrap().attached = true;
    }

    fn recover_media_error(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.recover_calls += 1;
        if state.fail_recovery {
            Err(LiveframeError::Session(
                "Media recovery failed".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn destroy(&mut self) {
        self.state.lock().unwrap().destroyed = true;
    }
}

/// Factory double. Records a handle for every engine it creates.
pub struct MockEngineFactory {
    supported: bool,
    handles: Mutex<Vec<MockEngineHandle>>,
}

impl MockEngineFactory {
    pub fn new() -> Self {
        Self {
            supported: true,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Factory for an environment without adaptive-engine support.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Handle onto the most recently created engine.
    pub fn last_handle(&self) -> Option<MockEngineHandle> {
        self.handles.lock().unwrap().last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

impl Default for MockEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveEngineFactory for MockEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(
        &self,
        _config: &SessionConfig,
    ) -> Result<(Box<dyn AdaptiveEngine>, UnboundedReceiver<EngineEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(EngineState::default()));
        self.handles.lock().unwrap().push(MockEngineHandle {
            events: tx,
            state: Arc::clone(&state),
        });
        Ok((Box::new(MockEngine { state }), rx))
    }
}
