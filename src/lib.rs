//! Liveframe - live-video playback core
//!
//! The playback resilience state machine, adaptive session lifecycle
//! and overlay positioning model behind a live-video player. The
//! embedding surface (media element, adaptive engine, overlay store,
//! stream converter) is supplied by the caller through traits.

pub mod overlay;
pub mod player;
pub mod session;
pub mod source;
pub mod utils;

pub use overlay::{Overlay, OverlayCanvas, OverlayKind, OverlayPatch, OverlayStore};
pub use player::{Phase, PlaybackError, PlayerController, StateSnapshot};
pub use session::{AdaptiveEngineFactory, MediaSurface, SessionConfig};
pub use source::{classify, StreamConverter, StreamKind};
pub use utils::{Config, LiveframeError, Result};
