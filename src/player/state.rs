//! Player state container
//!
//! All mutable playback state in one place, plus the snapshot shape
//! that crosses the core boundary to the caller.

use serde::{Deserialize, Serialize};

use crate::source::StreamKind;

use super::{Phase, PlaybackError};

/// The state snapshot emitted to `on_state_change` subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub phase: Phase,
    pub current_time: f64,
    pub duration: f64,
    pub is_live: bool,
    pub is_at_live_edge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PlaybackError>,
}

/// Full internal player state.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub phase: Phase,
    pub stream_kind: Option<StreamKind>,

    pub current_time: f64,
    pub duration: f64,

    pub volume: f32,
    /// Volume before the last mute, restored on unmute
    pub previous_volume: f32,
    pub muted: bool,

    pub fullscreen: bool,
    pub controls_visible: bool,

    pub is_live_stream: bool,
    pub is_at_live_edge: bool,

    /// Enough data buffered to start playback
    pub can_play: bool,
    /// Enough data buffered to play through without further stalls
    pub is_ready: bool,

    pub retry_count: u32,
    pub last_error: Option<PlaybackError>,
}

impl PlayerState {
    pub fn new(volume: f32) -> Self {
        Self {
            phase: Phase::Idle,
            stream_kind: None,
            current_time: 0.0,
            duration: f64::NAN,
            volume,
            previous_volume: volume,
            muted: false,
            fullscreen: false,
            controls_visible: true,
            is_live_stream: false,
            is_at_live_edge: false,
            can_play: false,
            is_ready: false,
            retry_count: 0,
            last_error: None,
        }
    }

    /// Reset everything tied to the current stream. Volume, mute and
    /// fullscreen survive a source change.
    pub fn reset_stream_state(&mut self) {
        self.phase = Phase::Idle;
        self.stream_kind = None;
        self.current_time = 0.0;
        self.duration = f64::NAN;
        self.is_live_stream = false;
        self.is_at_live_edge = false;
        self.can_play = false;
        self.is_ready = false;
        self.retry_count = 0;
        self.last_error = None;
    }

    /// Recompute live flags from the current duration and position.
    ///
    /// Unbounded durations and durations past the threshold are both
    /// treated as live. Positions closer than `edge_threshold` seconds
    /// to the end count as at the live edge; an unbounded duration is
    /// always at the edge.
    pub fn update_live_flags(&mut self, duration_threshold: f64, edge_threshold: f64) {
        self.is_live_stream =
            self.duration.is_infinite() || self.duration > duration_threshold;
        self.is_at_live_edge = self.duration.is_infinite()
            || self.duration - self.current_time < edge_threshold;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            phase: self.phase,
            current_time: self.current_time,
            duration: self.duration,
            is_live: self.is_live_stream,
            is_at_live_edge: self.is_at_live_edge,
            error: self.last_error.clone(),
        }
    }
}
