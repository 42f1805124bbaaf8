//! Playback resilience state machine
//!
//! The top-level controller: owns play/pause/seek/volume state,
//! live-edge tracking, loading and error states, and the retry policy
//! driving reconnection.

pub mod controller;
pub mod state;

pub use controller::{PlayerCommand, PlayerController};
pub use state::{PlayerState, StateSnapshot};

use serde::{Deserialize, Serialize};

/// Playback phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
    Ended,
}

/// How a playback error is classified for recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Retried automatically with backoff until the budget runs out
    RecoverableNetwork,
    /// One in-engine recovery attempt, then the network retry path
    RecoverableMedia,
    /// Requires explicit user action (manual reset)
    Terminal,
    /// The broadcast is over; not a failure
    StreamEnded,
}

/// A classified, user-facing playback error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PlaybackError {
    pub fn terminal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Terminal,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RecoverableNetwork,
            message: message.into(),
        }
    }
}
