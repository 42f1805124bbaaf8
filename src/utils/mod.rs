//! Utility modules for Liveframe
//!
//! Shared infrastructure: error types, configuration and cancellable
//! timers used across the playback core.

pub mod config;
pub mod error;
pub mod timer;

pub use config::Config;
pub use error::{IntoLiveframeError, LiveframeError, Result};
pub use timer::{Debouncer, TimerHandle};

/// Format a duration in seconds as a human-readable string
///
/// Durations under an hour render as `mm:ss`, longer ones as
/// `hh:mm:ss`. Non-finite or negative values render as `00:00`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
