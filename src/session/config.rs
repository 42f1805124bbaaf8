//! Adaptive engine tuning
//!
//! Defaults favor stability over minimal latency: moderate buffer
//! windows, bounded buffer memory, and independent bounded retry tiers
//! for manifest, quality-level and segment fetches.

use serde::{Deserialize, Serialize};

/// Configuration handed to the adaptive engine on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of already-played media kept behind the playhead
    pub back_buffer_secs: f64,
    /// Target forward buffer (seconds)
    pub max_buffer_secs: f64,
    /// Hard forward buffer ceiling (seconds)
    pub max_max_buffer_secs: f64,
    /// Forward buffer memory ceiling (bytes)
    pub max_buffer_bytes: u64,
    /// Largest buffered gap the engine will jump over (seconds)
    pub max_buffer_hole_secs: f64,

    /// Forward seek applied to escape a buffer stall (seconds)
    pub nudge_offset_secs: f64,
    /// Stall nudges attempted before the engine reports an error
    pub nudge_max_retry: u32,

    /// Segments behind the live edge to start playback from
    pub live_sync_segment_count: u32,

    pub manifest_load_timeout_ms: u64,
    pub manifest_load_max_retry: u32,
    pub manifest_load_retry_delay_ms: u64,

    pub level_load_timeout_ms: u64,
    pub level_load_max_retry: u32,
    pub level_load_retry_delay_ms: u64,

    pub fragment_load_timeout_ms: u64,
    pub fragment_load_max_retry: u32,
    pub fragment_load_retry_delay_ms: u64,

    /// Decrypt segments in software when hardware paths are missing
    pub enable_software_decrypt: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            back_buffer_secs: 30.0,
            max_buffer_secs: 30.0,
            max_max_buffer_secs: 60.0,
            max_buffer_bytes: 60 * 1000 * 1000,
            max_buffer_hole_secs: 0.5,

            nudge_offset_secs: 0.1,
            nudge_max_retry: 3,

            live_sync_segment_count: 3,

            manifest_load_timeout_ms: 10_000,
            manifest_load_max_retry: 4,
            manifest_load_retry_delay_ms: 1000,

            level_load_timeout_ms: 10_000,
            level_load_max_retry: 4,
            level_load_retry_delay_ms: 1000,

            fragment_load_timeout_ms: 20_000,
            fragment_load_max_retry: 6,
            fragment_load_retry_delay_ms: 1000,

            enable_software_decrypt: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_favor_stability() {
        let config = SessionConfig::default();
        assert_eq!(config.max_buffer_secs, 30.0);
        assert_eq!(config.max_buffer_bytes, 60_000_000);
        assert_eq!(config.fragment_load_max_retry, 6);
        assert!(config.enable_software_decrypt);
    }
}
