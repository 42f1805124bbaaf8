//! Engine and media event model
//!
//! Events raised by the adaptive engine and by the render surface,
//! plus the suppression predicate deciding which engine errors are
//! expected transient noise.

/// Events raised by the adaptive engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Manifest fetched and parsed, stream structure known
    ManifestParsed,
    /// A quality level's playlist loaded
    LevelLoaded,
    /// A media segment fetched successfully
    FragmentLoaded,
    /// Data appended to the playback buffer
    BufferAppended,
    /// Engine signaled end of stream
    BufferEos,
    /// Engine is switching quality level
    LevelSwitching { level: u32 },
    /// An engine error, fatal or not
    Error(EngineError),
}

/// Broad engine error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorType {
    Network,
    Media,
    Mux,
    Other,
}

/// Error payload as delivered by the engine. Real engines emit
/// loosely-populated error objects, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineError {
    pub error_type: Option<EngineErrorType>,
    pub details: Option<String>,
    pub fatal: Option<bool>,
    pub response_code: Option<u16>,
    pub reason: Option<String>,
}

/// Non-fatal error details known to be transient startup noise.
const IGNORABLE_DETAILS: &[&str] = &[
    "fragLoadError",
    "fragLoadTimeOut",
    "levelLoadError",
    "audioTrackLoadError",
    "fragParsingError",
    "remuxAllocError",
];

impl EngineError {
    /// Whether this error should be swallowed entirely.
    ///
    /// Detail-less events carry nothing actionable. Non-fatal load and
    /// fragment hiccups are expected while a live stream spins up; the
    /// engine retries them internally. The detail list is a heuristic
    /// tied to the engine's error vocabulary.
    pub fn is_ignorable(&self) -> bool {
        let Some(details) = self.details.as_deref() else {
            // No details and nothing else to act on
            return self.reason.is_none();
        };

        if self.fatal != Some(true) {
            if IGNORABLE_DETAILS.contains(&details) {
                return true;
            }
            if details.contains("frag") || details.contains("Load") {
                return true;
            }
        }

        false
    }

    /// Dedup key: identical signatures within a short window are
    /// coalesced to one report.
    pub fn signature(&self) -> String {
        format!(
            "{:?}-{}",
            self.error_type,
            self.details.as_deref().unwrap_or("unknown")
        )
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal == Some(true)
    }
}

/// Events mirrored from the render surface (the native media element).
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate { current_time: f64, duration: f64 },
    DurationChange { duration: f64 },
    VolumeChange { volume: f32, muted: bool },
    LoadStart,
    LoadedData,
    /// Enough data buffered to start playback
    CanPlay,
    /// Enough data buffered to play through without further stalls
    CanPlayThrough,
    Ended,
    Error { message: String },
    FullscreenChange { fullscreen: bool },
}
