//! Stream source classification
//!
//! Classifies an input URL into one of three playback strategies:
//! adaptive manifest, raw network stream (RTSP, needs conversion
//! before playback), or direct file.

pub mod convert;

pub use convert::{ConversionResponse, ReadyStatus, StreamConverter};

use url::Url;

/// Playback strategy selected for a stream URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Manifest-plus-segments delivery, handled by the adaptive engine
    /// or a native fallback.
    Adaptive,
    /// Raw network stream (RTSP). Not directly playable, must go
    /// through the conversion collaborator first.
    RawNetwork,
    /// Anything else is assigned directly as the playable source.
    DirectFile,
}

impl StreamKind {
    pub fn label(self) -> &'static str {
        match self {
            StreamKind::Adaptive => "adaptive",
            StreamKind::RawNetwork => "raw-network",
            StreamKind::DirectFile => "direct-file",
        }
    }
}

/// Classify a stream URL. Evaluated once per URL.
pub fn classify(url: &str) -> StreamKind {
    if url.contains("/api/stream/hls/") || url.ends_with(".m3u8") {
        return StreamKind::Adaptive;
    }

    if let Ok(parsed) = Url::parse(url) {
        if parsed.scheme() == "rtsp" {
            return StreamKind::RawNetwork;
        }
    }

    StreamKind::DirectFile
}
