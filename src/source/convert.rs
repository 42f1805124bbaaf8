//! Stream conversion collaborator
//!
//! Raw network streams are not directly playable; an external service
//! converts them to an adaptive stream. The core requests a conversion
//! and then polls a readiness endpoint at a fixed interval until the
//! converted stream is playable or the attempt budget runs out.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::utils::error::{LiveframeError, Result};

/// Interval between readiness polls.
pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Poll attempts before giving up on a conversion.
pub const READY_POLL_ATTEMPTS: u32 = 30;

/// Response to a conversion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResponse {
    /// Kind of stream the converter produced, e.g. "hls".
    #[serde(rename = "type")]
    pub kind: String,
    /// Playable URL for the converted stream.
    pub stream_url: String,
    /// Present when the converter spins up a background process whose
    /// readiness must be polled before playback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
}

/// Result of one readiness poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyStatus {
    pub ready: bool,
    pub process_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// External stream-conversion service.
#[async_trait]
pub trait StreamConverter: Send + Sync {
    /// Request conversion of a raw network stream URL.
    async fn convert(&self, url: &str) -> Result<ConversionResponse>;

    /// Poll whether a converted stream is ready for playback.
    async fn check_ready(&self, stream_id: &str) -> Result<ReadyStatus>;
}

/// Poll the converter until the stream is ready.
///
/// Gives up when the converter reports an error, the conversion
/// process dies, or the attempt budget is exhausted.
pub async fn await_ready(converter: &dyn StreamConverter, stream_id: &str) -> Result<()> {
    for attempt in 1..=READY_POLL_ATTEMPTS {
        let status = converter.check_ready(stream_id).await?;

        if let Some(error) = status.error {
            return Err(LiveframeError::Converter(format!(
                "Conversion failed: {}",
                error
            )));
        }

        if status.ready {
            info!("Converted stream {} ready after {} poll(s)", stream_id, attempt);
            return Ok(());
        }

        if !status.process_running {
            return Err(LiveframeError::Converter(
                "Conversion process stopped before the stream became ready".to_string(),
            ));
        }

        debug!(
            "Converted stream {} not ready yet (attempt {}/{})",
            stream_id, attempt, READY_POLL_ATTEMPTS
        );
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }

    Err(LiveframeError::Converter(format!(
        "Converted stream {} was not ready after {} attempts",
        stream_id, READY_POLL_ATTEMPTS
    )))
}

/// Convert a raw network stream URL into a playable one.
///
/// Waits for readiness when the converter hands back a stream id. The
/// returned URL is re-classified by the caller before playback.
pub async fn resolve_playable_url(converter: &dyn StreamConverter, url: &str) -> Result<String> {
    let response = converter.convert(url).await?;

    if let Some(stream_id) = &response.stream_id {
        await_ready(converter, stream_id).await?;
    }

    Ok(response.stream_url)
}
