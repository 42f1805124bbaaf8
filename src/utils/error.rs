//! Error types for Liveframe
//!
//! This module defines custom error types used throughout the playback
//! core. We use thiserror for convenient error type definitions and
//! anyhow for application-level error handling in the binary.

use thiserror::Error;

/// Main error type for Liveframe
#[derive(Error, Debug)]
pub enum LiveframeError {
    /// Stream source classification / resolution errors
    #[error("Source error: {0}")]
    Source(String),

    /// Adaptive playback session errors
    #[error("Session error: {0}")]
    Session(String),

    /// Player state machine errors
    #[error("Player error: {0}")]
    Player(String),

    /// Overlay collaborator errors
    #[error("Overlay error: {0}")]
    Overlay(String),

    /// Stream conversion collaborator errors
    #[error("Converter error: {0}")]
    Converter(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported source or playback capability
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results in Liveframe
pub type Result<T> = std::result::Result<T, LiveframeError>;

/// Extension trait for converting other errors to LiveframeError
pub trait IntoLiveframeError<T> {
    /// Convert this error into a Config error with the given context
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoLiveframeError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| LiveframeError::Config(format!("{}: {}", context, e)))
    }
}
