//! Error types shared across PunchMeter crates.

use std::path::PathBuf;

/// Top-level error type for PunchMeter operations.
#[derive(Debug, thiserror::Error)]
pub enum PunchError {
    /// The current platform has no usable motion source.
    ///
    /// Raised synchronously by `SamplingSession::start`; the session stays
    /// idle and may be started again later.
    #[error("Motion sensing is not available on this platform ({source_name})")]
    UnsupportedPlatform { source_name: String },

    #[error("Motion source error: {message}")]
    MotionSource { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Sample trace error: {message}")]
    Trace { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PunchError.
pub type PunchResult<T> = Result<T, PunchError>;

impl PunchError {
    pub fn unsupported_platform(source_name: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            source_name: source_name.into(),
        }
    }

    pub fn motion_source(msg: impl Into<String>) -> Self {
        Self::MotionSource {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn trace(msg: impl Into<String>) -> Self {
        Self::Trace {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the caller may simply retry later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform { .. })
    }
}
