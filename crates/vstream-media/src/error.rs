//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing or sampling a video.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to open video: {0}")]
    OpenFailed(String),

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Video has {total_frames} frames, {required} required")]
    TooShort { total_frames: usize, required: usize },

    #[error("Stream ended after {decoded} of {expected} sampled frames")]
    Truncated { decoded: usize, expected: usize },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid sampler configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an open failure error.
    pub fn open_failed(message: impl Into<String>) -> Self {
        Self::OpenFailed(message.into())
    }

    /// Create a decode failure error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Metric label describing why an extraction was rejected.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) | Self::OpenFailed(_) | Self::InvalidVideo(_) => "open_failed",
            Self::FfprobeFailed { .. } | Self::JsonParse(_) => "probe_failed",
            Self::TooShort { .. } => "too_short",
            Self::Truncated { .. } => "truncated",
            Self::Decode(_) | Self::Io(_) => "decode_failed",
            #[cfg(feature = "opencv")]
            Self::OpenCv(_) => "decode_failed",
            Self::FfmpegNotFound | Self::FfprobeNotFound => "tool_missing",
            Self::InvalidConfig(_) | Self::Internal(_) => "internal",
        }
    }
}
