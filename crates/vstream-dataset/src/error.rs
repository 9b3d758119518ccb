//! Dataset pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("No videos found in corpus")]
    NoData,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tensor shape mismatch: {0}")]
    Shape(String),

    #[error("Media error: {0}")]
    Media(#[from] vstream_media::MediaError),
}

impl DatasetError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means the corpus itself is unusable, as opposed to
    /// a bad setting.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::NoData | Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::NoData;
        assert_eq!(err.to_string(), "No videos found in corpus");
        assert!(err.is_data_error());

        let err = DatasetError::invalid_config("batch_size must be at least 1");
        assert!(err.to_string().contains("batch_size"));
        assert!(!err.is_data_error());
    }

    #[test]
    fn test_media_error_converts() {
        let err: DatasetError = vstream_media::MediaError::FfmpegNotFound.into();
        assert!(matches!(err, DatasetError::Media(_)));
    }
}
