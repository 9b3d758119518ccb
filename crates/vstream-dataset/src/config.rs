//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use vstream_media::SamplerConfig;

use crate::error::{DatasetError, DatasetResult};

/// Default shuffle buffer cap for the training stream.
pub const DEFAULT_SHUFFLE_BUFFER_CAP: usize = 1000;

/// How files inside a class directory are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrder {
    /// Sorted by file name, byte order.
    #[default]
    FileName,
    /// Whatever order the directory listing returns.
    Directory,
}

impl ListingOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingOrder::FileName => "file_name",
            ListingOrder::Directory => "directory",
        }
    }
}

impl fmt::Display for ListingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ListingOrder {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file_name" | "filename" | "sorted" => Ok(ListingOrder::FileName),
            "directory" | "dir" | "unsorted" => Ok(ListingOrder::Directory),
            other => Err(DatasetError::invalid_config(format!(
                "Unknown listing order: {}",
                other
            ))),
        }
    }
}

/// Everything needed to build train and validation pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Corpus root containing `nonviolent/` and `violent/`
    pub data_dir: PathBuf,
    /// Frame sampling parameters
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Samples per batch
    pub batch_size: usize,
    /// Fraction of each class held out for validation, in (0, 1)
    pub validation_split: f64,
    /// Epochs the training stream must sustain
    pub epochs: usize,
    /// Upper bound on the training shuffle buffer
    pub shuffle_buffer_cap: usize,
    /// Fixed shuffle seed; `None` seeds from the thread RNG
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
    /// File ordering within a class
    #[serde(default)]
    pub listing_order: ListingOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sampler: SamplerConfig::default(),
            batch_size: 8,
            validation_split: 0.2,
            epochs: 10,
            shuffle_buffer_cap: DEFAULT_SHUFFLE_BUFFER_CAP,
            shuffle_seed: None,
            listing_order: ListingOrder::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    ///
    /// Unset or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `.env` if present, then read the environment.
    pub fn from_dotenv() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_env()
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let sampler_defaults = SamplerConfig::default();

        Self {
            data_dir: lookup("VSTREAM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            sampler: SamplerConfig::new(
                lookup("VSTREAM_NUM_FRAMES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(sampler_defaults.num_frames),
                lookup("VSTREAM_FRAME_SIZE")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(sampler_defaults.frame_size),
            ),
            batch_size: lookup("VSTREAM_BATCH_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_size),
            validation_split: lookup("VSTREAM_VALIDATION_SPLIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.validation_split),
            epochs: lookup("VSTREAM_EPOCHS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.epochs),
            shuffle_buffer_cap: lookup("VSTREAM_SHUFFLE_BUFFER")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.shuffle_buffer_cap),
            shuffle_seed: lookup("VSTREAM_SHUFFLE_SEED").and_then(|s| s.parse().ok()),
            listing_order: lookup("VSTREAM_LISTING_ORDER")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.listing_order),
        }
    }

    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_validation_split(mut self, validation_split: f64) -> Self {
        self.validation_split = validation_split;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_shuffle_buffer_cap(mut self, cap: usize) -> Self {
        self.shuffle_buffer_cap = cap;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn with_listing_order(mut self, order: ListingOrder) -> Self {
        self.listing_order = order;
        self
    }

    /// Reject settings no pipeline can be built from.
    pub fn validate(&self) -> DatasetResult<()> {
        self.sampler.validate()?;
        if self.batch_size == 0 {
            return Err(DatasetError::invalid_config("batch_size must be at least 1"));
        }
        if !valid_split(self.validation_split) {
            return Err(DatasetError::invalid_config(format!(
                "validation_split must be in (0, 1), got {}",
                self.validation_split
            )));
        }
        if self.epochs == 0 {
            return Err(DatasetError::invalid_config("epochs must be at least 1"));
        }
        if self.shuffle_buffer_cap == 0 {
            return Err(DatasetError::invalid_config(
                "shuffle_buffer_cap must be at least 1",
            ));
        }
        Ok(())
    }
}

pub(crate) fn valid_split(split: f64) -> bool {
    split.is_finite() && split > 0.0 && split < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.validation_split, 0.2);
        assert_eq!(config.epochs, 10);
        assert_eq!(config.shuffle_buffer_cap, 1000);
        assert_eq!(config.shuffle_seed, None);
        assert_eq!(config.listing_order, ListingOrder::FileName);
        assert_eq!(config.sampler, SamplerConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("VSTREAM_DATA_DIR", "/srv/videos"),
            ("VSTREAM_NUM_FRAMES", "16"),
            ("VSTREAM_FRAME_SIZE", "112"),
            ("VSTREAM_BATCH_SIZE", "4"),
            ("VSTREAM_VALIDATION_SPLIT", "0.25"),
            ("VSTREAM_EPOCHS", "3"),
            ("VSTREAM_SHUFFLE_BUFFER", "64"),
            ("VSTREAM_SHUFFLE_SEED", "42"),
            ("VSTREAM_LISTING_ORDER", "directory"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/srv/videos"));
        assert_eq!(config.sampler, SamplerConfig::new(16, 112));
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.validation_split, 0.25);
        assert_eq!(config.epochs, 3);
        assert_eq!(config.shuffle_buffer_cap, 64);
        assert_eq!(config.shuffle_seed, Some(42));
        assert_eq!(config.listing_order, ListingOrder::Directory);
    }

    #[test]
    fn test_from_lookup_falls_back_on_garbage() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("VSTREAM_BATCH_SIZE", "eight"),
            ("VSTREAM_SHUFFLE_SEED", "-1"),
            ("VSTREAM_LISTING_ORDER", "random"),
        ]));
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.shuffle_seed, None);
        assert_eq!(config.listing_order, ListingOrder::FileName);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::default().with_batch_size(0).validate().is_err());
        assert!(PipelineConfig::default().with_epochs(0).validate().is_err());
        assert!(PipelineConfig::default()
            .with_shuffle_buffer_cap(0)
            .validate()
            .is_err());
        for split in [0.0, 1.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(
                PipelineConfig::default()
                    .with_validation_split(split)
                    .validate()
                    .is_err(),
                "split {} accepted",
                split
            );
        }
        let bad_sampler = PipelineConfig::default().with_sampler(SamplerConfig::new(0, 224));
        assert!(matches!(
            bad_sampler.validate(),
            Err(DatasetError::Media(_))
        ));
    }

    #[test]
    fn test_listing_order_parse() {
        assert_eq!("FileName".parse::<ListingOrder>().unwrap(), ListingOrder::FileName);
        assert_eq!("dir".parse::<ListingOrder>().unwrap(), ListingOrder::Directory);
        assert!("shuffled".parse::<ListingOrder>().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = PipelineConfig::new("corpus").with_shuffle_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"listing_order\":\"file_name\""));
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
