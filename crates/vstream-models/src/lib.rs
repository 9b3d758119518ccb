//! Shared data models for the vstream pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Class labels and catalogued video files
//! - Per-class counts and stratified split plans
//! - The dataset summary reported alongside built pipelines

pub mod class;
pub mod split;

// Re-export common types
pub use class::{ClassLabel, VideoFile};
pub use split::{ClassCounts, DatasetSummary, Split, SplitPlan};
