//! Stratified streaming train/validation pipelines over a labeled video corpus.
//!
//! The flow is catalog, plan, stream, batch:
//!
//! 1. [`DatasetCatalog`] lists `nonviolent/` and `violent/` under a root.
//! 2. [`planner::plan`] splits each class into train and validation counts.
//! 3. [`StreamSource`]s lazily extract frames through a
//!    [`vstream_media::FrameExtractor`], skipping unreadable videos.
//! 4. [`EpochController`] concatenates, shuffles and batches the streams and
//!    reports the step counts per epoch.
//!
//! [`build_pipelines`] runs the whole flow from a [`PipelineConfig`].

pub mod catalog;
pub mod config;
pub mod epoch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod planner;
pub mod stream;

pub use catalog::DatasetCatalog;
pub use config::{ListingOrder, PipelineConfig, DEFAULT_SHUFFLE_BUFFER_CAP};
pub use epoch::{
    build_ffmpeg_pipelines, build_pipelines, split_sources, Batch, EpochController, EpochPlan,
    ShuffleBuffer, TrainPipeline, ValPipeline,
};
pub use error::{DatasetError, DatasetResult};
pub use planner::plan;
pub use stream::{corpus_stream, Sample, SampleStream, StreamSource, StreamStats};
