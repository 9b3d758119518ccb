//! Uniform frame sampling from video files.
//!
//! This crate provides:
//! - Deterministic uniform frame index planning
//! - Sequential decoding through pluggable backends (FFmpeg CLI, OpenCV)
//! - Resize and normalization of sampled frames into `f32` tensors
//! - Corrupt and short video detection behind a frames-or-none boundary

pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod probe;
pub mod sampler;
pub mod sampling;

pub use backend::{FfmpegBackend, FrameReader, VideoBackend};
#[cfg(feature = "opencv")]
pub use backend::OpenCvBackend;
pub use command::FfmpegCommand;
pub use config::{SamplerConfig, DEFAULT_FRAME_SIZE, DEFAULT_NUM_FRAMES};
pub use error::{MediaError, MediaResult};
pub use frame::{as_model_input, normalize_frame, FrameTensor};
pub use probe::{probe_stream, StreamInfo};
pub use sampler::{FrameExtractor, FrameSampler};
pub use sampling::{can_sample, sample_indices};
