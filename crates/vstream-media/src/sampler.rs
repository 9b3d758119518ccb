//! Uniform frame sampler.
//!
//! Turns one video file into a fixed-shape tensor of evenly spaced frames,
//! or rejects it. Rejection covers every way a video can be unusable:
//! it cannot be opened, it reports fewer frames than required, or the
//! stream ends before every sampled position was decoded.

use ndarray::Axis;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::backend::{FfmpegBackend, FrameReader, VideoBackend};
use crate::config::SamplerConfig;
use crate::error::{MediaError, MediaResult};
use crate::frame::{write_normalized, FrameTensor};
use crate::metrics;
use crate::sampling::sample_indices;

/// Anything that can turn a video path into sampled frames.
///
/// This is the seam dataset streams consume. `None` means the video is
/// unusable; no error crosses this boundary.
pub trait FrameExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<FrameTensor>;

    /// Frames per extracted tensor.
    fn num_frames(&self) -> usize;

    /// Edge length of each extracted frame.
    fn frame_size(&self) -> usize;
}

/// Samples `num_frames` uniformly spaced frames from a video.
pub struct FrameSampler<B = FfmpegBackend> {
    backend: B,
    config: SamplerConfig,
}

impl FrameSampler<FfmpegBackend> {
    /// Sampler backed by `ffmpeg`/`ffprobe` from `PATH`.
    pub fn with_ffmpeg(config: SamplerConfig) -> MediaResult<Self> {
        Self::new(FfmpegBackend::new()?, config)
    }
}

#[cfg(feature = "opencv")]
impl FrameSampler<crate::backend::OpenCvBackend> {
    /// Sampler backed by OpenCV `VideoCapture`.
    pub fn with_opencv(config: SamplerConfig) -> MediaResult<Self> {
        Self::new(crate::backend::OpenCvBackend::new(), config)
    }
}

impl<B: VideoBackend> FrameSampler<B> {
    pub fn new(backend: B, config: SamplerConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sample frames, reporting why a video was rejected.
    pub fn try_extract(&self, path: &Path) -> MediaResult<FrameTensor> {
        let num_frames = self.config.num_frames;
        let frame_size = self.config.frame_size;

        let mut reader = self.backend.open(path)?;
        let total_frames = reader.frame_count();
        if total_frames < num_frames {
            return Err(MediaError::TooShort {
                total_frames,
                required: num_frames,
            });
        }

        let targets = sample_indices(total_frames, num_frames);
        let mut tensor = FrameTensor::zeros(self.config.tensor_shape());
        let mut position = 0usize;

        for (slot, &target) in targets.iter().enumerate() {
            if target < position {
                return Err(MediaError::internal(format!(
                    "Sample index {} is behind decode position {}",
                    target, position
                )));
            }
            while position < target {
                if !reader.skip_frame()? {
                    return Err(MediaError::Truncated {
                        decoded: slot,
                        expected: num_frames,
                    });
                }
                position += 1;
            }

            let frame = reader.read_frame()?.ok_or(MediaError::Truncated {
                decoded: slot,
                expected: num_frames,
            })?;
            position += 1;

            write_normalized(&frame, frame_size, tensor.index_axis_mut(Axis(0), slot))?;
        }

        Ok(tensor)
    }

    /// Sample frames, or `None` if the video is unusable.
    pub fn extract(&self, path: &Path) -> Option<FrameTensor> {
        let start = Instant::now();
        let result = self.try_extract(path);
        metrics::record_extraction_duration(start.elapsed().as_secs_f64());

        match result {
            Ok(tensor) => {
                metrics::record_extraction("ok");
                Some(tensor)
            }
            Err(e) => {
                metrics::record_extraction(e.outcome());
                debug!(
                    path = %path.display(),
                    backend = self.backend.name(),
                    reason = e.outcome(),
                    error = %e,
                    "Video rejected"
                );
                None
            }
        }
    }
}

impl<B: VideoBackend> FrameExtractor for FrameSampler<B> {
    fn extract(&self, path: &Path) -> Option<FrameTensor> {
        FrameSampler::<B>::extract(self, path)
    }

    fn num_frames(&self) -> usize {
        self.config.num_frames
    }

    fn frame_size(&self) -> usize {
        self.config.frame_size as usize
    }
}
