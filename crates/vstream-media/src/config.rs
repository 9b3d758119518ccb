//! Configuration for frame sampling.

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Default number of frames sampled per video.
pub const DEFAULT_NUM_FRAMES: usize = 30;
/// Default square frame edge in pixels (ResNet-style input).
pub const DEFAULT_FRAME_SIZE: u32 = 224;

/// Shape of the tensors produced by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Frames sampled uniformly across each video.
    #[serde(default = "default_num_frames")]
    pub num_frames: usize,

    /// Output frames are resized to `frame_size x frame_size`.
    #[serde(default = "default_frame_size")]
    pub frame_size: u32,
}

fn default_num_frames() -> usize {
    DEFAULT_NUM_FRAMES
}
fn default_frame_size() -> u32 {
    DEFAULT_FRAME_SIZE
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_frames: DEFAULT_NUM_FRAMES,
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }
}

impl SamplerConfig {
    pub fn new(num_frames: usize, frame_size: u32) -> Self {
        Self {
            num_frames,
            frame_size,
        }
    }

    /// Builder-style setter for the number of sampled frames.
    pub fn with_num_frames(mut self, num_frames: usize) -> Self {
        self.num_frames = num_frames;
        self
    }

    /// Builder-style setter for the output frame edge.
    pub fn with_frame_size(mut self, frame_size: u32) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Tensor shape `(num_frames, frame_size, frame_size, 3)`.
    pub fn tensor_shape(&self) -> (usize, usize, usize, usize) {
        let size = self.frame_size as usize;
        (self.num_frames, size, size, 3)
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.num_frames == 0 {
            return Err(MediaError::invalid_config("num_frames must be at least 1"));
        }
        if self.frame_size == 0 {
            return Err(MediaError::invalid_config("frame_size must be at least 1"));
        }
        Ok(())
    }
}
