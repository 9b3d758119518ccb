//! Video decoding backends.
//!
//! A backend opens a file and hands back a [`FrameReader`] that decodes
//! frames strictly in file order. The sampler never seeks; it skips frames
//! it does not need and reads the ones it does.
//!
//! - [`FfmpegBackend`]: `ffprobe` + `ffmpeg` rawvideo pipe (always available)
//! - `OpenCvBackend`: OpenCV `VideoCapture` (feature `opencv`)

use image::RgbImage;
use std::path::Path;

use crate::error::MediaResult;

pub mod ffmpeg;
#[cfg(feature = "opencv")]
pub mod opencv_capture;

pub use self::ffmpeg::{FfmpegBackend, FfmpegReader};
#[cfg(feature = "opencv")]
pub use self::opencv_capture::{OpenCvBackend, OpenCvReader};

/// Opens videos for sequential decoding.
pub trait VideoBackend: Send + Sync {
    type Reader: FrameReader;

    /// Open a video. Fails if the container cannot be opened or has no
    /// decodable video stream.
    fn open(&self, path: &Path) -> MediaResult<Self::Reader>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Sequential frame access to one opened video.
pub trait FrameReader {
    /// Total frame count as reported by the container.
    ///
    /// May disagree with what is actually decodable; truncated streams are
    /// detected while reading.
    fn frame_count(&self) -> usize;

    /// Advance past the next frame without converting it.
    ///
    /// Returns `false` once no more frames can be decoded.
    fn skip_frame(&mut self) -> MediaResult<bool>;

    /// Decode the next frame as 8-bit RGB.
    ///
    /// Returns `None` once no more frames can be decoded.
    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>>;
}
