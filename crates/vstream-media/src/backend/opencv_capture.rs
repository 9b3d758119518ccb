//! OpenCV `VideoCapture` decoding backend.

use image::RgbImage;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY, CAP_PROP_FRAME_COUNT},
};
use std::path::Path;

use super::{FrameReader, VideoBackend};
use crate::error::{MediaError, MediaResult};

/// Decoding backend using OpenCV's bundled FFmpeg/GStreamer readers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvBackend;

impl OpenCvBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VideoBackend for OpenCvBackend {
    type Reader = OpenCvReader;

    fn open(&self, path: &Path) -> MediaResult<OpenCvReader> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| MediaError::open_failed(format!("Non UTF-8 path: {}", path.display())))?;

        let cap = VideoCapture::from_file(path_str, CAP_ANY)
            .map_err(|e| MediaError::open_failed(format!("Failed to open video: {}", e)))?;

        if !cap.is_opened().unwrap_or(false) {
            return Err(MediaError::open_failed(format!(
                "Failed to open video file: {}",
                path_str
            )));
        }

        // CAP_PROP_FRAME_COUNT may be an estimate and may be negative when unknown.
        let reported = cap.get(CAP_PROP_FRAME_COUNT).unwrap_or(0.0);
        let frame_count = if reported.is_finite() && reported > 0.0 {
            reported as usize
        } else {
            0
        };

        Ok(OpenCvReader {
            cap,
            frame_count,
            frame: Mat::default(),
            rgb: Mat::default(),
        })
    }

    fn name(&self) -> &'static str {
        "opencv"
    }
}

/// Sequential reader over an OpenCV capture. Released on drop.
pub struct OpenCvReader {
    cap: VideoCapture,
    frame_count: usize,
    frame: Mat,
    rgb: Mat,
}

impl FrameReader for OpenCvReader {
    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        Ok(self.cap.grab()?)
    }

    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if !self.cap.grab()? {
            return Ok(None);
        }
        if !self.cap.retrieve(&mut self.frame, 0)? || self.frame.empty() {
            return Ok(None);
        }

        imgproc::cvt_color_def(&self.frame, &mut self.rgb, imgproc::COLOR_BGR2RGB)
            .map_err(|e| MediaError::decode(format!("Color conversion failed: {}", e)))?;

        let width = self.rgb.cols() as u32;
        let height = self.rgb.rows() as u32;
        let data = self
            .rgb
            .data_bytes()
            .map_err(|e| MediaError::decode(format!("Failed to get frame data: {}", e)))?
            .to_vec();

        RgbImage::from_raw(width, height, data)
            .map(Some)
            .ok_or_else(|| MediaError::decode("Frame data does not match frame dimensions"))
    }
}
