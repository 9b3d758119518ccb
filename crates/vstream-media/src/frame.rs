//! Frame conversion into normalized tensors.
//!
//! Decoded frames arrive as 8-bit RGB images at their native resolution.
//! Each sampled frame is resized to a square edge with bilinear filtering
//! and scaled into `[0.0, 1.0]` as `f32`.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array4, Array5, ArrayViewMut3, Axis};

use crate::error::{MediaError, MediaResult};

/// Sampled frames, shape `(num_frames, frame_size, frame_size, 3)`, RGB, `[0, 1]`.
pub type FrameTensor = Array4<f32>;

/// Resize `frame` to `size x size` and write normalized RGB values into `out`.
///
/// `out` must have shape `(size, size, 3)`.
pub fn write_normalized(frame: &RgbImage, size: u32, mut out: ArrayViewMut3<'_, f32>) -> MediaResult<()> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::decode("Empty frame"));
    }
    let edge = size as usize;
    if out.shape() != [edge, edge, 3] {
        return Err(MediaError::internal(format!(
            "Frame slot has shape {:?}, expected [{}, {}, 3]",
            out.shape(),
            edge,
            edge
        )));
    }

    let resized;
    let pixels = if (width, height) == (size, size) {
        frame
    } else {
        resized = imageops::resize(frame, size, size, FilterType::Triangle);
        &resized
    };

    // HWC order matches the tensor layout, so raw bytes map one to one.
    for (dst, src) in out.iter_mut().zip(pixels.as_raw().iter()) {
        *dst = *src as f32 / 255.0;
    }
    Ok(())
}

/// Convert one decoded frame into a standalone `(size, size, 3)` tensor slice.
pub fn normalize_frame(frame: &RgbImage, size: u32) -> MediaResult<ndarray::Array3<f32>> {
    let edge = size as usize;
    let mut out = ndarray::Array3::<f32>::zeros((edge, edge, 3));
    write_normalized(frame, size, out.view_mut())?;
    Ok(out)
}

/// Add the leading batch axis expected by single-video inference:
/// `(1, num_frames, size, size, 3)`.
pub fn as_model_input(frames: FrameTensor) -> Array5<f32> {
    frames.insert_axis(Axis(0))
}
