//! Uniform frame index planning.
//!
//! Sampled positions are evenly spaced over `[0, total_frames - 1]`
//! inclusive and truncated to integers, so the first and last frame are
//! always part of the plan when more than one frame is requested.

/// Frame indices to sample from a video of `total_frames` frames.
///
/// Equivalent to flooring a linear interpolation from `0` to
/// `total_frames - 1` in `num_frames` steps, computed in integer arithmetic
/// so the endpoints are exact. Returns an empty plan when either count is 0.
pub fn sample_indices(total_frames: usize, num_frames: usize) -> Vec<usize> {
    if total_frames == 0 || num_frames == 0 {
        return Vec::new();
    }
    if num_frames == 1 {
        return vec![0];
    }

    let last = (total_frames - 1) as u128;
    let steps = (num_frames - 1) as u128;
    (0..num_frames)
        .map(|i| ((i as u128 * last) / steps) as usize)
        .collect()
}

/// Whether a video with `total_frames` frames can supply `num_frames` samples.
pub fn can_sample(total_frames: usize, num_frames: usize) -> bool {
    num_frames > 0 && total_frames >= num_frames
}
