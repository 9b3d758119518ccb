//! FFprobe video stream information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// First video stream of a file, as far as the sampler needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Reported frame count
    pub frame_count: usize,
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Video codec
    pub codec: String,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
}

/// Probe the first video stream of `path` with the `ffprobe` binary at `ffprobe`.
///
/// The frame count comes from the container's `nb_frames` when present,
/// otherwise from a packet count, otherwise from `duration * fps`.
pub fn probe_stream(ffprobe: &Path, path: &Path) -> MediaResult<StreamInfo> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let stdout = run_ffprobe(
        ffprobe,
        &[
            "-v",
            "error",
            "-print_format",
            "json",
            "-select_streams",
            "v:0",
            "-show_format",
            "-show_streams",
        ],
        path,
    )?;
    let mut info = parse_stream_info(&stdout)?;

    if info.frame_count == 0 {
        debug!(path = %path.display(), "nb_frames missing, counting packets");
        let stdout = run_ffprobe(
            ffprobe,
            &[
                "-v",
                "error",
                "-print_format",
                "json",
                "-select_streams",
                "v:0",
                "-count_packets",
                "-show_entries",
                "stream=nb_read_packets",
            ],
            path,
        )?;
        info.frame_count = parse_packet_count(&stdout)?
            .unwrap_or_else(|| estimate_frames(info.duration, info.fps));
    }

    Ok(info)
}

fn run_ffprobe(ffprobe: &Path, args: &[&str], path: &Path) -> MediaResult<Vec<u8>> {
    let output = Command::new(ffprobe)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }
    Ok(output.stdout)
}

/// Parse `-show_format -show_streams` JSON for the first video stream.
///
/// A missing `nb_frames` leaves `frame_count` at 0 for the caller to resolve.
pub fn parse_stream_info(json: &[u8]) -> MediaResult<StreamInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref().unwrap_or("video") == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(MediaError::InvalidVideo(format!(
            "Video stream has no dimensions ({}x{})",
            width, height
        )));
    }

    let duration = stream
        .duration
        .as_deref()
        .or(probe.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(0.0);

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);

    Ok(StreamInfo {
        width,
        height,
        frame_count,
        fps,
        duration,
        codec: stream.codec_name.clone().unwrap_or_default(),
    })
}

/// Parse `-count_packets` JSON. `None` when ffprobe reported no count.
pub fn parse_packet_count(json: &[u8]) -> MediaResult<Option<usize>> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;
    Ok(probe
        .streams
        .first()
        .and_then(|s| s.nb_read_packets.as_deref())
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n > 0))
}

/// Frame count estimated from duration and frame rate.
fn estimate_frames(duration: f64, fps: f64) -> usize {
    if duration > 0.0 && fps > 0.0 {
        (duration * fps).round() as usize
    } else {
        0
    }
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 && num > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse::<f64>().ok().filter(|fps| *fps > 0.0)
}
