//! FFmpeg command builder for decoding to a raw frame pipe.

use std::path::{Path, PathBuf};

/// Output target meaning "write to stdout".
pub const PIPE_OUTPUT: &str = "pipe:1";

/// Builder for FFmpeg decode commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target (file path or pipe)
    output: String,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to stdout.
    pub fn new(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: PIPE_OUTPUT.to_string(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Decode the first video stream to packed RGB24 frames on stdout, one
    /// output frame per decoded frame, at the stream's native resolution.
    pub fn rgb_frames(input: impl AsRef<Path>) -> Self {
        Self::new(input)
            .no_autorotate()
            .map_first_video()
            .passthrough_timing()
            .raw_video("rgb24")
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Keep the coded orientation so frame dimensions match the probe.
    pub fn no_autorotate(self) -> Self {
        self.input_arg("-noautorotate")
    }

    /// Select only the first video stream.
    pub fn map_first_video(self) -> Self {
        self.output_arg("-map").output_arg("0:v:0").output_arg("-an").output_arg("-sn")
    }

    /// Neither duplicate nor drop frames to match a target rate.
    pub fn passthrough_timing(self) -> Self {
        self.output_arg("-vsync").output_arg("0")
    }

    /// Emit headerless frames in the given pixel format.
    pub fn raw_video(self, pix_fmt: impl Into<String>) -> Self {
        self.output_arg("-f")
            .output_arg("rawvideo")
            .output_arg("-pix_fmt")
            .output_arg(pix_fmt)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
        ];

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());

        args.push(self.output.clone());

        args
    }
}
