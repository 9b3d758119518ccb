//! FFmpeg CLI decoding backend.
//!
//! `ffprobe` supplies dimensions and the reported frame count; `ffmpeg`
//! decodes the first video stream to packed RGB24 on stdout, which is read
//! one frame at a time. Dropping the reader kills the decoder process.

use image::RgbImage;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::debug;

use super::{FrameReader, VideoBackend};
use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_stream, StreamInfo};

/// Decoding backend that shells out to `ffmpeg` and `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegBackend {
    /// Locate `ffmpeg` and `ffprobe` in `PATH`.
    pub fn new() -> MediaResult<Self> {
        let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        let ffprobe = which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;
        Ok(Self { ffmpeg, ffprobe })
    }

    /// Use explicit binary locations.
    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }
}

impl VideoBackend for FfmpegBackend {
    type Reader = FfmpegReader;

    fn open(&self, path: &Path) -> MediaResult<FfmpegReader> {
        let info = probe_stream(&self.ffprobe, path)?;
        let args = FfmpegCommand::rgb_frames(path).build_args();
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            frame_count = info.frame_count,
            "Spawning ffmpeg decoder"
        );

        let mut child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MediaError::open_failed(format!("Failed to spawn ffmpeg: {}", e)))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MediaError::internal("ffmpeg stdout not captured"));
            }
        };

        Ok(FfmpegReader::new(child, BufReader::new(stdout), info))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Sequential reader over an `ffmpeg` rawvideo pipe.
pub struct FfmpegReader {
    child: Child,
    stdout: BufReader<ChildStdout>,
    info: StreamInfo,
    buf: Vec<u8>,
}

impl FfmpegReader {
    fn new(child: Child, stdout: BufReader<ChildStdout>, info: StreamInfo) -> Self {
        let frame_len = info.width as usize * info.height as usize * 3;
        Self {
            child,
            stdout,
            info,
            buf: vec![0; frame_len],
        }
    }

    pub fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    /// Read one whole frame into the buffer. A short read means the decoder
    /// stopped, which counts as end of stream.
    fn fill(&mut self) -> MediaResult<bool> {
        match self.stdout.read_exact(&mut self.buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(MediaError::from(e)),
        }
    }
}

impl FrameReader for FfmpegReader {
    fn frame_count(&self) -> usize {
        self.info.frame_count
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        self.fill()
    }

    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if !self.fill()? {
            return Ok(None);
        }
        RgbImage::from_raw(self.info.width, self.info.height, self.buf.clone())
            .map(Some)
            .ok_or_else(|| MediaError::decode("Frame buffer does not match stream dimensions"))
    }
}

impl Drop for FfmpegReader {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_binaries() {
        let backend = FfmpegBackend::with_binaries("/opt/ffmpeg/bin/ffmpeg", "/opt/ffmpeg/bin/ffprobe");
        assert_eq!(backend.ffmpeg_path(), Path::new("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(backend.ffprobe_path(), Path::new("/opt/ffmpeg/bin/ffprobe"));
        assert_eq!(backend.name(), "ffmpeg");
    }

    #[test]
    fn test_open_missing_file() {
        let backend = FfmpegBackend::with_binaries("ffmpeg", "ffprobe");
        let result = backend.open(Path::new("/definitely/not/here.mp4"));
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
