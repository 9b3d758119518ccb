//! Sampler behavior against an in-memory decoding backend.

use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use vstream_media::{
    FrameExtractor, FrameReader, FrameSampler, MediaError, MediaResult, SamplerConfig,
    VideoBackend,
};

/// A synthetic video: frame `i` is a solid image whose red channel is `i`.
#[derive(Clone, Copy)]
struct FakeVideo {
    reported: usize,
    decodable: usize,
    width: u32,
    height: u32,
}

#[derive(Default)]
struct FakeBackend {
    videos: HashMap<PathBuf, FakeVideo>,
}

impl FakeBackend {
    fn with(mut self, path: &str, video: FakeVideo) -> Self {
        self.videos.insert(PathBuf::from(path), video);
        self
    }
}

struct FakeReader {
    video: FakeVideo,
    position: usize,
}

impl VideoBackend for FakeBackend {
    type Reader = FakeReader;

    fn open(&self, path: &Path) -> MediaResult<FakeReader> {
        let video = self
            .videos
            .get(path)
            .copied()
            .ok_or_else(|| MediaError::open_failed(format!("cannot open {}", path.display())))?;
        Ok(FakeReader { video, position: 0 })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

impl FrameReader for FakeReader {
    fn frame_count(&self) -> usize {
        self.video.reported
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        if self.position >= self.video.decodable {
            return Ok(false);
        }
        self.position += 1;
        Ok(true)
    }

    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if self.position >= self.video.decodable {
            return Ok(None);
        }
        let value = (self.position % 256) as u8;
        self.position += 1;
        Ok(Some(RgbImage::from_pixel(
            self.video.width,
            self.video.height,
            Rgb([value, 0, 255]),
        )))
    }
}

fn video(frames: usize) -> FakeVideo {
    FakeVideo {
        reported: frames,
        decodable: frames,
        width: 8,
        height: 8,
    }
}

fn sampler(backend: FakeBackend) -> FrameSampler<FakeBackend> {
    FrameSampler::new(backend, SamplerConfig::new(30, 8)).unwrap()
}

#[test]
fn test_extracts_expected_shape_and_range() {
    let s = sampler(FakeBackend::default().with("a.mp4", video(120)));
    let frames = s.extract(Path::new("a.mp4")).unwrap();
    assert_eq!(frames.shape(), &[30, 8, 8, 3]);
    assert!(frames.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn test_picks_uniformly_spaced_frames() {
    let s = sampler(FakeBackend::default().with("a.mp4", video(59)));
    let frames = s.extract(Path::new("a.mp4")).unwrap();
    // 59 frames sampled 30 times: every second frame, first and last included.
    for slot in 0..30 {
        let expected = (slot * 2) as f32 / 255.0;
        assert!((frames[[slot, 0, 0, 0]] - expected).abs() < 1e-6, "slot {}", slot);
        assert_eq!(frames[[slot, 4, 4, 2]], 1.0);
    }
}

#[test]
fn test_exact_frame_count_uses_every_frame() {
    let s = sampler(FakeBackend::default().with("a.mp4", video(30)));
    let frames = s.extract(Path::new("a.mp4")).unwrap();
    for slot in 0..30 {
        assert!((frames[[slot, 0, 0, 0]] - slot as f32 / 255.0).abs() < 1e-6);
    }
}

#[test]
fn test_short_video_rejected() {
    let s = sampler(FakeBackend::default().with("short.mp4", video(29)));
    assert!(s.extract(Path::new("short.mp4")).is_none());
    assert!(matches!(
        s.try_extract(Path::new("short.mp4")),
        Err(MediaError::TooShort {
            total_frames: 29,
            required: 30
        })
    ));
}

#[test]
fn test_truncated_stream_rejected() {
    let truncated = FakeVideo {
        reported: 100,
        decodable: 60,
        ..video(0)
    };
    let s = sampler(FakeBackend::default().with("cut.mp4", truncated));
    assert!(s.extract(Path::new("cut.mp4")).is_none());
    assert!(matches!(
        s.try_extract(Path::new("cut.mp4")),
        Err(MediaError::Truncated { expected: 30, .. })
    ));
}

#[test]
fn test_unopenable_video_rejected() {
    let s = sampler(FakeBackend::default());
    assert!(s.extract(Path::new("missing.mp4")).is_none());
    assert!(matches!(
        s.try_extract(Path::new("missing.mp4")),
        Err(MediaError::OpenFailed(_))
    ));
}

#[test]
fn test_non_square_frames_resized() {
    let wide = FakeVideo {
        width: 64,
        height: 36,
        ..video(40)
    };
    let s = sampler(FakeBackend::default().with("wide.mp4", wide));
    let frames = s.extract(Path::new("wide.mp4")).unwrap();
    assert_eq!(frames.shape(), &[30, 8, 8, 3]);
}

#[test]
fn test_extractor_trait_object() {
    let s = sampler(FakeBackend::default().with("a.mp4", video(45)));
    let extractor: &dyn FrameExtractor = &s;
    assert_eq!(extractor.num_frames(), 30);
    assert_eq!(extractor.frame_size(), 8);
    assert!(extractor.extract(Path::new("a.mp4")).is_some());
}

#[test]
fn test_invalid_config_rejected() {
    let result = FrameSampler::new(FakeBackend::default(), SamplerConfig::new(0, 8));
    assert!(matches!(result, Err(MediaError::InvalidConfig(_))));
}
