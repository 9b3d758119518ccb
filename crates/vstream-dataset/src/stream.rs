//! Lazy per-class sample streams.
//!
//! A [`StreamSource`] describes one class on one side of the split and can
//! be turned into any number of independent [`SampleStream`]s. Streams
//! decode one video per `next()` call and never look ahead.
//!
//! The train/validation boundary is counted in successful extractions, not
//! file positions: a validation stream skips the first `train_count` videos
//! that actually decode, so a corrupt file in the training range cannot
//! push a training video into validation.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use vstream_media::{FrameExtractor, FrameTensor};
use vstream_models::{ClassLabel, Split, VideoFile};

use crate::catalog::DatasetCatalog;
use crate::metrics;

/// One extracted video and its class.
#[derive(Debug, Clone)]
pub struct Sample {
    pub frames: FrameTensor,
    pub label: ClassLabel,
}

/// Restartable description of a per-class stream.
#[derive(Clone)]
pub struct StreamSource {
    files: Arc<[VideoFile]>,
    label: ClassLabel,
    split: Option<Split>,
    limit: usize,
    skip_before_limit: usize,
    extractor: Arc<dyn FrameExtractor>,
}

impl StreamSource {
    /// The first `train_count` successes of a class.
    pub fn train(
        files: Arc<[VideoFile]>,
        label: ClassLabel,
        train_count: usize,
        extractor: Arc<dyn FrameExtractor>,
    ) -> Self {
        Self {
            files,
            label,
            split: Some(Split::Train),
            limit: train_count,
            skip_before_limit: 0,
            extractor,
        }
    }

    /// The `val_count` successes following the first `train_count`.
    pub fn validation(
        files: Arc<[VideoFile]>,
        label: ClassLabel,
        train_count: usize,
        val_count: usize,
        extractor: Arc<dyn FrameExtractor>,
    ) -> Self {
        Self {
            files,
            label,
            split: Some(Split::Validation),
            limit: val_count,
            skip_before_limit: train_count,
            extractor,
        }
    }

    /// Every extractable file of a class, unsplit.
    pub fn unsplit(files: Arc<[VideoFile]>, label: ClassLabel, extractor: Arc<dyn FrameExtractor>) -> Self {
        let limit = files.len();
        Self {
            files,
            label,
            split: None,
            limit,
            skip_before_limit: 0,
            extractor,
        }
    }

    pub fn label(&self) -> ClassLabel {
        self.label
    }

    pub fn split(&self) -> Option<Split> {
        self.split
    }

    /// Maximum samples a stream from this source emits.
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn skip_before_limit(&self) -> usize {
        self.skip_before_limit
    }

    pub fn files(&self) -> &[VideoFile] {
        &self.files
    }

    /// `(num_frames, frame_size)` of the tensors this source emits.
    pub fn frame_shape(&self) -> (usize, usize) {
        (self.extractor.num_frames(), self.extractor.frame_size())
    }

    /// Start a fresh pass.
    pub fn stream(&self) -> SampleStream {
        SampleStream::new(self.clone())
    }

    fn split_name(&self) -> &'static str {
        self.split.map_or("corpus", |s| s.as_str())
    }
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSource")
            .field("files", &self.files.len())
            .field("label", &self.label)
            .field("split", &self.split)
            .field("limit", &self.limit)
            .field("skip_before_limit", &self.skip_before_limit)
            .finish_non_exhaustive()
    }
}

/// Counters for one pass of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Files handed to the extractor
    pub visited: usize,
    /// Files the extractor rejected
    pub failed: usize,
    /// Successes skipped before the first emitted sample
    pub skipped: usize,
    /// Samples emitted
    pub emitted: usize,
}

/// One lazy pass over a [`StreamSource`].
pub struct SampleStream {
    source: StreamSource,
    position: usize,
    stats: StreamStats,
}

impl SampleStream {
    pub fn new(source: StreamSource) -> Self {
        Self {
            source,
            position: 0,
            stats: StreamStats::default(),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn source(&self) -> &StreamSource {
        &self.source
    }

    fn extract(&self, file: &VideoFile) -> Option<FrameTensor> {
        let extractor = &self.source.extractor;
        let frames = extractor.extract(file.path())?;

        let edge = extractor.frame_size();
        let expected = [extractor.num_frames(), edge, edge, 3];
        if frames.shape() != expected {
            warn!(
                path = %file.path.display(),
                shape = ?frames.shape(),
                expected = ?expected,
                "Extracted tensor has unexpected shape"
            );
            return None;
        }
        Some(frames)
    }
}

impl Iterator for SampleStream {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        loop {
            if self.stats.emitted >= self.source.limit {
                return None;
            }
            let file = self.source.files.get(self.position)?.clone();
            self.position += 1;
            self.stats.visited += 1;

            let Some(frames) = self.extract(&file) else {
                self.stats.failed += 1;
                debug!(
                    path = %file.path.display(),
                    class = %self.source.label,
                    split = self.source.split_name(),
                    "Skipping unreadable video"
                );
                continue;
            };

            if self.stats.skipped < self.source.skip_before_limit {
                self.stats.skipped += 1;
                continue;
            }

            self.stats.emitted += 1;
            metrics::record_sample(self.source.split_name(), self.source.label.dir_name());
            return Some(Sample {
                frames,
                label: self.source.label,
            });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining_files = self.source.files.len().saturating_sub(self.position);
        let remaining_limit = self.source.limit.saturating_sub(self.stats.emitted);
        (0, Some(remaining_files.min(remaining_limit)))
    }
}

/// Every extractable video in the corpus, nonviolent first, unsplit.
pub fn corpus_stream(
    catalog: &DatasetCatalog,
    extractor: Arc<dyn FrameExtractor>,
) -> impl Iterator<Item = Sample> {
    ClassLabel::ALL
        .into_iter()
        .map(move |label| {
            StreamSource::unsplit(catalog.files(label), label, Arc::clone(&extractor)).stream()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
}
