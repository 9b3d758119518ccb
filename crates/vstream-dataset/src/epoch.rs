//! Epoch-aware train and validation pipelines.
//!
//! Per-class streams are concatenated in class order, the training side is
//! shuffled through a bounded buffer, and both sides are batched. The
//! training pipeline restarts itself whenever a pass runs dry, so a consumer
//! can pull `train_steps_per_epoch * epochs` batches without ever seeing the
//! end of the stream. Validation runs exactly once per pipeline.

use ndarray::{Array1, Array5, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, error, info};
use vstream_media::FrameExtractor;
use vstream_models::{ClassLabel, DatasetSummary, Split, SplitPlan};

use crate::catalog::DatasetCatalog;
use crate::config::{PipelineConfig, DEFAULT_SHUFFLE_BUFFER_CAP};
use crate::error::{DatasetError, DatasetResult};
use crate::metrics;
use crate::planner;
use crate::stream::{Sample, SampleStream, StreamSource};

/// A stack of samples.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `(n, num_frames, frame_size, frame_size, 3)`
    pub frames: Array5<f32>,
    /// Class index per sample, `(n,)`
    pub labels: Array1<i32>,
}

impl Batch {
    /// Stack samples along a new leading axis.
    ///
    /// Every sample must have the same frame tensor shape.
    pub fn from_samples(samples: &[Sample]) -> DatasetResult<Self> {
        let first = samples
            .first()
            .ok_or_else(|| DatasetError::shape("Cannot build an empty batch"))?;
        let shape = first.frames.dim();
        if let Some(bad) = samples.iter().find(|s| s.frames.dim() != shape) {
            return Err(DatasetError::shape(format!(
                "Sample shape {:?} does not match {:?}",
                bad.frames.shape(),
                first.frames.shape()
            )));
        }

        let mut frames = Array5::<f32>::zeros((samples.len(), shape.0, shape.1, shape.2, shape.3));
        for (mut slot, sample) in frames.axis_iter_mut(Axis(0)).zip(samples) {
            slot.assign(&sample.frames);
        }
        let labels = samples.iter().map(|s| s.label.index()).collect();

        Ok(Self { frames, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Bounded random-order buffer over a sample stream.
///
/// Holds up to `capacity` samples and emits a uniformly chosen one each
/// time, refilling from the input. Once the input ends the buffer drains in
/// random order.
pub struct ShuffleBuffer<I> {
    input: I,
    buffer: Vec<Sample>,
    capacity: usize,
    rng: StdRng,
}

impl<I: Iterator<Item = Sample>> ShuffleBuffer<I> {
    pub fn new(input: I, capacity: usize, rng: StdRng) -> Self {
        let capacity = capacity.max(1);
        Self {
            input,
            buffer: Vec::with_capacity(capacity),
            capacity,
            rng,
        }
    }
}

impl<I: Iterator<Item = Sample>> Iterator for ShuffleBuffer<I> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        while self.buffer.len() < self.capacity {
            match self.input.next() {
                Some(sample) => self.buffer.push(sample),
                None => break,
            }
        }
        if self.buffer.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.buffer.len());
        Some(self.buffer.swap_remove(index))
    }
}

/// Groups consecutive samples into batches of at most `batch_size`.
struct Batcher<I> {
    input: I,
    batch_size: usize,
}

impl<I: Iterator<Item = Sample>> Batcher<I> {
    /// Next batch, or `None` once the input is exhausted.
    fn next_samples(&mut self) -> Option<Vec<Sample>> {
        let samples: Vec<Sample> = self.input.by_ref().take(self.batch_size).collect();
        (!samples.is_empty()).then_some(samples)
    }
}

type PassStream = std::iter::Flatten<std::vec::IntoIter<SampleStream>>;

/// Concatenate fresh streams of every source, in order.
fn open_pass(sources: &[StreamSource]) -> PassStream {
    sources
        .iter()
        .map(StreamSource::stream)
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
}

/// Stack a batch; shapes are already checked per sample by the streams.
/// A batch that still fails is logged and dropped.
fn stack(samples: Vec<Sample>, split: Split) -> Option<Batch> {
    match Batch::from_samples(&samples) {
        Ok(batch) => Some(batch),
        Err(e) => {
            error!(split = %split, error = %e, "Dropping batch that failed to assemble");
            None
        }
    }
}

/// Shuffled, batched, endlessly repeating training batches.
pub struct TrainPipeline {
    sources: Vec<StreamSource>,
    batch_size: usize,
    buffer_size: usize,
    expected_samples: usize,
    rng: StdRng,
    current: Option<Batcher<ShuffleBuffer<PassStream>>>,
    pass: usize,
    pass_batches: usize,
    finished: bool,
}

impl TrainPipeline {
    fn new(
        sources: Vec<StreamSource>,
        batch_size: usize,
        buffer_size: usize,
        seed: Option<u64>,
    ) -> Self {
        let expected_samples = sources.iter().map(StreamSource::limit).sum();
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            sources,
            batch_size,
            buffer_size,
            expected_samples,
            rng,
            current: None,
            pass: 0,
            pass_batches: 0,
            finished: false,
        }
    }

    /// Passes started so far.
    pub fn passes(&self) -> usize {
        self.pass
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn start_pass(&mut self) {
        self.pass += 1;
        self.pass_batches = 0;
        metrics::record_train_pass();
        debug!(pass = self.pass, "Starting training pass");

        let shuffled = ShuffleBuffer::new(
            open_pass(&self.sources),
            self.buffer_size,
            StdRng::from_rng(&mut self.rng),
        );
        self.current = Some(Batcher {
            input: shuffled,
            batch_size: self.batch_size,
        });
    }
}

impl Iterator for TrainPipeline {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        while !self.finished {
            if self.current.is_none() {
                self.start_pass();
            }
            let next = self.current.as_mut().and_then(Batcher::next_samples);

            if let Some(samples) = next {
                if let Some(batch) = stack(samples, Split::Train) {
                    self.pass_batches += 1;
                    return Some(batch);
                }
                continue;
            }

            self.current = None;
            if self.pass_batches == 0 {
                self.finished = true;
                if self.expected_samples > 0 {
                    error!(
                        pass = self.pass,
                        expected = self.expected_samples,
                        "Training pass produced no samples; every training video failed to decode"
                    );
                } else {
                    debug!("Training split is empty");
                }
            }
        }
        None
    }
}

/// Batched validation samples, one pass only.
pub struct ValPipeline {
    batcher: Batcher<PassStream>,
}

impl ValPipeline {
    fn new(sources: &[StreamSource], batch_size: usize) -> Self {
        Self {
            batcher: Batcher {
                input: open_pass(sources),
                batch_size,
            },
        }
    }
}

impl Iterator for ValPipeline {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        loop {
            let samples = self.batcher.next_samples()?;
            if let Some(batch) = stack(samples, Split::Validation) {
                return Some(batch);
            }
        }
    }
}

/// Built pipelines plus the step budget a training loop needs.
pub struct EpochPlan {
    pub train: TrainPipeline,
    pub val: ValPipeline,
    pub train_steps_per_epoch: usize,
    pub val_steps_per_epoch: usize,
    pub epochs: usize,
    pub summary: DatasetSummary,
    val_sources: Vec<StreamSource>,
    batch_size: usize,
}

impl EpochPlan {
    /// A fresh one-shot validation pipeline for another evaluation pass.
    pub fn validation(&self) -> ValPipeline {
        ValPipeline::new(&self.val_sources, self.batch_size)
    }

    pub fn total_train_steps(&self) -> usize {
        self.train_steps_per_epoch * self.epochs
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Assembles train and validation pipelines from per-class sources.
#[derive(Debug, Clone)]
pub struct EpochController {
    shuffle_buffer_cap: usize,
    shuffle_seed: Option<u64>,
}

impl Default for EpochController {
    fn default() -> Self {
        Self {
            shuffle_buffer_cap: DEFAULT_SHUFFLE_BUFFER_CAP,
            shuffle_seed: None,
        }
    }
}

impl EpochController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shuffle_buffer_cap(mut self, cap: usize) -> Self {
        self.shuffle_buffer_cap = cap;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    /// Build pipelines over `train_sources` and `val_sources`, each listed
    /// in class order.
    ///
    /// All sources must emit the same frame shape. Sources that can emit
    /// nothing at all are reported as [`DatasetError::NoData`].
    pub fn build(
        &self,
        train_sources: Vec<StreamSource>,
        val_sources: Vec<StreamSource>,
        batch_size: usize,
        epoch_count: usize,
    ) -> DatasetResult<EpochPlan> {
        if batch_size == 0 {
            return Err(DatasetError::invalid_config("batch_size must be at least 1"));
        }
        if self.shuffle_buffer_cap == 0 {
            return Err(DatasetError::invalid_config(
                "shuffle_buffer_cap must be at least 1",
            ));
        }

        let mut shapes = train_sources.iter().chain(&val_sources).map(StreamSource::frame_shape);
        if let Some(first) = shapes.next() {
            if let Some(other) = shapes.find(|shape| *shape != first) {
                return Err(DatasetError::invalid_config(format!(
                    "Sources disagree on frame shape: {:?} vs {:?}",
                    first, other
                )));
            }
        }

        let plan = plan_from_sources(&train_sources, &val_sources);
        if plan.class_counts().is_empty() {
            return Err(DatasetError::NoData);
        }
        let summary = DatasetSummary::new(plan.class_counts(), &plan);
        let train_total = plan.train_total();
        let val_total = plan.val_total();

        let train_steps_per_epoch = train_total.div_ceil(batch_size);
        let val_steps_per_epoch = val_total.div_ceil(batch_size);
        let buffer_size = self.shuffle_buffer_cap.min(train_total).max(1);

        info!(
            nonviolent = summary.nonviolent,
            violent = summary.violent,
            total = summary.total,
            train = summary.train,
            val = summary.val,
            train_nonviolent = summary.train_nonviolent,
            train_violent = summary.train_violent,
            val_nonviolent = summary.val_nonviolent,
            val_violent = summary.val_violent,
            train_steps_per_epoch,
            val_steps_per_epoch,
            epochs = epoch_count,
            shuffle_buffer = buffer_size,
            "Dataset pipelines ready"
        );

        let val = ValPipeline::new(&val_sources, batch_size);
        let train = TrainPipeline::new(train_sources, batch_size, buffer_size, self.shuffle_seed);

        Ok(EpochPlan {
            train,
            val,
            train_steps_per_epoch,
            val_steps_per_epoch,
            epochs: epoch_count,
            summary,
            val_sources,
            batch_size,
        })
    }
}

fn plan_from_sources(train_sources: &[StreamSource], val_sources: &[StreamSource]) -> SplitPlan {
    let total = |sources: &[StreamSource], label: ClassLabel| -> usize {
        sources
            .iter()
            .filter(|s| s.label() == label)
            .map(StreamSource::limit)
            .sum()
    };
    SplitPlan {
        nonviolent_train: total(train_sources, ClassLabel::Nonviolent),
        nonviolent_val: total(val_sources, ClassLabel::Nonviolent),
        violent_train: total(train_sources, ClassLabel::Violent),
        violent_val: total(val_sources, ClassLabel::Violent),
    }
}

/// Train and validation sources for every class, in class order.
pub fn split_sources(
    catalog: &DatasetCatalog,
    plan: &SplitPlan,
    extractor: Arc<dyn FrameExtractor>,
) -> (Vec<StreamSource>, Vec<StreamSource>) {
    let mut train = Vec::with_capacity(ClassLabel::ALL.len());
    let mut val = Vec::with_capacity(ClassLabel::ALL.len());
    for label in ClassLabel::ALL {
        let files = catalog.files(label);
        train.push(StreamSource::train(
            Arc::clone(&files),
            label,
            plan.train(label),
            Arc::clone(&extractor),
        ));
        val.push(StreamSource::validation(
            files,
            label,
            plan.train(label),
            plan.val(label),
            Arc::clone(&extractor),
        ));
    }
    (train, val)
}

/// Catalog the corpus, plan the split and build both pipelines.
pub fn build_pipelines(
    config: &PipelineConfig,
    extractor: Arc<dyn FrameExtractor>,
) -> DatasetResult<EpochPlan> {
    config.validate()?;
    let edge = config.sampler.frame_size as usize;
    if extractor.num_frames() != config.sampler.num_frames || extractor.frame_size() != edge {
        return Err(DatasetError::invalid_config(format!(
            "Extractor produces {}x{} frames, config expects {}x{}",
            extractor.num_frames(),
            extractor.frame_size(),
            config.sampler.num_frames,
            edge
        )));
    }

    let catalog = DatasetCatalog::enumerate_with(&config.data_dir, config.listing_order)?;
    if catalog.is_empty() {
        error!(root = %config.data_dir.display(), "No videos found");
        return Err(DatasetError::NoData);
    }

    let plan = planner::plan(catalog.counts(), config.validation_split)?;
    let (train_sources, val_sources) = split_sources(&catalog, &plan, extractor);

    EpochController::new()
        .with_shuffle_buffer_cap(config.shuffle_buffer_cap)
        .with_shuffle_seed(config.shuffle_seed)
        .build(train_sources, val_sources, config.batch_size, config.epochs)
}

/// [`build_pipelines`] with an FFmpeg-backed sampler.
pub fn build_ffmpeg_pipelines(config: &PipelineConfig) -> DatasetResult<EpochPlan> {
    let sampler = vstream_media::FrameSampler::with_ffmpeg(config.sampler)?;
    build_pipelines(config, Arc::new(sampler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstream_media::FrameTensor;
    use vstream_models::VideoFile;

    fn sample(value: f32, label: ClassLabel) -> Sample {
        Sample {
            frames: FrameTensor::from_elem((2, 3, 3, 3), value),
            label,
        }
    }

    #[test]
    fn test_batch_stacks_in_order() {
        let samples = vec![
            sample(0.25, ClassLabel::Nonviolent),
            sample(0.75, ClassLabel::Violent),
        ];
        let batch = Batch::from_samples(&samples).unwrap();
        assert_eq!(batch.frames.shape(), &[2, 2, 3, 3, 3]);
        assert_eq!(batch.labels.to_vec(), vec![0, 1]);
        assert_eq!(batch.frames[[0, 1, 2, 2, 0]], 0.25);
        assert_eq!(batch.frames[[1, 0, 0, 0, 2]], 0.75);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_batch_rejects_mixed_shapes() {
        let samples = vec![
            sample(0.0, ClassLabel::Nonviolent),
            Sample {
                frames: FrameTensor::zeros((1, 3, 3, 3)),
                label: ClassLabel::Violent,
            },
        ];
        assert!(matches!(
            Batch::from_samples(&samples),
            Err(DatasetError::Shape(_))
        ));
        assert!(Batch::from_samples(&[]).is_err());
    }

    #[test]
    fn test_shuffle_buffer_is_a_permutation() {
        let input = (0..50).map(|i| sample(i as f32, ClassLabel::Nonviolent));
        let shuffled: Vec<f32> = ShuffleBuffer::new(input, 10, StdRng::seed_from_u64(7))
            .map(|s| s.frames[[0, 0, 0, 0]])
            .collect();
        assert_eq!(shuffled.len(), 50);
        let mut sorted = shuffled.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let expected: Vec<f32> = (0..50).map(|i| i as f32).collect();
        assert_eq!(sorted, expected);
        assert_ne!(shuffled, expected);
    }

    #[test]
    fn test_shuffle_seed_is_deterministic() {
        let run = |seed| -> Vec<f32> {
            let input = (0..20).map(|i| sample(i as f32, ClassLabel::Violent));
            ShuffleBuffer::new(input, 8, StdRng::seed_from_u64(seed))
                .map(|s| s.frames[[0, 0, 0, 0]])
                .collect()
        };
        assert_eq!(run(3), run(3));
    }

    #[test]
    fn test_shuffle_buffer_of_one_keeps_order() {
        let input = (0..5).map(|i| sample(i as f32, ClassLabel::Violent));
        let out: Vec<f32> = ShuffleBuffer::new(input, 1, StdRng::seed_from_u64(1))
            .map(|s| s.frames[[0, 0, 0, 0]])
            .collect();
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    /// Emits `(num_frames, 3, 3, 3)` zeros for any path.
    struct FixedExtractor(usize);

    impl FrameExtractor for FixedExtractor {
        fn extract(&self, _: &std::path::Path) -> Option<FrameTensor> {
            Some(FrameTensor::zeros((self.0, 3, 3, 3)))
        }

        fn num_frames(&self) -> usize {
            self.0
        }

        fn frame_size(&self) -> usize {
            3
        }
    }

    fn files(n: usize, label: ClassLabel) -> Arc<[VideoFile]> {
        (0..n)
            .map(|i| VideoFile::new(format!("{}_{}.mp4", label.dir_name(), i), label))
            .collect()
    }

    fn train_source(n: usize, label: ClassLabel, num_frames: usize) -> StreamSource {
        StreamSource::train(files(n, label), label, n, Arc::new(FixedExtractor(num_frames)))
    }

    #[test]
    fn test_empty_sources_are_no_data() {
        let extractor: Arc<dyn FrameExtractor> = Arc::new(FixedExtractor(2));
        let sources = |label| StreamSource::train(files(0, label), label, 0, Arc::clone(&extractor));
        let result = EpochController::new().build(
            vec![sources(ClassLabel::Nonviolent), sources(ClassLabel::Violent)],
            vec![sources(ClassLabel::Nonviolent), sources(ClassLabel::Violent)],
            8,
            10,
        );
        assert!(matches!(result, Err(DatasetError::NoData)));
    }

    #[test]
    fn test_sources_must_share_frame_shape() {
        let result = EpochController::new().build(
            vec![
                train_source(2, ClassLabel::Nonviolent, 2),
                train_source(2, ClassLabel::Violent, 3),
            ],
            Vec::new(),
            2,
            1,
        );
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_train_skips_batch_that_fails_to_assemble() {
        // A one-slot buffer keeps input order: [nv, v] cannot stack, [v, v] can.
        let sources = vec![
            train_source(1, ClassLabel::Nonviolent, 2),
            train_source(3, ClassLabel::Violent, 3),
        ];
        let mut train = TrainPipeline::new(sources, 2, 1, Some(5));

        let batch = train.next().unwrap();
        assert_eq!(batch.labels.to_vec(), vec![1, 1]);
        assert_eq!(batch.frames.shape(), &[2, 3, 3, 3, 3]);
        assert_eq!(train.passes(), 1);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = EpochController::new().build(Vec::new(), Vec::new(), 0, 1);
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
    }
}
