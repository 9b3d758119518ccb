//! Dataset pipeline metrics.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const SAMPLES_EMITTED_TOTAL: &str = "vstream_samples_emitted_total";
    pub const TRAIN_PASSES_TOTAL: &str = "vstream_train_passes_total";
}

/// Record one sample handed to a consumer.
pub fn record_sample(split: &'static str, class: &'static str) {
    counter!(names::SAMPLES_EMITTED_TOTAL, "split" => split, "class" => class).increment(1);
}

/// Record the start of a pass over the training streams.
pub fn record_train_pass() {
    counter!(names::TRAIN_PASSES_TOTAL).increment(1);
}
