//! Extraction metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the host process.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const EXTRACTIONS_TOTAL: &str = "vstream_extractions_total";
    pub const EXTRACTION_DURATION_SECONDS: &str = "vstream_extraction_duration_seconds";
}

/// Record one extraction attempt by outcome (`ok` or a rejection reason).
pub fn record_extraction(outcome: &'static str) {
    counter!(names::EXTRACTIONS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record the wall time of one extraction attempt.
pub fn record_extraction_duration(duration_secs: f64) {
    histogram!(names::EXTRACTION_DURATION_SECONDS).record(duration_secs);
}
