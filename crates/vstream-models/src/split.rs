//! Per-class counts, split plans and the dataset summary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::class::ClassLabel;

/// Which side of the train/validation partition a stream covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Validation,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of catalogued files per class.
///
/// Snapshot taken at catalog time. It goes stale if the corpus changes on
/// disk afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClassCounts {
    pub nonviolent: usize,
    pub violent: usize,
}

impl ClassCounts {
    pub fn new(nonviolent: usize, violent: usize) -> Self {
        Self {
            nonviolent,
            violent,
        }
    }

    pub fn get(&self, label: ClassLabel) -> usize {
        match label {
            ClassLabel::Nonviolent => self.nonviolent,
            ClassLabel::Violent => self.violent,
        }
    }

    pub fn total(&self) -> usize {
        self.nonviolent + self.violent
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Stratified train/validation counts per class.
///
/// For each class `train + val` equals the class total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SplitPlan {
    pub nonviolent_train: usize,
    pub nonviolent_val: usize,
    pub violent_train: usize,
    pub violent_val: usize,
}

impl SplitPlan {
    pub fn train(&self, label: ClassLabel) -> usize {
        match label {
            ClassLabel::Nonviolent => self.nonviolent_train,
            ClassLabel::Violent => self.violent_train,
        }
    }

    pub fn val(&self, label: ClassLabel) -> usize {
        match label {
            ClassLabel::Nonviolent => self.nonviolent_val,
            ClassLabel::Violent => self.violent_val,
        }
    }

    /// Count for one class on one side of the split.
    pub fn count(&self, label: ClassLabel, split: Split) -> usize {
        match split {
            Split::Train => self.train(label),
            Split::Validation => self.val(label),
        }
    }

    pub fn train_total(&self) -> usize {
        self.nonviolent_train + self.violent_train
    }

    pub fn val_total(&self) -> usize {
        self.nonviolent_val + self.violent_val
    }

    /// Class totals implied by the plan.
    pub fn class_counts(&self) -> ClassCounts {
        ClassCounts {
            nonviolent: self.nonviolent_train + self.nonviolent_val,
            violent: self.violent_train + self.violent_val,
        }
    }
}

/// Reporting breakdown returned with the built pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetSummary {
    pub nonviolent: usize,
    pub violent: usize,
    pub total: usize,
    pub train: usize,
    pub val: usize,
    pub train_nonviolent: usize,
    pub train_violent: usize,
    pub val_nonviolent: usize,
    pub val_violent: usize,
}

impl DatasetSummary {
    pub fn new(counts: ClassCounts, plan: &SplitPlan) -> Self {
        Self {
            nonviolent: counts.nonviolent,
            violent: counts.violent,
            total: counts.total(),
            train: plan.train_total(),
            val: plan.val_total(),
            train_nonviolent: plan.nonviolent_train,
            train_violent: plan.violent_train,
            val_nonviolent: plan.nonviolent_val,
            val_violent: plan.violent_val,
        }
    }
}
