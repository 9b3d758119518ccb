//! Stratified split planning.

use vstream_models::{ClassCounts, SplitPlan};

use crate::config::valid_split;
use crate::error::{DatasetError, DatasetResult};

/// Split each class into train and validation counts.
///
/// `train = floor(total * (1 - validation_split))` and `val` takes the
/// remainder, so no class ever loses a video to rounding.
pub fn plan(counts: ClassCounts, validation_split: f64) -> DatasetResult<SplitPlan> {
    if !valid_split(validation_split) {
        return Err(DatasetError::invalid_config(format!(
            "validation_split must be in (0, 1), got {}",
            validation_split
        )));
    }
    if counts.is_empty() {
        return Err(DatasetError::NoData);
    }

    let (nonviolent_train, nonviolent_val) = split_class(counts.nonviolent, validation_split);
    let (violent_train, violent_val) = split_class(counts.violent, validation_split);

    Ok(SplitPlan {
        nonviolent_train,
        nonviolent_val,
        violent_train,
        violent_val,
    })
}

fn split_class(total: usize, validation_split: f64) -> (usize, usize) {
    let train = ((total as f64) * (1.0 - validation_split)).floor() as usize;
    let train = train.min(total);
    (train, total - train)
}
