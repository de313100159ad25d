use std::num::NonZeroUsize;

use crate::contract::{Batch, Point};
use crate::error::SweepError;

/// Upper bound on how many points go into one launch batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxBatchSize {
    Unbounded,
    Bounded(NonZeroUsize),
}

impl MaxBatchSize {
    /// Interprets the `max_batch_size` config value: null is unbounded,
    /// anything else must be positive.
    pub fn from_config(value: Option<i64>) -> Result<Self, SweepError> {
        match value {
            None => Ok(Self::Unbounded),
            Some(size) => usize::try_from(size)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::Bounded)
                .ok_or(SweepError::InvalidBatchSize(size)),
        }
    }
}

/// Splits `points` into consecutive batches without reordering them.
pub fn split_into_batches(points: Vec<Point>, max_batch_size: MaxBatchSize) -> Vec<Batch> {
    if points.is_empty() {
        return Vec::new();
    }

    match max_batch_size {
        MaxBatchSize::Unbounded => vec![points],
        MaxBatchSize::Bounded(size) => {
            let mut batches = Vec::with_capacity(points.len().div_ceil(size.get()));
            let mut points = points.into_iter().peekable();
            while points.peek().is_some() {
                batches.push(points.by_ref().take(size.get()).collect());
            }
            batches
        }
    }
}

/// Checks that `batches` is a valid partition of `total_points` points.
pub fn validate_batches(
    total_points: usize,
    batches: &[Batch],
    max_batch_size: MaxBatchSize,
) -> Result<(), SweepError> {
    if batches.iter().any(Vec::is_empty) {
        return Err(SweepError::InvalidConfig(
            "batch plan contains an empty batch".to_string(),
        ));
    }

    if let MaxBatchSize::Bounded(size) = max_batch_size {
        if let Some(oversized) = batches.iter().find(|batch| batch.len() > size.get()) {
            return Err(SweepError::InvalidConfig(format!(
                "batch of {} points exceeds max_batch_size={size}",
                oversized.len()
            )));
        }
    }

    let covered: usize = batches.iter().map(Vec::len).sum();
    if covered != total_points {
        return Err(SweepError::InvalidConfig(format!(
            "batches cover {covered} points, expected {total_points}"
        )));
    }

    Ok(())
}
