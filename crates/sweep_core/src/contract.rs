use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A single `key=value` argument for one job.
pub type Override = String;

/// Every override sharing one key, in the order the values were given.
pub type OverrideAxis = Vec<Override>;

/// One job's full argument set: one override per axis, in axis order.
pub type Point = Vec<Override>;

/// Points launched together.
pub type Batch = Vec<Point>;

/// What a launcher reports back for one job.
///
/// The sweep loop stores and forwards these without looking inside
/// `return_value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobReturn {
    pub job_index: usize,
    pub overrides: Vec<Override>,
    pub working_dir: PathBuf,
    pub return_value: Value,
}

/// Summary of how a sweep was partitioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepPlan {
    pub total_points: usize,
    pub batch_sizes: Vec<usize>,
    pub fingerprint: String,
}

impl SweepPlan {
    pub fn from_batches(batches: &[Batch]) -> Self {
        let batch_sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        Self {
            total_points: batch_sizes.iter().sum(),
            batch_sizes,
            fingerprint: plan_fingerprint(batches),
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batch_sizes.len()
    }
}

/// SHA-256 over the ordered points. Batch boundaries are not part of the
/// hash, so the same product chunked differently shares a fingerprint.
pub fn plan_fingerprint(batches: &[Batch]) -> String {
    let points: Vec<&Point> = batches.iter().flatten().collect();
    let mut hasher = Sha256::new();
    hasher.update(stable_contract_json(&points));
    format!("{:x}", hasher.finalize())
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(items: &[&str]) -> Point {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn plan_counts_points_per_batch() {
        let batches = vec![
            vec![point(&["a=1"]), point(&["a=2"])],
            vec![point(&["a=3"])],
        ];

        let plan = SweepPlan::from_batches(&batches);
        assert_eq!(plan.total_points, 3);
        assert_eq!(plan.batch_sizes, vec![2, 1]);
        assert_eq!(plan.batch_count(), 2);
        assert_eq!(plan.fingerprint.len(), 64);
    }

    #[test]
    fn fingerprint_ignores_batch_boundaries() {
        let flat = vec![vec![point(&["a=1"]), point(&["a=2"]), point(&["a=3"])]];
        let chunked = vec![
            vec![point(&["a=1"])],
            vec![point(&["a=2"])],
            vec![point(&["a=3"])],
        ];

        assert_eq!(plan_fingerprint(&flat), plan_fingerprint(&chunked));
    }

    #[test]
    fn fingerprint_depends_on_point_order() {
        let forward = vec![vec![point(&["a=1"]), point(&["a=2"])]];
        let reversed = vec![vec![point(&["a=2"]), point(&["a=1"])]];

        assert_ne!(plan_fingerprint(&forward), plan_fingerprint(&reversed));
    }
}
