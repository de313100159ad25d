//! Cartesian-product sweep over comma separated override values.
//!
//! For `a=1,2,3 b=10,20` the basic sweeper launches six jobs:
//! `(a=1,b=10) (a=1,b=20) (a=2,b=10) (a=2,b=20) (a=3,b=10) (a=3,b=20)`,
//! split into batches of at most `max_batch_size` jobs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunking::{split_into_batches, validate_batches, MaxBatchSize};
use crate::contract::{Batch, JobReturn, SweepPlan};
use crate::error::SweepError;
use crate::overrides::expand_points;
use crate::step_sweeper::SweepStrategy;

/// `params` of the `basic` sweeper config node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicSweeperParams {
    #[serde(default)]
    pub max_batch_size: Option<i64>,
}

/// Precomputes every batch up front and hands them out in order. Job results
/// are recorded but never change what runs next.
#[derive(Debug, Clone)]
pub struct BasicSweeper {
    max_batch_size: Option<i64>,
    batches: Option<Vec<Batch>>,
    batch_index: usize,
    job_results: Vec<Vec<JobReturn>>,
}

impl BasicSweeper {
    pub fn new(max_batch_size: Option<i64>) -> Self {
        Self {
            max_batch_size,
            batches: None,
            batch_index: 0,
            job_results: Vec::new(),
        }
    }

    pub fn max_batch_size(&self) -> Option<i64> {
        self.max_batch_size
    }

    /// Results of every launched batch, in launch order.
    pub fn job_results(&self) -> &[Vec<JobReturn>] {
        &self.job_results
    }

    /// How the sweep was partitioned, once arguments are initialized.
    pub fn plan(&self) -> Option<SweepPlan> {
        self.batches.as_deref().map(SweepPlan::from_batches)
    }

    fn batches(&self) -> Result<&[Batch], SweepError> {
        self.batches.as_deref().ok_or(SweepError::NotInitialized)
    }
}

impl SweepStrategy for BasicSweeper {
    fn initialize_arguments(&mut self, arguments: &[String]) -> Result<(), SweepError> {
        let max_batch_size = MaxBatchSize::from_config(self.max_batch_size)?;
        let points = expand_points(arguments)?;
        let total_points = points.len();
        let batches = split_into_batches(points, max_batch_size);
        validate_batches(total_points, &batches, max_batch_size)?;

        debug!(
            total_points,
            batches = batches.len(),
            max_batch_size = ?self.max_batch_size,
            "initialized sweep arguments"
        );
        self.batches = Some(batches);
        self.batch_index = 0;
        self.job_results.clear();
        Ok(())
    }

    fn get_job_batch(&mut self) -> Result<Batch, SweepError> {
        let batch = self
            .batches()?
            .get(self.batch_index)
            .cloned()
            .ok_or(SweepError::NoRemainingBatches)?;
        self.batch_index += 1;
        Ok(batch)
    }

    fn is_done(&self) -> Result<bool, SweepError> {
        Ok(self.batch_index >= self.batches()?.len())
    }

    fn update_results(&mut self, job_results: &[JobReturn]) {
        self.job_results.push(job_results.to_vec());
    }
}
