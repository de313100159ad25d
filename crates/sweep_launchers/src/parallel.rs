//! Parallel batch execution using rayon.
//!
//! Every job of a batch runs on a dedicated thread pool. Results come back in
//! batch order regardless of which job finishes first.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sweep_core::config::ConfigLoader;
use sweep_core::launcher::run_job;
use sweep_core::{JobReturn, Launcher, Point, SweepError, TaskFunction};
use tracing::info;

/// `params` of the `parallel` launcher config node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParallelLauncherParams {
    /// Worker threads. `None` uses rayon's default (one per core).
    #[serde(default)]
    pub num_threads: Option<usize>,
    #[serde(default)]
    pub show_progress: bool,
}

/// Runs every job of a batch on its own rayon pool.
///
/// A failing job does not cancel the others. Once the batch settles, the
/// failure with the lowest job index is returned, matching
/// [`crate::BasicLauncher`].
pub struct ParallelLauncher {
    params: ParallelLauncherParams,
    sweep_dir: PathBuf,
    config_loader: Arc<dyn ConfigLoader>,
    task_function: TaskFunction,
    pool: rayon::ThreadPool,
}

impl ParallelLauncher {
    pub fn new(
        params: ParallelLauncherParams,
        sweep_dir: PathBuf,
        config_loader: Arc<dyn ConfigLoader>,
        task_function: TaskFunction,
    ) -> Result<Self, SweepError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = params.num_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(|error| {
            SweepError::InvalidConfig(format!("failed to create thread pool: {error}"))
        })?;

        Ok(Self {
            params,
            sweep_dir,
            config_loader,
            task_function,
            pool,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.params.show_progress || total == 0 {
            return None;
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(bar)
    }
}

impl Launcher for ParallelLauncher {
    fn launch(
        &mut self,
        batch: &[Point],
        initial_index: usize,
    ) -> Result<Vec<JobReturn>, SweepError> {
        info!(
            sweep_dir = %self.sweep_dir.display(),
            jobs = batch.len(),
            threads = self.num_threads(),
            "launching jobs in parallel"
        );

        let pb = self.progress_bar(batch.len());
        let task_function = &self.task_function;
        let config_loader = self.config_loader.as_ref();
        let sweep_dir = &self.sweep_dir;

        let outcomes: Vec<Result<JobReturn, SweepError>> = self.pool.install(|| {
            batch
                .par_iter()
                .enumerate()
                .map(|(offset, overrides)| {
                    let result = run_job(
                        task_function,
                        config_loader,
                        sweep_dir,
                        initial_index + offset,
                        overrides,
                    );
                    if let Some(ref progress_bar) = pb {
                        progress_bar.inc(1);
                    }
                    result
                })
                .collect()
        });

        if let Some(ref progress_bar) = pb {
            progress_bar.finish_with_message("Completed");
        }

        outcomes.into_iter().collect()
    }
}
