use std::path::PathBuf;
use std::sync::Arc;

use sweep_core::config::ConfigLoader;
use sweep_core::launcher::run_job;
use sweep_core::{JobReturn, Launcher, Point, SweepError, TaskFunction};
use tracing::info;

/// Runs each job of a batch in turn on the calling thread.
///
/// The first failing job aborts the batch; jobs after it are not started.
pub struct BasicLauncher {
    sweep_dir: PathBuf,
    config_loader: Arc<dyn ConfigLoader>,
    task_function: TaskFunction,
}

impl BasicLauncher {
    pub fn new(
        sweep_dir: PathBuf,
        config_loader: Arc<dyn ConfigLoader>,
        task_function: TaskFunction,
    ) -> Self {
        Self {
            sweep_dir,
            config_loader,
            task_function,
        }
    }
}

impl Launcher for BasicLauncher {
    fn launch(
        &mut self,
        batch: &[Point],
        initial_index: usize,
    ) -> Result<Vec<JobReturn>, SweepError> {
        info!(
            sweep_dir = %self.sweep_dir.display(),
            jobs = batch.len(),
            "launching jobs locally"
        );

        batch
            .iter()
            .enumerate()
            .map(|(offset, overrides)| {
                let job_index = initial_index + offset;
                info!(job_index, overrides = %overrides.join(" "), "starting job");
                run_job(
                    &self.task_function,
                    self.config_loader.as_ref(),
                    &self.sweep_dir,
                    job_index,
                    overrides,
                )
            })
            .collect()
    }
}
