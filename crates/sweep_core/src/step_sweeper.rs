//! Generic batch-by-batch sweep loop.
//!
//! [`StepSweeper`] asks a [`SweepStrategy`] for the next batch, launches it,
//! and feeds the results back until the strategy reports it is done. The loop
//! never looks at how batches are produced, so adaptive strategies that pick
//! the next batch from earlier results plug in the same way as
//! [`crate::BasicSweeper`].

use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::config::{ConfigLoader, SweepConfig};
use crate::contract::{Batch, JobReturn};
use crate::error::SweepError;
use crate::launcher::{Launcher, TaskFunction};
use crate::plugins::Plugins;

/// Takes command line arguments, launches the jobs they describe and returns
/// what those jobs produced.
pub trait Sweeper {
    fn setup(
        &mut self,
        config: &SweepConfig,
        config_loader: Arc<dyn ConfigLoader>,
        task_function: TaskFunction,
    ) -> Result<(), SweepError>;

    /// Runs the sweep. The outer list is indexed by batch, the inner one by
    /// position within the batch.
    fn sweep(&mut self, arguments: &[String]) -> Result<Vec<Vec<JobReturn>>, SweepError>;
}

/// Decides which batch runs next and when the sweep is over.
pub trait SweepStrategy {
    fn initialize_arguments(&mut self, arguments: &[String]) -> Result<(), SweepError>;

    /// Returns the next batch of jobs, one override list per job.
    fn get_job_batch(&mut self) -> Result<Batch, SweepError>;

    /// True once no more batches should be launched.
    fn is_done(&self) -> Result<bool, SweepError>;

    /// Receives the results of the batch that was just launched.
    fn update_results(&mut self, job_results: &[JobReturn]);
}

/// Drives a [`SweepStrategy`] against a launcher resolved at setup time.
pub struct StepSweeper<S> {
    strategy: S,
    config: Option<SweepConfig>,
    launcher: Option<Box<dyn Launcher>>,
}

impl<S: SweepStrategy> StepSweeper<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            config: None,
            launcher: None,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn config(&self) -> Option<&SweepConfig> {
        self.config.as_ref()
    }

    /// Same as [`Sweeper::setup`], resolving the launcher from `plugins`
    /// instead of the installed registry.
    pub fn setup_with(
        &mut self,
        plugins: &Plugins,
        config: &SweepConfig,
        config_loader: Arc<dyn ConfigLoader>,
        task_function: TaskFunction,
    ) -> Result<(), SweepError> {
        let launcher = plugins.instantiate_launcher(config, config_loader, task_function)?;
        self.config = Some(config.clone());
        self.launcher = Some(launcher);
        Ok(())
    }
}

impl<S: SweepStrategy> Sweeper for StepSweeper<S> {
    fn setup(
        &mut self,
        config: &SweepConfig,
        config_loader: Arc<dyn ConfigLoader>,
        task_function: TaskFunction,
    ) -> Result<(), SweepError> {
        let plugins = Plugins::instance()?;
        self.setup_with(plugins, config, config_loader, task_function)
    }

    fn sweep(&mut self, arguments: &[String]) -> Result<Vec<Vec<JobReturn>>, SweepError> {
        let (Some(_), Some(launcher)) = (self.config.as_ref(), self.launcher.as_mut()) else {
            return Err(SweepError::NotSetUp);
        };

        let span = info_span!("sweep", arguments = ?arguments);
        let _entered = span.enter();

        self.strategy.initialize_arguments(arguments)?;

        let mut returns: Vec<Vec<JobReturn>> = Vec::new();
        let mut initial_index = 0usize;
        while !self.strategy.is_done()? {
            let batch = self.strategy.get_job_batch()?;
            debug!(
                batch_index = returns.len(),
                initial_index,
                jobs = batch.len(),
                "launching batch"
            );
            let results = launcher.launch(&batch, initial_index)?;
            initial_index += batch.len();
            self.strategy.update_results(&results);
            returns.push(results);
        }

        info!(
            batches = returns.len(),
            jobs = initial_index,
            "sweep completed"
        );
        Ok(returns)
    }
}
