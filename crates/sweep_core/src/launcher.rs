use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::ConfigLoader;
use crate::contract::{JobReturn, Point};
use crate::error::SweepError;
use crate::job_dirs::{override_dirname, prepare_job_working_dir};

/// Everything a task sees about the job it is running.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_index: usize,
    pub overrides: Vec<String>,
    pub working_dir: PathBuf,
    pub config: Value,
}

/// The user task run once per job. An `Err` fails the job.
pub type TaskFunction = Arc<dyn Fn(&JobContext) -> Result<Value, String> + Send + Sync>;

/// Wraps a closure as a [`TaskFunction`].
pub fn task<F>(f: F) -> TaskFunction
where
    F: Fn(&JobContext) -> Result<Value, String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Executes batches of jobs.
///
/// `initial_index` is the global index of the first job in `batch`; job `i`
/// of the batch gets index `initial_index + i`. Implementations return one
/// result per point, in batch order.
pub trait Launcher {
    fn launch(&mut self, batch: &[Point], initial_index: usize)
        -> Result<Vec<JobReturn>, SweepError>;
}

/// Runs one job to completion: prepares its working directory, loads its
/// config and invokes the task.
pub fn run_job(
    task_function: &TaskFunction,
    config_loader: &dyn ConfigLoader,
    sweep_dir: &Path,
    job_index: usize,
    overrides: &[String],
) -> Result<JobReturn, SweepError> {
    let working_dir = prepare_job_working_dir(sweep_dir, job_index)?;
    let config = config_loader.load_job_config(overrides)?;
    debug!(
        job_index,
        job = %override_dirname(overrides),
        working_dir = %working_dir.display(),
        "running job"
    );

    let context = JobContext {
        job_index,
        overrides: overrides.to_vec(),
        working_dir,
        config,
    };
    let return_value = (**task_function)(&context)
        .map_err(|message| SweepError::JobFailed { job_index, message })?;

    Ok(JobReturn {
        job_index,
        overrides: context.overrides,
        working_dir: context.working_dir,
        return_value,
    })
}
