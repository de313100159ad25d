use std::process::Command;

use serde_json::json;
use sweep_core::{task, TaskFunction};
use tracing::debug;

/// Environment variable carrying the job's global index.
pub const JOB_INDEX_ENV: &str = "SWEEP_JOB_INDEX";

/// A task that runs `program` once per job, inside the job's working
/// directory, as `program <args...> <overrides...>`.
///
/// A job fails when the program cannot be started or exits non-zero. On
/// success the job returns its exit code and trimmed stdout.
pub fn command_task(program: String, args: Vec<String>) -> TaskFunction {
    task(move |job| {
        debug!(job_index = job.job_index, program = %program, "spawning job process");
        let output = Command::new(&program)
            .args(&args)
            .args(&job.overrides)
            .current_dir(&job.working_dir)
            .env(JOB_INDEX_ENV, job.job_index.to_string())
            .output()
            .map_err(|error| format!("failed to execute {program}: {error}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim_end()
            ));
        }

        Ok(json!({
            "exit_code": output.status.code(),
            "stdout": stdout,
        }))
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::Value;
    use sweep_core::JobContext;

    use super::*;

    fn job(working_dir: &Path, overrides: &[&str]) -> JobContext {
        JobContext {
            job_index: 3,
            overrides: overrides.iter().map(|item| item.to_string()).collect(),
            working_dir: working_dir.to_path_buf(),
            config: Value::Null,
        }
    }

    #[test]
    fn passes_args_then_overrides() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let task_function = command_task("echo".to_string(), vec!["train".to_string()]);

        let result = task_function(&job(root.path(), &["a=1", "b=10"])).expect("job should pass");

        assert_eq!(result, json!({"exit_code": 0, "stdout": "train a=1 b=10"}));
    }

    #[test]
    fn exposes_job_index_to_the_process() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let task_function = command_task(
            "sh".to_string(),
            vec!["-c".to_string(), format!("echo ${JOB_INDEX_ENV}")],
        );

        let result = task_function(&job(root.path(), &[])).expect("job should pass");

        assert_eq!(result["stdout"], json!("3"));
    }

    #[test]
    fn non_zero_exit_fails_the_job() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let task_function = command_task("false".to_string(), Vec::new());

        let error = task_function(&job(root.path(), &[])).expect_err("job should fail");

        assert!(error.starts_with("false exited with"));
    }

    #[test]
    fn missing_program_fails_the_job() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let task_function = command_task("definitely-not-a-program".to_string(), Vec::new());

        let error = task_function(&job(root.path(), &[])).expect_err("job should fail");

        assert!(error.starts_with("failed to execute definitely-not-a-program"));
    }
}
