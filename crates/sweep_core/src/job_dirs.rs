use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SweepError;

/// Working directory for the job with global index `job_index`.
///
/// Indices are unique across the whole sweep, so directories from different
/// batches never collide.
pub fn job_working_dir(sweep_dir: &Path, job_index: usize) -> PathBuf {
    sweep_dir.join(job_index.to_string())
}

/// Creates (if needed) and returns the working directory for `job_index`.
pub fn prepare_job_working_dir(sweep_dir: &Path, job_index: usize) -> Result<PathBuf, SweepError> {
    let dir = job_working_dir(sweep_dir, job_index);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Joins a point's overrides into a single directory-safe name, e.g.
/// `a=1,b=10`. Path separators inside values are replaced with `_`.
pub fn override_dirname(overrides: &[String]) -> String {
    overrides
        .iter()
        .map(|item| item.replace(['/', '\\'], "_"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_working_dir_from_global_index() {
        let dir = job_working_dir(Path::new("multirun/2026-10-19"), 7);
        assert_eq!(dir, PathBuf::from("multirun/2026-10-19/7"));
    }

    #[test]
    fn prepares_missing_directories() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let dir = prepare_job_working_dir(&root.path().join("sweep"), 3)
            .expect("directory should be created");
        assert!(dir.is_dir());
        assert_eq!(dir, root.path().join("sweep").join("3"));
    }

    #[test]
    fn joins_overrides_into_dirname() {
        let name = override_dirname(&["a=1".to_string(), "path=x/y".to_string()]);
        assert_eq!(name, "a=1,path=x_y");
    }
}
