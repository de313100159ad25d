//! Launchers that execute sweep batches on the local machine.
//!
//! - [`basic`]: runs the jobs of a batch one after another
//! - [`parallel`]: runs the jobs of a batch on a rayon thread pool
//!
//! Both create a working directory per job under the sweep directory, named
//! by the job's global index. Call [`register`] to make them available to a
//! [`sweep_core::plugins::Plugins`] registry.

pub mod basic;
pub mod parallel;

use serde_json::json;
use sweep_core::plugins::{Plugins, LAUNCHER_GROUP};
use sweep_core::Launcher;

pub use basic::BasicLauncher;
pub use parallel::{ParallelLauncher, ParallelLauncherParams};

/// Registers the `basic` and `parallel` launchers and their default config.
pub fn register(plugins: &mut Plugins) {
    plugins.config_store_mut().store(
        LAUNCHER_GROUP,
        "basic",
        json!({"name": "basic", "params": {}}),
        "launcher",
        module_path!(),
    );
    plugins.config_store_mut().store(
        LAUNCHER_GROUP,
        "parallel",
        json!({"name": "parallel", "params": ParallelLauncherParams::default()}),
        "launcher",
        module_path!(),
    );

    plugins.register_launcher("basic", |_plugins, config, config_loader, task_function| {
        Ok(Box::new(BasicLauncher::new(
            config.sweep_dir.clone(),
            config_loader,
            task_function,
        )) as Box<dyn Launcher>)
    });

    plugins.register_launcher("parallel", |plugins, config, config_loader, task_function| {
        let params: ParallelLauncherParams =
            plugins.plugin_params(LAUNCHER_GROUP, &config.launcher)?;
        Ok(Box::new(ParallelLauncher::new(
            params,
            config.sweep_dir.clone(),
            config_loader,
            task_function,
        )?) as Box<dyn Launcher>)
    });
}
