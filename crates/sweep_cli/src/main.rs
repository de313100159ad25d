//! `sweep`: run a program over the cartesian product of override values.
//!
//! ```bash
//! sweep plan --max-batch-size 4 a=1,2,3 b=10,20
//! sweep run --launcher parallel --num-threads 4 --program ./train.sh lr=0.1,0.01 depth=2,4
//! ```

mod command_task;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use sweep_core::config::{PluginSelection, StaticConfigLoader, SweepConfig};
use sweep_core::plugins::{register_core_plugins, ConfigNode, Plugins, SWEEPER_GROUP};
use sweep_core::{BasicSweeper, BasicSweeperParams, Batch, JobReturn, SweepPlan, SweepStrategy};
use tracing::info;

use crate::command_task::command_task;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "sweep",
    version,
    about = "Sweep a program over the cartesian product of override values"
)]
struct Cli {
    /// Log progress at info level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the batches a sweep would launch without running anything
    Plan {
        #[command(flatten)]
        options: SweepOptions,
    },
    /// Run a program once per job, passing the job's overrides as arguments
    Run {
        #[command(flatten)]
        options: SweepOptions,
        /// Program to run for every job
        #[arg(long)]
        program: String,
        /// Argument placed before the overrides (repeatable)
        #[arg(long = "arg", allow_hyphen_values = true)]
        program_args: Vec<String>,
    },
    /// List registered sweepers, launchers and their default config
    Plugins,
}

#[derive(Args, Debug, Default)]
struct SweepOptions {
    /// JSON sweep config file
    #[arg(long, env = "SWEEP_CONFIG")]
    config: Option<PathBuf>,
    /// Maximum jobs per launch batch (omit for a single batch)
    #[arg(long, allow_negative_numbers = true)]
    max_batch_size: Option<i64>,
    /// Launcher plugin name, e.g. `basic` or `parallel`
    #[arg(long)]
    launcher: Option<String>,
    /// Worker threads for the parallel launcher
    #[arg(long)]
    num_threads: Option<usize>,
    /// Show a progress bar for each batch (parallel launcher)
    #[arg(long)]
    progress: bool,
    /// Directory receiving one working directory per job
    #[arg(long)]
    sweep_dir: Option<PathBuf>,
    /// Overrides such as `lr=0.1,0.01 depth=2,4`
    overrides: Vec<String>,
}

impl SweepOptions {
    /// Loads the config file (or defaults) and applies command line flags.
    fn sweep_config(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::from_json_file(path)
                .with_context(|| format!("failed to load sweep config {}", path.display()))?,
            None => SweepConfig::default(),
        };

        if let Some(size) = self.max_batch_size {
            config
                .sweeper
                .params
                .insert("max_batch_size".to_string(), json!(size));
        }
        if let Some(name) = &self.launcher {
            config.launcher = PluginSelection::new(name.clone());
        }
        if let Some(threads) = self.num_threads {
            config
                .launcher
                .params
                .insert("num_threads".to_string(), json!(threads));
        }
        if self.progress {
            config
                .launcher
                .params
                .insert("show_progress".to_string(), json!(true));
        }
        if let Some(dir) = &self.sweep_dir {
            config.sweep_dir = dir.clone();
        }
        Ok(config)
    }
}

#[derive(Serialize)]
struct PlanReport {
    plan: SweepPlan,
    batches: Vec<Batch>,
}

#[derive(Serialize)]
struct RunReport {
    sweep_dir: PathBuf,
    batches: Vec<Vec<JobReturn>>,
}

#[derive(Serialize)]
struct PluginsReport<'a> {
    sweepers: Vec<&'a str>,
    launchers: Vec<&'a str>,
    config_nodes: Vec<&'a ConfigNode>,
}

// ── commands ───────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let plugins = build_plugins().install();
    match cli.command {
        Commands::Plan { options } => {
            let report = plan(plugins, &options)?;
            print_json(&report)
        }
        Commands::Run {
            options,
            program,
            program_args,
        } => {
            let report = run_sweep(plugins, &options, program, program_args)?;
            print_json(&report)
        }
        Commands::Plugins => print_json(&PluginsReport {
            sweepers: plugins.sweeper_names().collect(),
            launchers: plugins.launcher_names().collect(),
            config_nodes: plugins.config_store().nodes().collect(),
        }),
    }
}

fn build_plugins() -> Plugins {
    let mut plugins = Plugins::new();
    register_core_plugins(&mut plugins);
    sweep_launchers::register(&mut plugins);
    plugins
}

fn plan(plugins: &Plugins, options: &SweepOptions) -> Result<PlanReport> {
    let config = options.sweep_config()?;
    if config.sweeper.name != "basic" {
        bail!(
            "plan only supports the basic sweeper, got '{}'",
            config.sweeper.name
        );
    }

    let params: BasicSweeperParams = plugins.plugin_params(SWEEPER_GROUP, &config.sweeper)?;
    let mut strategy = BasicSweeper::new(params.max_batch_size);
    strategy.initialize_arguments(&options.overrides)?;

    let mut batches = Vec::new();
    while !strategy.is_done()? {
        batches.push(strategy.get_job_batch()?);
    }
    let plan = strategy
        .plan()
        .context("basic sweeper did not produce a plan")?;
    Ok(PlanReport { plan, batches })
}

fn run_sweep(
    plugins: &Plugins,
    options: &SweepOptions,
    program: String,
    program_args: Vec<String>,
) -> Result<RunReport> {
    let config = options.sweep_config()?;
    let mut sweeper = plugins.instantiate_sweeper(&config)?;
    let job_config = json!({
        "program": program,
        "args": program_args,
    });

    sweeper.setup(
        &config,
        Arc::new(StaticConfigLoader::new(job_config)),
        command_task(program, program_args),
    )?;

    info!(sweep_dir = %config.sweep_dir.display(), "starting sweep");
    let batches = sweeper
        .sweep(&options.overrides)
        .context("sweep aborted")?;
    Ok(RunReport {
        sweep_dir: config.sweep_dir,
        batches,
    })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn options(args: &[&str]) -> SweepOptions {
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        match cli.command {
            Commands::Plan { options } | Commands::Run { options, .. } => options,
            Commands::Plugins => panic!("expected a sweep command"),
        }
    }

    #[test]
    fn parses_overrides_and_flags() {
        let options = options(&[
            "sweep",
            "plan",
            "--max-batch-size",
            "4",
            "a=1,2,3",
            "b=10,20",
        ]);

        assert_eq!(options.max_batch_size, Some(4));
        assert_eq!(options.overrides, vec!["a=1,2,3", "b=10,20"]);
    }

    #[test]
    fn accepts_negative_batch_size_for_validation_downstream() {
        let options = options(&["sweep", "plan", "--max-batch-size", "-1", "a=1"]);
        assert_eq!(options.max_batch_size, Some(-1));
    }

    #[test]
    fn flags_override_config_file() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let path = root.path().join("sweep.json");
        std::fs::write(
            &path,
            r#"{"sweep_dir": "from-file", "launcher": {"name": "parallel", "params": {"num_threads": 8}}}"#,
        )
        .expect("config should be written");

        let options = SweepOptions {
            config: Some(path),
            num_threads: Some(2),
            max_batch_size: Some(3),
            ..SweepOptions::default()
        };
        let config = options.sweep_config().expect("config should load");

        assert_eq!(config.sweep_dir, PathBuf::from("from-file"));
        assert_eq!(config.launcher.name, "parallel");
        assert_eq!(config.launcher.params["num_threads"], json!(2));
        assert_eq!(config.sweeper.params["max_batch_size"], json!(3));
    }

    #[test]
    fn plan_lists_batches_in_product_order() {
        let plugins = build_plugins();
        let options = SweepOptions {
            max_batch_size: Some(4),
            overrides: vec!["a=1,2,3".to_string(), "b=10,20".to_string()],
            ..SweepOptions::default()
        };

        let report = plan(&plugins, &options).expect("plan should pass");

        assert_eq!(report.plan.batch_sizes, vec![4, 2]);
        assert_eq!(report.batches[1][0], vec!["a=3", "b=10"]);
    }

    #[test]
    fn plan_rejects_invalid_batch_size() {
        let plugins = build_plugins();
        let options = SweepOptions {
            max_batch_size: Some(0),
            overrides: vec!["a=1".to_string()],
            ..SweepOptions::default()
        };

        let error = plan(&plugins, &options)
            .err()
            .expect("plan should fail");
        assert!(error.to_string().contains("max_batch_size"));
    }

    #[test]
    fn run_sweep_executes_program_per_job() {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let plugins = build_plugins().install();
        let options = SweepOptions {
            max_batch_size: Some(1),
            sweep_dir: Some(root.path().join("multirun")),
            overrides: vec!["a=1,2".to_string()],
            ..SweepOptions::default()
        };

        let report = run_sweep(plugins, &options, "echo".to_string(), Vec::new())
            .expect("sweep should pass");

        let stdout: Vec<&Value> = report
            .batches
            .iter()
            .flatten()
            .map(|job| &job.return_value["stdout"])
            .collect();
        assert_eq!(stdout, vec![&json!("a=1"), &json!("a=2")]);
        assert_eq!(report.batches.len(), 2);
        assert!(root.path().join("multirun").join("1").is_dir());
    }
}
