//! Batch-oriented job sweeping primitives.
//!
//! This crate owns the deterministic part of a sweep: expanding
//! `key=v1,v2,...` overrides into a cartesian product of jobs, chunking that
//! product into launch batches, and driving a pluggable strategy against a
//! [`launcher::Launcher`]. Concrete launchers live in `sweep_launchers`.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sweep_core::launcher::task;
//! use sweep_core::config::{StaticConfigLoader, SweepConfig};
//! use sweep_core::plugins::{register_core_plugins, Plugins};
//!
//! let mut plugins = Plugins::new();
//! register_core_plugins(&mut plugins);
//! // Launchers are registered by `sweep_launchers::register(&mut plugins)`.
//! let plugins = plugins.install();
//!
//! let config = SweepConfig::default();
//! let mut sweeper = plugins.instantiate_sweeper(&config).unwrap();
//! sweeper
//!     .setup(
//!         &config,
//!         Arc::new(StaticConfigLoader::default()),
//!         task(|_job| Ok(serde_json::Value::Null)),
//!     )
//!     .unwrap();
//! let results = sweeper
//!     .sweep(&["a=1,2".to_string(), "b=10,20".to_string()])
//!     .unwrap();
//! assert_eq!(results[0].len(), 4);
//! ```

pub mod basic_sweeper;
pub mod chunking;
pub mod config;
pub mod contract;
pub mod error;
pub mod job_dirs;
pub mod launcher;
pub mod overrides;
pub mod plugins;
pub mod step_sweeper;

pub use basic_sweeper::{BasicSweeper, BasicSweeperParams};
pub use contract::{Batch, JobReturn, Override, OverrideAxis, Point, SweepPlan};
pub use error::SweepError;
pub use launcher::{task, JobContext, Launcher, TaskFunction};
pub use step_sweeper::{StepSweeper, SweepStrategy, Sweeper};
