//! Explicit registry of sweeper and launcher plugins.
//!
//! Nothing registers itself. Callers build a [`Plugins`] value, register what
//! they need (see [`register_core_plugins`]) and either pass it around or
//! [`Plugins::install`] it once for the whole process.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::basic_sweeper::{BasicSweeper, BasicSweeperParams};
use crate::config::{ConfigLoader, PluginSelection, SweepConfig};
use crate::error::SweepError;
use crate::launcher::{Launcher, TaskFunction};
use crate::step_sweeper::{StepSweeper, Sweeper};

pub const SWEEPER_GROUP: &str = "sweeper";
pub const LAUNCHER_GROUP: &str = "launcher";

static PLUGINS: OnceLock<Plugins> = OnceLock::new();

pub type LauncherFactory = Box<
    dyn Fn(
            &Plugins,
            &SweepConfig,
            Arc<dyn ConfigLoader>,
            TaskFunction,
        ) -> Result<Box<dyn Launcher>, SweepError>
        + Send
        + Sync,
>;

pub type SweeperFactory =
    Box<dyn Fn(&Plugins, &SweepConfig) -> Result<Box<dyn Sweeper>, SweepError> + Send + Sync>;

/// A named config node, e.g. the default params of the `basic` sweeper.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigNode {
    pub group: String,
    pub name: String,
    pub path: String,
    pub node: Value,
    pub provider: String,
}

#[derive(Debug, Default)]
pub struct ConfigStore {
    nodes: BTreeMap<(String, String), ConfigNode>,
}

impl ConfigStore {
    pub fn store(&mut self, group: &str, name: &str, node: Value, path: &str, provider: &str) {
        let previous = self.nodes.insert(
            (group.to_string(), name.to_string()),
            ConfigNode {
                group: group.to_string(),
                name: name.to_string(),
                path: path.to_string(),
                node,
                provider: provider.to_string(),
            },
        );
        if previous.is_some() {
            warn!(group, name, "replacing existing config node");
        }
    }

    pub fn load(&self, group: &str, name: &str) -> Option<&ConfigNode> {
        self.nodes.get(&(group.to_string(), name.to_string()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ConfigNode> {
        self.nodes.values()
    }
}

#[derive(Default)]
pub struct Plugins {
    config_store: ConfigStore,
    sweepers: BTreeMap<String, SweeperFactory>,
    launchers: BTreeMap<String, LauncherFactory>,
}

impl std::fmt::Debug for Plugins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugins")
            .field("config_store", &self.config_store)
            .field("sweepers", &self.sweepers.keys().collect::<Vec<_>>())
            .field("launchers", &self.launchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes this registry for the rest of the process. The first call
    /// wins; later registries are dropped.
    pub fn install(self) -> &'static Plugins {
        let mut installed_now = false;
        let plugins = PLUGINS.get_or_init(|| {
            installed_now = true;
            self
        });
        if installed_now {
            debug!(registry = ?plugins, "installed plugin registry");
        } else {
            warn!("plugin registry already installed; ignoring the new one");
        }
        plugins
    }

    /// The registry published by [`Plugins::install`].
    pub fn instance() -> Result<&'static Plugins, SweepError> {
        PLUGINS.get().ok_or(SweepError::PluginsNotInitialized)
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn config_store_mut(&mut self) -> &mut ConfigStore {
        &mut self.config_store
    }

    pub fn register_sweeper<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Plugins, &SweepConfig) -> Result<Box<dyn Sweeper>, SweepError>
            + Send
            + Sync
            + 'static,
    {
        self.sweepers.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_launcher<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(
                &Plugins,
                &SweepConfig,
                Arc<dyn ConfigLoader>,
                TaskFunction,
            ) -> Result<Box<dyn Launcher>, SweepError>
            + Send
            + Sync
            + 'static,
    {
        self.launchers.insert(name.to_string(), Box::new(factory));
    }

    pub fn sweeper_names(&self) -> impl Iterator<Item = &str> {
        self.sweepers.keys().map(String::as_str)
    }

    pub fn launcher_names(&self) -> impl Iterator<Item = &str> {
        self.launchers.keys().map(String::as_str)
    }

    /// Builds the sweeper named by `config.sweeper`.
    pub fn instantiate_sweeper(&self, config: &SweepConfig) -> Result<Box<dyn Sweeper>, SweepError> {
        let factory = self.sweepers.get(&config.sweeper.name).ok_or_else(|| {
            SweepError::UnknownPlugin {
                kind: SWEEPER_GROUP,
                name: config.sweeper.name.clone(),
            }
        })?;
        factory(self, config)
    }

    /// Builds the launcher named by `config.launcher`.
    pub fn instantiate_launcher(
        &self,
        config: &SweepConfig,
        config_loader: Arc<dyn ConfigLoader>,
        task_function: TaskFunction,
    ) -> Result<Box<dyn Launcher>, SweepError> {
        let factory = self.launchers.get(&config.launcher.name).ok_or_else(|| {
            SweepError::UnknownPlugin {
                kind: LAUNCHER_GROUP,
                name: config.launcher.name.clone(),
            }
        })?;
        debug!(launcher = %config.launcher.name, "instantiating launcher");
        factory(self, config, config_loader, task_function)
    }

    /// `selection.params` laid over the defaults stored for that plugin.
    pub fn resolved_params(&self, group: &str, selection: &PluginSelection) -> Map<String, Value> {
        let mut params = self
            .config_store
            .load(group, &selection.name)
            .and_then(|node| node.node.get("params"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        params.extend(selection.params.clone());
        params
    }

    /// Resolves and deserializes the params of the plugin `selection` names.
    pub fn plugin_params<T: DeserializeOwned>(
        &self,
        group: &'static str,
        selection: &PluginSelection,
    ) -> Result<T, SweepError> {
        PluginSelection {
            name: selection.name.clone(),
            params: self.resolved_params(group, selection),
        }
        .parse_params(group)
    }
}

/// Registers the `basic` sweeper and its default config node.
pub fn register_core_plugins(plugins: &mut Plugins) {
    plugins.config_store_mut().store(
        SWEEPER_GROUP,
        "basic",
        json!({"name": "basic", "params": BasicSweeperParams::default()}),
        "sweeper",
        module_path!(),
    );

    plugins.register_sweeper("basic", |plugins, config| {
        let params: BasicSweeperParams =
            plugins.plugin_params(SWEEPER_GROUP, &config.sweeper)?;
        Ok(Box::new(StepSweeper::new(BasicSweeper::new(params.max_batch_size))) as Box<dyn Sweeper>)
    });
}
