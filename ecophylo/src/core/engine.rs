//! Tree-inference engine selection.

use serde::Serialize;

use crate::core::error::ConfigError;
use crate::core::key_path::KeyPath;
use crate::core::params::ParameterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEngine {
    IqTree,
    FastTree,
}

impl TreeEngine {
    /// Engines in the order their tree targets are emitted.
    pub const ALL: [TreeEngine; 2] = [TreeEngine::IqTree, TreeEngine::FastTree];

    /// Rule that runs this engine; its `run` parameter enables it.
    pub fn rule(self) -> &'static str {
        match self {
            TreeEngine::IqTree => "iqtree",
            TreeEngine::FastTree => "fasttree",
        }
    }

    /// File extension of the final tree artifact.
    pub fn extension(self) -> &'static str {
        match self {
            TreeEngine::IqTree => "iqtree",
            TreeEngine::FastTree => "nwk",
        }
    }

    pub fn run_path(self) -> KeyPath {
        KeyPath::from([self.rule(), "run"])
    }
}

/// Enabled flag per engine, in [`TreeEngine::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSelection {
    engines: Vec<(TreeEngine, bool)>,
}

impl EngineSelection {
    pub fn new(engines: impl IntoIterator<Item = (TreeEngine, bool)>) -> Self {
        let requested: Vec<(TreeEngine, bool)> = engines.into_iter().collect();
        let engines = TreeEngine::ALL
            .iter()
            .map(|engine| {
                let enabled = requested
                    .iter()
                    .any(|(candidate, on)| candidate == engine && *on);
                (*engine, enabled)
            })
            .collect();
        Self { engines }
    }

    /// Read each engine's `<rule>.run` flag from the merged configuration.
    pub fn from_params(store: &ParameterStore) -> Result<Self, ConfigError> {
        let mut engines = Vec::with_capacity(TreeEngine::ALL.len());
        for engine in TreeEngine::ALL {
            engines.push((engine, store.get_bool(&engine.run_path())?));
        }
        Ok(Self::new(engines))
    }

    pub fn enabled(&self) -> impl Iterator<Item = TreeEngine> + '_ {
        self.engines
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(engine, _)| *engine)
    }

    pub fn is_enabled(&self, engine: TreeEngine) -> bool {
        self.enabled().any(|candidate| candidate == engine)
    }

    /// Fail unless at least one engine is enabled.
    pub fn require_any(&self) -> Result<(), ConfigError> {
        if self.enabled().next().is_none() {
            return Err(ConfigError::NoEngineSelected);
        }
        Ok(())
    }
}
