//! Configuration system for simulation runs.
//!
//! A run configuration bundles the simulation parameters, the page to
//! simulate and an optional stimulus. It can be written by hand in YAML or
//! JSON, or exported by the editor.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   resolution_ms: 100
//!   max_cycles: 50
//!   record_trace: true
//!   probes: [0, 1]
//!
//! page:
//!   blocks:
//!     - id: 0
//!       name: Signal
//!       pins: [0]
//!     - id: 1
//!       name: TOF
//!       pins: [1, 2]
//!       properties:
//!         Delay: "1"
//!         Unit: s
//!   pins:
//!     - { id: 0, kind: output, owner: 0 }
//!     - { id: 1, kind: input, owner: 1 }
//!     - { id: 2, kind: output, owner: 1 }
//!   wires:
//!     - { id: 0, start: 0, end: 1 }
//!
//! stimulus:
//!   - { cycle: 0, block: 0, value: "true" }
//!   - { cycle: 5, block: 0, value: "false" }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::clock::DEFAULT_RESOLUTION_MS;
use crate::error::CircuitError;
use crate::executor::TickExecutor;
use crate::graph::{build_graph_with, GraphContext};
use crate::logic::Logic;
use crate::page::Page;
use crate::registry::{create_default_registry, ComponentRegistry};
use crate::stimulus::Stimulus;
use crate::types::{BlockId, Cycle};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Simulated milliseconds per tick
    #[serde(default = "default_resolution_ms")]
    pub resolution_ms: u64,

    /// Number of ticks a configured run executes
    #[serde(default = "default_max_cycles")]
    pub max_cycles: Cycle,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to record a state trace
    #[serde(default)]
    pub record_trace: bool,

    /// Blocks to trace; empty traces every block
    #[serde(default)]
    pub probes: Vec<BlockId>,
}

fn default_resolution_ms() -> u64 {
    DEFAULT_RESOLUTION_MS
}

fn default_max_cycles() -> Cycle {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            resolution_ms: default_resolution_ms(),
            max_cycles: default_max_cycles(),
            log_level: default_log_level(),
            record_trace: false,
            probes: Vec::new(),
        }
    }
}

impl SimulationParams {
    /// Validates the parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resolution_ms == 0 {
            return Err(ConfigError::Validation(
                "resolution_ms must be at least 1".to_string(),
            ));
        }
        if !self.record_trace && !self.probes.is_empty() {
            tracing::warn!(
                probes = self.probes.len(),
                "Probes are set but record_trace is off (ignored)"
            );
        }
        Ok(())
    }
}

/// Complete run configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Global simulation parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// The page to simulate
    #[serde(default)]
    pub page: Page,

    /// Scheduled writes to source blocks
    #[serde(default)]
    pub stimulus: Stimulus,
}

impl SimConfig {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;
        self.page.validate().map_err(ConfigError::Validation)?;

        for event in self.stimulus.events() {
            if event.block.index() >= self.page.blocks.len() {
                return Err(ConfigError::Validation(format!(
                    "Stimulus at cycle {} references non-existent block: {}",
                    event.cycle, event.block
                )));
            }
        }
        for &probe in &self.simulation.probes {
            if probe.index() >= self.page.blocks.len() {
                return Err(ConfigError::Validation(format!(
                    "Probe references non-existent block: {}",
                    probe
                )));
            }
        }

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the number of blocks.
    pub fn block_count(&self) -> usize {
        self.page.blocks.len()
    }

    /// Returns the number of wires.
    pub fn wire_count(&self) -> usize {
        self.page.wires.len()
    }

    /// Resolves the page with the built-in block kinds.
    pub fn build_graph(&self) -> ConfigResult<GraphContext> {
        Ok(build_graph_with(&self.page, &create_default_registry())?)
    }

    /// Builds a ready-to-run session: graph, components, stimulus and,
    /// when enabled, a labelled trace.
    pub fn executor(&self) -> ConfigResult<TickExecutor> {
        self.executor_with(&create_default_registry())
    }

    /// Like [`executor`](Self::executor) with a custom registry.
    pub fn executor_with(&self, registry: &ComponentRegistry) -> ConfigResult<TickExecutor> {
        let graph = build_graph_with(&self.page, registry)?;
        let mut executor = TickExecutor::from_graph(&graph, registry, self.simulation.resolution_ms)?
            .with_stimulus(self.stimulus.clone());
        if self.simulation.record_trace {
            executor = executor.with_labelled_trace(&graph, self.simulation.probes.clone());
        }
        Ok(executor)
    }

    /// Builds a session and runs it for `max_cycles` ticks.
    pub fn run(&self) -> ConfigResult<TickExecutor> {
        let mut executor = self.executor()?;
        tracing::info!(cycles = self.simulation.max_cycles, "Running configured simulation");
        executor.run_for(self.simulation.max_cycles);
        Ok(executor)
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clock resolution.
    pub fn resolution_ms(mut self, ms: u64) -> Self {
        self.config.simulation.resolution_ms = ms;
        self
    }

    /// Sets the number of ticks to run.
    pub fn max_cycles(mut self, cycles: Cycle) -> Self {
        self.config.simulation.max_cycles = cycles;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Enables state tracing of `probes` (empty for every block).
    pub fn record_trace(mut self, probes: Vec<BlockId>) -> Self {
        self.config.simulation.record_trace = true;
        self.config.simulation.probes = probes;
        self
    }

    /// Sets the page.
    pub fn page(mut self, page: Page) -> Self {
        self.config.page = page;
        self
    }

    /// Schedules a write to a block.
    pub fn force_at(mut self, cycle: Cycle, block: BlockId, value: impl Into<Logic>) -> Self {
        self.config.stimulus.push(cycle, block, value);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
