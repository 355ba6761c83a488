use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::{NodeLike, UnitGraph};
use crate::runner::Condition;

/// Per-unit timeouts may not exceed this.
pub const MAX_UNIT_TIMEOUT_SECS: u64 = 300;

/// The whole-run timeout may not exceed this.
pub const MAX_GLOBAL_TIMEOUT_SECS: u64 = 600;

/// How unit dispatch obeys (or ignores) the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One unit at a time, in topological order.
    Sequential,
    /// Every unit in a single wave, dependencies ignored.
    Parallel,
    /// Repeated runnable-set waves respecting dependencies.
    #[default]
    Dag,
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            "dag" => Ok(Self::Dag),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Dag => "dag",
        };
        f.write_str(s)
    }
}

/// One schedulable agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub name: String,

    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default = "default_unit_timeout_secs")]
    pub timeout_secs: u64,

    /// A required unit's failure halts the run; an optional one degrades to
    /// a warning.
    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default)]
    pub condition: Condition,
}

fn default_unit_timeout_secs() -> u64 {
    120
}

fn default_required() -> bool {
    true
}

impl NodeLike for UnitConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "cadence_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// The declarative orchestration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    #[serde(default)]
    pub mode: ExecutionMode,

    #[serde(default = "default_global_timeout_secs")]
    pub global_timeout_secs: u64,

    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Upper bound for a single hook invocation.
    #[serde(default = "default_hook_timeout_secs")]
    pub hook_timeout_secs: u64,

    /// Upper bound for one wave of a wave plan.
    #[serde(default = "default_wave_timeout_secs")]
    pub wave_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub agents: Vec<UnitConfig>,
}

fn default_global_timeout_secs() -> u64 {
    MAX_GLOBAL_TIMEOUT_SECS
}

fn default_max_parallel() -> usize {
    4
}

fn default_hook_timeout_secs() -> u64 {
    10
}

fn default_wave_timeout_secs() -> u64 {
    MAX_GLOBAL_TIMEOUT_SECS / 2
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            global_timeout_secs: default_global_timeout_secs(),
            max_parallel: default_max_parallel(),
            hook_timeout_secs: default_hook_timeout_secs(),
            wave_timeout_secs: default_wave_timeout_secs(),
            logging: LoggingConfig::default(),
            agents: Vec::new(),
        }
    }
}

/// A partial project document layered over a larger base config.
///
/// Scalar fields override only when present; agents merge keyed by name
/// (same name replaces the base entry in place, new names append).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverlay {
    pub mode: Option<ExecutionMode>,
    pub global_timeout_secs: Option<u64>,
    pub max_parallel: Option<usize>,
    pub hook_timeout_secs: Option<u64>,
    pub wave_timeout_secs: Option<u64>,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub agents: Vec<UnitConfig>,
}

impl OrchestrationConfig {
    pub fn merged_with(mut self, overlay: ConfigOverlay) -> Self {
        if let Some(mode) = overlay.mode {
            self.mode = mode;
        }
        if let Some(secs) = overlay.global_timeout_secs {
            self.global_timeout_secs = secs;
        }
        if let Some(n) = overlay.max_parallel {
            self.max_parallel = n;
        }
        if let Some(secs) = overlay.hook_timeout_secs {
            self.hook_timeout_secs = secs;
        }
        if let Some(secs) = overlay.wave_timeout_secs {
            self.wave_timeout_secs = secs;
        }
        if let Some(logging) = overlay.logging {
            self.logging = logging;
        }

        for agent in overlay.agents {
            match self.agents.iter_mut().find(|a| a.name == agent.name) {
                Some(existing) => *existing = agent,
                None => self.agents.push(agent),
            }
        }
        self
    }

    pub fn agent(&self, name: &str) -> Option<&UnitConfig> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Full fail-fast validation: timeout ranges, duplicate names, and strict
    /// dependency existence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.global_timeout_secs == 0 || self.global_timeout_secs > MAX_GLOBAL_TIMEOUT_SECS {
            return Err(ConfigError::InvalidGlobalTimeout {
                secs: self.global_timeout_secs,
                max: MAX_GLOBAL_TIMEOUT_SECS,
            });
        }

        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            if agent.timeout_secs == 0 || agent.timeout_secs > MAX_UNIT_TIMEOUT_SECS {
                return Err(ConfigError::InvalidUnitTimeout {
                    unit: agent.name.clone(),
                    secs: agent.timeout_secs,
                    max: MAX_UNIT_TIMEOUT_SECS,
                });
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::DuplicateAgent(agent.name.clone()));
            }
        }

        // Duplicates were rejected above, so the graph always builds; its
        // missing-dependency scan is the strict counterpart of the runtime's
        // lenient treatment of absent dependencies.
        if let Ok(graph) = UnitGraph::from_nodes(&self.agents) {
            if let Some((unit, missing)) = graph.missing_dependencies().into_iter().next() {
                return Err(ConfigError::UndeclaredDependency { unit, missing });
            }
        }

        Ok(())
    }
}
