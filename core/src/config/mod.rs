pub mod load;
pub mod types;

pub use load::{default_agents, default_config, load_from_path, load_with_defaults};
pub use types::{
    ConfigOverlay, ExecutionMode, LoggingConfig, OrchestrationConfig, UnitConfig,
    MAX_GLOBAL_TIMEOUT_SECS, MAX_UNIT_TIMEOUT_SECS,
};
