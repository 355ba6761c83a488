pub mod config;
pub mod orchestrator;

pub use config::ConfigError;
pub use orchestrator::OrchestratorError;
