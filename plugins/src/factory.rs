//! Assembly helpers wiring concrete plugins into the core seams.

use std::sync::Arc;

use cadence_core::api::{ExecutorPlugin, StrategyRegistry};

use crate::executor::{NullExecutorPlugin, ProcessExecutorPlugin};
use crate::strategies::{ProgressiveStrategy, SystematicStrategy};

/// Registry with every built-in strategy registered.
pub fn build_strategy_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register(Arc::new(ProgressiveStrategy::default()));
    registry.register(Arc::new(SystematicStrategy::default()));
    registry
}

/// Builds an executor from an optional command line such as
/// `"./review.sh --agent {name}"`. No command means the no-op executor.
pub fn build_executor(command: Option<&str>) -> Arc<dyn ExecutorPlugin> {
    match command {
        Some(command) => {
            let mut parts = command.split_whitespace().map(str::to_string);
            match parts.next() {
                Some(program) => Arc::new(ProcessExecutorPlugin::new(program, parts.collect())),
                None => Arc::new(NullExecutorPlugin),
            }
        }
        None => Arc::new(NullExecutorPlugin),
    }
}
