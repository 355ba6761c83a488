//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `cadence_core::api` instead of reaching into internal modules.

pub use crate::config::{
    default_config, load_from_path, load_with_defaults, ConfigOverlay, ExecutionMode,
    LoggingConfig, OrchestrationConfig, UnitConfig, MAX_GLOBAL_TIMEOUT_SECS,
    MAX_UNIT_TIMEOUT_SECS,
};
pub use crate::error::{ConfigError, OrchestratorError};
pub use crate::graph::{NodeLike, UnitGraph};
pub use crate::orchestrator::{DagOrchestrator, RunSummary, StopReason, StopToken};
pub use crate::runner::{
    Complexity, Condition, ExecutionContext, UnitResult, UnitRunner, UnitStatus, DEFAULT_VERDICT,
    SKIPPED_VERDICT, TIMEOUT_VERDICT,
};
pub use crate::traits::{
    BreakpointPlugin, ExecutorOutcome, ExecutorPlugin, HookKind, HookPlugin, WaveStrategyPlugin,
};
pub use crate::wave::{
    suggest_strategy, Decision, Issue, PlannedWaves, Severity, StrategyRegistry, Task,
    TaskDescription, TaskOutcome, TestStatus, Wave, WaveContext, WaveOrchestrationResult,
    WaveOrchestrator, WavePlan, WavePlanner, WaveResult, WaveStatus, PROGRESSIVE_STRATEGY,
    SYSTEMATIC_STRATEGY,
};
