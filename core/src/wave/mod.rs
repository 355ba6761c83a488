//! Wave-based planning and execution: strategies split a task list into
//! ordered waves, the orchestrator runs them while accumulating a context.

pub mod context;
pub mod orchestrator;
pub mod plan;
pub mod planner;

pub use context::{Decision, Issue, Severity, TestStatus, WaveContext};
pub use orchestrator::{WaveOrchestrationResult, WaveOrchestrator, WaveResult};
pub use plan::{PlannedWaves, Task, TaskDescription, TaskOutcome, Wave, WavePlan, WaveStatus};
pub use planner::{
    suggest_strategy, StrategyRegistry, WavePlanner, PROGRESSIVE_STRATEGY, SYSTEMATIC_STRATEGY,
};
