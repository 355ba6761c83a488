use thiserror::Error;

/// Errors raised while building a graph or wave plan.
///
/// Execution-time failures (a unit failing, timing out, being skipped) are not
/// errors: they are folded into the structured run results. Only construction
/// and validation fail fast.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Duplicate unit name: {0}")]
    DuplicateUnit(String),

    #[error("Circular dependency detected among: {}", members.join(", "))]
    CycleDetected { members: Vec<String> },

    #[error("Duplicate task name in plan input: {0}")]
    DuplicateTask(String),

    #[error("Unknown wave strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid wave plan: {0}")]
    InvalidPlan(String),
}
