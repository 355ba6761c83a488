use async_trait::async_trait;

use crate::runner::ExecutionContext;

/// What an injected executor reports back for one unit or task.
///
/// `verdict` is only meaningful for review-style units; task executors report
/// the files they touched so the wave context can accumulate them.
#[derive(Debug, Clone, Default)]
pub struct ExecutorOutcome {
    pub verdict: Option<String>,
    pub output: String,
    pub created_files: Vec<String>,
    pub modified_files: Vec<String>,
}

/// Opaque boundary to the actual agents/tasks being executed.
///
/// The orchestration core invokes this at most once per unit and treats any
/// `Err` as that unit's failure; it never inspects or retries.
#[async_trait]
pub trait ExecutorPlugin: Send + Sync {
    async fn execute(&self, name: &str, ctx: &ExecutionContext) -> anyhow::Result<ExecutorOutcome>;
}
