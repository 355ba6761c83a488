use async_trait::async_trait;
use cadence_core::api::{ExecutionContext, ExecutorOutcome, ExecutorPlugin, DEFAULT_VERDICT};
use tracing::info;

/// Executor that succeeds immediately without doing anything. Useful for
/// dry-running a configuration or a wave plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExecutorPlugin;

#[async_trait]
impl ExecutorPlugin for NullExecutorPlugin {
    async fn execute(&self, name: &str, ctx: &ExecutionContext) -> anyhow::Result<ExecutorOutcome> {
        info!(unit = name, feature = %ctx.feature_id, "null executor, nothing to do");
        Ok(ExecutorOutcome {
            verdict: Some(DEFAULT_VERDICT.to_string()),
            ..ExecutorOutcome::default()
        })
    }
}
