use async_trait::async_trait;
use cadence_core::api::{HookKind, HookPlugin};
use tracing::info;

/// Hook that mirrors lifecycle events into the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHookPlugin;

#[async_trait]
impl HookPlugin for TracingHookPlugin {
    async fn run_hook(&self, kind: HookKind, payload: serde_json::Value) -> anyhow::Result<()> {
        info!(hook = %kind, payload = %payload, "lifecycle hook");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn never_fails() {
        let hook = TracingHookPlugin;
        for kind in [
            HookKind::PreAgent,
            HookKind::PostAgent,
            HookKind::PreWave,
            HookKind::PostWave,
        ] {
            hook.run_hook(kind, json!({"agent": "style-review"}))
                .await
                .unwrap();
        }
    }
}
