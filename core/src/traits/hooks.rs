use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::wave::{Wave, WaveContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    PreAgent,
    PostAgent,
    PreWave,
    PostWave,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreAgent => "pre-agent",
            Self::PostAgent => "post-agent",
            Self::PreWave => "pre-wave",
            Self::PostWave => "post-wave",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer callbacks around units and waves.
///
/// Hook failures never abort a run; the orchestrator bounds each call with
/// its own timeout and downgrades errors to warnings.
#[async_trait]
pub trait HookPlugin: Send + Sync {
    async fn run_hook(&self, kind: HookKind, payload: serde_json::Value) -> anyhow::Result<()>;
}

/// Continue/cancel decision point between waves, consulted only in safe mode.
#[async_trait]
pub trait BreakpointPlugin: Send + Sync {
    async fn confirm(&self, wave: &Wave, ctx: &WaveContext) -> anyhow::Result<bool>;
}

/// Invokes a hook under `bound`, logging failures and timeouts as warnings.
/// Returns the warning text, if any, for callers that aggregate warnings.
pub(crate) async fn run_hook_guarded(
    hooks: &Option<Arc<dyn HookPlugin>>,
    kind: HookKind,
    payload: serde_json::Value,
    bound: Duration,
) -> Option<String> {
    let hooks = hooks.as_ref()?;
    match tokio::time::timeout(bound, hooks.run_hook(kind, payload)).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            let message = format!("{kind} hook failed: {e:#}");
            warn!("{message}");
            Some(message)
        }
        Err(_) => {
            let message = format!("{kind} hook timed out after {}s", bound.as_secs());
            warn!("{message}");
            Some(message)
        }
    }
}
