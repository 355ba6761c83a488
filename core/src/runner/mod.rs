//! Single-unit execution: condition gate, hard timeout, uniform reporting.
//!
//! The runner never propagates executor errors. Whatever the injected
//! executor does — fail, hang, panic-free error — the caller always gets a
//! terminal [`UnitResult`].

pub mod condition;
pub mod result;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::UnitConfig;
use crate::traits::ExecutorPlugin;

pub use condition::{Complexity, Condition, ExecutionContext};
pub use result::{UnitResult, UnitStatus, DEFAULT_VERDICT, SKIPPED_VERDICT, TIMEOUT_VERDICT};

/// Executes one unit against an injected executor.
pub struct UnitRunner {
    unit: UnitConfig,
    executor: Arc<dyn ExecutorPlugin>,
}

impl UnitRunner {
    pub fn new(unit: UnitConfig, executor: Arc<dyn ExecutorPlugin>) -> Self {
        Self { unit, executor }
    }

    /// Runs the unit, invoking the executor exactly once — or zero times if
    /// the condition gate evaluates false.
    pub async fn run(&self, ctx: &ExecutionContext) -> UnitResult {
        if !self.unit.condition.evaluate(ctx) {
            debug!(unit = %self.unit.name, condition = %self.unit.condition, "condition not met, skipping");
            return UnitResult::skipped(&self.unit.name);
        }

        let bound = Duration::from_secs(self.unit.timeout_secs);
        let started = Instant::now();
        let outcome = tokio::time::timeout(bound, self.executor.execute(&self.unit.name, ctx)).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(out)) => {
                let verdict = out.verdict.unwrap_or_else(|| DEFAULT_VERDICT.to_string());
                debug!(unit = %self.unit.name, %verdict, duration_ms, "unit succeeded");
                UnitResult::success(&self.unit.name, verdict, duration_ms)
            }
            Ok(Err(e)) => {
                debug!(unit = %self.unit.name, error = %e, "unit failed");
                UnitResult::failed(&self.unit.name, format!("{e:#}"), duration_ms)
            }
            Err(_) => {
                debug!(unit = %self.unit.name, timeout_secs = self.unit.timeout_secs, "unit timed out");
                UnitResult::timed_out(&self.unit.name, self.unit.timeout_secs, duration_ms)
            }
        }
    }
}
