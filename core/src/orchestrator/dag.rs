use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{ExecutionMode, OrchestrationConfig, UnitConfig};
use crate::error::OrchestratorError;
use crate::graph::UnitGraph;
use crate::runner::{ExecutionContext, UnitResult, UnitRunner, UnitStatus};
use crate::traits::{run_hook_guarded, ExecutorPlugin, HookKind, HookPlugin};

use super::dispatch::run_wave;
use super::types::{RunSummary, StopReason, StopToken};

/// Drives repeated "find runnable → run wave → fold results" cycles over a
/// validated agent graph.
pub struct DagOrchestrator {
    graph: UnitGraph<UnitConfig>,
    executor: Arc<dyn ExecutorPlugin>,
    hooks: Option<Arc<dyn HookPlugin>>,
    mode: ExecutionMode,
    global_timeout: Duration,
    max_parallel: usize,
    hook_timeout: Duration,
    stop: StopToken,
}

impl DagOrchestrator {
    /// Builds and validates the dependency graph. Duplicate unit names and
    /// cycles fail here, before any execution.
    pub fn new(
        config: &OrchestrationConfig,
        executor: Arc<dyn ExecutorPlugin>,
    ) -> Result<Self, OrchestratorError> {
        let mut graph = UnitGraph::from_nodes(&config.agents)?;
        graph.validate()?;

        Ok(Self {
            graph,
            executor,
            hooks: None,
            mode: config.mode,
            global_timeout: Duration::from_secs(config.global_timeout_secs),
            max_parallel: config.max_parallel,
            hook_timeout: Duration::from_secs(config.hook_timeout_secs),
            stop: StopToken::new(),
        })
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn HookPlugin>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Handle for cooperative cancellation from another task.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Runs the graph in the configured mode.
    pub async fn execute(&self, ctx: &ExecutionContext) -> RunSummary {
        self.execute_mode(ctx, self.mode).await
    }

    /// Runs the graph in an explicit mode, overriding the configured one.
    pub async fn execute_mode(&self, ctx: &ExecutionContext, mode: ExecutionMode) -> RunSummary {
        let started = Instant::now();

        let mut completed: HashSet<String> = HashSet::new();
        let mut skipped: HashSet<String> = HashSet::new();
        let mut results: HashMap<String, UnitResult> = HashMap::new();
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut waves_executed = 0usize;
        let mut stop_reason: Option<StopReason> = None;

        // The graph was validated at construction, so ordering cannot fail
        // here; guard anyway rather than unwrap.
        let mut seq_remaining: VecDeque<String> = match mode {
            ExecutionMode::Sequential => match self.graph.topological_order() {
                Ok(order) => order.into(),
                Err(e) => {
                    errors.push(e.to_string());
                    VecDeque::new()
                }
            },
            _ => VecDeque::new(),
        };

        info!(%mode, units = self.graph.len(), "starting run");

        loop {
            if self.stop.is_stopped() {
                warnings.push("stop requested; no further waves dispatched".to_string());
                stop_reason = Some(StopReason::StopRequested);
                break;
            }

            let elapsed = started.elapsed();
            if elapsed >= self.global_timeout {
                errors.push(format!(
                    "global timeout of {}s exceeded",
                    self.global_timeout.as_secs()
                ));
                stop_reason = Some(StopReason::GlobalTimeout);
                break;
            }

            let wave: Vec<String> = match mode {
                ExecutionMode::Dag => self.graph.find_runnable(&completed, &skipped),
                ExecutionMode::Sequential => seq_remaining.pop_front().into_iter().collect(),
                ExecutionMode::Parallel => {
                    if waves_executed == 0 {
                        self.graph.names().to_vec()
                    } else {
                        Vec::new()
                    }
                }
            };

            if wave.is_empty() {
                break;
            }

            debug!(wave = waves_executed + 1, units = ?wave, "dispatching wave");
            let remaining = self.global_timeout - elapsed;
            let run_fn = self.unit_run_fn(&wave, ctx);

            let wave_results =
                match tokio::time::timeout(remaining, run_wave(&wave, self.max_parallel, run_fn))
                    .await
                {
                    Ok(results) => results,
                    Err(_) => {
                        errors.push(format!(
                            "global timeout of {}s exceeded; units still in flight were abandoned",
                            self.global_timeout.as_secs()
                        ));
                        stop_reason = Some(StopReason::GlobalTimeout);
                        break;
                    }
                };

            waves_executed += 1;

            let mut halt = false;
            for (result, hook_warnings) in wave_results {
                warnings.extend(hook_warnings);
                match result.status {
                    UnitStatus::Skipped => {
                        skipped.insert(result.unit.clone());
                    }
                    UnitStatus::Success => {
                        completed.insert(result.unit.clone());
                    }
                    UnitStatus::Failed | UnitStatus::Timeout => {
                        let detail = result.error.clone().unwrap_or_else(|| "unknown".to_string());
                        let required = self
                            .graph
                            .node(&result.unit)
                            .map(|u| u.required)
                            .unwrap_or(true);
                        if required {
                            errors.push(format!(
                                "required unit '{}' failed: {detail}",
                                result.unit
                            ));
                            halt = true;
                        } else {
                            warnings.push(format!(
                                "optional unit '{}' failed: {detail}",
                                result.unit
                            ));
                            // Counts as completed for dependency purposes so
                            // downstream units still run.
                            completed.insert(result.unit.clone());
                        }
                    }
                    UnitStatus::Pending | UnitStatus::Running => {
                        // The runner only produces terminal results.
                        warn!(unit = %result.unit, status = ?result.status, "non-terminal result ignored for dependency tracking");
                    }
                }
                results.insert(result.unit.clone(), result);
            }

            if halt {
                stop_reason = Some(StopReason::RequiredUnitFailed);
                break;
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let unit_ms: u64 = results.values().map(|r| r.duration_ms).sum();
        let mut verdicts: HashMap<String, usize> = HashMap::new();
        for result in results.values() {
            *verdicts.entry(result.verdict.clone()).or_default() += 1;
        }

        let success = errors.is_empty();
        info!(
            success,
            waves = waves_executed,
            units = results.len(),
            duration_ms,
            "run finished"
        );

        RunSummary {
            success,
            mode,
            results,
            waves_executed,
            duration_ms,
            parallel_saved_ms: unit_ms.saturating_sub(duration_ms),
            verdicts,
            errors,
            warnings,
            stop_reason,
        }
    }

    /// Builds the per-unit future for one wave: pre-hook, runner, post-hook.
    /// Hook failures come back alongside the result so the caller can fold
    /// them into the run's warnings.
    fn unit_run_fn(
        &self,
        wave: &[String],
        ctx: &ExecutionContext,
    ) -> impl Fn(String) -> futures::future::BoxFuture<'static, (UnitResult, Vec<String>)> + Clone
    {
        let units: Arc<HashMap<String, UnitConfig>> = Arc::new(
            wave.iter()
                .filter_map(|n| self.graph.node(n).map(|u| (n.clone(), u.clone())))
                .collect(),
        );
        let executor = self.executor.clone();
        let hooks = self.hooks.clone();
        let ctx = Arc::new(ctx.clone());
        let hook_timeout = self.hook_timeout;

        move |name: String| {
            let units = units.clone();
            let executor = executor.clone();
            let hooks = hooks.clone();
            let ctx = ctx.clone();

            Box::pin(async move {
                let Some(unit) = units.get(&name).cloned() else {
                    return (
                        UnitResult::failed(&name, "unit not found in graph", 0),
                        Vec::new(),
                    );
                };

                let mut hook_warnings = Vec::new();
                if let Some(w) = run_hook_guarded(
                    &hooks,
                    HookKind::PreAgent,
                    json!({ "agent": name, "required": unit.required }),
                    hook_timeout,
                )
                .await
                {
                    hook_warnings.push(w);
                }

                let result = UnitRunner::new(unit, executor).run(&ctx).await;

                if let Some(w) = run_hook_guarded(
                    &hooks,
                    HookKind::PostAgent,
                    json!({
                        "agent": name,
                        "status": result.status,
                        "verdict": result.verdict,
                    }),
                    hook_timeout,
                )
                .await
                {
                    hook_warnings.push(w);
                }

                (result, hook_warnings)
            })
        }
    }
}
