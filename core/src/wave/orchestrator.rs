use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::orchestrator::{dispatch, StopToken};
use crate::runner::ExecutionContext;
use crate::traits::{
    run_hook_guarded, BreakpointPlugin, ExecutorPlugin, HookKind, HookPlugin, WaveStrategyPlugin,
};
use crate::wave::context::{Issue, Severity, WaveContext};
use crate::wave::plan::{TaskOutcome, WavePlan, WaveStatus};

/// Result of one wave.
#[derive(Debug, Clone, Serialize)]
pub struct WaveResult {
    pub wave_id: String,
    pub name: String,
    pub order: u32,
    pub status: WaveStatus,
    pub task_outcomes: Vec<TaskOutcome>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a full wave-plan run.
#[derive(Debug, Serialize)]
pub struct WaveOrchestrationResult {
    pub success: bool,
    pub waves: Vec<WaveResult>,
    pub context: WaveContext,
    pub completed_waves: usize,
    pub failed_waves: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at_wave: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    pub duration_ms: u64,
    pub warnings: Vec<String>,
}

/// Drives a [`WavePlan`] wave by wave: dispatches each wave's tasks under a
/// concurrency bound, folds outcomes into the [`WaveContext`], and lets the
/// strategy and the optional breakpoint decide whether to keep going.
pub struct WaveOrchestrator {
    executor: Arc<dyn ExecutorPlugin>,
    strategy: Arc<dyn WaveStrategyPlugin>,
    hooks: Option<Arc<dyn HookPlugin>>,
    breakpoint: Option<Arc<dyn BreakpointPlugin>>,
    wave_timeout: Duration,
    hook_timeout: Duration,
    max_parallel: usize,
    stop: StopToken,
}

impl WaveOrchestrator {
    pub fn new(executor: Arc<dyn ExecutorPlugin>, strategy: Arc<dyn WaveStrategyPlugin>) -> Self {
        Self {
            executor,
            strategy,
            hooks: None,
            breakpoint: None,
            wave_timeout: Duration::from_secs(300),
            hook_timeout: Duration::from_secs(10),
            max_parallel: 4,
            stop: StopToken::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn HookPlugin>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_breakpoint(mut self, breakpoint: Arc<dyn BreakpointPlugin>) -> Self {
        self.breakpoint = Some(breakpoint);
        self
    }

    pub fn with_wave_timeout(mut self, timeout: Duration) -> Self {
        self.wave_timeout = timeout;
        self
    }

    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = timeout;
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// Shares an externally created stop token, e.g. one wired to a signal
    /// handler.
    pub fn with_stop_token(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for requesting a cooperative stop between waves.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub async fn execute(
        &self,
        plan: &WavePlan,
        exec_ctx: &ExecutionContext,
    ) -> WaveOrchestrationResult {
        let run_started = Instant::now();
        let mut ctx = WaveContext::new();
        let mut results: Vec<WaveResult> = Vec::with_capacity(plan.waves.len());
        let mut warnings: Vec<String> = Vec::new();
        let mut stopped_at_wave: Option<String> = None;
        let mut stop_reason: Option<String> = None;
        let total_waves = plan.waves.len();

        for (idx, planned) in plan.waves.iter().enumerate() {
            if self.stop.is_stopped() {
                stopped_at_wave = results.last().map(|r| r.wave_id.clone());
                stop_reason = Some("stop requested".to_string());
                break;
            }

            let mut wave = planned.clone();
            ctx = ctx.advance();
            wave.status = WaveStatus::InProgress;
            wave.started_at = Some(Utc::now());
            info!(
                wave = %wave.name,
                order = wave.order,
                tasks = wave.tasks.len(),
                "starting wave"
            );

            if let Some(w) = run_hook_guarded(
                &self.hooks,
                HookKind::PreWave,
                json!({
                    "wave": wave.name,
                    "order": wave.order,
                    "tasks": wave.tasks.len(),
                }),
                self.hook_timeout,
            )
            .await
            {
                warnings.push(w);
            }

            let wave_started = Instant::now();
            let dispatched = tokio::time::timeout(
                self.wave_timeout,
                dispatch::run_wave(&wave.tasks, self.max_parallel, self.task_run_fn(exec_ctx)),
            )
            .await;
            let wave_duration_ms = wave_started.elapsed().as_millis() as u64;

            let (outcomes, error) = match dispatched {
                Ok(outcomes) => (outcomes, None),
                Err(_) => {
                    let message = format!(
                        "wave '{}' timed out after {}s",
                        wave.name,
                        self.wave_timeout.as_secs()
                    );
                    warn!("{message}");
                    (Vec::new(), Some(message))
                }
            };

            // A failed task is folded into the context as an important issue;
            // only a timeout fails the wave itself.
            let wave_failed = error.is_some();
            for outcome in &outcomes {
                for file in &outcome.created_files {
                    ctx.record_file_created(file.clone());
                }
                for file in &outcome.modified_files {
                    ctx.record_file_modified(file.clone());
                }
                if !outcome.success {
                    let detail = outcome.error.as_deref().unwrap_or("unknown error");
                    ctx.add_issue(Issue::new(
                        Severity::Important,
                        format!("task '{}' failed: {detail}", outcome.task),
                        wave.name.clone(),
                    ));
                }
            }
            if let Some(message) = &error {
                ctx.add_issue(Issue::new(
                    Severity::Important,
                    message.clone(),
                    wave.name.clone(),
                ));
            }

            wave.status = if wave_failed {
                WaveStatus::Failed
            } else {
                WaveStatus::Completed
            };
            wave.completed_at = Some(Utc::now());
            wave.task_outcomes = outcomes;

            if let Some(w) = run_hook_guarded(
                &self.hooks,
                HookKind::PostWave,
                json!({
                    "wave": wave.name,
                    "order": wave.order,
                    "status": wave.status,
                    "wave_number": ctx.wave_number(),
                }),
                self.hook_timeout,
            )
            .await
            {
                warnings.push(w);
            }

            let status = wave.status;
            let keep_going = self.strategy.should_continue_after_wave(&wave, &ctx);
            results.push(WaveResult {
                wave_id: wave.id.clone(),
                name: wave.name.clone(),
                order: wave.order,
                status,
                task_outcomes: wave.task_outcomes.clone(),
                duration_ms: wave_duration_ms,
                error,
            });

            if !keep_going {
                stopped_at_wave = Some(wave.id.clone());
                stop_reason = Some(if status == WaveStatus::Failed {
                    format!("wave '{}' failed", wave.name)
                } else {
                    format!("strategy halted after wave '{}'", wave.name)
                });
                break;
            }

            let more_waves = idx + 1 < total_waves;
            if plan.safe_mode && more_waves && status == WaveStatus::Completed {
                if let Some(breakpoint) = &self.breakpoint {
                    match breakpoint.confirm(&wave, &ctx).await {
                        Ok(true) => {}
                        Ok(false) => {
                            stopped_at_wave = Some(wave.id.clone());
                            stop_reason = Some("user cancelled at breakpoint".to_string());
                            break;
                        }
                        Err(e) => {
                            let message = format!(
                                "breakpoint after wave '{}' failed: {e:#}",
                                wave.name
                            );
                            warn!("{message}");
                            warnings.push(message);
                        }
                    }
                }
            }
        }

        let completed_waves = results
            .iter()
            .filter(|r| r.status == WaveStatus::Completed)
            .count();
        let failed_waves = results
            .iter()
            .filter(|r| r.status == WaveStatus::Failed)
            .count();

        WaveOrchestrationResult {
            success: failed_waves == 0,
            waves: results,
            context: ctx,
            completed_waves,
            failed_waves,
            stopped_at_wave,
            stop_reason,
            duration_ms: run_started.elapsed().as_millis() as u64,
            warnings,
        }
    }

    fn task_run_fn(
        &self,
        exec_ctx: &ExecutionContext,
    ) -> impl Fn(String) -> futures::future::BoxFuture<'static, TaskOutcome> + Clone {
        let executor = Arc::clone(&self.executor);
        let exec_ctx = exec_ctx.clone();
        move |task: String| {
            let executor = Arc::clone(&executor);
            let exec_ctx = exec_ctx.clone();
            Box::pin(async move {
                let started = Instant::now();
                match executor.execute(&task, &exec_ctx).await {
                    Ok(outcome) => TaskOutcome {
                        task,
                        success: true,
                        duration_ms: started.elapsed().as_millis() as u64,
                        error: None,
                        created_files: outcome.created_files,
                        modified_files: outcome.modified_files,
                    },
                    Err(e) => TaskOutcome {
                        task,
                        success: false,
                        duration_ms: started.elapsed().as_millis() as u64,
                        error: Some(format!("{e:#}")),
                        created_files: Vec::new(),
                        modified_files: Vec::new(),
                    },
                }
            })
        }
    }
}
