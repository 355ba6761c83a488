#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cadence_core::api::{
    ExecutionContext, ExecutorOutcome, ExecutorPlugin, OrchestrationConfig, OrchestratorError,
    PlannedWaves, Task, UnitConfig, Wave, WaveContext, WaveStatus, WaveStrategyPlugin,
    DEFAULT_VERDICT,
};

/// How the scripted executor reacts to one unit or task.
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    SucceedWith {
        verdict: &'static str,
        created: Vec<&'static str>,
        modified: Vec<&'static str>,
    },
    Fail(&'static str),
    Sleep(Duration),
}

/// Executor scripted per unit name; records every invocation in order.
/// Unscripted names succeed with the default verdict.
pub struct ScriptedExecutor {
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, name: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(name.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.call_count(name) > 0
    }
}

#[async_trait]
impl ExecutorPlugin for ScriptedExecutor {
    async fn execute(&self, name: &str, _ctx: &ExecutionContext) -> anyhow::Result<ExecutorOutcome> {
        self.calls.lock().unwrap().push(name.to_string());
        match self.behaviors.get(name).unwrap_or(&Behavior::Succeed) {
            Behavior::Succeed => Ok(ExecutorOutcome {
                verdict: Some(DEFAULT_VERDICT.to_string()),
                ..ExecutorOutcome::default()
            }),
            Behavior::SucceedWith {
                verdict,
                created,
                modified,
            } => Ok(ExecutorOutcome {
                verdict: Some(verdict.to_string()),
                output: String::new(),
                created_files: created.iter().map(|s| s.to_string()).collect(),
                modified_files: modified.iter().map(|s| s.to_string()).collect(),
            }),
            Behavior::Fail(message) => Err(anyhow::anyhow!(*message)),
            Behavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(ExecutorOutcome::default())
            }
        }
    }
}

pub fn unit(name: &str, deps: &[&str]) -> UnitConfig {
    UnitConfig {
        name: name.to_string(),
        depends_on: deps.iter().map(|d| d.to_string()).collect(),
        timeout_secs: 30,
        required: true,
        condition: Default::default(),
    }
}

pub fn optional(mut unit: UnitConfig) -> UnitConfig {
    unit.required = false;
    unit
}

pub fn config(agents: Vec<UnitConfig>) -> OrchestrationConfig {
    OrchestrationConfig {
        agents,
        ..OrchestrationConfig::default()
    }
}

/// Strategy that puts each task in its own wave, in input order.
pub struct OneTaskPerWaveStrategy;

impl WaveStrategyPlugin for OneTaskPerWaveStrategy {
    fn name(&self) -> &str {
        "one-per-wave"
    }

    fn plan_waves(
        &self,
        tasks: &[Task],
        _prior: Option<&WaveContext>,
    ) -> Result<PlannedWaves, OrchestratorError> {
        let waves = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                Wave::new(
                    format!("wave-{}", idx + 1),
                    idx as u32 + 1,
                    vec![task.name.clone()],
                )
            })
            .collect();
        Ok(PlannedWaves {
            waves,
            total_tasks: tasks.len(),
            estimated_minutes: tasks.iter().map(|t| t.estimated_minutes).sum(),
            metadata: serde_json::Value::Null,
        })
    }

    fn should_continue_after_wave(&self, wave: &Wave, _ctx: &WaveContext) -> bool {
        wave.status != WaveStatus::Failed
    }
}
