use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrchestratorError;
use crate::graph::NodeLike;
use crate::runner::Complexity;

fn default_estimated_minutes() -> u32 {
    5
}

/// Caller-supplied description of one unit of work to be planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Hint at the file this task touches, if known up front.
    #[serde(default)]
    pub file: Option<String>,
    /// What kind of change this is (create, modify, review, ...). Free-form.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default = "default_estimated_minutes")]
    pub estimated_minutes: u32,
}

impl TaskDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            file: None,
            action: None,
            depends_on: Vec::new(),
            estimated_minutes: default_estimated_minutes(),
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.depends_on = deps.iter().map(|d| d.to_string()).collect();
        self
    }
}

/// A task after planning, addressable from waves by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub depends_on: Vec<String>,
    pub estimated_minutes: u32,
}

impl From<TaskDescription> for Task {
    fn from(desc: TaskDescription) -> Self {
        Self {
            name: desc.name,
            description: desc.description,
            file: desc.file,
            action: desc.action,
            depends_on: desc.depends_on,
            estimated_minutes: desc.estimated_minutes,
        }
    }
}

/// Result of one task inside an executed wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task: String,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_files: Vec<String>,
    pub modified_files: Vec<String>,
}

impl NodeLike for Task {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl WaveStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    pub fn can_transition(self, next: WaveStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::Pending, Self::Skipped)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Failed)
        )
    }
}

/// An ordered batch of tasks executed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub id: String,
    pub name: String,
    /// 1-based position in the plan.
    pub order: u32,
    /// Names of tasks in this wave; resolved against [`WavePlan::tasks`].
    pub tasks: Vec<String>,
    pub status: WaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Filled in during execution; empty in a freshly planned wave.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_outcomes: Vec<TaskOutcome>,
}

impl Wave {
    pub fn new(name: impl Into<String>, order: u32, tasks: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            order,
            tasks,
            status: WaveStatus::Pending,
            started_at: None,
            completed_at: None,
            task_outcomes: Vec::new(),
        }
    }
}

/// What a strategy hands back from planning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannedWaves {
    pub waves: Vec<Wave>,
    pub total_tasks: usize,
    pub estimated_minutes: u32,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

/// A validated, execution-ready plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavePlan {
    pub feature_id: String,
    pub complexity: Complexity,
    pub strategy: String,
    pub waves: Vec<Wave>,
    pub tasks: Vec<Task>,
    pub total_tasks: usize,
    pub estimated_minutes: u32,
    pub safe_mode: bool,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl WavePlan {
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Checks plan well-formedness: wave orders are contiguous from 1, and
    /// every task appears in exactly one wave.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        for (idx, wave) in self.waves.iter().enumerate() {
            let expected = (idx + 1) as u32;
            if wave.order != expected {
                return Err(OrchestratorError::InvalidPlan(format!(
                    "wave '{}' has order {}, expected {expected}",
                    wave.name, wave.order
                )));
            }
        }

        let known: HashSet<&str> = self.tasks.iter().map(|t| t.name.as_str()).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        for wave in &self.waves {
            for task in &wave.tasks {
                if !known.contains(task.as_str()) {
                    return Err(OrchestratorError::InvalidPlan(format!(
                        "wave '{}' references unknown task '{task}'",
                        wave.name
                    )));
                }
                if !seen.insert(task.as_str()) {
                    return Err(OrchestratorError::InvalidPlan(format!(
                        "task '{task}' appears in more than one wave"
                    )));
                }
            }
        }
        if seen.len() != known.len() {
            let missing: Vec<&str> = known.difference(&seen).copied().collect();
            return Err(OrchestratorError::InvalidPlan(format!(
                "tasks missing from every wave: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}
