use anyhow::{bail, Context};
use async_trait::async_trait;
use cadence_core::api::{ExecutionContext, ExecutorOutcome, ExecutorPlugin};
use tokio::process::Command;
use tracing::debug;

/// Runs each unit or task as a child process.
///
/// `{name}` in any configured argument is replaced by the unit name, and the
/// child gets `CADENCE_UNIT` and `CADENCE_FEATURE` in its environment. The
/// child's exit status decides success; stdout feeds reporting:
/// - the last non-empty line becomes the verdict
/// - lines shaped `created: <path>` / `modified: <path>` become file records
#[derive(Debug, Clone)]
pub struct ProcessExecutorPlugin {
    program: String,
    args: Vec<String>,
}

impl ProcessExecutorPlugin {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl ExecutorPlugin for ProcessExecutorPlugin {
    async fn execute(&self, name: &str, ctx: &ExecutionContext) -> anyhow::Result<ExecutorOutcome> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{name}", name))
            .collect();
        debug!(unit = name, program = %self.program, "spawning executor process");

        let output = Command::new(&self.program)
            .args(&args)
            .env("CADENCE_UNIT", name)
            .env("CADENCE_FEATURE", &ctx.feature_id)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to spawn '{}'", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "'{}' exited with {} for unit '{name}': {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        let mut outcome = ExecutorOutcome {
            verdict: None,
            output: stdout.clone(),
            created_files: Vec::new(),
            modified_files: Vec::new(),
        };
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(path) = line.strip_prefix("created:") {
                outcome.created_files.push(path.trim().to_string());
            } else if let Some(path) = line.strip_prefix("modified:") {
                outcome.modified_files.push(path.trim().to_string());
            } else {
                outcome.verdict = Some(line.to_string());
            }
        }
        Ok(outcome)
    }
}
