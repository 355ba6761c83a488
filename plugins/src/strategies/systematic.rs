use std::collections::HashSet;

use cadence_core::api::{
    OrchestratorError, PlannedWaves, Task, UnitGraph, Wave, WaveContext, WaveStatus,
    WaveStrategyPlugin, SYSTEMATIC_STRATEGY,
};
use serde_json::json;
use tracing::warn;

const ANALYSIS_WAVE: &str = "Analysis";
const VALIDATION_WAVE: &str = "Validation";
const DEFAULT_BATCH_SIZE: usize = 4;

/// Plans dependency-ordered implementation batches between two checkpoint
/// waves: an empty Analysis wave up front and an empty Validation wave at
/// the end. Checkpoints carry no tasks, so every input task still lands in
/// exactly one implementation batch.
#[derive(Debug)]
pub struct SystematicStrategy {
    batch_size: usize,
}

impl Default for SystematicStrategy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SystematicStrategy {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Batches tasks so every dependency lands in an earlier batch: the
    /// graph's level-parallel stages, each split at `batch_size`. When a
    /// dependency cycle blocks progress the remaining tasks are dumped into
    /// one final batch rather than failing the plan.
    fn batch(&self, tasks: &[Task]) -> Result<Vec<Vec<String>>, OrchestratorError> {
        let graph = UnitGraph::from_nodes(tasks)?;
        if let Ok(stages) = graph.execution_stages() {
            return Ok(stages
                .iter()
                .flat_map(|stage| stage.chunks(self.batch_size))
                .map(|chunk| chunk.to_vec())
                .collect());
        }

        // Cyclic task lists cannot be staged; batch what is runnable, then
        // group whatever is stuck into one batch.
        let mut completed: HashSet<String> = HashSet::new();
        let skipped = HashSet::new();
        let mut batches = Vec::new();
        while completed.len() < tasks.len() {
            let runnable = graph.find_runnable(&completed, &skipped);
            if runnable.is_empty() {
                let leftover: Vec<String> = graph
                    .names()
                    .iter()
                    .filter(|n| !completed.contains(*n))
                    .cloned()
                    .collect();
                warn!(
                    tasks = %leftover.join(", "),
                    "task dependency cycle, grouping remainder into one batch"
                );
                batches.push(leftover);
                break;
            }
            for chunk in runnable.chunks(self.batch_size) {
                completed.extend(chunk.iter().cloned());
                batches.push(chunk.to_vec());
            }
        }
        Ok(batches)
    }
}

impl WaveStrategyPlugin for SystematicStrategy {
    fn name(&self) -> &str {
        SYSTEMATIC_STRATEGY
    }

    fn plan_waves(
        &self,
        tasks: &[Task],
        _prior: Option<&WaveContext>,
    ) -> Result<PlannedWaves, OrchestratorError> {
        let batches = self.batch(tasks)?;

        let mut waves = Vec::with_capacity(batches.len() + 2);
        waves.push(Wave::new(ANALYSIS_WAVE, 1, Vec::new()));
        for (idx, batch) in batches.into_iter().enumerate() {
            waves.push(Wave::new(
                format!("Implementation {}", idx + 1),
                idx as u32 + 2,
                batch,
            ));
        }
        waves.push(Wave::new(VALIDATION_WAVE, waves.len() as u32 + 1, Vec::new()));

        Ok(PlannedWaves {
            total_tasks: tasks.len(),
            estimated_minutes: tasks.iter().map(|t| t.estimated_minutes).sum(),
            metadata: json!({ "batch_size": self.batch_size }),
            waves,
        })
    }

    /// Implementation-batch failures are carried to the Validation checkpoint
    /// as issues; only a failed Analysis checkpoint or a critical issue halts
    /// the run early.
    fn should_continue_after_wave(&self, wave: &Wave, ctx: &WaveContext) -> bool {
        if ctx.has_critical_issues() {
            return false;
        }
        !(wave.status == WaveStatus::Failed && wave.name == ANALYSIS_WAVE)
    }
}
