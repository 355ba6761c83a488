use cadence_core::api::{
    OrchestratorError, PlannedWaves, Task, Wave, WaveContext, WaveStatus, WaveStrategyPlugin,
    PROGRESSIVE_STRATEGY,
};
use serde_json::json;

/// Architectural layers, ordered from foundations to finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Foundations,
    CoreLogic,
    Integration,
    Finalization,
}

impl Phase {
    const ALL: [Phase; 4] = [
        Phase::Foundations,
        Phase::CoreLogic,
        Phase::Integration,
        Phase::Finalization,
    ];

    fn wave_name(self) -> &'static str {
        match self {
            Self::Foundations => "Foundations",
            Self::CoreLogic => "Core Logic",
            Self::Integration => "Integration",
            Self::Finalization => "Finalization",
        }
    }

    fn rank(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(3)
    }
}

/// Groups tasks into architectural layers by name: foundations first, then
/// core logic, then integration, then finalization. Classification looks at
/// task names only; declared dependencies do not move a task between layers.
///
/// The pattern table is configurable: each entry pairs a [`Phase`] with the
/// lowercase substrings that route a task into it, checked in table order
/// with the first match winning. Tasks matching nothing land in the
/// finalization layer.
#[derive(Debug, Clone)]
pub struct ProgressiveStrategy {
    patterns: Vec<(Phase, Vec<String>)>,
}

impl Default for ProgressiveStrategy {
    fn default() -> Self {
        Self::new(Self::default_patterns())
    }
}

impl ProgressiveStrategy {
    pub fn new(patterns: Vec<(Phase, Vec<String>)>) -> Self {
        Self { patterns }
    }

    pub fn default_patterns() -> Vec<(Phase, Vec<String>)> {
        let strings = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        vec![
            (
                Phase::Foundations,
                strings(&[
                    "entity", "model", "schema", "migration", "setup", "struct", "config",
                ]),
            ),
            (
                Phase::CoreLogic,
                strings(&["service", "logic", "handler", "usecase", "domain"]),
            ),
            (
                Phase::Integration,
                strings(&[
                    "controller",
                    "api",
                    "endpoint",
                    "route",
                    "client",
                    "integration",
                    "wire",
                ]),
            ),
            (
                Phase::Finalization,
                strings(&["doc", "test", "polish", "cleanup", "final", "release"]),
            ),
        ]
    }

    fn classify(&self, task_name: &str) -> Phase {
        let name = task_name.to_lowercase();
        for (phase, words) in &self.patterns {
            if words.iter().any(|w| name.contains(w.as_str())) {
                return *phase;
            }
        }
        Phase::Finalization
    }
}

impl WaveStrategyPlugin for ProgressiveStrategy {
    fn name(&self) -> &str {
        PROGRESSIVE_STRATEGY
    }

    fn plan_waves(
        &self,
        tasks: &[Task],
        _prior: Option<&WaveContext>,
    ) -> Result<PlannedWaves, OrchestratorError> {
        let mut buckets: [Vec<String>; 4] = Default::default();
        for task in tasks {
            buckets[self.classify(&task.name).rank()].push(task.name.clone());
        }

        let mut waves = Vec::new();
        for (phase, bucket) in Phase::ALL.into_iter().zip(buckets) {
            if bucket.is_empty() {
                continue;
            }
            let order = waves.len() as u32 + 1;
            waves.push(Wave::new(phase.wave_name(), order, bucket));
        }

        Ok(PlannedWaves {
            total_tasks: tasks.len(),
            estimated_minutes: tasks.iter().map(|t| t.estimated_minutes).sum(),
            metadata: json!({ "layers": waves.iter().map(|w| w.name.clone()).collect::<Vec<_>>() }),
            waves,
        })
    }

    fn should_continue_after_wave(&self, wave: &Wave, ctx: &WaveContext) -> bool {
        wave.status != WaveStatus::Failed && !ctx.has_critical_issues()
    }
}
