use crate::error::OrchestratorError;
use crate::wave::{PlannedWaves, Task, Wave, WaveContext};

/// Pluggable policy for grouping tasks into waves and deciding when a run
/// should stop after a wave.
///
/// `plan_waves` is a pure function of its inputs: calling it twice with the
/// same tasks and context must group tasks identically (wave ids may differ).
/// Every input task must land in exactly one wave, and waves must come back
/// in ascending `order`.
pub trait WaveStrategyPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn plan_waves(
        &self,
        tasks: &[Task],
        prior: Option<&WaveContext>,
    ) -> Result<PlannedWaves, OrchestratorError>;

    fn should_continue_after_wave(&self, wave: &Wave, ctx: &WaveContext) -> bool;
}
