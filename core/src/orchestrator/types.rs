use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ExecutionMode;
use crate::runner::UnitResult;

/// Cooperative cancellation handle.
///
/// `stop()` prevents any further wave from starting; units already dispatched
/// in the current wave run to completion. Cloneable and cheap to share.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a run ended before exhausting the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    RequiredUnitFailed,
    GlobalTimeout,
    StopRequested,
}

/// Outcome of a full DAG run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// True iff no required unit failed and no timeout cut the run short.
    pub success: bool,

    pub mode: ExecutionMode,

    /// Per-unit results, keyed by unit name.
    pub results: HashMap<String, UnitResult>,

    pub waves_executed: usize,

    pub duration_ms: u64,

    /// Sum of per-unit durations minus wall-clock duration: how much time
    /// concurrent dispatch saved over running everything back to back.
    pub parallel_saved_ms: u64,

    /// Tally of verdict strings across all unit results.
    pub verdicts: HashMap<String, usize>,

    pub errors: Vec<String>,
    pub warnings: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl RunSummary {
    pub fn result(&self, unit: &str) -> Option<&UnitResult> {
        self.results.get(unit)
    }
}
