use serde::{Deserialize, Serialize};

/// Verdict reported when the executor succeeds without naming one.
pub const DEFAULT_VERDICT: &str = "approved";

/// Verdict reported when a unit's condition gate evaluates false.
pub const SKIPPED_VERDICT: &str = "N/A";

/// Verdict reported when a unit exceeds its configured timeout.
pub const TIMEOUT_VERDICT: &str = "timeout";

/// Lifecycle status of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
    Timeout,
}

impl UnitStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::Skipped | Self::Timeout
        )
    }

    /// Transitions are monotonic; terminal states accept no successor.
    pub fn can_transition(self, next: UnitStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Running | Self::Skipped),
            Self::Running => matches!(next, Self::Success | Self::Failed | Self::Timeout),
            _ => false,
        }
    }
}

/// Uniform outcome of running one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit: String,
    pub status: UnitStatus,
    pub verdict: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UnitResult {
    pub fn skipped(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            status: UnitStatus::Skipped,
            verdict: SKIPPED_VERDICT.to_string(),
            duration_ms: 0,
            error: None,
        }
    }

    pub fn success(unit: impl Into<String>, verdict: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            unit: unit.into(),
            status: UnitStatus::Success,
            verdict: verdict.into(),
            duration_ms,
            error: None,
        }
    }

    pub fn failed(unit: impl Into<String>, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            unit: unit.into(),
            status: UnitStatus::Failed,
            verdict: "rejected".to_string(),
            duration_ms,
            error: Some(error.into()),
        }
    }

    pub fn timed_out(unit: impl Into<String>, timeout_secs: u64, duration_ms: u64) -> Self {
        let unit = unit.into();
        let error = format!("unit '{unit}' timed out after {timeout_secs}s");
        Self {
            unit,
            status: UnitStatus::Timeout,
            verdict: TIMEOUT_VERDICT.to_string(),
            duration_ms,
            error: Some(error),
        }
    }

    /// Failures are what a required unit turns into a run abort.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, UnitStatus::Failed | UnitStatus::Timeout)
    }
}
