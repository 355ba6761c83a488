//! DAG-mode orchestration: waves of runnable units dispatched concurrently
//! until the graph is exhausted, a required unit fails, the global timeout
//! elapses, or a stop is requested.

mod dag;
pub(crate) mod dispatch;
mod types;

pub use dag::DagOrchestrator;
pub use types::{RunSummary, StopReason, StopToken};
