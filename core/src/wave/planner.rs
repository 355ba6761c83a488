use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::OrchestratorError;
use crate::runner::Complexity;
use crate::traits::WaveStrategyPlugin;
use crate::wave::context::WaveContext;
use crate::wave::plan::{Task, TaskDescription, WavePlan};

pub const PROGRESSIVE_STRATEGY: &str = "progressive";
pub const SYSTEMATIC_STRATEGY: &str = "systematic";

/// Registered planning strategies, looked up by name.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn WaveStrategyPlugin>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, strategy: Arc<dyn WaveStrategyPlugin>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn WaveStrategyPlugin>> {
        self.strategies.get(name).cloned()
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn WaveStrategyPlugin>, OrchestratorError> {
        self.get(name)
            .ok_or_else(|| OrchestratorError::UnknownStrategy(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Turns task descriptions into a validated [`WavePlan`] via a strategy.
pub struct WavePlanner {
    registry: StrategyRegistry,
}

impl WavePlanner {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    pub fn plan(
        &self,
        feature_id: &str,
        tasks: &[TaskDescription],
        strategy_name: &str,
        complexity: Complexity,
        safe_mode: bool,
    ) -> Result<WavePlan, OrchestratorError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for task in tasks {
            if !seen.insert(task.name.as_str()) {
                return Err(OrchestratorError::DuplicateTask(task.name.clone()));
            }
        }

        let strategy = self.registry.resolve(strategy_name)?;
        let tasks: Vec<Task> = tasks.iter().cloned().map(Task::from).collect();

        let prior = WaveContext::new();
        let planned = strategy.plan_waves(&tasks, Some(&prior))?;
        debug!(
            strategy = strategy_name,
            waves = planned.waves.len(),
            tasks = tasks.len(),
            "strategy produced wave layout"
        );

        let plan = WavePlan {
            feature_id: feature_id.to_string(),
            complexity,
            strategy: strategy_name.to_string(),
            waves: planned.waves,
            total_tasks: tasks.len(),
            estimated_minutes: tasks.iter().map(|t| t.estimated_minutes).sum(),
            safe_mode,
            metadata: planned.metadata,
            tasks,
        };
        plan.validate()?;
        info!(
            feature = feature_id,
            strategy = strategy_name,
            waves = plan.waves.len(),
            "wave plan ready"
        );
        Ok(plan)
    }
}

/// Picks a strategy when the caller did not name one.
///
/// Exploratory work (names hinting at research) and tangled dependency shapes
/// get the progressive layout; large well-structured task lists get the
/// systematic one. The size threshold tightens as complexity grows.
pub fn suggest_strategy(tasks: &[TaskDescription], complexity: Complexity) -> &'static str {
    const EXPLORATORY: [&str; 3] = ["research", "investigat", "explor"];

    let exploratory = tasks.iter().any(|t| {
        let name = t.name.to_lowercase();
        EXPLORATORY.iter().any(|hint| name.contains(hint))
    });
    let tangled = tasks.iter().any(|t| t.depends_on.len() > 2);
    if exploratory || tangled {
        return PROGRESSIVE_STRATEGY;
    }

    let threshold = match complexity {
        Complexity::Simple => 10,
        Complexity::Standard => 6,
        Complexity::Complex => 4,
    };
    if tasks.len() > threshold {
        SYSTEMATIC_STRATEGY
    } else {
        PROGRESSIVE_STRATEGY
    }
}
