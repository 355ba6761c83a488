mod common;

use std::sync::Arc;

use cadence_core::api::{
    Complexity, Condition, DagOrchestrator, ExecutionContext, ExecutionMode, HookKind, HookPlugin,
    OrchestratorError, StopReason, UnitStatus,
};
use common::{config, optional, unit, Behavior, ScriptedExecutor};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn dag_runs_dependents_after_optional_failure() {
    // a <- b, a <- c; c fails but is optional, so the run succeeds with a
    // warning and both dependents complete.
    let executor = Arc::new(
        ScriptedExecutor::new().with("c", Behavior::Fail("lint crashed")),
    );
    let cfg = config(vec![
        unit("a", &[]),
        unit("b", &["a"]),
        optional(unit("c", &["a"])),
    ]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    assert!(summary.success);
    assert_eq!(summary.waves_executed, 2);
    assert_eq!(summary.result("b").unwrap().status, UnitStatus::Success);
    assert_eq!(summary.result("c").unwrap().status, UnitStatus::Failed);
    assert_eq!(summary.errors.len(), 0);
    assert!(summary.warnings.iter().any(|w| w.contains("optional unit 'c'")));
    assert_eq!(executor.calls()[0], "a");
}

#[tokio::test]
async fn required_failure_halts_before_dependents() {
    let executor = Arc::new(
        ScriptedExecutor::new().with("a", Behavior::Fail("compile error")),
    );
    let cfg = config(vec![unit("a", &[]), unit("b", &["a"])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    assert!(!summary.success);
    assert_eq!(summary.stop_reason, Some(StopReason::RequiredUnitFailed));
    assert!(summary.errors.iter().any(|e| e.contains("required unit 'a'")));
    assert!(!executor.was_called("b"));
    assert!(summary.result("b").is_none());
}

#[tokio::test]
async fn cycle_is_rejected_at_construction_naming_members() {
    let cfg = config(vec![
        unit("setup", &[]),
        unit("x", &["y"]),
        unit("y", &["x"]),
    ]);
    match DagOrchestrator::new(&cfg, Arc::new(ScriptedExecutor::new())) {
        Ok(_) => panic!("cyclic graph must be rejected"),
        Err(OrchestratorError::CycleDetected { members }) => {
            assert_eq!(members, vec!["x".to_string(), "y".to_string()]);
        }
        Err(other) => panic!("expected cycle error, got {other}"),
    }
}

#[tokio::test]
async fn condition_gate_skips_without_invoking_executor() {
    let executor = Arc::new(ScriptedExecutor::new());
    let mut security = unit("security-review", &[]);
    security.condition = "has-sensitive-files".parse::<Condition>().unwrap();
    let cfg = config(vec![security, unit("report", &["security-review"])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    // no sensitive files in the context
    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    assert!(summary.success);
    assert!(!executor.was_called("security-review"));
    assert_eq!(
        summary.result("security-review").unwrap().status,
        UnitStatus::Skipped
    );
    assert_eq!(summary.result("security-review").unwrap().verdict, "N/A");
    // a skipped dependency still unblocks its dependents
    assert_eq!(summary.result("report").unwrap().status, UnitStatus::Success);
}

#[tokio::test]
async fn condition_gate_fires_when_context_matches() {
    let executor = Arc::new(ScriptedExecutor::new());
    let mut security = unit("security-review", &[]);
    security.condition = "complexity>=complex".parse::<Condition>().unwrap();
    let cfg = config(vec![security]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    let ctx = ExecutionContext {
        complexity: Complexity::Complex,
        ..ExecutionContext::default()
    };
    let summary = orchestrator.execute(&ctx).await;

    assert!(executor.was_called("security-review"));
    assert_eq!(
        summary.result("security-review").unwrap().status,
        UnitStatus::Success
    );
}

#[tokio::test]
async fn parallel_mode_runs_everything_in_one_wave() {
    let executor = Arc::new(ScriptedExecutor::new());
    // dependencies are deliberately ignored in parallel mode
    let cfg = config(vec![unit("a", &[]), unit("b", &["a"]), unit("c", &["b"])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    let summary = orchestrator
        .execute_mode(&ExecutionContext::default(), ExecutionMode::Parallel)
        .await;

    assert!(summary.success);
    assert_eq!(summary.waves_executed, 1);
    assert_eq!(summary.results.len(), 3);
}

#[tokio::test]
async fn sequential_mode_is_one_unit_per_wave_in_dependency_order() {
    let executor = Arc::new(ScriptedExecutor::new());
    let cfg = config(vec![unit("c", &["b"]), unit("b", &["a"]), unit("a", &[])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    let summary = orchestrator
        .execute_mode(&ExecutionContext::default(), ExecutionMode::Sequential)
        .await;

    assert!(summary.success);
    assert_eq!(summary.waves_executed, 3);
    assert_eq!(executor.calls(), vec!["a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn global_timeout_abandons_inflight_units() {
    let executor = Arc::new(
        ScriptedExecutor::new().with("slow", Behavior::Sleep(std::time::Duration::from_secs(3600))),
    );
    let mut cfg = config(vec![unit("slow", &[]), unit("after", &["slow"])]);
    cfg.global_timeout_secs = 5;
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    assert!(!summary.success);
    assert_eq!(summary.stop_reason, Some(StopReason::GlobalTimeout));
    assert!(summary.errors.iter().any(|e| e.contains("abandoned")));
    assert!(!executor.was_called("after"));
}

#[tokio::test]
async fn stop_token_prevents_further_waves() {
    let executor = Arc::new(ScriptedExecutor::new());
    let cfg = config(vec![unit("a", &[])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor.clone()).unwrap();

    orchestrator.stop_token().stop();
    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    assert_eq!(summary.stop_reason, Some(StopReason::StopRequested));
    assert_eq!(summary.results.len(), 0);
    assert!(!executor.was_called("a"));
}

struct FaultyHook;

#[async_trait::async_trait]
impl HookPlugin for FaultyHook {
    async fn run_hook(&self, kind: HookKind, _payload: serde_json::Value) -> anyhow::Result<()> {
        anyhow::bail!("audit sink unavailable during {kind}")
    }
}

#[tokio::test]
async fn hook_failures_surface_as_run_warnings() {
    let executor = Arc::new(ScriptedExecutor::new());
    let cfg = config(vec![unit("a", &[])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor)
        .unwrap()
        .with_hooks(Arc::new(FaultyHook));

    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    // Hooks are observers: their failures never fail the run, but they must
    // land in the summary's warnings.
    assert!(summary.success);
    assert_eq!(summary.result("a").unwrap().status, UnitStatus::Success);
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("pre-agent hook failed")));
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("post-agent hook failed")));
}

#[tokio::test]
async fn verdicts_are_tallied_across_units() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .with(
                "a",
                Behavior::SucceedWith {
                    verdict: "approved",
                    created: vec![],
                    modified: vec![],
                },
            )
            .with(
                "b",
                Behavior::SucceedWith {
                    verdict: "approved",
                    created: vec![],
                    modified: vec![],
                },
            ),
    );
    let cfg = config(vec![unit("a", &[]), unit("b", &[])]);
    let orchestrator = DagOrchestrator::new(&cfg, executor).unwrap();

    let summary = orchestrator.execute(&ExecutionContext::default()).await;

    assert_eq!(summary.verdicts.get("approved"), Some(&2));
}
