use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use cadence_core::api::{
    default_config, load_with_defaults, suggest_strategy, BreakpointPlugin, ExecutionContext,
    StrategyRegistry, TaskDescription, Wave, WaveContext, WaveOrchestrator, WavePlan, WavePlanner,
};
use cadence_plugins::factory::{build_executor, build_strategy_registry};
use cadence_plugins::hooks::TracingHookPlugin;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::commands::cli;

pub async fn run(args: cli::RunArgs, pretty: bool) -> anyhow::Result<i32> {
    let mut cfg = load_with_defaults(args.config.as_deref())?;
    if let Some(mode) = args.mode {
        cfg.mode = mode;
    }

    let ctx = ExecutionContext {
        feature_id: args.feature.clone(),
        complexity: args.complexity,
        sensitive_files: args.sensitive_files.clone(),
        extra: serde_json::Value::Null,
    };

    let executor = build_executor(args.exec.as_deref());
    let orchestrator = cadence_core::api::DagOrchestrator::new(&cfg, executor)?
        .with_hooks(Arc::new(TracingHookPlugin));

    let summary = orchestrator.execute(&ctx).await;
    print_json(&summary, pretty)?;
    Ok(if summary.success { 0 } else { 1 })
}

pub async fn plan(args: cli::PlanArgs, pretty: bool) -> anyhow::Result<i32> {
    let registry = build_strategy_registry();
    let plan = build_plan(&args, &registry)?;
    print_json(&plan, pretty)?;
    Ok(0)
}

pub async fn waves(args: cli::WavesArgs, pretty: bool) -> anyhow::Result<i32> {
    let registry = build_strategy_registry();
    let plan = build_plan(&args.plan, &registry)?;
    let strategy = registry.resolve(&plan.strategy)?;

    let cfg = default_config();
    let ctx = ExecutionContext {
        feature_id: plan.feature_id.clone(),
        complexity: plan.complexity,
        sensitive_files: Vec::new(),
        extra: serde_json::Value::Null,
    };

    let mut orchestrator = WaveOrchestrator::new(build_executor(args.exec.as_deref()), strategy)
        .with_hooks(Arc::new(TracingHookPlugin))
        .with_wave_timeout(Duration::from_secs(cfg.wave_timeout_secs))
        .with_hook_timeout(Duration::from_secs(cfg.hook_timeout_secs))
        .with_max_parallel(cfg.max_parallel);
    if plan.safe_mode {
        orchestrator = orchestrator.with_breakpoint(Arc::new(ConsoleBreakpoint));
    }

    let result = orchestrator.execute(&plan, &ctx).await;
    print_json(&result, pretty)?;
    Ok(if result.success { 0 } else { 1 })
}

fn build_plan(args: &cli::PlanArgs, registry: &StrategyRegistry) -> anyhow::Result<WavePlan> {
    let raw = std::fs::read_to_string(&args.tasks)
        .with_context(|| format!("reading task file {}", args.tasks.display()))?;
    let tasks: Vec<TaskDescription> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing task file {}", args.tasks.display()))?;

    let strategy_name = match &args.strategy {
        Some(name) => name.clone(),
        None => {
            let suggested = suggest_strategy(&tasks, args.complexity);
            info!(strategy = suggested, "no strategy given, suggesting one");
            suggested.to_string()
        }
    };

    let plan = WavePlanner::new(registry.clone()).plan(
        &args.feature,
        &tasks,
        &strategy_name,
        args.complexity,
        args.safe_mode,
    )?;
    Ok(plan)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Breakpoint that asks on the terminal whether to start the next wave.
/// Empty input or anything starting with `y` continues; everything else
/// cancels the run.
struct ConsoleBreakpoint;

#[async_trait]
impl BreakpointPlugin for ConsoleBreakpoint {
    async fn confirm(&self, wave: &Wave, ctx: &WaveContext) -> anyhow::Result<bool> {
        eprintln!(
            "wave '{}' done ({} issues so far). continue? [Y/n] ",
            wave.name,
            ctx.issues().len()
        );
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader.read_line(&mut line).await?;
        let answer = line.trim().to_ascii_lowercase();
        Ok(answer.is_empty() || answer.starts_with('y'))
    }
}
