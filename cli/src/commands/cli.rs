use std::path::PathBuf;

use cadence_core::api::{Complexity, ExecutionMode};
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cadence", about = "Agent and wave orchestration engine")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit pretty-printed JSON instead of compact.
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured agents over their dependency graph.
    Run(RunArgs),
    /// Plan waves for a task list without executing anything.
    Plan(PlanArgs),
    /// Plan waves for a task list and execute them.
    Waves(WavesArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// TOML config overlaying the built-in agent defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured execution mode.
    /// - sequential: one agent at a time, dependency order
    /// - parallel: everything at once
    /// - dag: dependency-driven waves
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<ExecutionMode>,

    #[arg(long, value_parser = parse_complexity, default_value = "standard")]
    pub complexity: Complexity,

    /// File the run should treat as sensitive. Can be specified multiple times.
    #[arg(long = "sensitive-file", action = clap::ArgAction::Append)]
    pub sensitive_files: Vec<String>,

    #[arg(long, default_value = "adhoc")]
    pub feature: String,

    /// Command line used to execute each agent; `{name}` expands to the
    /// agent name. Omitting it dry-runs with a no-op executor.
    #[arg(long)]
    pub exec: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    /// JSON file holding the task descriptions to plan.
    #[arg(long)]
    pub tasks: PathBuf,

    /// Strategy name; omitted means suggest one from the task shape.
    #[arg(long)]
    pub strategy: Option<String>,

    #[arg(long, value_parser = parse_complexity, default_value = "standard")]
    pub complexity: Complexity,

    /// Pause for confirmation between waves during execution.
    #[arg(long)]
    pub safe_mode: bool,

    #[arg(long, default_value = "adhoc")]
    pub feature: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WavesArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Command line used to execute each task; `{name}` expands to the
    /// task name. Omitting it dry-runs with a no-op executor.
    #[arg(long)]
    pub exec: Option<String>,
}

fn parse_mode(s: &str) -> Result<ExecutionMode, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_complexity(s: &str) -> Result<Complexity, String> {
    s.parse().map_err(|e| format!("{e}"))
}
