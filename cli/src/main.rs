use std::io::IsTerminal;

use cadence_core::api::{default_config, load_with_defaults, ConfigError, LoggingConfig};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;

use commands::cli;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> anyhow::Result<i32> {
    let args = cli::Args::parse();

    // The run command may override logging via its config file; the planning
    // commands log with the defaults.
    let logging = match &args.command {
        cli::Commands::Run(run) => load_with_defaults(run.config.as_deref())?.logging,
        _ => default_config().logging,
    };
    init_tracing(&logging).map_err(anyhow::Error::msg)?;

    match args.command {
        cli::Commands::Run(run_args) => app::run(run_args, args.pretty).await,
        cli::Commands::Plan(plan_args) => app::plan(plan_args, args.pretty).await,
        cli::Commands::Waves(waves_args) => app::waves(waves_args, args.pretty).await,
    }
}

fn exit_code_for_error(e: &anyhow::Error) -> i32 {
    // 0: success
    // 1: run finished with failures (returned as a normal exit code)
    // 11: config error
    // 20: IO error
    // 50: internal/uncategorized
    if e.downcast_ref::<ConfigError>().is_some() {
        11
    } else if e.downcast_ref::<std::io::Error>().is_some() {
        20
    } else {
        50
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("cadence"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("cadence.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
