#![forbid(unsafe_code)]

//! healthwatch: one-shot deployment health monitor.
//!
//! Intended for periodic invocation by an external scheduler; a no-argument
//! invocation runs with defaults plus `deploy.env` when present. Exit codes:
//! 0 healthy (or skipped because a pass is already running), 1 unhealthy,
//! 2 fatal internal error.

use clap::Parser;
use healthwatch_lib::config::ConfigLoader;
use healthwatch_lib::models::OverallStatus;
use healthwatch_lib::monitor::Monitor;
use healthwatch_lib::runlock::{LockError, RunLock};
use healthwatch_lib::telemetry;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "healthwatch")]
#[command(about = "Deployment health monitor: probes, aggregation, alerting")]
#[command(version)]
struct Cli {
    /// Deployment parameter file (key=value); defaults to deploy.env when present
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Directory for the primary log, alert log, and run lock
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

const EXIT_UNHEALTHY: u8 = 1;
const EXIT_FATAL: u8 = 2;

enum RunOutcome {
    Completed(OverallStatus),
    SkippedLocked,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(RunOutcome::Completed(OverallStatus::Healthy)) | Ok(RunOutcome::SkippedLocked) => {
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Completed(OverallStatus::Unhealthy)) => ExitCode::from(EXIT_UNHEALTHY),
        Err(err) => {
            eprintln!("healthwatch: fatal: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let loader = match &cli.env_file {
        Some(path) => ConfigLoader::with_env_file(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(dir) = cli.log_dir {
        config.logging.dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Guard held for the whole run so the log is flushed on every exit path.
    let _log_guard = telemetry::init(&config.logging.dir, &config.logging.level)?;

    let lock_path = config.logging.dir.join(telemetry::LOCK_FILE);
    let _lock = match RunLock::acquire(&lock_path) {
        Ok(lock) => lock,
        Err(LockError::Busy { .. }) => {
            warn!("previous run still in progress, skipping this pass");
            return Ok(RunOutcome::SkippedLocked);
        }
        Err(err) => return Err(err.into()),
    };

    let monitor = Monitor::new(config);
    let report = monitor.run().await;
    info!(
        status = %report.overall_status,
        failed = report.failed_probes.len(),
        "monitoring pass complete"
    );
    Ok(RunOutcome::Completed(report.overall_status))
}
