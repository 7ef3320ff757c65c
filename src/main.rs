use std::process::ExitCode;

use dispatch_planner::storage::config::Config;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{USAGE, parse_cli_mode, run};

fn main() -> anyhow::Result<ExitCode> {
    setup_logging();

    let args = match parse_cli_mode() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    if let Err(e) = run(args) {
        tracing::error!("Command failed: {:#}", e);
        return Err(e);
    }

    Ok(ExitCode::SUCCESS)
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "dispatch-planner.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("DISPATCH_PLANNER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("dispatch-planner started");
}
