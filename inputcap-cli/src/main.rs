mod cli;
mod commands;
mod config;
mod script;
mod state;
mod term_backend;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Command};
use crate::config::CaptureConfig;

#[derive(Debug, PartialEq)]
enum LogDestination {
    Stderr,
    File(PathBuf),
    /// Monitor with nowhere to write: drop everything, RUST_LOG included.
    Discard,
}

/// The monitor owns the terminal, so its log never goes to stderr.
fn log_destination(monitor: bool, log_path: Option<PathBuf>) -> LogDestination {
    match (monitor, log_path) {
        (false, _) => LogDestination::Stderr,
        (true, Some(path)) => LogDestination::File(path),
        (true, None) => LogDestination::Discard,
    }
}

fn init_logging(verbose: u8, command: &Command, config: &CaptureConfig) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    let monitor = matches!(command, Command::Monitor);
    let log_path = if monitor { config.monitor_log_path() } else { None };
    match log_destination(monitor, log_path) {
        LogDestination::Stderr => {}
        LogDestination::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        LogDestination::Discard => {
            builder
                .filter_level(LevelFilter::Off)
                .target(env_logger::Target::Pipe(Box::new(io::sink())));
        }
    }

    builder.try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let resolved = config::resolve_config(cli.config.as_deref())?;
    init_logging(cli.verbose, &cli.command, &resolved.config)?;
    log::debug!("configuration from {}", resolved.source.describe());

    match cli.command {
        Command::Replay {
            script,
            realtime,
            toml,
            history,
        } => commands::replay_cmd::run(&script, realtime, toml, history, resolved).await,
        Command::Monitor => commands::monitor_cmd::run(resolved).await,
        Command::Config => commands::config_cmd::run(resolved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_logs_to_stderr() {
        assert_eq!(log_destination(false, None), LogDestination::Stderr);
        assert_eq!(
            log_destination(false, Some(PathBuf::from("/tmp/x.log"))),
            LogDestination::Stderr
        );
    }

    #[test]
    fn test_monitor_never_logs_to_stderr() {
        assert_eq!(
            log_destination(true, Some(PathBuf::from("/tmp/monitor.log"))),
            LogDestination::File(PathBuf::from("/tmp/monitor.log"))
        );
        assert_eq!(log_destination(true, None), LogDestination::Discard);
    }
}
