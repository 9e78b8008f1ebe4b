use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "inputcap",
    about = "Capture input into per-frame snapshots",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (default: nearest .inputcap/config.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a recorded event script through the capture loop
    Replay {
        /// Path to the .toml script
        script: PathBuf,
        /// Pace cycles at the configured target_fps instead of as fast as possible
        #[arg(long)]
        realtime: bool,
        /// Print snapshots as TOML instead of one line per cycle
        #[arg(long)]
        toml: bool,
        /// After the run, list the snapshots still retained (see `history` in the config)
        #[arg(long)]
        history: bool,
    },
    /// Capture terminal input live and show each snapshot
    Monitor,
    /// Print the resolved configuration
    Config,
}
