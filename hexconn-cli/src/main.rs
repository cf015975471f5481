//! hexconn CLI - Command-line interface
//!
//! Commands:
//! - decide: Choose a move for a saved position
//! - play: Play one game to completion

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod decide_cmd;
mod play_cmd;

#[derive(Parser)]
#[command(name = "hexconn")]
#[command(about = "Alpha-beta engine for a hex connection game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose a move for a position loaded from JSON
    Decide(decide_cmd::DecideArgs),
    /// Play a full game and report the result
    Play(play_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decide(args) => decide_cmd::run(args),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
    }
}
