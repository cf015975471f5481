//! Decide command - pick a move for a saved position

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexconn_core::{Board, HexBoard, MoveSource, Player, SearchConfig, SearchEngine, SearchOutcome};

#[derive(Args)]
pub struct DecideArgs {
    /// Board JSON file (`{ "rows": [".1..", ...] }`)
    #[arg(long, value_name = "FILE")]
    pub board: PathBuf,

    /// Side to move: one (left-right) or two (top-bottom)
    #[arg(long)]
    pub player: Player,

    /// Search configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Time budget in seconds (overrides the config file)
    #[arg(long)]
    pub time: Option<f64>,

    /// Maximum search depth (overrides the config file)
    #[arg(long)]
    pub depth: Option<u32>,

    /// Output the decision as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run decide command
pub fn run(args: DecideArgs) -> Result<()> {
    let mut board = HexBoard::load(&args.board)?;
    let config = load_config(&args)?;

    tracing::info!(
        "Deciding for player {} on a {}x{} board (depth={}, time={}s)",
        args.player,
        board.size(),
        board.size(),
        config.max_depth,
        config.time_limit_secs
    );

    let mut engine = SearchEngine::new(args.player, config);
    let outcome = engine.decide_with_info(&mut board);

    if args.json {
        print_json(&outcome)?;
    } else {
        print_text(&board, &outcome);
    }
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
pub fn load_config(args: &DecideArgs) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    if let Some(time) = args.time {
        config.time_limit_secs = time;
    }
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    config.validate().context("Invalid search configuration")?;
    Ok(config)
}

fn print_json(outcome: &SearchOutcome) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonDecision {
        row: Option<u8>,
        col: Option<u8>,
        score: f32,
        depth: u32,
        nodes: u64,
        tt_hits: u64,
        elapsed_ms: u64,
        source: String,
    }

    let output = JsonDecision {
        row: outcome.best_move.map(|mv| mv.row),
        col: outcome.best_move.map(|mv| mv.col),
        score: outcome.score,
        depth: outcome.depth,
        nodes: outcome.nodes,
        tt_hits: outcome.tt_hits,
        elapsed_ms: outcome.elapsed.as_millis() as u64,
        source: format!("{:?}", outcome.source),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(board: &HexBoard, outcome: &SearchOutcome) {
    println!("{}", board);
    match outcome.best_move {
        Some(mv) => println!("Move:   {}", mv),
        None => println!("Move:   none (board is full)"),
    }
    println!("Score:  {:.2}", outcome.score);
    match outcome.source {
        MoveSource::Search => println!("Depth:  {}", outcome.depth),
        MoveSource::ImmediateWin => println!("Depth:  immediate win"),
        MoveSource::Fallback => println!("Depth:  none completed, frontier fallback"),
        MoveSource::NoMoves => {}
    }
    println!(
        "Nodes:  {} ({} transposition hits) in {:.2?}",
        outcome.nodes, outcome.tt_hits, outcome.elapsed
    );
}
