//! Play command - one game between the engine and an opponent
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_players(), play_game(), report_result()
//! - Level 3: single turns
//! - Level 4: formatting utilities

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hexconn_core::{
    game_result, Cell, GameResult, HexBoard, Player, RandomPlayer, SearchConfig, SearchEngine, Strategy,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Opponent {
    /// A second search engine with the same settings
    Engine,
    /// Uniformly random legal moves
    Random,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Board side length
    #[arg(long, default_value = "7")]
    pub size: usize,

    /// Who the engine plays against
    #[arg(long, value_enum, default_value = "random")]
    pub opponent: Opponent,

    /// Side the engine plays (player one moves first)
    #[arg(long, default_value = "one")]
    pub engine_player: Player,

    /// Time budget per move in seconds
    #[arg(long, default_value = "2.0")]
    pub time: f64,

    /// Maximum search depth
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Output the game record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Finished game
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub result: GameResult,
    pub moves: Vec<(Player, Cell)>,
    pub final_board: HexBoard,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build both players
/// 2. Play until someone connects
/// 3. Report the result
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = SearchConfig::default()
        .with_time_limit(args.time)
        .with_max_depth(args.depth);
    config.validate()?;

    let mut rng = create_rng(seed);
    let board = HexBoard::new(args.size)?;
    let (mut first, mut second) = build_players(&args, config, &mut rng);

    tracing::info!(
        "Starting game on {}x{}: engine plays {} against {:?}",
        args.size,
        args.size,
        args.engine_player,
        args.opponent
    );

    let record = play_game(board, first.as_mut(), second.as_mut())?;
    report_result(&record, args.json);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

type BoxedStrategy = Box<dyn Strategy<HexBoard>>;

/// Players in move order (player one first)
fn build_players(args: &PlayArgs, config: SearchConfig, rng: &mut ChaCha8Rng) -> (BoxedStrategy, BoxedStrategy) {
    let engine_side = args.engine_player;
    let other_side = engine_side.opponent();

    let engine: BoxedStrategy = Box::new(SearchEngine::new(engine_side, config.clone()));
    let other: BoxedStrategy = match args.opponent {
        Opponent::Engine => Box::new(SearchEngine::new(other_side, config)),
        Opponent::Random => Box::new(RandomPlayer::new(other_side, rng.gen())),
    };

    match engine_side {
        Player::One => (engine, other),
        Player::Two => (other, engine),
    }
}

/// Alternate turns until a connection is made or the board fills up
pub fn play_game<'a>(
    mut board: HexBoard,
    first: &'a mut dyn Strategy<HexBoard>,
    second: &'a mut dyn Strategy<HexBoard>,
) -> Result<GameRecord> {
    let mut moves = Vec::new();
    let mut players = [first, second];
    let mut turn = 0;

    while game_result(&board) == GameResult::Ongoing {
        let player = &mut players[turn % 2];
        let side = player.player();
        let Some(mv) = player.play(&mut board) else {
            break;
        };
        if let Err(e) = board.play(mv, side) {
            bail!("Player {} chose an illegal move: {}", side, e);
        }
        tracing::debug!("Move {}: {} plays {}", turn + 1, side, mv);
        moves.push((side, mv));
        turn += 1;
    }

    Ok(GameRecord {
        result: game_result(&board),
        moves,
        final_board: board,
    })
}

/// Report the finished game
fn report_result(record: &GameRecord, json: bool) {
    if json {
        print_json_result(record);
    } else {
        print_text_result(record);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn print_json_result(record: &GameRecord) {
    #[derive(serde::Serialize)]
    struct JsonMove {
        player: Player,
        row: u8,
        col: u8,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        winner: Option<Player>,
        total_moves: usize,
        moves: Vec<JsonMove>,
        final_board: Vec<String>,
    }

    let output = JsonOutput {
        winner: record.result.winner(),
        total_moves: record.moves.len(),
        moves: record
            .moves
            .iter()
            .map(|&(player, mv)| JsonMove {
                player,
                row: mv.row,
                col: mv.col,
            })
            .collect(),
        final_board: record.final_board.to_snapshot().rows,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_result(record: &GameRecord) {
    println!("\n=== Game Result ===");
    println!("{}", record.final_board);
    match record.result.winner() {
        Some(winner) => println!("Winner: player {} after {} moves", winner, record.moves.len()),
        None => println!("No winner after {} moves", record.moves.len()),
    }
    println!("\nMoves:");
    for (i, (player, mv)) in record.moves.iter().enumerate() {
        println!("  {:>3}. {} {}", i + 1, player, mv);
    }
}

// ============================================================================
// TESTS
// ============================================================================
