//! hexconn core - search engine for a hex connection game
//!
//! This crate provides:
//! - Board geometry and the board contract the engine consumes
//! - Static evaluation from shortest-path potentials
//! - Transposition table and move ordering heuristics
//! - Alpha-beta search driven by iterative deepening and MTD(f)

pub mod board;
pub mod game;
pub mod eval;
pub mod config;
pub mod tt;
pub mod ordering;
pub mod scanner;
pub mod alphabeta;
pub mod ai;

// Re-exports for convenient access
pub use board::{AppliedMove, Board, BoardError, BoardSnapshot, Cell, HexBoard, MAX_BOARD_SIZE};
pub use game::{game_result, GameResult, Player, RandomPlayer, Strategy};
pub use eval::{evaluate, shortest_path_distance, EvalWeights, LOSS_SCORE, WIN_SCORE};
pub use config::{ConfigError, SearchConfig};
pub use tt::{Bound, TranspositionTable, TtEntry};
pub use scanner::find_immediate_win;
pub use ai::{MoveSource, SearchEngine, SearchOutcome};
