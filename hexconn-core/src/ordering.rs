//! Move ordering: killer moves, history heuristic, defensive lookahead
//!
//! Good ordering makes alpha-beta cut earlier; it never changes the value a
//! search returns.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::board::{Board, Cell};
use crate::config::SearchConfig;
use crate::eval::bounded_distance;
use crate::game::Player;

// ============================================================================
// KILLER MOVES
// ============================================================================

/// Most recent cutoff move per remaining depth
#[derive(Clone, Debug, Default)]
pub struct KillerTable {
    moves: FxHashMap<u32, Cell>,
}

impl KillerTable {
    pub fn record(&mut self, depth: u32, mv: Cell) {
        self.moves.insert(depth, mv);
    }

    pub fn get(&self, depth: u32) -> Option<Cell> {
        self.moves.get(&depth).copied()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }
}

// ============================================================================
// HISTORY HEURISTIC
// ============================================================================

/// Cumulative weight of moves that improved a node's best value
#[derive(Clone, Debug, Default)]
pub struct HistoryTable {
    weights: FxHashMap<Cell, u64>,
}

impl HistoryTable {
    /// Credit a move that improved the best value at a node `depth` plies
    /// from the horizon
    pub fn reward(&mut self, mv: Cell, depth: u32) {
        let weight = self.weights.entry(mv).or_insert(0);
        *weight = weight.saturating_add(depth as u64);
    }

    pub fn weight(&self, mv: Cell) -> u64 {
        self.weights.get(&mv).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, u64)> + '_ {
        self.weights.iter().map(|(&mv, &w)| (mv, w))
    }

    pub fn clear(&mut self) {
        self.weights.clear();
    }
}

// ============================================================================
// ORDERING
// ============================================================================

/// How attractive `mv` would be for the opponent of `mover`: the negated
/// opponent path distance after the opponent claims it.
///
/// Works on a clone so the caller's board is never touched.
pub fn defensive_score<B: Board>(board: &B, mv: Cell, mover: Player) -> f32 {
    let opponent = mover.opponent();
    let mut probe = board.clone();
    probe.place_piece(mv, opponent);
    -bounded_distance(&probe, opponent)
}

/// Order `moves` for the side `mover` at a node `depth` plies from the
/// horizon.
///
/// The killer move for the depth, when present, goes first; the rest are
/// stable-sorted by descending history weight, then descending defensive
/// score.
pub fn order_moves<B: Board>(
    board: &B,
    moves: &mut Vec<Cell>,
    depth: u32,
    mover: Player,
    killers: &KillerTable,
    history: &HistoryTable,
    config: &SearchConfig,
) {
    let killer = if config.use_killer_moves {
        killers
            .get(depth)
            .and_then(|k| moves.iter().position(|&mv| mv == k))
            .map(|idx| moves.remove(idx))
    } else {
        None
    };

    if config.use_history || config.use_defensive_ordering {
        let mut keyed: Vec<(Cell, u64, f32)> = moves
            .iter()
            .map(|&mv| {
                let hist = if config.use_history { history.weight(mv) } else { 0 };
                let defense = if config.use_defensive_ordering {
                    defensive_score(board, mv, mover)
                } else {
                    0.0
                };
                (mv, hist, defense)
            })
            .collect();

        keyed.sort_by(|a, b| compare_keys(b, a));
        moves.clear();
        moves.extend(keyed.into_iter().map(|(mv, _, _)| mv));
    }

    if let Some(killer) = killer {
        moves.insert(0, killer);
    }
}

fn compare_keys(a: &(Cell, u64, f32), b: &(Cell, u64, f32)) -> Ordering {
    a.1.cmp(&b.1).then_with(|| a.2.total_cmp(&b.2))
}
