//! Alpha-beta minimax with transposition lookups
//!
//! The engine's own turns maximize and the opponent's minimize, always scored
//! from the engine's perspective. Values are fail-soft: a result at or below
//! alpha is an upper bound, at or above beta a lower bound.

use std::time::{Duration, Instant};

use crate::board::{AppliedMove, Board, Cell};
use crate::config::SearchConfig;
use crate::eval::evaluate;
use crate::game::Player;
use crate::ordering::{order_moves, HistoryTable, KillerTable};
use crate::tt::{Bound, TranspositionTable, TtEntry};

// ============================================================================
// SEARCH STATE
// ============================================================================

/// Wall-clock limit polled at every node
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    pub fn expired(&self) -> bool {
        self.budget.map_or(false, |budget| self.start.elapsed() >= budget)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Caches that live for exactly one decision
#[derive(Debug, Default)]
pub struct SearchTables {
    pub tt: TranspositionTable,
    pub killers: KillerTable,
    pub history: HistoryTable,
}

impl SearchTables {
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }
}

/// Everything a search node needs besides the board
pub struct SearchContext<'a> {
    pub config: &'a SearchConfig,
    /// The side the engine plays; scores are from its perspective
    pub me: Player,
    pub deadline: Deadline,
    pub tables: &'a mut SearchTables,
    /// Nodes visited
    pub nodes: u64,
    /// Set once any node has seen the deadline pass
    pub timed_out: bool,
}

impl<'a> SearchContext<'a> {
    pub fn new(config: &'a SearchConfig, me: Player, deadline: Deadline, tables: &'a mut SearchTables) -> Self {
        Self {
            config,
            me,
            deadline,
            tables,
            nodes: 0,
            timed_out: false,
        }
    }

    fn evaluate<B: Board>(&self, board: &B) -> f32 {
        evaluate(board, self.me, &self.config.weights)
    }

    fn check_time(&mut self) -> bool {
        if !self.timed_out && self.deadline.expired() {
            self.timed_out = true;
        }
        self.timed_out
    }
}

// ============================================================================
// ALPHA-BETA
// ============================================================================

/// Search `board` to `depth` plies within `[alpha, beta]`.
///
/// Returns the best move found (none at leaves and cutoffs) and its value.
/// The board is unchanged on return, including when the deadline hits.
pub fn alpha_beta<B: Board>(
    ctx: &mut SearchContext<'_>,
    board: &mut B,
    depth: u32,
    mut alpha: f32,
    mut beta: f32,
    maximizing: bool,
) -> (Option<Cell>, f32) {
    ctx.nodes += 1;

    if ctx.check_time() {
        return (None, ctx.evaluate(board));
    }
    if depth == 0 || board.check_connection(Player::One) || board.check_connection(Player::Two) {
        return (None, ctx.evaluate(board));
    }

    let (original_alpha, original_beta) = (alpha, beta);
    let key = ctx.config.use_transposition_table.then(|| board.position_key());

    if let Some(key) = key.as_deref() {
        if let Some(entry) = ctx.tables.tt.probe(key, depth) {
            match entry.bound {
                Bound::Exact => return (entry.best_move, entry.value),
                Bound::Lower => alpha = alpha.max(entry.value),
                Bound::Upper => beta = beta.min(entry.value),
            }
            if alpha >= beta {
                return (entry.best_move, entry.value);
            }
        }
    }

    let side = if maximizing { ctx.me } else { ctx.me.opponent() };
    let mut moves = board.possible_moves();
    if moves.is_empty() {
        return (None, ctx.evaluate(board));
    }
    order_moves(
        board,
        &mut moves,
        depth,
        side,
        &ctx.tables.killers,
        &ctx.tables.history,
        ctx.config,
    );

    let mut best_move = None;
    let mut best_value = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };

    for mv in moves {
        let (_, value) = {
            let mut child = AppliedMove::new(&mut *board, mv, side);
            alpha_beta(ctx, &mut *child, depth - 1, alpha, beta, !maximizing)
        };

        let improved = if maximizing { value > best_value } else { value < best_value };
        if improved {
            best_value = value;
            best_move = Some(mv);
            ctx.tables.history.reward(mv, depth);
        }

        if maximizing {
            alpha = alpha.max(best_value);
        } else {
            beta = beta.min(best_value);
        }
        if beta <= alpha {
            ctx.tables.killers.record(depth, mv);
            break;
        }
    }

    // Values from a timed-out subtree are static guesses, not search results
    if let Some(key) = key {
        if !ctx.timed_out {
            ctx.tables.tt.store(
                key,
                TtEntry {
                    value: best_value,
                    depth,
                    bound: Bound::classify(best_value, original_alpha, original_beta),
                    best_move,
                },
            );
        }
    }

    (best_move, best_value)
}
