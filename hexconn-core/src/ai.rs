//! Decision engine: immediate-win scan, iterative deepening, MTD(f)

use std::time::Duration;

use crate::alphabeta::{alpha_beta, Deadline, SearchContext, SearchTables};
use crate::board::{Board, Cell};
use crate::config::SearchConfig;
use crate::eval::{evaluate, WIN_SCORE};
use crate::game::{Player, Strategy};
use crate::ordering::HistoryTable;
use crate::scanner::find_immediate_win;
use crate::tt::TranspositionTable;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Upper bound on narrow-window passes per depth
const MAX_MTDF_PASSES: u32 = 64;

// ============================================================================
// SEARCH OUTCOME
// ============================================================================

/// Where a decision came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveSource {
    /// A move that completes the connection right away
    ImmediateWin,
    /// Result of the deepest completed search iteration
    Search,
    /// No iteration completed; nearest-to-center frontier move
    Fallback,
    /// The board has no legal moves
    NoMoves,
}

/// A decision plus the statistics behind it
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub best_move: Option<Cell>,
    /// Score of the completed search, or the static evaluation otherwise
    pub score: f32,
    /// Deepest completed iteration (0 when none completed)
    pub depth: u32,
    pub nodes: u64,
    pub tt_probes: u64,
    pub tt_hits: u64,
    pub elapsed: Duration,
    pub source: MoveSource,
}

/// Best move and value of one completed depth
#[derive(Clone, Copy, Debug)]
struct DepthResult {
    best_move: Option<Cell>,
    score: f32,
    depth: u32,
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

/// Time-bounded alpha-beta player
pub struct SearchEngine {
    player: Player,
    config: SearchConfig,
    tables: SearchTables,
}

impl SearchEngine {
    pub fn new(player: Player, config: SearchConfig) -> Self {
        Self {
            player,
            config,
            tables: SearchTables::default(),
        }
    }

    /// Engine with the default refinements and the given limits
    pub fn with_limits(player: Player, time_limit_secs: f64, max_depth: u32, aspiration_window: f32) -> Self {
        let config = SearchConfig::default()
            .with_time_limit(time_limit_secs)
            .with_max_depth(max_depth)
            .with_aspiration_window(aspiration_window);
        Self::new(player, config)
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// History weights gathered by the last decision
    pub fn history(&self) -> &HistoryTable {
        &self.tables.history
    }

    /// Transposition table filled by the last decision
    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tables.tt
    }

    /// Choose a move within the configured time budget.
    ///
    /// `None` only when the board has no legal moves.
    pub fn decide<B: Board>(&mut self, board: &mut B) -> Option<Cell> {
        self.decide_with_info(board).best_move
    }

    pub fn decide_with_info<B: Board>(&mut self, board: &mut B) -> SearchOutcome {
        let deadline = Deadline::after(self.config.time_budget());
        let outcome = self.run(board, self.config.max_depth, deadline);

        tracing::info!(
            player = %self.player,
            mv = ?outcome.best_move,
            score = outcome.score,
            depth = outcome.depth,
            nodes = outcome.nodes,
            source = ?outcome.source,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "decision"
        );
        outcome
    }

    /// Search to exactly `depth` with no time limit
    pub fn search_depth<B: Board>(&mut self, board: &mut B, depth: u32) -> SearchOutcome {
        self.run(board, depth, Deadline::unbounded())
    }

    /// Level 1: scan, deepen, fall back
    fn run<B: Board>(&mut self, board: &mut B, max_depth: u32, deadline: Deadline) -> SearchOutcome {
        self.tables.clear();

        if board.possible_moves().is_empty() {
            let score = self.static_score(board);
            return self.finish(None, score, 0, MoveSource::NoMoves, deadline);
        }

        if let Some(mv) = find_immediate_win(board, self.player) {
            tracing::debug!(%mv, "immediate win");
            return self.finish(Some(mv), WIN_SCORE, 0, MoveSource::ImmediateWin, deadline);
        }

        let (completed, nodes) = self.deepen(board, max_depth, deadline);

        let mut outcome = match completed {
            Some(DepthResult { best_move: Some(mv), score, depth }) => {
                self.finish(Some(mv), score, depth, MoveSource::Search, deadline)
            }
            _ => {
                tracing::debug!("no search depth completed, using fallback move");
                let mv = fallback_move(board);
                let score = self.static_score(board);
                self.finish(mv, score, 0, MoveSource::Fallback, deadline)
            }
        };
        outcome.nodes = nodes;
        outcome
    }

    /// Level 2: iterative deepening, keeping the last depth that finished in time
    fn deepen<B: Board>(&mut self, board: &mut B, max_depth: u32, deadline: Deadline) -> (Option<DepthResult>, u64) {
        let mut ctx = SearchContext::new(&self.config, self.player, deadline, &mut self.tables);
        let first_depth = if ctx.config.iterative_deepening { 1 } else { max_depth.max(1) };

        let mut completed: Option<DepthResult> = None;
        let mut guess = 0.0;

        for depth in first_depth..=max_depth {
            let result = search_iteration(&mut ctx, board, depth, guess);
            if ctx.timed_out {
                tracing::debug!(depth, "time budget exhausted, discarding partial iteration");
                break;
            }

            tracing::debug!(
                depth,
                score = result.score,
                mv = ?result.best_move,
                nodes = ctx.nodes,
                "iteration complete"
            );
            guess = result.score;
            completed = Some(result);
        }

        (completed, ctx.nodes)
    }

    fn static_score<B: Board>(&self, board: &B) -> f32 {
        evaluate(board, self.player, &self.config.weights)
    }

    fn finish(
        &self,
        best_move: Option<Cell>,
        score: f32,
        depth: u32,
        source: MoveSource,
        deadline: Deadline,
    ) -> SearchOutcome {
        SearchOutcome {
            best_move,
            score,
            depth,
            nodes: 0,
            tt_probes: self.tables.tt.probes(),
            tt_hits: self.tables.tt.hits(),
            elapsed: deadline.elapsed(),
            source,
        }
    }
}

impl<B: Board> Strategy<B> for SearchEngine {
    fn player(&self) -> Player {
        self.player
    }

    fn play(&mut self, board: &mut B) -> Option<Cell> {
        self.decide(board)
    }
}

// ============================================================================
// PER-DEPTH SEARCH (Level 3)
// ============================================================================

/// One iteration: converge with MTD(f) when enabled, then a full-window
/// pass for the definitive move and score
fn search_iteration<B: Board>(ctx: &mut SearchContext<'_>, board: &mut B, depth: u32, guess: f32) -> DepthResult {
    let converged = ctx.config.use_mtdf.then(|| mtdf(ctx, board, depth, guess));
    let (best_move, score) = alpha_beta(ctx, board, depth, f32::NEG_INFINITY, f32::INFINITY, true);
    if let Some(converged) = converged {
        tracing::trace!(depth, converged, score, "mtd(f) estimate against full window");
    }
    DepthResult { best_move, score, depth }
}

/// Narrow-window passes around `guess` until the value is bracketed.
///
/// A result at or below the window's lower edge is an upper bound on the
/// true value, at or above the upper edge a lower bound; a result strictly
/// inside is exact.
fn mtdf<B: Board>(ctx: &mut SearchContext<'_>, board: &mut B, depth: u32, guess: f32) -> f32 {
    let delta = ctx.config.aspiration_window;
    let mut lower = f32::NEG_INFINITY;
    let mut upper = f32::INFINITY;
    let mut g = guess;
    let mut passes = 0;

    while lower < upper && !ctx.timed_out && passes < MAX_MTDF_PASSES {
        passes += 1;
        let (window_low, window_high) = (g - delta, g + delta);
        let (_, value) = alpha_beta(ctx, board, depth, window_low, window_high, true);

        if value <= window_low {
            upper = value;
        } else if value >= window_high {
            lower = value;
        } else {
            lower = value;
            upper = value;
        }
        g = value;

        tracing::trace!(depth, pass = passes, window_low, window_high, value, lower, upper, "mtd(f) pass");
    }

    g
}

// ============================================================================
// FALLBACK (Level 4)
// ============================================================================

/// Empty cells next to any stone, nearest to the board center first
pub fn promising_moves<B: Board>(board: &B) -> Vec<Cell> {
    let size = board.size();
    let mut moves: Vec<Cell> = board
        .possible_moves()
        .into_iter()
        .filter(|cell| cell.neighbors(size).any(|n| !board.is_empty_cell(n)))
        .collect();
    moves.sort_by(|a, b| a.center_distance(size).total_cmp(&b.center_distance(size)));
    moves
}

/// Move used when no search iteration completed
pub fn fallback_move<B: Board>(board: &B) -> Option<Cell> {
    promising_moves(board)
        .first()
        .copied()
        .or_else(|| board.possible_moves().first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HexBoard;

    #[test]
    fn test_decide_takes_immediate_win() {
        let mut board = HexBoard::from_rows(&["2...", "11.1", "2...", "...2"]).unwrap();
        let mut engine = SearchEngine::new(Player::One, SearchConfig::default().with_max_depth(2));
        let outcome = engine.decide_with_info(&mut board);
        assert_eq!(outcome.best_move, Some(Cell::new(1, 2)));
        assert_eq!(outcome.source, MoveSource::ImmediateWin);
        assert_eq!(outcome.score, WIN_SCORE);
    }

    #[test]
    fn test_no_moves_returns_none() {
        let mut board = HexBoard::from_rows(&["12", "21"]).unwrap();
        let mut engine = SearchEngine::new(Player::One, SearchConfig::default());
        let outcome = engine.decide_with_info(&mut board);
        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.source, MoveSource::NoMoves);
        assert_eq!(outcome.score, evaluate(&board, Player::One, &engine.config().weights));
    }

    #[test]
    fn test_zero_budget_uses_frontier() {
        let mut board = HexBoard::from_rows(&["1....", ".....", ".....", ".....", "....2"]).unwrap();
        let before = board.clone();
        let mut engine = SearchEngine::new(Player::One, SearchConfig::default().with_time_limit(0.0));
        let outcome = engine.decide_with_info(&mut board);

        assert_eq!(outcome.source, MoveSource::Fallback);
        assert_eq!(outcome.depth, 0);
        assert_eq!(outcome.score, evaluate(&board, Player::One, &engine.config().weights));
        let mv = outcome.best_move.unwrap();
        assert_eq!(mv, promising_moves(&board)[0]);
        assert!(mv.neighbors(5).any(|n| !board.is_empty_cell(n)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_zero_budget_empty_board_takes_first_move() {
        let mut board = HexBoard::new(4).unwrap();
        let mut engine = SearchEngine::with_limits(Player::Two, 0.0, 3, 10.0);
        assert_eq!(engine.decide(&mut board), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_promising_moves_sorted_by_center_distance() {
        let board = HexBoard::from_rows(&["1....", ".....", ".....", ".....", "....."]).unwrap();
        let moves = promising_moves(&board);
        assert_eq!(moves, vec![Cell::new(0, 1), Cell::new(1, 0)]);

        let board = HexBoard::from_rows(&[".....", ".....", "..1..", ".....", "....."]).unwrap();
        let moves = promising_moves(&board);
        assert_eq!(moves.len(), 6);
        let distances: Vec<f32> = moves.iter().map(|m| m.center_distance(5)).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_decide_returns_legal_move() {
        let mut board = HexBoard::from_rows(&["....", ".1..", "..2.", "...."]).unwrap();
        let before = board.clone();
        let mut engine = SearchEngine::new(Player::Two, SearchConfig::default().with_max_depth(2));
        let outcome = engine.decide_with_info(&mut board);
        let mv = outcome.best_move.unwrap();
        assert!(before.is_empty_cell(mv));
        assert_eq!(outcome.source, MoveSource::Search);
        assert_eq!(outcome.depth, 2);
        assert!(outcome.nodes > 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_blocks_single_threat() {
        // Player two wins at (2, 0) unless player one takes it first
        let mut board = HexBoard::from_rows(&["2...", "2...", "....", "2.1."]).unwrap();
        let mut engine = SearchEngine::new(Player::One, SearchConfig::default().with_max_depth(2));
        assert_eq!(engine.decide(&mut board), Some(Cell::new(2, 0)));
    }

    #[test]
    fn test_history_reset_between_decisions() {
        let config = SearchConfig::default().with_max_depth(2);
        let mut first = HexBoard::from_rows(&["1...", "....", "....", "...."]).unwrap();
        let mut second = HexBoard::from_rows(&["....", "....", ".2..", "...1"]).unwrap();

        let mut reused = SearchEngine::new(Player::Two, config.clone());
        reused.decide(&mut first);
        assert!(!reused.history().is_empty());
        reused.decide(&mut second);

        let mut fresh = SearchEngine::new(Player::Two, config);
        fresh.decide(&mut second);

        let mut reused_weights: Vec<_> = reused.history().iter().collect();
        let mut fresh_weights: Vec<_> = fresh.history().iter().collect();
        reused_weights.sort();
        fresh_weights.sort();
        assert_eq!(reused_weights, fresh_weights);
    }

    #[test]
    fn test_without_iterative_deepening_searches_max_depth_only() {
        let mut board = HexBoard::from_rows(&["...", ".1.", "..."]).unwrap();
        let mut engine = SearchEngine::new(Player::Two, SearchConfig::plain(2).with_time_limit(60.0));
        let outcome = engine.decide_with_info(&mut board);
        assert_eq!(outcome.depth, 2);
        assert_eq!(outcome.source, MoveSource::Search);
        assert!(engine.transposition_table().is_empty());

        let mut tables = SearchTables::default();
        let config = engine.config().clone();
        let mut ctx = SearchContext::new(&config, Player::Two, Deadline::unbounded(), &mut tables);
        let (mv, score) = alpha_beta(&mut ctx, &mut board, 2, f32::NEG_INFINITY, f32::INFINITY, true);
        assert_eq!((outcome.best_move, outcome.score), (mv, score));
    }
}
