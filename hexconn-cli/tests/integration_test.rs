//! Integration tests for the hexconn engine
//!
//! Tests the full stack: board loading, evaluation, search and self-play

use hexconn_core::{
    ai::promising_moves, evaluate, game_result, Board, Cell, GameResult, HexBoard, MoveSource, Player,
    RandomPlayer, SearchConfig, SearchEngine, Strategy, WIN_SCORE,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Undecided position with `stones` random stones, players alternating
fn random_position(size: usize, stones: usize, rng: &mut ChaCha8Rng) -> HexBoard {
    loop {
        let mut board = HexBoard::new(size).unwrap();
        let mut player = Player::One;
        for _ in 0..stones {
            let moves = board.possible_moves();
            let mv = *moves.choose(rng).unwrap();
            board.play(mv, player).unwrap();
            player = player.opponent();
        }
        if game_result(&board) == GameResult::Ongoing {
            return board;
        }
    }
}

/// Exhaustive minimax in enumeration order, first best move wins ties
fn minimax(board: &HexBoard, me: Player, depth: u32, maximizing: bool, config: &SearchConfig) -> (Option<Cell>, f32) {
    if depth == 0 || board.check_connection(Player::One) || board.check_connection(Player::Two) {
        return (None, evaluate(board, me, &config.weights));
    }
    let moves = board.possible_moves();
    if moves.is_empty() {
        return (None, evaluate(board, me, &config.weights));
    }

    let side = if maximizing { me } else { me.opponent() };
    let mut best_move = None;
    let mut best_value = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };
    for mv in moves {
        let mut child = board.clone();
        child.place_piece(mv, side);
        let (_, value) = minimax(&child, me, depth - 1, !maximizing, config);
        let improved = if maximizing { value > best_value } else { value < best_value };
        if improved {
            best_value = value;
            best_move = Some(mv);
        }
    }
    (best_move, best_value)
}

/// Exhaustive value of playing `mv` for `me` and searching the reply tree
fn move_value(board: &HexBoard, me: Player, mv: Cell, depth: u32, config: &SearchConfig) -> f32 {
    let mut child = board.clone();
    child.place_piece(mv, me);
    minimax(&child, me, depth - 1, false, config).1
}

fn to_move(board: &HexBoard) -> Player {
    if board.stones() % 2 == 0 {
        Player::One
    } else {
        Player::Two
    }
}

// ============================================================================
// SEARCH CORRECTNESS
// ============================================================================

#[test]
fn test_pruning_matches_exhaustive_minimax() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut compared = 0;

    for round in 0..12 {
        let mut board = random_position(4, 4 + round % 4, &mut rng);
        let me = to_move(&board);
        let depth = 2 + (round % 2) as u32;
        let config = SearchConfig::plain(depth);

        let mut engine = SearchEngine::new(me, config.clone());
        let outcome = engine.search_depth(&mut board, depth);
        if outcome.source != MoveSource::Search {
            continue;
        }

        let (expected_move, expected_value) = minimax(&board, me, depth, true, &config);
        assert_eq!(outcome.best_move, expected_move, "round {}:\n{}", round, board);
        assert_eq!(outcome.score, expected_value, "round {}:\n{}", round, board);
        compared += 1;
    }

    assert!(compared > 0, "every random position had an immediate win");
}

#[test]
fn test_transposition_table_does_not_change_results() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for round in 0..8 {
        let mut board = random_position(4, 3 + round % 3, &mut rng);
        let me = to_move(&board);
        let depth = 3;

        let mut base = SearchConfig::default().with_max_depth(depth);
        base.use_mtdf = false;
        base.use_killer_moves = false;
        base.use_history = false;

        let mut with_tt = SearchEngine::new(me, base.clone().with_transposition_table(true));
        let mut without_tt = SearchEngine::new(me, base.with_transposition_table(false));

        let a = with_tt.search_depth(&mut board, depth);
        let b = without_tt.search_depth(&mut board, depth);
        assert_eq!(a.best_move, b.best_move, "round {}:\n{}", round, board);
        assert_eq!(a.score, b.score, "round {}:\n{}", round, board);
        assert_eq!(b.tt_probes, 0);
    }
}

#[test]
fn test_transposition_table_keeps_default_search_value() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let depth = 3;

    for round in 0..10 {
        let mut board = random_position(4, 3 + round % 4, &mut rng);
        let me = to_move(&board);
        let config = SearchConfig::default().with_max_depth(depth);

        let mut with_tt = SearchEngine::new(me, config.clone().with_transposition_table(true));
        let mut without_tt = SearchEngine::new(me, config.clone().with_transposition_table(false));
        let a = with_tt.search_depth(&mut board, depth);
        let b = without_tt.search_depth(&mut board, depth);
        assert_eq!(a.score, b.score, "round {}:\n{}", round, board);

        // Tied moves may be ordered differently, but each choice must be worth the score
        for outcome in [&a, &b] {
            let mv = outcome.best_move.unwrap();
            assert!(board.is_empty_cell(mv));
            assert_eq!(move_value(&board, me, mv, depth, &config), outcome.score, "round {}:\n{}", round, board);
        }
    }
}

#[test]
fn test_mtdf_converges_to_full_window_value() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);

    for _ in 0..6 {
        let mut board = random_position(4, 4, &mut rng);
        let me = to_move(&board);

        let mut plain = SearchConfig::default().with_max_depth(2);
        plain.use_mtdf = false;
        let mut mtdf = plain.clone();
        mtdf.use_mtdf = true;

        let a = SearchEngine::new(me, plain).search_depth(&mut board, 2);
        let b = SearchEngine::new(me, mtdf).search_depth(&mut board, 2);
        assert_eq!(a.score, b.score, "\n{}", board);
    }
}

#[test]
fn test_search_leaves_board_untouched() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut board = random_position(5, 6, &mut rng);
    let before = board.clone();

    let mut engine = SearchEngine::new(to_move(&board), SearchConfig::default().with_max_depth(2));
    engine.decide(&mut board);
    assert_eq!(board, before);
}

// ============================================================================
// DECISIONS
// ============================================================================

#[test]
fn test_decide_from_saved_position_takes_immediate_win() {
    let path = std::env::temp_dir().join(format!("hexconn-win-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "rows": ["2...", "11.1", "2...", "...2"] }"#).unwrap();

    let mut board = HexBoard::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut engine = SearchEngine::new(Player::One, SearchConfig::default());
    let outcome = engine.decide_with_info(&mut board);
    assert_eq!(outcome.best_move, Some(Cell::new(1, 2)));
    assert_eq!(outcome.source, MoveSource::ImmediateWin);
    assert_eq!(outcome.score, WIN_SCORE);
}

#[test]
fn test_zero_budget_uses_frontier_fallback() {
    let mut board = HexBoard::from_rows(&[".....", ".....", "..1..", ".2...", "....."]).unwrap();
    let mut engine = SearchEngine::new(Player::One, SearchConfig::default().with_time_limit(0.0));

    let outcome = engine.decide_with_info(&mut board);
    assert_eq!(outcome.source, MoveSource::Fallback);
    assert_eq!(outcome.depth, 0);
    assert_eq!(outcome.best_move, promising_moves(&board).first().copied());
}

#[test]
fn test_full_board_has_no_move() {
    let mut board = HexBoard::from_rows(&["12", "21"]).unwrap();
    let mut engine = SearchEngine::new(Player::Two, SearchConfig::default());
    assert_eq!(engine.decide(&mut board), None);
}

// ============================================================================
// SELF-PLAY
// ============================================================================

#[test]
fn test_engine_vs_random_completes() {
    let mut board = HexBoard::new(5).unwrap();
    let mut engine = SearchEngine::new(Player::One, SearchConfig::default().with_max_depth(2).with_time_limit(5.0));
    let mut random = RandomPlayer::new(Player::Two, 99);

    let mut moves = 0;
    while game_result(&board) == GameResult::Ongoing {
        let (player, mv) = if moves % 2 == 0 {
            (Player::One, engine.play(&mut board))
        } else {
            (Player::Two, random.play(&mut board))
        };
        let mv = mv.expect("ongoing game always has a move");
        board.play(mv, player).unwrap();
        moves += 1;
    }

    assert!(game_result(&board).winner().is_some());
    assert!(moves <= 25);
}

#[test]
fn test_seeded_random_games_repeat() {
    let play = |seed: u64| {
        let mut board = HexBoard::new(4).unwrap();
        let mut players = [RandomPlayer::new(Player::One, seed), RandomPlayer::new(Player::Two, seed + 1)];
        let mut record = Vec::new();
        let mut turn = 0;
        while game_result(&board) == GameResult::Ongoing {
            let player = &mut players[turn % 2];
            let side = Strategy::<HexBoard>::player(player);
            let mv = player.play(&mut board).unwrap();
            board.play(mv, side).unwrap();
            record.push(mv);
            turn += 1;
        }
        record
    };

    assert_eq!(play(5), play(5));
}
