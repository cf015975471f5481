//! Players, game results and the strategy contract

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player identity
///
/// `One` connects the left and right edges (column 0 to column N-1),
/// `Two` connects the top and bottom edges (row 0 to row N-1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Cell tag used in board text and position keys
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "one"),
            Player::Two => write!(f, "two"),
        }
    }
}

impl FromStr for Player {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "one" => Ok(Player::One),
            "2" | "two" => Ok(Player::Two),
            other => Err(format!("unknown player '{}', expected one or two", other)),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Ongoing,
    OneWins,
    TwoWins,
}

impl GameResult {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Ongoing => None,
            GameResult::OneWins => Some(Player::One),
            GameResult::TwoWins => Some(Player::Two),
        }
    }
}

/// Current result of a board
pub fn game_result<B: Board>(board: &B) -> GameResult {
    if board.check_connection(Player::One) {
        GameResult::OneWins
    } else if board.check_connection(Player::Two) {
        GameResult::TwoWins
    } else {
        GameResult::Ongoing
    }
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// Something that chooses moves for one side.
///
/// Every implementor supplies its own `play`.
pub trait Strategy<B: Board> {
    /// The side this strategy plays for
    fn player(&self) -> Player;

    /// Choose a move for `player()` on `board`.
    ///
    /// Returns `None` only when the board has no legal moves. Any
    /// hypothetical placements must be undone before returning.
    fn play(&mut self, board: &mut B) -> Option<Cell>;
}

/// Uniformly random legal moves, reproducible from a seed
pub struct RandomPlayer {
    player: Player,
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    pub fn new(player: Player, seed: u64) -> Self {
        Self {
            player,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<B: Board> Strategy<B> for RandomPlayer {
    fn player(&self) -> Player {
        self.player
    }

    fn play(&mut self, board: &mut B) -> Option<Cell> {
        board.possible_moves().choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HexBoard;

    #[test]
    fn test_opponent_is_involution() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent().opponent(), Player::Two);
    }

    #[test]
    fn test_player_parsing() {
        assert_eq!("one".parse::<Player>(), Ok(Player::One));
        assert_eq!("2".parse::<Player>(), Ok(Player::Two));
        assert!("three".parse::<Player>().is_err());
    }

    #[test]
    fn test_game_result() {
        let board = HexBoard::from_rows(&["111", "2.2", "..."]).unwrap();
        assert_eq!(game_result(&board), GameResult::OneWins);
        assert_eq!(game_result(&board).winner(), Some(Player::One));

        let board = HexBoard::new(3).unwrap();
        assert_eq!(game_result(&board), GameResult::Ongoing);
    }

    #[test]
    fn test_random_player_is_reproducible() {
        let mut board = HexBoard::new(5).unwrap();
        let mut a = RandomPlayer::new(Player::One, 7);
        let mut b = RandomPlayer::new(Player::One, 7);
        for _ in 0..5 {
            let mv_a = a.play(&mut board);
            let mv_b = b.play(&mut board);
            assert_eq!(mv_a, mv_b);
            board.place_piece(mv_a.unwrap(), Player::One);
        }
    }

    #[test]
    fn test_random_player_on_full_board() {
        let mut board = HexBoard::from_rows(&["12", "21"]).unwrap();
        let mut player = RandomPlayer::new(Player::Two, 1);
        assert_eq!(player.play(&mut board), None);
    }
}
