//! One-ply tactical check for moves that win on the spot

use crate::board::{AppliedMove, Board, Cell};
use crate::game::Player;

/// First legal move (in board enumeration order) that completes `player`'s
/// connection, if any. The board is left as it was found.
pub fn find_immediate_win<B: Board>(board: &mut B, player: Player) -> Option<Cell> {
    board.possible_moves().into_iter().find(|&mv| {
        let applied = AppliedMove::new(&mut *board, mv, player);
        applied.check_connection(player)
    })
}
