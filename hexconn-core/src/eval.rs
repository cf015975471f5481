//! Position evaluation from shortest-path potentials

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::board::{all_cells, on_target_edge, start_edge, Board, Cell};
use crate::game::Player;

/// Weights of the evaluation terms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Weight of the shortest-path difference
    pub path: f32,
    /// Weight of the two-distance difference
    pub two_distance: f32,
    /// Weight of the blocking bonus
    pub blocking: f32,
    /// Numerator of the per-cell centrality bonus
    pub center: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            path: 50.0,
            two_distance: 20.0,
            blocking: 100.0,
            center: 5.0,
        }
    }
}

/// Score of a position the engine has already won
pub const WIN_SCORE: f32 = 1_000_000.0;

/// Score of a position the engine has already lost
pub const LOSS_SCORE: f32 = -WIN_SCORE;

/// Stand-in for an infinite path distance in score arithmetic.
///
/// Larger than any real hop count on a supported board and small enough that
/// heuristic scores stay far inside the win/loss sentinels.
pub const UNREACHABLE_DISTANCE: f32 = 1_000.0;

/// Effective-distance adjustment per bridge cell
const BRIDGE_DISCOUNT: f32 = 0.5;

/// Divisor turning the opponent's distance into a blocking bonus
const BLOCKING_SCALE: f32 = 100.0;

/// Evaluate a position from `me`'s perspective
pub fn evaluate<B: Board>(board: &B, me: Player, weights: &EvalWeights) -> f32 {
    let opponent = me.opponent();
    if board.check_connection(me) {
        return WIN_SCORE;
    }
    if board.check_connection(opponent) {
        return LOSS_SCORE;
    }

    let my_distance = bounded_distance(board, me);
    let opp_distance = bounded_distance(board, opponent);

    let mut score = weights.path * (opp_distance - my_distance);

    let my_two = two_distance(board, me, my_distance);
    let opp_two = two_distance(board, opponent, opp_distance);
    score += weights.two_distance * (opp_two - my_two);

    score += weights.blocking * blocking_bonus(opp_distance);
    score += connectivity_bonus(board, me, weights.center);

    score
}

/// Hops from `player`'s start edge to its target edge through cells that are
/// empty or already owned by `player`.
///
/// Uniform-cost search with unit hop cost; entering an owned cell costs the
/// same as entering an empty one. Returns `f32::INFINITY` when no path exists.
pub fn shortest_path_distance<B: Board>(board: &B, player: Player) -> f32 {
    let size = board.size();
    let passable = |cell: Cell| board.owner(cell).map_or(true, |owner| owner == player);

    let mut best = vec![u32::MAX; size * size];
    let mut heap = BinaryHeap::new();
    for cell in start_edge(size, player).filter(|&cell| passable(cell)) {
        best[cell.index(size)] = 0;
        heap.push(Reverse((0u32, cell)));
    }

    while let Some(Reverse((cost, cell))) = heap.pop() {
        if cost > best[cell.index(size)] {
            continue;
        }
        if on_target_edge(cell, size, player) {
            return cost as f32;
        }
        for next in cell.neighbors(size) {
            let idx = next.index(size);
            if cost + 1 < best[idx] && passable(next) {
                best[idx] = cost + 1;
                heap.push(Reverse((cost + 1, next)));
            }
        }
    }

    f32::INFINITY
}

/// Shortest path distance with the unreachable case clamped to
/// [`UNREACHABLE_DISTANCE`], safe for arithmetic
pub fn bounded_distance<B: Board>(board: &B, player: Player) -> f32 {
    let distance = shortest_path_distance(board, player);
    if distance.is_finite() {
        distance
    } else {
        UNREACHABLE_DISTANCE
    }
}

/// `distance` (the player's bounded shortest path) adjusted by 0.5 for every
/// empty cell touching two or more of `player`'s cells
pub fn two_distance<B: Board>(board: &B, player: Player, distance: f32) -> f32 {
    distance + bridge_discount(board, player)
}

fn bridge_discount<B: Board>(board: &B, player: Player) -> f32 {
    let size = board.size();
    let bridges = board
        .possible_moves()
        .into_iter()
        .filter(|cell| {
            cell.neighbors(size)
                .filter(|&n| board.owner(n) == Some(player))
                .count()
                >= 2
        })
        .count();
    bridges as f32 * BRIDGE_DISCOUNT
}

/// How far the opponent still is from connecting, scaled down
pub fn blocking_bonus(opponent_distance: f32) -> f32 {
    opponent_distance / BLOCKING_SCALE
}

/// Reward for central cells: `weight / (1 + center distance)` per stone,
/// added for `me` and subtracted for the opponent
pub fn connectivity_bonus<B: Board>(board: &B, me: Player, weight: f32) -> f32 {
    let size = board.size();
    all_cells(size)
        .filter_map(|cell| board.owner(cell).map(|owner| (cell, owner)))
        .map(|(cell, owner)| {
            let bonus = weight / (1.0 + cell.center_distance(size));
            if owner == me {
                bonus
            } else {
                -bonus
            }
        })
        .sum()
}
