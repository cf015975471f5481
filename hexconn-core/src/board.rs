//! Hex board geometry and the board collaborator consumed by the engine

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::game::Player;

/// Largest supported board side
pub const MAX_BOARD_SIZE: usize = 26;

/// Neighbour offsets (d_row, d_col) on a rhombic hex board
pub const DIRECTIONS: [(i8, i8); 6] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (1, -1),
];

/// Raw board contents, one byte per cell in row-major order
pub type PositionKey = Box<[u8]>;

// ============================================================================
// CELLS
// ============================================================================

/// A board coordinate; as a move it names the empty cell to claim
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major index into a board of side `size`
    pub fn index(&self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    pub fn is_valid(&self, size: usize) -> bool {
        (self.row as usize) < size && (self.col as usize) < size
    }

    /// On-board neighbours
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Cell> {
        DIRECTIONS.into_iter().filter_map(move |(dr, dc)| {
            let row = self.row as i16 + dr as i16;
            let col = self.col as i16 + dc as i16;
            let limit = size as i16;
            if (0..limit).contains(&row) && (0..limit).contains(&col) {
                Some(Cell::new(row as u8, col as u8))
            } else {
                None
            }
        })
    }

    /// Manhattan-style distance to the board center (`size / 2` on both axes)
    pub fn center_distance(&self, size: usize) -> f32 {
        let center = size as f32 / 2.0;
        (self.row as f32 - center).abs() + (self.col as f32 - center).abs()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Every cell of a board in row-major order
pub fn all_cells(size: usize) -> impl Iterator<Item = Cell> {
    (0..size).flat_map(move |row| (0..size).map(move |col| Cell::new(row as u8, col as u8)))
}

/// Cells on the edge a player's chain starts from
pub fn start_edge(size: usize, player: Player) -> impl Iterator<Item = Cell> {
    (0..size).map(move |i| match player {
        Player::One => Cell::new(i as u8, 0),
        Player::Two => Cell::new(0, i as u8),
    })
}

/// Whether a cell lies on the edge a player's chain must reach
pub fn on_target_edge(cell: Cell, size: usize, player: Player) -> bool {
    match player {
        Player::One => cell.col as usize + 1 == size,
        Player::Two => cell.row as usize + 1 == size,
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size {0} is not supported (expected 1 to 26)")]
    InvalidSize(usize),

    #[error("cell {0} is outside a {1}x{1} board")]
    OutOfBounds(Cell, usize),

    #[error("cell {0} is already occupied")]
    Occupied(Cell),

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unrecognised cell '{ch}' at row {row}, column {col}")]
    InvalidCell { ch: char, row: usize, col: usize },
}

// ============================================================================
// BOARD CONTRACT
// ============================================================================

/// The board operations the search engine relies on.
///
/// The engine places hypothetical pieces with `place_piece` and undoes them
/// with `clear_cell`; `Clone` must produce an independent deep copy.
pub trait Board: Clone {
    fn size(&self) -> usize;

    /// Owner of a cell, `None` when empty
    fn owner(&self, cell: Cell) -> Option<Player>;

    /// Legal moves (the empty cells) in a stable enumeration order
    fn possible_moves(&self) -> Vec<Cell>;

    /// Claim a cell. Callers only pass empty, on-board cells.
    fn place_piece(&mut self, cell: Cell, player: Player);

    /// Reset a cell to empty
    fn clear_cell(&mut self, cell: Cell);

    /// Whether `player` has a chain joining both of its edges
    fn check_connection(&self, player: Player) -> bool;

    fn is_empty_cell(&self, cell: Cell) -> bool {
        self.owner(cell).is_none()
    }

    /// Canonical key for transposition lookups: the full raw board contents
    fn position_key(&self) -> PositionKey {
        all_cells(self.size())
            .map(|cell| self.owner(cell).map_or(0, Player::code))
            .collect()
    }
}

/// A hypothetical move that is undone when the guard is dropped.
///
/// Reads and writes to the board go through the guard, so every exit path
/// (return, `break`, `?`) reverts the placement.
pub struct AppliedMove<'a, B: Board> {
    board: &'a mut B,
    cell: Cell,
}

impl<'a, B: Board> AppliedMove<'a, B> {
    pub fn new(board: &'a mut B, cell: Cell, player: Player) -> Self {
        board.place_piece(cell, player);
        Self { board, cell }
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }
}

impl<B: Board> Deref for AppliedMove<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.board
    }
}

impl<B: Board> DerefMut for AppliedMove<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.board
    }
}

impl<B: Board> Drop for AppliedMove<'_, B> {
    fn drop(&mut self) {
        self.board.clear_cell(self.cell);
    }
}

// ============================================================================
// HEX BOARD
// ============================================================================

/// Square-indexed hex board
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HexBoard {
    size: usize,
    cells: Vec<Option<Player>>,
}

/// JSON form of a board: one string per row, `.` empty, `1`/`2` owners
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: Vec<String>,
}

impl HexBoard {
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(BoardError::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    /// Parse rows of `.`, `1` and `2`. Whitespace inside a row is ignored.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let mut board = Self::new(rows.len())?;
        for (row, text) in rows.iter().enumerate() {
            let tags: Vec<char> = text.as_ref().chars().filter(|c| !c.is_whitespace()).collect();
            if tags.len() != board.size {
                return Err(BoardError::RaggedRow {
                    row,
                    found: tags.len(),
                    expected: board.size,
                });
            }
            for (col, ch) in tags.into_iter().enumerate() {
                let owner = match ch {
                    '.' => None,
                    '1' => Some(Player::One),
                    '2' => Some(Player::Two),
                    _ => return Err(BoardError::InvalidCell { ch, row, col }),
                };
                board.cells[row * board.size + col] = owner;
            }
        }
        Ok(board)
    }

    /// Load a JSON board snapshot
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read board file: {}", path.display()))?;
        let snapshot: BoardSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse board file: {}", path.display()))?;
        Ok(Self::from_rows(&snapshot.rows)?)
    }

    pub fn to_snapshot(&self) -> BoardSnapshot {
        let rows = (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| match self.cells[row * self.size + col] {
                        None => '.',
                        Some(Player::One) => '1',
                        Some(Player::Two) => '2',
                    })
                    .collect()
            })
            .collect();
        BoardSnapshot { rows }
    }

    /// Validated placement for game drivers
    pub fn play(&mut self, cell: Cell, player: Player) -> Result<(), BoardError> {
        if !cell.is_valid(self.size) {
            return Err(BoardError::OutOfBounds(cell, self.size));
        }
        if !self.is_empty_cell(cell) {
            return Err(BoardError::Occupied(cell));
        }
        self.place_piece(cell, player);
        Ok(())
    }

    /// Number of occupied cells
    pub fn stones(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl Board for HexBoard {
    fn size(&self) -> usize {
        self.size
    }

    fn owner(&self, cell: Cell) -> Option<Player> {
        self.cells[cell.index(self.size)]
    }

    fn possible_moves(&self) -> Vec<Cell> {
        all_cells(self.size)
            .filter(|cell| self.cells[cell.index(self.size)].is_none())
            .collect()
    }

    fn place_piece(&mut self, cell: Cell, player: Player) {
        self.cells[cell.index(self.size)] = Some(player);
    }

    fn clear_cell(&mut self, cell: Cell) {
        self.cells[cell.index(self.size)] = None;
    }

    fn check_connection(&self, player: Player) -> bool {
        let mut visited = vec![false; self.size * self.size];
        let mut stack: Vec<Cell> = start_edge(self.size, player)
            .filter(|&cell| self.owner(cell) == Some(player))
            .collect();
        for cell in &stack {
            visited[cell.index(self.size)] = true;
        }

        while let Some(cell) = stack.pop() {
            if on_target_edge(cell, self.size, player) {
                return true;
            }
            for next in cell.neighbors(self.size) {
                let idx = next.index(self.size);
                if !visited[idx] && self.cells[idx] == Some(player) {
                    visited[idx] = true;
                    stack.push(next);
                }
            }
        }
        false
    }
}

impl fmt::Display for HexBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, "{} ", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{:>2} {}", row, " ".repeat(row))?;
            for col in 0..self.size {
                let tag = match self.cells[row * self.size + col] {
                    None => '.',
                    Some(Player::One) => '1',
                    Some(Player::Two) => '2',
                };
                write!(f, "{} ", tag)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
