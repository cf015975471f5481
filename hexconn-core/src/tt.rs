//! Transposition table for caching search results within one decision
//!
//! Keys are the raw board contents, so two move orders reaching the same
//! position share an entry. Nothing is evicted; the engine clears the table
//! at the start of every decision.

use rustc_hash::FxHashMap;

use crate::board::{Cell, PositionKey};

/// How a stored value relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// The search completed inside its window
    Exact,
    /// True value >= stored value (fail high)
    Lower,
    /// True value <= stored value (fail low)
    Upper,
}

impl Bound {
    /// Classify a search result against the window it was searched with
    pub fn classify(value: f32, alpha: f32, beta: f32) -> Self {
        if value <= alpha {
            Bound::Upper
        } else if value >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

/// Transposition table entry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TtEntry {
    pub value: f32,
    /// Remaining depth the value was searched to
    pub depth: u32,
    pub bound: Bound,
    pub best_move: Option<Cell>,
}

/// Cache from position to searched bounds
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<PositionKey, TtEntry>,
    probes: u64,
    hits: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry searched at least `depth` plies deep
    pub fn probe(&mut self, key: &[u8], depth: u32) -> Option<TtEntry> {
        self.probes += 1;
        let entry = self.entries.get(key).filter(|e| e.depth >= depth).copied();
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    /// Store an entry, replacing whatever was stored for the key
    pub fn store(&mut self, key: PositionKey, entry: TtEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: &[u8]) -> Option<&TtEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn probes(&self) -> u64 {
        self.probes
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Drop every entry and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.probes = 0;
        self.hits = 0;
    }
}
