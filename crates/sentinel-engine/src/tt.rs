//! Transposition table.
//!
//! A fixed-size, power-of-two hash table keyed by Zobrist fingerprint.
//! Entries carry the searched depth, a score with its bound kind, the
//! best move found, and an age stamp so stale entries from earlier
//! searches lose replacement fights.

use sentinel_core::{Color, Move};

use crate::search::MATE_THRESHOLD;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is exact (searched with a full window).
    Exact,
    /// The score is a lower bound (the search failed high).
    Lower,
    /// The score is an upper bound (the search failed low).
    Upper,
}

/// One table slot.
#[derive(Debug, Clone, Copy)]
pub struct TableEntry {
    pub key: u64,
    /// Remaining search depth when the entry was stored.
    pub depth: i32,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
    /// Side the score is given from the perspective of.
    pub side: Color,
    age: u8,
}

/// Hit/miss counters, reported over UCI as hashfull-style diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    /// Stores that evicted an entry for a different position.
    pub collisions: u64,
}

/// Fixed-size transposition table with age-aware replacement.
pub struct TranspositionTable {
    entries: Vec<Option<TableEntry>>,
    mask: usize,
    age: u8,
    stats: TableStats,
}

impl TranspositionTable {
    /// Default size in megabytes.
    pub const DEFAULT_SIZE_MB: usize = 16;

    /// Searches an entry may lag behind the current age before depth no
    /// longer protects it from replacement.
    const AGE_LIMIT: u8 = 4;

    /// Creates a table using roughly `size_mb` megabytes.
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let entries = bytes / std::mem::size_of::<Option<TableEntry>>();
        Self::with_capacity(entries)
    }

    /// Creates a table with at least one slot, rounded down to a power of
    /// two so indexing is a mask.
    pub fn with_capacity(entries: usize) -> Self {
        let capacity = entries.next_power_of_two().max(1);
        let capacity = if capacity > entries && capacity > 1 {
            capacity / 2
        } else {
            capacity
        };
        TranspositionTable {
            entries: vec![None; capacity],
            mask: capacity - 1,
            age: 1,
            stats: TableStats::default(),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    /// Advances the age stamp at the start of a new search. Entries from
    /// previous searches stay probeable but become easy to evict once
    /// they fall far enough behind. Age zero is never used so a fresh
    /// table never looks current.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
        if self.age == 0 {
            self.age = 1;
        }
    }

    /// Clears all entries and counters.
    pub fn clear(&mut self) {
        for slot in &mut self.entries {
            *slot = None;
        }
        self.age = 1;
        self.stats = TableStats::default();
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        key as usize & self.mask
    }

    /// Stores a search result. Negative depths (from quiescence) are not
    /// worth a slot.
    pub fn store(
        &mut self,
        key: u64,
        depth: i32,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
        side: Color,
    ) {
        if depth < 0 {
            return;
        }

        let age = self.age;
        let index = self.index(key);
        let replace = match &self.entries[index] {
            None => true,
            Some(entry) => {
                entry.key == key
                    || depth >= entry.depth
                    || age.wrapping_sub(entry.age) > Self::AGE_LIMIT
            }
        };
        if !replace {
            return;
        }

        if let Some(old) = &self.entries[index] {
            if old.key != key {
                self.stats.collisions += 1;
            }
        }
        self.stats.stores += 1;
        self.entries[index] = Some(TableEntry {
            key,
            depth,
            score,
            bound,
            best_move,
            side,
            age,
        });
    }

    /// Looks up the stored best move for a position, for move ordering.
    /// Usable at any depth since a hint costs nothing.
    pub fn probe_move(&self, key: u64) -> Option<Move> {
        match &self.entries[self.index(key)] {
            Some(entry) if entry.key == key => entry.best_move,
            _ => None,
        }
    }

    /// Looks up a usable score for a position searched to at least
    /// `depth`, within the current alpha-beta window.
    ///
    /// Returns `None` on a miss, on insufficient depth, or when the
    /// stored bound cannot cut the given window. A matching entry has its
    /// age refreshed even when its score is unusable.
    pub fn probe_score(
        &mut self,
        key: u64,
        depth: i32,
        alpha: i32,
        beta: i32,
        side: Color,
    ) -> Option<i32> {
        let age = self.age;
        let index = self.index(key);
        let entry = match &mut self.entries[index] {
            Some(entry) if entry.key == key => {
                entry.age = age;
                *entry
            }
            _ => {
                self.stats.misses += 1;
                return None;
            }
        };
        self.stats.hits += 1;

        if entry.depth < depth {
            return None;
        }

        let mut score = entry.score;
        if entry.side != side {
            score = -score;
        }
        // Mate scores are distance-sensitive: re-anchor them to the depth
        // being searched now.
        if score > MATE_THRESHOLD {
            score -= entry.depth - depth;
        } else if score < -MATE_THRESHOLD {
            score += entry.depth - depth;
        }

        match entry.bound {
            Bound::Exact => Some(score),
            Bound::Lower if score >= beta => Some(score),
            Bound::Upper if score <= alpha => Some(score),
            _ => None,
        }
    }
}
