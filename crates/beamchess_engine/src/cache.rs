use std::collections::HashMap;

use beamchess_core::PositionKey;

use crate::evaluation::Score;

#[derive(Clone, Copy)]
struct CacheEntry {
    depth: u32,
    score: Score,
}

/// Memoized evaluations keyed by position. An entry only answers a query
/// when it was computed with at least as much remaining depth as the query
/// needs; anything shallower reports a miss and forces a re-search.
///
/// Unbounded within one search session; the engine rebuilds it per move.
#[derive(Default)]
pub struct PositionCache {
    entries: HashMap<PositionKey, CacheEntry>,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: PositionKey, remaining_depth: u32) -> Option<Score> {
        self.entries
            .get(&key)
            .filter(|entry| entry.depth >= remaining_depth)
            .map(|entry| entry.score)
    }

    /// Unconditionally replaces any prior entry for the key.
    pub fn store(&mut self, key: PositionKey, remaining_depth: u32, score: Score) {
        self.entries.insert(
            key,
            CacheEntry {
                depth: remaining_depth,
                score,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamchess_core::Board;

    fn key() -> PositionKey {
        Board::new().position_key()
    }

    #[test]
    fn deep_entry_answers_shallow_query() {
        let mut cache = PositionCache::new();
        cache.store(key(), 3, 1.5);
        assert_eq!(cache.lookup(key(), 2), Some(1.5));
        assert_eq!(cache.lookup(key(), 3), Some(1.5));
    }

    #[test]
    fn shallow_entry_misses_deeper_query() {
        let mut cache = PositionCache::new();
        cache.store(key(), 1, 1.5);
        assert_eq!(cache.lookup(key(), 2), None);
    }

    #[test]
    fn store_overwrites() {
        let mut cache = PositionCache::new();
        cache.store(key(), 3, 1.5);
        cache.store(key(), 1, -0.5);
        assert_eq!(cache.len(), 1);
        // The fresher, shallower entry wins; depth validity still guards reads.
        assert_eq!(cache.lookup(key(), 1), Some(-0.5));
        assert_eq!(cache.lookup(key(), 3), None);
    }

    #[test]
    fn unknown_key_misses() {
        let cache = PositionCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup(key(), 0), None);
    }
}
