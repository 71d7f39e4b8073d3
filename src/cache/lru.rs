//! LRU Tracker Module
//!
//! Access-order bookkeeping used when a store has a capacity bound.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access recency per key.
///
/// Every touch stamps the key with a fresh sequence number; the smallest
/// live sequence number is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Next sequence number to hand out
    tick: u64,
    /// Key -> last access sequence
    seq_by_key: HashMap<String, u64>,
    /// Access sequence -> key, oldest first
    key_by_seq: BTreeMap<u64, String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        self.tick += 1;
        if let Some(old) = self.seq_by_key.insert(key.to_string(), self.tick) {
            self.key_by_seq.remove(&old);
        }
        self.key_by_seq.insert(self.tick, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(seq) = self.seq_by_key.remove(key) {
            self.key_by_seq.remove(&seq);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.key_by_seq.pop_first()?;
        self.seq_by_key.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.seq_by_key.clear();
        self.key_by_seq.clear();
    }

    pub fn len(&self) -> usize {
        self.seq_by_key.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.seq_by_key.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_evicts_in_insertion_order() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_touch_moves_to_front() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_repeated_touch_keeps_one_slot() {
        let mut lru = LruTracker::new();
        lru.touch("k");
        lru.touch("k");
        lru.touch("k");
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_remove_and_clear() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.remove("a");
        lru.remove("missing");
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));

        lru.touch("c");
        lru.clear();
        assert_eq!(lru.evict_oldest(), None);
    }
}
