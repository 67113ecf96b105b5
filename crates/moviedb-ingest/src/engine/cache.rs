//! Bounded dedup cache

use std::collections::HashSet;
use std::hash::Hash;

/// Set of keys already written during one run, capped at `capacity`.
///
/// A key that is cached is always rejected. New keys are cached while there
/// is room; once the cache is full they pass through uncached, so repeats of
/// those keys reach the store and are absorbed by its insert-ignore writes.
/// A capacity of zero disables deduplication.
#[derive(Debug)]
pub struct DedupCache<K> {
    seen: HashSet<K>,
    capacity: usize,
}

impl<K: Eq + Hash> DedupCache<K> {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            capacity,
        }
    }

    /// Returns `true` when the item owning `key` should be written
    pub fn admit(&mut self, key: K) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if self.seen.len() < self.capacity {
            self.seen.insert(key);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.seen.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admitted(capacity: usize, keys: &[&'static str]) -> Vec<&'static str> {
        let mut cache = DedupCache::new(capacity);
        keys.iter().copied().filter(|k| cache.admit(*k)).collect()
    }

    #[test]
    fn test_cached_key_is_rejected() {
        assert_eq!(admitted(2, &["a", "b", "a", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_zero_capacity_disables_dedup() {
        assert_eq!(admitted(0, &["a", "b", "a", "c"]), vec!["a", "b", "a", "c"]);
    }

    #[test]
    fn test_full_cache_passes_new_keys_through() {
        // "c" arrives after the cache is full, so its repeat is not caught
        assert_eq!(
            admitted(2, &["a", "b", "c", "c", "b"]),
            vec!["a", "b", "c", "c"]
        );
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut cache = DedupCache::new(3);
        for key in 0..10 {
            cache.admit(key);
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.is_full());
        assert_eq!(cache.capacity(), 3);
    }
}
