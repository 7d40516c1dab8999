use std::collections::HashMap;
use std::hash::Hash;

/// Memoization table owned by whoever needs it.
///
/// Nothing is evicted automatically; the owner calls [`QueryCache::clear`]
/// when the inputs the keys were derived from are no longer valid.
#[derive(Debug, Clone)]
pub struct QueryCache<K, V> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V: Clone> QueryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return value.clone();
        }
        self.misses += 1;
        let value = compute();
        self.entries.insert(key, value.clone());
        value
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

    /// `(hits, misses)` since creation.
    pub fn counters(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl<K: Eq + Hash, V: Clone> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once_per_key() {
        let mut cache: QueryCache<u64, usize> = QueryCache::new();
        let mut calls = 0;

        let a = cache.get_or_insert_with(1, || {
            calls += 1;
            10
        });
        let b = cache.get_or_insert_with(1, || {
            calls += 1;
            20
        });

        assert_eq!(a, 10);
        assert_eq!(b, 10);
        assert_eq!(calls, 1);
        assert_eq!(cache.counters(), (1, 1));
    }

    #[test]
    fn test_clear_resets_entries() {
        let mut cache: QueryCache<&str, i32> = QueryCache::new();
        cache.get_or_insert_with("a", || 1);
        cache.get_or_insert_with("b", || 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_insert_with("a", || 3), 3);
    }

    #[test]
    fn test_independent_instances() {
        let mut one: QueryCache<u8, u8> = QueryCache::new();
        let two: QueryCache<u8, u8> = QueryCache::new();
        one.get_or_insert_with(0, || 1);
        assert_eq!(one.len(), 1);
        assert!(two.is_empty());
    }
}
