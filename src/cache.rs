//! Bounded insertion-order cache.
//!
//! Used to memoize text measurements across layout passes: a relayout after
//! a sort or page change measures mostly the same strings again.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Cache with a fixed capacity that evicts the oldest insertions first.
/// Lookups do not promote entries.
pub struct LruCache<K: Hash + Eq + Clone, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Insert unless present. Returns `true` for a new entry.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key.clone(), value);
        self.order.push_back(key);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        true
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

    #[test]
    fn test_evicts_oldest_first() {
        let mut cache: LruCache<&str, u32> = LruCache::new(2);
        assert!(cache.insert("a", 1));
        assert!(cache.insert("b", 2));
        assert!(!cache.insert("a", 9));
        assert!(cache.insert("c", 3));
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let mut cache: LruCache<u8, u8> = LruCache::new(0);
        assert!(!cache.insert(1, 1));
        assert!(cache.is_empty());
    }
}
