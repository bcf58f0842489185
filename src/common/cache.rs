//! In-memory lookup table shared across a run.
//!
//! Uses moka's concurrent cache so that parallel branches can publish and read
//! action results without a global lock.

use moka::sync::Cache;

/// Thread-safe in-memory map with a fixed capacity.
///
/// The execution context keeps the latest `ActionResult` per action name here
/// (`MemCache<String, ActionResult>`). Capacity is sized from the workflow so
/// that no entry is evicted during a run.
#[derive(Clone)]
pub struct MemCache<K, V> {
    entries: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Allocate a new [`MemCache`] holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Cache::new(capacity.max(1) as u64),
        }
    }

    /// Insert or replace the value stored under `key`.
    pub fn set(
        &self,
        key: K,
        value: V,
    ) {
        self.entries.insert(key, value);
    }

    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces() {
        let cache: MemCache<String, u32> = MemCache::new(4);
        assert!(cache.get(&"a".to_string()).is_none());

        cache.set("a".to_string(), 1);
        cache.set("a".to_string(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(2));
        assert!(cache.get(&"b".to_string()).is_none());
    }
}
