//! Keyed entity container with named secondary indexes.
//!
//! The primary map is keyed by the record id. Secondary indexes are built
//! from extractor functions (e.g. the ssrc of an RTP stream monitor) and
//! are kept exactly in sync with the primary map: `insert` removes the
//! replaced value's index entries before indexing the new value, `remove`
//! drops all entries, and the sweep used for garbage collection goes
//! through the same removal path.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::MonitorError;

/// Value a secondary index is computed over. Only numeric indexes exist
/// today (ssrc); extractors returning `None` leave the value unindexed.
pub type IndexValue = u64;

/// Extractor producing the index value of an entity, or `None` when the
/// entity has nothing to index (e.g. a stream record without an ssrc).
pub type IndexExtractor<V> = fn(&V) -> Option<IndexValue>;

struct SecondaryIndex<V> {
    name: &'static str,
    extract: IndexExtractor<V>,
    entries: FxHashMap<IndexValue, FxHashSet<String>>,
}

impl<V> SecondaryIndex<V> {
    fn add(&mut self, key: &str, value: &V) {
        if let Some(index_value) = (self.extract)(value) {
            self.entries
                .entry(index_value)
                .or_default()
                .insert(key.to_owned());
        }
    }

    fn drop_entry(&mut self, key: &str, value: &V) {
        if let Some(index_value) = (self.extract)(value) {
            if let Some(keys) = self.entries.get_mut(&index_value) {
                keys.remove(key);
                if keys.is_empty() {
                    self.entries.remove(&index_value);
                }
            }
        }
    }
}

/// Entity store with O(1) primary lookup and named secondary indexes.
pub struct EntityStore<V> {
    entries: FxHashMap<String, V>,
    indexes: Vec<SecondaryIndex<V>>,
}

impl<V> Default for EntityStore<V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            indexes: Vec::new(),
        }
    }
}

impl<V> EntityStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named secondary index. Fails on duplicate names and
    /// must be called before the store holds any value, so that every
    /// value passes through the indexing path.
    pub fn add_index(
        &mut self,
        name: &'static str,
        extract: IndexExtractor<V>,
    ) -> Result<(), MonitorError> {
        if self.indexes.iter().any(|index| index.name == name) {
            return Err(MonitorError::DuplicateIndex(name));
        }
        let mut index = SecondaryIndex {
            name,
            extract,
            entries: FxHashMap::default(),
        };
        for (key, value) in &self.entries {
            index.add(key, value);
        }
        self.indexes.push(index);
        Ok(())
    }

    /// Insert or overwrite. A replaced value's index entries are removed
    /// before the new value is indexed, so no stale entry survives.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        let previous = self.entries.remove(&key);
        if let Some(ref old) = previous {
            for index in &mut self.indexes {
                index.drop_entry(&key, old);
            }
        }
        for index in &mut self.indexes {
            index.add(&key, &value);
        }
        self.entries.insert(key, value);
        previous
    }

    /// Remove a value and all of its index entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let value = self.entries.remove(key)?;
        for index in &mut self.indexes {
            index.drop_entry(key, &value);
        }
        Some(value)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Mutable access. Callers must not change indexed fields through this
    /// path; use [`EntityStore::upsert_with`] for that.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Update an existing value (re-indexing it around the mutation) or
    /// insert a freshly created one.
    pub fn upsert_with(
        &mut self,
        key: &str,
        create: impl FnOnce() -> V,
        update: impl FnOnce(&mut V),
    ) {
        if let Some(value) = self.entries.get_mut(key) {
            for index in &mut self.indexes {
                index.drop_entry(key, value);
            }
            update(value);
            for index in &mut self.indexes {
                index.add(key, value);
            }
        } else {
            self.insert(key.to_owned(), create());
        }
    }

    /// All live values whose extractor output equals `value` for the named
    /// index. Order-independent; empty when none match or the index does
    /// not exist.
    pub fn values_by_index(&self, name: &str, value: IndexValue) -> Vec<&V> {
        let Some(index) = self.indexes.iter().find(|index| index.name == name) else {
            return Vec::new();
        };
        let Some(keys) = index.entries.get(&value) else {
            return Vec::new();
        };
        keys.iter().filter_map(|key| self.entries.get(key)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }

    /// Remove every entry the predicate rejects, through the index-aware
    /// removal path. Returns the removed keys.
    pub fn sweep_unvisited(&mut self, mut keep: impl FnMut(&mut V) -> bool) -> Vec<String> {
        let doomed: Vec<String> = self
            .entries
            .iter_mut()
            .filter_map(|(key, value)| (!keep(value)).then(|| key.clone()))
            .collect();
        for key in &doomed {
            self.remove(key);
        }
        doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entity {
        ssrc: Option<u64>,
        payload: &'static str,
    }

    fn ssrc_index(entity: &Entity) -> Option<IndexValue> {
        entity.ssrc
    }

    fn store_with_index() -> EntityStore<Entity> {
        let mut store = EntityStore::new();
        store.add_index("ssrc", ssrc_index).unwrap();
        store
    }

    #[test]
    fn test_insert_and_lookup_by_index() {
        let mut store = store_with_index();
        store.insert(
            "a".into(),
            Entity {
                ssrc: Some(7),
                payload: "first",
            },
        );
        store.insert(
            "b".into(),
            Entity {
                ssrc: Some(7),
                payload: "second",
            },
        );
        store.insert(
            "c".into(),
            Entity {
                ssrc: None,
                payload: "unindexed",
            },
        );

        let hits = store.values_by_index("ssrc", 7);
        assert_eq!(hits.len(), 2);
        assert!(store.values_by_index("ssrc", 8).is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_overwrite_leaves_no_stale_entry() {
        let mut store = store_with_index();
        store.insert(
            "a".into(),
            Entity {
                ssrc: Some(7),
                payload: "old",
            },
        );
        store.insert(
            "a".into(),
            Entity {
                ssrc: Some(9),
                payload: "new",
            },
        );

        assert!(store.values_by_index("ssrc", 7).is_empty());
        let hits = store.values_by_index("ssrc", 9);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload, "new");
    }

    #[test]
    fn test_remove_clears_index() {
        let mut store = store_with_index();
        store.insert(
            "a".into(),
            Entity {
                ssrc: Some(7),
                payload: "x",
            },
        );
        assert!(store.remove("a").is_some());
        assert!(store.values_by_index("ssrc", 7).is_empty());
        assert!(store.remove("a").is_none());
    }

    #[test]
    fn test_upsert_reindexes_changed_value() {
        let mut store = store_with_index();
        store.upsert_with(
            "a",
            || Entity {
                ssrc: Some(1),
                payload: "created",
            },
            |_| unreachable!("no existing value"),
        );
        store.upsert_with(
            "a",
            || unreachable!("already present"),
            |entity| {
                entity.ssrc = Some(2);
                entity.payload = "updated";
            },
        );

        assert!(store.values_by_index("ssrc", 1).is_empty());
        assert_eq!(store.values_by_index("ssrc", 2).len(), 1);
    }

    #[test]
    fn test_index_added_after_inserts_sees_existing_values() {
        let mut store: EntityStore<Entity> = EntityStore::new();
        store.insert(
            "a".into(),
            Entity {
                ssrc: Some(3),
                payload: "pre",
            },
        );
        store.add_index("ssrc", ssrc_index).unwrap();
        assert_eq!(store.values_by_index("ssrc", 3).len(), 1);
        assert!(store.add_index("ssrc", ssrc_index).is_err());
    }

    #[test]
    fn test_sweep_removes_through_index_path() {
        let mut store = store_with_index();
        store.insert(
            "keep".into(),
            Entity {
                ssrc: Some(1),
                payload: "keep",
            },
        );
        store.insert(
            "drop".into(),
            Entity {
                ssrc: Some(2),
                payload: "drop",
            },
        );

        let removed = store.sweep_unvisited(|entity| entity.payload == "keep");
        assert_eq!(removed, vec!["drop".to_string()]);
        assert!(store.values_by_index("ssrc", 2).is_empty());
        assert_eq!(store.values_by_index("ssrc", 1).len(), 1);
    }
}
