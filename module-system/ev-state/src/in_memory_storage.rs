use std::collections::BTreeMap;
use std::sync::Arc;

use crate::storage::{OrderedWrites, Storage, StorageKey, StorageValue};

/// A [`Storage`] implementation backed by an ordered in-memory map.
///
/// The map sits behind an [`Arc`], so cloning the storage is cheap and yields a
/// snapshot. Committing on a storage that still shares its map with a snapshot
/// copies the map first; the snapshot keeps seeing the old state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    state: Arc<BTreeMap<StorageKey, StorageValue>>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.state.len()
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &StorageKey) -> Option<StorageValue> {
        self.state.get(key).cloned()
    }

    fn commit(&mut self, writes: OrderedWrites) {
        if writes.is_empty() {
            return;
        }

        let state = Arc::make_mut(&mut self.state);
        for (key, value) in writes {
            match value {
                Some(value) => {
                    state.insert(key, value);
                }
                None => {
                    state.remove(&key);
                }
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}
