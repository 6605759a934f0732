use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use crate::codec::{StateKeyCodec, StateValueCodec};
use crate::storage::{OrderedWrites, Storage, StorageKey, StorageValue};
use crate::Prefix;

/// An event emitted by a module while executing a call.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    borsh::BorshSerialize,
    borsh::BorshDeserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Event {
    key: String,
    value: String,
}

impl Event {
    /// Creates a new event.
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }

    /// The event key, usually `"<Module>: <operation>"`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The free-form event payload.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Committed writes layered on top of the underlying storage snapshot.
///
/// This structure is obtained from the [`WorkingSet`] by using either the
/// `checkpoint` or `revert` method.
pub struct StateCheckpoint<S: Storage> {
    inner: S,
    writes: BTreeMap<StorageKey, Option<StorageValue>>,
}

impl<S: Storage> Debug for StateCheckpoint<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCheckpoint")
            .field("writes", &self.writes.len())
            .finish()
    }
}

impl<S: Storage> StateCheckpoint<S> {
    /// Creates a checkpoint with no pending writes over `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: Default::default(),
        }
    }

    /// Opens a new revertable [`WorkingSet`] on top of this checkpoint.
    pub fn to_revertable(self) -> WorkingSet<S> {
        WorkingSet {
            delta: RevertableWrites {
                inner: self,
                writes: Default::default(),
            },
            events: Default::default(),
        }
    }

    /// Drains the accumulated writes, ready to be committed to the storage.
    pub fn freeze(&mut self) -> OrderedWrites {
        std::mem::take(&mut self.writes).into_iter().collect()
    }

    fn get(&self, key: &StorageKey) -> Option<StorageValue> {
        match self.writes.get(key) {
            Some(value) => value.clone(),
            None => self.inner.get(key),
        }
    }
}

/// Writes of the transaction currently being executed. Reads are first checked
/// against this map, and if the key is not present, the checkpoint is checked.
struct RevertableWrites<S: Storage> {
    inner: StateCheckpoint<S>,
    writes: HashMap<StorageKey, Option<StorageValue>>,
}

impl<S: Storage> RevertableWrites<S> {
    fn get(&self, key: &StorageKey) -> Option<StorageValue> {
        match self.writes.get(key) {
            Some(value) => value.clone(),
            None => self.inner.get(key),
        }
    }

    fn set(&mut self, key: StorageKey, value: StorageValue) {
        self.writes.insert(key, Some(value));
    }

    fn delete(&mut self, key: StorageKey) {
        self.writes.insert(key, None);
    }

    fn commit(self) -> StateCheckpoint<S> {
        let mut inner = self.inner;
        inner.writes.extend(self.writes);
        inner
    }

    fn revert(self) -> StateCheckpoint<S> {
        self.inner
    }
}

/// This structure contains the read-write set and the events collected during the execution of a transaction.
/// There are two ways to convert it into a [`StateCheckpoint`]:
/// 1. By using the checkpoint() method, where all the changes are added to the underlying [`StateCheckpoint`].
/// 2. By using the revert method, where the most recent changes are reverted and the previous [`StateCheckpoint`] is returned.
pub struct WorkingSet<S: Storage> {
    delta: RevertableWrites<S>,
    events: Vec<Event>,
}

impl<S: Storage> WorkingSet<S> {
    /// Creates a working set over a storage snapshot.
    pub fn new(inner: S) -> Self {
        StateCheckpoint::new(inner).to_revertable()
    }

    /// Keeps the writes of this working set. Events are discarded; take them first.
    pub fn checkpoint(self) -> StateCheckpoint<S> {
        self.delta.commit()
    }

    /// Discards the writes and events of this working set.
    pub fn revert(self) -> StateCheckpoint<S> {
        self.delta.revert()
    }

    /// Records an event.
    pub fn add_event(&mut self, key: &str, value: &str) {
        self.events.push(Event::new(key, value));
    }

    /// Removes and returns all the events recorded so far.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// The events recorded so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl<S: Storage> WorkingSet<S> {
    pub(crate) fn set_value<K, V, Codec>(
        &mut self,
        prefix: &Prefix,
        storage_key: &K,
        value: &V,
        codec: &Codec,
    ) where
        Codec: StateKeyCodec<K> + StateValueCodec<V>,
    {
        let storage_key = StorageKey::new(prefix, storage_key, codec);
        let storage_value = StorageValue::new(value, codec);
        self.delta.set(storage_key, storage_value);
    }

    pub(crate) fn get_value<K, V, Codec>(
        &mut self,
        prefix: &Prefix,
        storage_key: &K,
        codec: &Codec,
    ) -> Option<V>
    where
        Codec: StateKeyCodec<K> + StateValueCodec<V>,
    {
        let storage_key = StorageKey::new(prefix, storage_key, codec);
        self.get_decoded(&storage_key, codec)
    }

    pub(crate) fn remove_value<K, V, Codec>(
        &mut self,
        prefix: &Prefix,
        storage_key: &K,
        codec: &Codec,
    ) -> Option<V>
    where
        Codec: StateKeyCodec<K> + StateValueCodec<V>,
    {
        let storage_key = StorageKey::new(prefix, storage_key, codec);
        let value = self.get_decoded(&storage_key, codec)?;
        self.delta.delete(storage_key);
        Some(value)
    }

    pub(crate) fn set_singleton<V, Codec>(&mut self, prefix: &Prefix, value: &V, codec: &Codec)
    where
        Codec: StateValueCodec<V>,
    {
        let storage_key = StorageKey::singleton(prefix);
        let storage_value = StorageValue::new(value, codec);
        self.delta.set(storage_key, storage_value);
    }

    pub(crate) fn get_singleton<V, Codec>(&mut self, prefix: &Prefix, codec: &Codec) -> Option<V>
    where
        Codec: StateValueCodec<V>,
    {
        let storage_key = StorageKey::singleton(prefix);
        self.get_decoded(&storage_key, codec)
    }

    fn get_decoded<V, Codec>(&mut self, storage_key: &StorageKey, codec: &Codec) -> Option<V>
    where
        Codec: StateValueCodec<V>,
    {
        let storage_value = self.delta.get(storage_key)?;
        // A value that does not decode means the storage is corrupted.
        Some(codec.decode_value(storage_value.value()))
    }
}
