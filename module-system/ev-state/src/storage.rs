use std::sync::Arc;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::codec::{StateKeyCodec, StateValueCodec};
use crate::Prefix;

/// `Key` type for the [`Storage`].
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
)]
pub struct StorageKey {
    key: Arc<Vec<u8>>,
}

impl StorageKey {
    /// Creates a new [`StorageKey`] that combines a prefix and a key.
    pub fn new<K, KC>(prefix: &Prefix, key: &K, codec: &KC) -> Self
    where
        KC: StateKeyCodec<K>,
    {
        let encoded_key = codec.encode_key(key);

        let mut full_key = Vec::<u8>::with_capacity(prefix.len() + encoded_key.len());
        full_key.extend(prefix.as_bytes());
        full_key.extend(&encoded_key);

        Self {
            key: Arc::new(full_key),
        }
    }

    /// Creates a new [`StorageKey`] for a container holding a single value.
    pub fn singleton(prefix: &Prefix) -> Self {
        Self {
            key: Arc::new(prefix.as_bytes().to_vec()),
        }
    }
}

/// A serialized value suitable for storing. Internally uses an [`Arc<Vec<u8>>`] for cheap cloning.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize, Default,
)]
pub struct StorageValue {
    value: Arc<Vec<u8>>,
}

impl From<Vec<u8>> for StorageValue {
    fn from(value: Vec<u8>) -> Self {
        Self {
            value: Arc::new(value),
        }
    }
}

impl StorageValue {
    /// Create a new storage value by serializing the input with the given codec.
    pub fn new<V, VC>(value: &V, codec: &VC) -> Self
    where
        VC: StateValueCodec<V>,
    {
        let encoded_value = codec.encode_value(value);
        Self {
            value: Arc::new(encoded_value),
        }
    }

    /// Get the bytes of this value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Writes produced by a transaction, in key order. `None` marks a deletion.
pub type OrderedWrites = Vec<(StorageKey, Option<StorageValue>)>;

/// An interface for storing and retrieving values in the storage.
///
/// Cloning a storage must yield a consistent snapshot: writes committed to the
/// original after the clone was taken are not visible through the clone.
pub trait Storage: Clone {
    /// Returns the value corresponding to the key or None if key is absent.
    fn get(&self, key: &StorageKey) -> Option<StorageValue>;

    /// Applies the writes of a finished transaction.
    fn commit(&mut self, writes: OrderedWrites);

    /// Indicates if storage is empty or not.
    fn is_empty(&self) -> bool;
}
