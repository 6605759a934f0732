//! Storage and state management interfaces for e-voting modules.

#![deny(missing_docs)]

pub mod codec;
mod containers;
mod in_memory_storage;
mod scratchpad;

/// Trait and type definitions related to the [`Storage`] trait.
pub mod storage;


use std::fmt::Display;
use std::str;

pub use containers::*;
pub use in_memory_storage::InMemoryStorage;
pub use scratchpad::{Event, StateCheckpoint, WorkingSet};
pub use storage::{OrderedWrites, Storage, StorageKey, StorageValue};

/// A prefix prepended to each key before insertion and retrieval from the storage.
///
/// Every module shares the same working set, so each state container carries its own
/// prefix to keep keys from different containers apart.
#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Prefix {
    prefix: Vec<u8>,
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match str::from_utf8(&self.prefix) {
            Ok(s) => {
                write!(f, "{:?}", s)
            }
            Err(_) => {
                write!(f, "0x{}", hex::encode(&self.prefix))
            }
        }
    }
}

impl Prefix {
    /// Creates a new prefix from a byte vector.
    pub fn new(prefix: Vec<u8>) -> Self {
        Self { prefix }
    }

    /// Returns the raw bytes of the prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the length in bytes of the prefix.
    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    /// Returns `true` if the prefix is empty, `false` otherwise.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }
}
