use std::marker::PhantomData;

use thiserror::Error;

use crate::codec::{BorshCodec, StateKeyCodec, StateValueCodec};
use crate::{Prefix, Storage, WorkingSet};

/// An append-friendly vector stored element by element.
///
/// The length lives under the bare prefix, element `i` under the prefix
/// followed by the encoded index.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVec<V, Codec = BorshCodec> {
    _phantom: PhantomData<V>,
    codec: Codec,
    prefix: Prefix,
}

/// Error returned by [`StateVec::set`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StateVecError {
    /// The index is past the end of the vector.
    #[error("Index {index} is out of bounds for a vector of length {len}")]
    IndexOutOfBounds {
        /// The rejected index.
        index: u64,
        /// Length of the vector at the time of the write.
        len: u64,
    },
}

impl<V> StateVec<V> {
    /// Crates a new [`StateVec`] with the given prefix and the default
    /// codec (i.e. [`BorshCodec`]).
    pub fn new(prefix: Prefix) -> Self {
        Self::with_codec(prefix, BorshCodec)
    }
}

impl<V, Codec> StateVec<V, Codec> {
    /// Creates a new [`StateVec`] with the given prefix and codec.
    pub fn with_codec(prefix: Prefix, codec: Codec) -> Self {
        Self {
            _phantom: PhantomData,
            codec,
            prefix,
        }
    }

    /// Returns the prefix used when this [`StateVec`] was created.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }
}

impl<V, Codec> StateVec<V, Codec>
where
    Codec: StateKeyCodec<u64> + StateValueCodec<V> + StateValueCodec<u64>,
{
    fn set_len<S: Storage>(&self, length: u64, working_set: &mut WorkingSet<S>) {
        working_set.set_singleton(self.prefix(), &length, &self.codec);
    }

    /// Returns the length of the [`StateVec`].
    pub fn len<S: Storage>(&self, working_set: &mut WorkingSet<S>) -> u64 {
        working_set
            .get_singleton::<u64, _>(self.prefix(), &self.codec)
            .unwrap_or_default()
    }

    /// Returns the value for the given index.
    pub fn get<S: Storage>(&self, index: u64, working_set: &mut WorkingSet<S>) -> Option<V> {
        if index >= self.len(working_set) {
            return None;
        }
        working_set.get_value(self.prefix(), &index, &self.codec)
    }

    /// Returns the last element, if any.
    pub fn last<S: Storage>(&self, working_set: &mut WorkingSet<S>) -> Option<V> {
        let len = self.len(working_set);
        if len == 0 {
            return None;
        }
        working_set.get_value(self.prefix(), &(len - 1), &self.codec)
    }

    /// Sets a value in the [`StateVec`].
    /// If the index is out of bounds, returns an error.
    /// To push a value to the end of the StateVec, use [`StateVec::push`].
    pub fn set<S: Storage>(
        &self,
        index: u64,
        value: &V,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), StateVecError> {
        let len = self.len(working_set);
        if index < len {
            working_set.set_value(self.prefix(), &index, value, &self.codec);
            Ok(())
        } else {
            Err(StateVecError::IndexOutOfBounds { index, len })
        }
    }

    /// Pushes a value to the end of the [`StateVec`] and returns its index.
    pub fn push<S: Storage>(&self, value: &V, working_set: &mut WorkingSet<S>) -> u64 {
        let len = self.len(working_set);

        working_set.set_value(self.prefix(), &len, value, &self.codec);
        self.set_len(len + 1, working_set);
        len
    }
}
