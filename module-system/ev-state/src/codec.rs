//! Serialization and deserialization -related logic.

/// A trait for types that can serialize and deserialize keys for storage
/// access.
pub trait StateKeyCodec<K> {
    /// Error type that can arise during deserialization.
    type KeyError: std::fmt::Debug;

    /// Serializes a key into a bytes vector.
    ///
    /// This method **must** not panic as all instances of the key type are
    /// supposed to be serializable.
    fn encode_key(&self, key: &K) -> Vec<u8>;

    /// Tries to deserialize a key from a bytes slice, and returns a
    /// [`Result`] with either the deserialized key or an error.
    fn try_decode_key(&self, bytes: &[u8]) -> Result<K, Self::KeyError>;
}

/// A trait for types that can serialize and deserialize values for storage
/// access.
pub trait StateValueCodec<V> {
    /// Error type that can arise during deserialization.
    type ValueError: std::fmt::Debug;

    /// Serializes a value into a bytes vector.
    ///
    /// This method **must** not panic as all instances of the value type are
    /// supposed to be serializable.
    fn encode_value(&self, value: &V) -> Vec<u8>;

    /// Tries to deserialize a value from a bytes slice, and returns a
    /// [`Result`] with either the deserialized value or an error.
    fn try_decode_value(&self, bytes: &[u8]) -> Result<V, Self::ValueError>;

    /// Deserializes a value from a bytes slice.
    ///
    /// # Panics
    /// Panics if the call to [`StateValueCodec::try_decode_value`] fails. A value
    /// that was written through the same codec can only fail to decode if the
    /// storage is corrupted.
    fn decode_value(&self, bytes: &[u8]) -> V {
        match self.try_decode_value(bytes) {
            Ok(value) => value,
            Err(err) => panic!(
                "Failed to decode value 0x{}, error: {:?}",
                hex::encode(bytes),
                err
            ),
        }
    }
}

/// A [`StateKeyCodec`] and [`StateValueCodec`] that uses [`borsh`] for all keys and values.
#[derive(Debug, Default, PartialEq, Eq, Clone, borsh::BorshDeserialize, borsh::BorshSerialize)]
pub struct BorshCodec;

impl<K> StateKeyCodec<K> for BorshCodec
where
    K: borsh::BorshSerialize + borsh::BorshDeserialize,
{
    type KeyError = std::io::Error;

    fn encode_key(&self, key: &K) -> Vec<u8> {
        key.try_to_vec().expect("Failed to serialize key")
    }

    fn try_decode_key(&self, bytes: &[u8]) -> Result<K, Self::KeyError> {
        K::try_from_slice(bytes)
    }
}

impl<V> StateValueCodec<V> for BorshCodec
where
    V: borsh::BorshSerialize + borsh::BorshDeserialize,
{
    type ValueError = std::io::Error;

    fn encode_value(&self, value: &V) -> Vec<u8> {
        value.try_to_vec().expect("Failed to serialize value")
    }

    fn try_decode_value(&self, bytes: &[u8]) -> Result<V, Self::ValueError> {
        V::try_from_slice(bytes)
    }
}
