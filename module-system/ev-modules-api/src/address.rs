use std::fmt;
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use borsh::{BorshDeserialize, BorshSerialize};
use derive_more::{Display, Into};
use thiserror::Error;

/// Human readable part of every bech32m encoded address.
pub const HRP: &str = "vote";

/// The errors that might arise when parsing an [`Address`] from a string.
#[derive(Debug, Error, PartialEq)]
pub enum AddressParseError {
    #[error("Bech32 error: {0}")]
    Bech32(#[from] bech32::Error),
    #[error("Wrong HRP: {0}, expected: {HRP}")]
    WrongHrp(String),
    #[error("Address must be bech32m encoded")]
    WrongVariant,
    #[error("Invalid length {0}, should be 32")]
    InvalidLength(usize),
}

/// Textual (bech32m) form of an [`Address`].
#[derive(Debug, PartialEq, Clone, Eq, Into, Display)]
#[display(fmt = "{}", "value")]
pub struct AddressBech32 {
    value: String,
}

impl From<&Address> for AddressBech32 {
    fn from(addr: &Address) -> Self {
        // Encoding only fails on an invalid HRP and ours is a valid constant.
        let value = bech32::encode(HRP, addr.addr.to_base32(), Variant::Bech32m)
            .unwrap_or_else(|_| unreachable!("{HRP} is a valid human readable part"));
        AddressBech32 { value }
    }
}

/// A 32 byte identity: a voter, the administrator or a module.
#[derive(PartialEq, Clone, Copy, Eq, PartialOrd, Ord, BorshDeserialize, BorshSerialize, Hash)]
pub struct Address {
    addr: [u8; 32],
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.addr
    }
}

impl Address {
    /// Creates a new address containing the given bytes
    pub const fn new(addr: [u8; 32]) -> Self {
        Self { addr }
    }
}

impl From<[u8; 32]> for Address {
    fn from(addr: [u8; 32]) -> Self {
        Self { addr }
    }
}

impl<'a> TryFrom<&'a [u8]> for Address {
    type Error = AddressParseError;

    fn try_from(addr: &'a [u8]) -> Result<Self, Self::Error> {
        let addr: [u8; 32] = addr
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(addr.len()))?;
        Ok(Self { addr })
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data, variant) = bech32::decode(s)?;

        if hrp != HRP {
            return Err(AddressParseError::WrongHrp(hrp));
        }
        if variant != Variant::Bech32m {
            return Err(AddressParseError::WrongVariant);
        }

        let bytes = Vec::<u8>::from_base32(&data)?;
        Address::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AddressBech32::from(self))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", AddressBech32::from(self).to_string())
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&AddressBech32::from(self).to_string())
        } else {
            serde::Serialize::serialize(&self.addr, serializer)
        }
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let address: String = serde::Deserialize::deserialize(deserializer)?;
            Address::from_str(&address).map_err(serde::de::Error::custom)
        } else {
            let addr = <[u8; 32] as serde::Deserialize>::deserialize(deserializer)?;
            Ok(Address { addr })
        }
    }
}

#[cfg(feature = "native")]
impl schemars::JsonSchema for Address {
    fn schema_name() -> String {
        "Address".to_owned()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <String as schemars::JsonSchema>::json_schema(gen)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_address_serialization() {
        let address = Address::from([11; 32]);
        let data: String = serde_json::to_string(&address).unwrap();
        let deserialized_address = serde_json::from_str::<Address>(&data).unwrap();

        assert_eq!(address, deserialized_address);
        assert!(deserialized_address.to_string().starts_with("vote1"));
        assert_eq!(
            Address::from_str(&address.to_string()).unwrap(),
            address
        );
    }

    #[test]
    fn test_address_parse_errors() {
        let foreign = bech32::encode("sov", [11u8; 32].to_base32(), Variant::Bech32m).unwrap();
        assert_eq!(
            Address::from_str(&foreign),
            Err(AddressParseError::WrongHrp("sov".to_owned()))
        );

        let short = bech32::encode(HRP, [11u8; 20].to_base32(), Variant::Bech32m).unwrap();
        assert_eq!(
            Address::from_str(&short),
            Err(AddressParseError::InvalidLength(20))
        );

        let legacy = bech32::encode(HRP, [11u8; 32].to_base32(), Variant::Bech32).unwrap();
        assert_eq!(
            Address::from_str(&legacy),
            Err(AddressParseError::WrongVariant)
        );
    }
}
