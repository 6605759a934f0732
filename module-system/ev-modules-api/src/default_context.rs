use borsh::{BorshDeserialize, BorshSerialize};
use ev_state::InMemoryStorage;
use serde::{Deserialize, Serialize};

use crate::{Address, Context, Spec, Timestamp};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DefaultContext {
    pub sender: Address,
    pub timestamp: Timestamp,
}

impl Spec for DefaultContext {
    type Address = Address;
    type Storage = InMemoryStorage;
}

impl Context for DefaultContext {
    fn sender(&self) -> &Self::Address {
        &self.sender
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn new(sender: Self::Address, timestamp: Timestamp) -> Self {
        Self { sender, timestamp }
    }
}
