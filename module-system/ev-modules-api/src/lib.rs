//! Interfaces shared by the e-voting modules: addresses, execution context,
//! the [`Module`] trait and the error type every call returns.

mod address;
mod clock;
pub mod default_context;
mod dispatch;
mod error;
mod prefix;
mod response;
mod utils;

use core::fmt::{Debug, Display};
use core::hash::Hash;

pub use address::{Address, AddressBech32, AddressParseError, HRP};
use borsh::{BorshDeserialize, BorshSerialize};
pub use clock::{Clock, MockClock, SystemClock, Timestamp};
pub use dispatch::{DispatchCall, EncodeCall, Genesis};
pub use error::Error;
pub use ev_state::{Event, Storage, WorkingSet};
pub use prefix::ModulePrefix;
pub use response::CallResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;
pub use utils::generate_address;

/// Everything an address type has to provide to be stored, displayed and
/// used as a map key.
pub trait AddressTrait:
    PartialEq
    + Eq
    + Ord
    + Hash
    + Debug
    + Display
    + Clone
    + AsRef<[u8]>
    + for<'a> TryFrom<&'a [u8], Error = AddressParseError>
    + From<[u8; 32]>
    + BorshSerialize
    + BorshDeserialize
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl AddressTrait for Address {}

/// The `Spec` trait configures the primitives used by a particular deployment of the ledger.
/// It is almost always implemented on a [`Context`] object; since all modules are generic
/// over a context, swapping the context swaps the address type and the storage backend
/// without touching the module implementations.
pub trait Spec {
    /// The address type used for voters, administrators and modules.
    #[cfg(feature = "native")]
    type Address: AddressTrait + schemars::JsonSchema;

    /// The address type used for voters, administrators and modules.
    #[cfg(not(feature = "native"))]
    type Address: AddressTrait;

    /// State storage the modules read from and write to.
    type Storage: Storage + Send + Sync;
}

/// A context contains the information passed to modules while a transaction executes:
/// the authenticated sender and the time at which the transaction is applied.
pub trait Context:
    Spec
    + Clone
    + Debug
    + PartialEq
    + BorshSerialize
    + BorshDeserialize
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Sender of the transaction.
    fn sender(&self) -> &Self::Address;

    /// Time at which the transaction is executed, sampled once by the caller.
    fn timestamp(&self) -> Timestamp;

    /// Constructor for the Context.
    fn new(sender: Self::Address, timestamp: Timestamp) -> Self;
}

/// Every module has to implement this trait.
pub trait Module {
    /// Execution context.
    type Context: Context;

    /// Configuration for the genesis method.
    type Config;

    /// Module defined argument to the call method.
    type CallMessage: Debug + BorshSerialize + BorshDeserialize;

    /// Genesis is called when the ledger is deployed and can be used to set initial state values in the module.
    fn genesis(
        &self,
        _config: &Self::Config,
        _working_set: &mut WorkingSet<<Self::Context as Spec>::Storage>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Call allows interaction with the module and invokes state changes.
    /// It takes a module defined type and a context as parameters.
    fn call(
        &self,
        message: Self::CallMessage,
        context: &Self::Context,
        working_set: &mut WorkingSet<<Self::Context as Spec>::Storage>,
    ) -> Result<CallResponse, Error>;
}

/// JSON Schema of the call message of a module, used by the CLI.
#[cfg(feature = "native")]
pub trait ModuleCallJsonSchema: Module {
    /// Returns the JSON schema for [`Module::CallMessage`].
    fn json_schema() -> String;
}

#[cfg(feature = "native")]
impl<T> ModuleCallJsonSchema for T
where
    T: Module,
    T::CallMessage: schemars::JsonSchema,
{
    fn json_schema() -> String {
        let schema = schemars::schema_for!(T::CallMessage);
        serde_json::to_string_pretty(&schema)
            .expect("Serialization of a JSON schema must not fail")
    }
}

/// Static information about a module: where its state lives and which address it acts as.
pub trait ModuleInfo {
    type Context: Context;

    /// Returns address of the module.
    fn address(&self) -> &<Self::Context as Spec>::Address;

    /// Returns the prefix shared by the state of the module.
    fn prefix(&self) -> ModulePrefix;

    /// Returns the addresses of the modules this module calls into.
    fn dependencies(&self) -> Vec<&<Self::Context as Spec>::Address>;
}
