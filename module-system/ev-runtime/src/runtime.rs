use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use ev_ballot::Ballot;
use ev_modules_api::{
    CallResponse, Context, DispatchCall, EncodeCall, Error, Genesis, Module, ModuleInfo, Spec,
    WorkingSet,
};
use ev_voter_registry::VoterRegistry;

/// The ledger receives serialized call messages and executes each of them as an atomic transaction.
/// Upon reception, the message is deserialized into a [`RuntimeCall`] and forwarded to the module it
/// names.
///
/// The runtime defines:
/// - how the modules are wired up together: the ballot holds its own handle on the registry
///   state, so both fields below read and write the same registry storage;
/// - how the state is initialized (`Genesis`);
/// - how messages are decoded and dispatched (`DispatchCall`).
///
/// If a call returns an error, no state is updated: the caller reverts the working set.
pub struct Runtime<C: Context> {
    pub voter_registry: VoterRegistry<C>,
    pub ballot: Ballot<C>,
}

impl<C: Context> Default for Runtime<C> {
    fn default() -> Self {
        Self {
            voter_registry: VoterRegistry::default(),
            ballot: Ballot::default(),
        }
    }
}

/// Genesis configuration of every module in the runtime.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound = "C::Address: serde::Serialize + serde::de::DeserializeOwned")]
pub struct GenesisConfig<C: Context> {
    pub voter_registry: <VoterRegistry<C> as Module>::Config,
    pub ballot: <Ballot<C> as Module>::Config,
}

impl<C: Context> GenesisConfig<C> {
    /// Both modules administered by the same identity.
    pub fn with_admin(admin: C::Address) -> Self {
        Self {
            voter_registry: ev_voter_registry::VoterRegistryConfig {
                admin: admin.clone(),
            },
            ballot: ev_ballot::BallotConfig { admin },
        }
    }
}

/// A call message addressed to one of the runtime modules.
#[cfg_attr(
    feature = "native",
    derive(schemars::JsonSchema),
    schemars(bound = "C::Address: ::schemars::JsonSchema", rename = "RuntimeCall")
)]
#[derive(BorshDeserialize, BorshSerialize, serde::Serialize, serde::Deserialize, Debug, PartialEq, Clone)]
#[serde(
    bound = "C::Address: serde::Serialize + serde::de::DeserializeOwned",
    rename_all = "snake_case"
)]
pub enum RuntimeCall<C: Context> {
    VoterRegistry(ev_voter_registry::CallMessage<C>),
    Ballot(ev_ballot::CallMessage),
}

impl<C: Context> Genesis for Runtime<C> {
    type Context = C;

    type Config = GenesisConfig<C>;

    fn genesis(
        &self,
        config: &Self::Config,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<(), Error> {
        Module::genesis(&self.voter_registry, &config.voter_registry, working_set)?;
        Module::genesis(&self.ballot, &config.ballot, working_set)?;
        Ok(())
    }
}

impl<C: Context> DispatchCall for Runtime<C> {
    type Context = C;

    type Decodable = RuntimeCall<C>;

    fn decode_call(serialized_message: &[u8]) -> Result<Self::Decodable, io::Error> {
        RuntimeCall::<C>::try_from_slice(serialized_message)
    }

    fn dispatch_call(
        &self,
        message: Self::Decodable,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
        context: &Self::Context,
    ) -> Result<CallResponse, Error> {
        match message {
            RuntimeCall::VoterRegistry(message) => {
                self.voter_registry.call(message, context, working_set)
            }
            RuntimeCall::Ballot(message) => self.ballot.call(message, context, working_set),
        }
    }

    fn module_address(&self, message: &Self::Decodable) -> &C::Address {
        match message {
            RuntimeCall::VoterRegistry(_) => self.voter_registry.address(),
            RuntimeCall::Ballot(_) => self.ballot.address(),
        }
    }
}

impl<C: Context> EncodeCall<VoterRegistry<C>> for Runtime<C> {
    fn encode_call(data: <VoterRegistry<C> as Module>::CallMessage) -> Vec<u8> {
        encode(&RuntimeCall::<C>::VoterRegistry(data))
    }
}

impl<C: Context> EncodeCall<Ballot<C>> for Runtime<C> {
    fn encode_call(data: <Ballot<C> as Module>::CallMessage) -> Vec<u8> {
        encode(&RuntimeCall::<C>::Ballot(data))
    }
}

impl<C: Context> Runtime<C> {
    /// Encodes voter_registry call message.
    pub fn encode_voter_registry_call(data: <VoterRegistry<C> as Module>::CallMessage) -> Vec<u8> {
        <Self as EncodeCall<VoterRegistry<C>>>::encode_call(data)
    }

    /// Encodes ballot call message.
    pub fn encode_ballot_call(data: <Ballot<C> as Module>::CallMessage) -> Vec<u8> {
        <Self as EncodeCall<Ballot<C>>>::encode_call(data)
    }
}

fn encode<C: Context>(call: &RuntimeCall<C>) -> Vec<u8> {
    call.try_to_vec()
        .expect("Serializing a call message into memory must not fail")
}
