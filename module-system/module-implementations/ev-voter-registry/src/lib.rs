pub mod call;
mod error;
pub mod genesis;
pub mod query;


pub use call::CallMessage;
pub use error::RegistryError;
use ev_modules_api::{CallResponse, Context, Error, ModuleInfo, ModulePrefix, Spec, WorkingSet};
use ev_state::{StateMap, StateValue};
pub use query::VoterRecord;

const MODULE_NAME: &str = "VoterRegistry";

/// Initial configuration for the [`VoterRegistry`] module.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound = "C::Address: serde::Serialize + serde::de::DeserializeOwned")]
pub struct VoterRegistryConfig<C: Context> {
    /// The only identity allowed to register voters and manage authorized callers.
    pub admin: C::Address,
}

/// Registration record stored per voter identity.
#[derive(borsh::BorshDeserialize, borsh::BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Voter {
    pub(crate) personal_id: String,
    pub(crate) full_name: String,
    pub(crate) has_voted: bool,
}

/// Registered voters, their one-time personal identifiers and whether they already voted.
#[derive(Clone)]
pub struct VoterRegistry<C: Context> {
    pub(crate) address: C::Address,

    pub(crate) admin: StateValue<C::Address>,

    pub(crate) voters: StateMap<C::Address, Voter>,

    /// Reverse index used to keep personal identifiers unique.
    pub(crate) personal_ids: StateMap<String, C::Address>,

    /// Callers allowed to invoke `mark_voted`.
    pub(crate) authorized_callers: StateMap<C::Address, bool>,

    pub(crate) voter_count: StateValue<u64>,
}

impl<C: Context> Default for VoterRegistry<C> {
    fn default() -> Self {
        let storage = |field: &'static str| -> ev_state::Prefix {
            ModulePrefix::new_storage(module_path!(), MODULE_NAME, field).into()
        };
        Self {
            address: ModulePrefix::new_module(module_path!(), MODULE_NAME)
                .hash()
                .into(),
            admin: StateValue::new(storage("admin")),
            voters: StateMap::new(storage("voters")),
            personal_ids: StateMap::new(storage("personal_ids")),
            authorized_callers: StateMap::new(storage("authorized_callers")),
            voter_count: StateValue::new(storage("voter_count")),
        }
    }
}

impl<C: Context> ModuleInfo for VoterRegistry<C> {
    type Context = C;

    fn address(&self) -> &C::Address {
        &self.address
    }

    fn prefix(&self) -> ModulePrefix {
        ModulePrefix::new_module(module_path!(), MODULE_NAME)
    }

    fn dependencies(&self) -> Vec<&C::Address> {
        Vec::new()
    }
}

impl<C: Context> ev_modules_api::Module for VoterRegistry<C> {
    type Context = C;

    type Config = VoterRegistryConfig<C>;

    type CallMessage = call::CallMessage<C>;

    fn genesis(
        &self,
        config: &Self::Config,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<(), Error> {
        Ok(self.init_module(config, working_set)?)
    }

    fn call(
        &self,
        msg: Self::CallMessage,
        context: &Self::Context,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse, Error> {
        match msg {
            CallMessage::RegisterVoter {
                voter,
                personal_id,
                full_name,
            } => Ok(self.register_voter(voter, personal_id, full_name, context, working_set)?),

            CallMessage::AuthorizeContract { caller } => {
                Ok(self.authorize_contract(caller, context, working_set)?)
            }

            CallMessage::RevokeContract { caller } => {
                Ok(self.revoke_contract(&caller, context, working_set)?)
            }
        }
    }
}
