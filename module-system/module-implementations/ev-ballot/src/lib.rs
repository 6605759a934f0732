pub mod call;
mod error;
pub mod genesis;
pub mod query;

#[cfg(test)]
mod tests;

mod types;

pub use call::CallMessage;
pub use error::BallotError;
use ev_modules_api::{CallResponse, Context, Error, ModuleInfo, ModulePrefix, Spec, WorkingSet};
use ev_state::{StateMap, StateValue, StateVec};
use ev_voter_registry::VoterRegistry;
pub use query::ElectionResults;
pub use types::{Candidate, Election};

const MODULE_NAME: &str = "Ballot";

/// Initial configuration for the [`Ballot`] module.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound = "C::Address: serde::Serialize + serde::de::DeserializeOwned")]
pub struct BallotConfig<C: Context> {
    /// The only identity allowed to create and end elections and add candidates.
    pub admin: C::Address,
}

#[derive(Clone)]
pub struct Ballot<C: Context> {
    pub(crate) address: C::Address,

    pub(crate) admin: StateValue<C::Address>,

    /// Every election ever created, indexed by its id. The last one is the current election.
    pub(crate) elections: StateVec<Election>,

    /// Candidates keyed by `(election id, candidate index)`.
    pub(crate) candidates: StateMap<(u64, u64), Candidate>,

    pub(crate) candidate_counts: StateMap<u64, u64>,

    /// Reference to the registry module, used to check voters and mark them as voted.
    pub(crate) voter_registry: VoterRegistry<C>,
}

impl<C: Context> Default for Ballot<C> {
    fn default() -> Self {
        let storage = |field: &'static str| -> ev_state::Prefix {
            ModulePrefix::new_storage(module_path!(), MODULE_NAME, field).into()
        };
        Self {
            address: ModulePrefix::new_module(module_path!(), MODULE_NAME)
                .hash()
                .into(),
            admin: StateValue::new(storage("admin")),
            elections: StateVec::new(storage("elections")),
            candidates: StateMap::new(storage("candidates")),
            candidate_counts: StateMap::new(storage("candidate_counts")),
            voter_registry: VoterRegistry::default(),
        }
    }
}

impl<C: Context> ModuleInfo for Ballot<C> {
    type Context = C;

    fn address(&self) -> &C::Address {
        &self.address
    }

    fn prefix(&self) -> ModulePrefix {
        ModulePrefix::new_module(module_path!(), MODULE_NAME)
    }

    fn dependencies(&self) -> Vec<&C::Address> {
        vec![self.voter_registry.address()]
    }
}

impl<C: Context> ev_modules_api::Module for Ballot<C> {
    type Context = C;

    type Config = BallotConfig<C>;

    type CallMessage = call::CallMessage;

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
            CallMessage::CreateElection {
                name,
                description,
                start_time,
                end_time,
            } => Ok(self.create_election(
                name,
                description,
                start_time,
                end_time,
                context,
                working_set,
            )?),

            CallMessage::AddCandidate {
                name,
                party,
                image_ref,
            } => Ok(self.add_candidate(name, party, image_ref, context, working_set)?),

            CallMessage::CastVote { candidate_index } => {
                Ok(self.cast_vote(candidate_index, context, working_set)?)
            }

            CallMessage::EndElection => Ok(self.end_election(context, working_set)?),
        }
    }
}
