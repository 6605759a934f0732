use std::sync::{Mutex, MutexGuard, RwLock};

use ev_ballot::{BallotError, Candidate, Election, ElectionResults};
use ev_modules_api::{
    CallResponse, Clock, Context, DispatchCall, Error as ModuleError, Event, Genesis, ModuleInfo,
    Spec, Storage, Timestamp, WorkingSet,
};
use ev_voter_registry::{RegistryError, VoterRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfiguredClock, LedgerConfig};
use crate::eligibility::{EligibilityGate, VoterIdDirectory};
use crate::identity::{Challenge, ChallengeAction, ChallengeBook};
use crate::runtime::{GenesisConfig, Runtime, RuntimeCall};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Genesis failed: {0}")]
    Genesis(#[source] ModuleError),
    #[error("Transaction rejected: {0}")]
    Rejected(#[source] ModuleError),
    #[error("Malformed call message: {0}")]
    Decode(#[from] std::io::Error),
}

impl LedgerError {
    /// The registry reason behind a rejection, including the ones a ballot call relays.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        let LedgerError::Rejected(err) = self else {
            return None;
        };
        match err.downcast_ref::<BallotError>() {
            Some(BallotError::Registry(reason)) => Some(reason),
            Some(_) => None,
            None => err.downcast_ref::<RegistryError>(),
        }
    }

    pub fn ballot_error(&self) -> Option<&BallotError> {
        match self {
            LedgerError::Rejected(err) => err.downcast_ref::<BallotError>(),
            _ => None,
        }
    }
}

/// Outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Receipt {
    pub executed_at: Timestamp,
    pub events: Vec<Event>,
}

/// State guarded by the writer lock, next to the right to mutate storage.
pub(crate) struct WriterState<G> {
    pub(crate) gate: G,
    pub(crate) challenges: ChallengeBook,
}

/// A serialized, single-writer transaction executor over the runtime.
///
/// Every mutating call runs on a fresh [`WorkingSet`] opened over the latest committed
/// snapshot while the writer lock is held. The writes are committed if the call succeeds
/// and dropped otherwise, so a call never partially applies. Queries clone the current
/// snapshot and run without the writer lock; they only ever see committed state.
pub struct ElectionLedger<C: Context, K: Clock, G = VoterIdDirectory<<C as Spec>::Address>> {
    runtime: Runtime<C>,
    clock: K,
    admin: C::Address,
    storage: RwLock<C::Storage>,
    pub(crate) writer: Mutex<WriterState<G>>,
}

impl<C> ElectionLedger<C, ConfiguredClock>
where
    C: Context,
    C::Storage: Default,
{
    /// Deploys a ledger on empty storage as described by `config`.
    pub fn from_config(config: &LedgerConfig<C>) -> Result<Self, LedgerError> {
        Self::deploy(
            C::Storage::default(),
            config.genesis_config(),
            config.clock(),
            config.voter_directory(),
        )
    }
}

impl<C, K, G> ElectionLedger<C, K, G>
where
    C: Context,
    K: Clock,
    G: EligibilityGate<C::Address>,
{
    /// Runs genesis for both modules, then authorizes the ballot in the registry
    /// on behalf of the registry administrator.
    pub fn deploy(
        storage: C::Storage,
        genesis: GenesisConfig<C>,
        clock: K,
        gate: G,
    ) -> Result<Self, LedgerError> {
        let runtime = Runtime::<C>::default();
        let admin = genesis.voter_registry.admin.clone();

        let mut working_set = WorkingSet::new(storage.clone());
        if let Err(err) = runtime.genesis(&genesis, &mut working_set) {
            working_set.revert();
            return Err(LedgerError::Genesis(err));
        }
        let mut storage = storage;
        storage.commit(working_set.checkpoint().freeze());

        let ledger = Self {
            runtime,
            clock,
            admin,
            storage: RwLock::new(storage),
            writer: Mutex::new(WriterState {
                gate,
                challenges: ChallengeBook::default(),
            }),
        };

        let ballot = ledger.runtime.ballot.address().clone();
        let admin = ledger.admin.clone();
        ledger.authorize_contract(&admin, ballot.clone())?;
        info!("Ledger deployed, ballot {} authorized in the registry", ballot);

        Ok(ledger)
    }

    pub fn admin(&self) -> &C::Address {
        &self.admin
    }

    pub fn runtime(&self) -> &Runtime<C> {
        &self.runtime
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Executes a call message as one transaction signed by `sender`.
    pub fn submit(&self, sender: &C::Address, call: RuntimeCall<C>) -> Result<Receipt, LedgerError> {
        let _writer = self.lock_writer();
        let receipt = self.execute(sender, |runtime, context, working_set| {
            runtime.dispatch_call(call, working_set, context)
        })?;
        Ok(self.commit(receipt))
    }

    /// Decodes a borsh-encoded [`RuntimeCall`] and executes it.
    pub fn submit_raw(&self, sender: &C::Address, message: &[u8]) -> Result<Receipt, LedgerError> {
        let call = Runtime::<C>::decode_call(message)?;
        self.submit(sender, call)
    }

    pub fn register_voter(
        &self,
        sender: &C::Address,
        voter: C::Address,
        personal_id: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Result<Receipt, LedgerError> {
        self.submit(
            sender,
            RuntimeCall::VoterRegistry(ev_voter_registry::CallMessage::RegisterVoter {
                voter,
                personal_id: personal_id.into(),
                full_name: full_name.into(),
            }),
        )
    }

    pub fn authorize_contract(
        &self,
        sender: &C::Address,
        caller: C::Address,
    ) -> Result<Receipt, LedgerError> {
        self.submit(
            sender,
            RuntimeCall::VoterRegistry(ev_voter_registry::CallMessage::AuthorizeContract {
                caller,
            }),
        )
    }

    pub fn revoke_contract(
        &self,
        sender: &C::Address,
        caller: C::Address,
    ) -> Result<Receipt, LedgerError> {
        self.submit(
            sender,
            RuntimeCall::VoterRegistry(ev_voter_registry::CallMessage::RevokeContract { caller }),
        )
    }

    /// Invokes the registry's `mark_voted` with `sender` as the caller.
    pub fn mark_voted(
        &self,
        sender: &C::Address,
        voter: &C::Address,
    ) -> Result<Receipt, LedgerError> {
        let _writer = self.lock_writer();
        let receipt = self.execute(sender, |runtime, context, working_set| {
            Ok(runtime
                .voter_registry
                .mark_voted(voter, context, working_set)?)
        })?;
        Ok(self.commit(receipt))
    }

    pub fn create_election(
        &self,
        sender: &C::Address,
        name: impl Into<String>,
        description: impl Into<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<Receipt, LedgerError> {
        self.submit(
            sender,
            RuntimeCall::Ballot(ev_ballot::CallMessage::CreateElection {
                name: name.into(),
                description: description.into(),
                start_time,
                end_time,
            }),
        )
    }

    pub fn add_candidate(
        &self,
        sender: &C::Address,
        name: impl Into<String>,
        party: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Result<Receipt, LedgerError> {
        self.submit(
            sender,
            RuntimeCall::Ballot(ev_ballot::CallMessage::AddCandidate {
                name: name.into(),
                party: party.into(),
                image_ref: image_ref.into(),
            }),
        )
    }

    pub fn cast_vote(
        &self,
        sender: &C::Address,
        candidate_index: u64,
    ) -> Result<Receipt, LedgerError> {
        self.submit(
            sender,
            RuntimeCall::Ballot(ev_ballot::CallMessage::CastVote { candidate_index }),
        )
    }

    pub fn end_election(&self, sender: &C::Address) -> Result<Receipt, LedgerError> {
        self.submit(sender, RuntimeCall::Ballot(ev_ballot::CallMessage::EndElection))
    }

    /// Hands out a fresh challenge for the identity provider to sign. It can be
    /// redeemed once, within [`CHALLENGE_TTL`](crate::CHALLENGE_TTL) seconds.
    pub fn issue_challenge(&self, action: ChallengeAction) -> Challenge {
        let now = self.clock.now();
        self.lock_writer().challenges.issue(action, now)
    }

    /// Challenges issued and not yet redeemed or evicted.
    pub fn outstanding_challenges(&self) -> usize {
        self.lock_writer().challenges.len()
    }

    /// A consistent view of the committed state.
    pub fn snapshot(&self) -> C::Storage {
        self.storage
            .read()
            .expect("Storage lock must not be poisoned")
            .clone()
    }

    /// Runs a read-only closure against the latest committed snapshot.
    pub fn query<R>(
        &self,
        query: impl FnOnce(&Runtime<C>, &mut WorkingSet<C::Storage>) -> R,
    ) -> R {
        let mut working_set = WorkingSet::new(self.snapshot());
        query(&self.runtime, &mut working_set)
    }

    pub fn is_voter_registered(&self, voter: &C::Address) -> bool {
        self.query(|runtime, ws| runtime.voter_registry.is_voter_registered(voter, ws))
    }

    pub fn has_voter_voted(&self, voter: &C::Address) -> bool {
        self.query(|runtime, ws| runtime.voter_registry.has_voter_voted(voter, ws))
    }

    pub fn get_voter_details(&self, voter: &C::Address) -> VoterRecord {
        self.query(|runtime, ws| runtime.voter_registry.get_voter_details(voter, ws))
    }

    pub fn is_authorized(&self, caller: &C::Address) -> bool {
        self.query(|runtime, ws| runtime.voter_registry.is_authorized(caller, ws))
    }

    pub fn voter_count(&self) -> u64 {
        self.query(|runtime, ws| runtime.voter_registry.voter_count(ws))
    }

    pub fn get_election_info(&self) -> Option<Election> {
        self.query(|runtime, ws| runtime.ballot.get_election_info(ws))
    }

    pub fn get_election(&self, id: u64) -> Option<Election> {
        self.query(|runtime, ws| runtime.ballot.get_election(id, ws))
    }

    pub fn election_count(&self) -> u64 {
        self.query(|runtime, ws| runtime.ballot.election_count(ws))
    }

    pub fn get_candidate_count(&self) -> u64 {
        self.query(|runtime, ws| runtime.ballot.get_candidate_count(ws))
    }

    pub fn get_candidate(&self, index: u64) -> Result<Candidate, BallotError> {
        self.query(|runtime, ws| runtime.ballot.get_candidate(index, ws))
    }

    pub fn get_results(&self) -> Option<ElectionResults> {
        self.query(|runtime, ws| runtime.ballot.get_results(ws))
    }

    pub fn total_votes(&self) -> u64 {
        self.query(|runtime, ws| runtime.ballot.total_votes(ws))
    }

    pub(crate) fn lock_writer(&self) -> MutexGuard<'_, WriterState<G>> {
        self.writer
            .lock()
            .expect("Writer lock must not be poisoned")
    }

    /// Runs `f` on a working set over the latest snapshot with `now` sampled once.
    /// Callers must hold the writer lock until the result is committed or dropped.
    pub(crate) fn execute<F>(&self, sender: &C::Address, f: F) -> Result<Pending<C>, LedgerError>
    where
        F: FnOnce(&Runtime<C>, &C, &mut WorkingSet<C::Storage>) -> Result<CallResponse, ModuleError>,
    {
        let now = self.clock.now();
        let context = C::new(sender.clone(), now);
        let mut working_set = WorkingSet::new(self.snapshot());

        match f(&self.runtime, &context, &mut working_set) {
            Ok(_) => {
                debug!("Transaction from {} executed at {}", sender, now);
                Ok(Pending {
                    executed_at: now,
                    working_set,
                })
            }
            Err(err) => {
                warn!("Transaction from {} rejected: {}", sender, err);
                working_set.revert();
                Err(LedgerError::Rejected(err))
            }
        }
    }

    pub(crate) fn commit(&self, pending: Pending<C>) -> Receipt {
        let Pending {
            executed_at,
            mut working_set,
        } = pending;
        let events = working_set.take_events();
        let writes = working_set.checkpoint().freeze();

        self.storage
            .write()
            .expect("Storage lock must not be poisoned")
            .commit(writes);

        Receipt {
            executed_at,
            events,
        }
    }
}

/// A successfully executed transaction whose writes are not committed yet.
pub(crate) struct Pending<C: Context> {
    executed_at: Timestamp,
    working_set: WorkingSet<C::Storage>,
}
