use ev_modules_api::{CallResponse, Context, ModuleInfo, Spec, Timestamp, WorkingSet};
use tracing::{debug, info};

use crate::{Ballot, BallotError, Candidate, Election};

/// Call actions supported by the module.
#[cfg_attr(
    feature = "native",
    derive(schemars::JsonSchema),
    schemars(rename = "BallotCallMessage")
)]
#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    serde::Serialize,
    serde::Deserialize,
    Debug,
    PartialEq,
    Clone,
)]
#[serde(rename_all = "snake_case")]
pub enum CallMessage {
    /// Starts a new election, replacing the current one. Admin only.
    CreateElection {
        name: String,
        description: String,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    /// Adds a candidate to the current election. Admin only.
    AddCandidate {
        name: String,
        party: String,
        image_ref: String,
    },
    /// Votes for the candidate with the given index in the current election.
    CastVote { candidate_index: u64 },
    /// Closes the current election for good. Admin only.
    EndElection,
}

type Result<T> = std::result::Result<T, BallotError>;

impl<C: Context> Ballot<C> {
    pub(crate) fn create_election(
        &self,
        name: String,
        description: String,
        start_time: Timestamp,
        end_time: Timestamp,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        self.exit_if_not_admin(context, working_set)?;

        if end_time <= start_time {
            return Err(BallotError::InvalidWindow);
        }

        if let Some(mut previous) = self.elections.last(working_set) {
            if previous.is_active {
                previous.is_active = false;
                self.store_election(&previous, working_set)?;
                debug!("Election {} replaced and deactivated", previous.id);
            }
        }

        let id = self.elections.len(working_set);
        let election = Election {
            id,
            name,
            description,
            start_time,
            end_time,
            is_active: true,
        };
        self.elections.push(&election, working_set);

        info!(
            "Created election {} '{}' open from {} to {}",
            id, election.name, start_time, end_time
        );
        working_set.add_event(
            "Ballot: create_election",
            &format!("Election created: {id}"),
        );

        Ok(CallResponse::default())
    }

    pub(crate) fn add_candidate(
        &self,
        name: String,
        party: String,
        image_ref: String,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        self.exit_if_not_admin(context, working_set)?;
        let election = self.active_election(working_set)?;

        let index = self.candidate_count_of(election.id, working_set);
        let candidate_count = index
            .checked_add(1)
            .ok_or(BallotError::IndexOutOfRange)?;
        let candidate = Candidate::new(index, name, party, image_ref);
        self.candidates
            .set(&(election.id, index), &candidate, working_set);
        self.candidate_counts
            .set(&election.id, &candidate_count, working_set);

        info!(
            "Added candidate {} '{}' to election {}",
            index, candidate.name, election.id
        );
        working_set.add_event(
            "Ballot: add_candidate",
            &format!("Candidate added: {index}"),
        );

        Ok(CallResponse::default())
    }

    pub(crate) fn cast_vote(
        &self,
        candidate_index: u64,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        let voter = context.sender();
        let now = context.timestamp();

        let election = self.active_election(working_set)?;
        if now < election.start_time {
            return Err(BallotError::NotStarted);
        }
        if now > election.end_time {
            return Err(BallotError::Ended);
        }

        let mut candidate = self
            .candidates
            .get(&(election.id, candidate_index), working_set)
            .ok_or(BallotError::InvalidCandidate)?;

        let registry = &self.voter_registry;
        if !registry.is_voter_registered(voter, working_set) {
            return Err(ev_voter_registry::RegistryError::NotRegistered.into());
        }
        if registry.has_voter_voted(voter, working_set) {
            return Err(ev_voter_registry::RegistryError::AlreadyVoted.into());
        }

        candidate.vote_count = candidate
            .vote_count
            .checked_add(1)
            .ok_or(BallotError::TallyOverflow)?;
        self.candidates
            .set(&(election.id, candidate_index), &candidate, working_set);

        // The registry only accepts the ballot's own address as the caller.
        let ballot_context = C::new(self.address().clone(), now);
        registry.mark_voted(voter, &ballot_context, working_set)?;

        debug!(
            "Vote from {} counted for candidate {} in election {}",
            voter, candidate_index, election.id
        );
        working_set.add_event(
            "Ballot: cast_vote",
            &format!("Vote from: {voter} accepted"),
        );

        Ok(CallResponse::default())
    }

    pub(crate) fn end_election(
        &self,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        self.exit_if_not_admin(context, working_set)?;

        let mut election = self
            .elections
            .last(working_set)
            .ok_or(BallotError::NoActiveElection)?;
        election.is_active = false;
        self.store_election(&election, working_set)?;

        info!("Ended election {}", election.id);
        working_set.add_event(
            "Ballot: end_election",
            &format!("Election ended: {}", election.id),
        );

        Ok(CallResponse::default())
    }

    fn active_election(
        &self,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<Election> {
        self.elections
            .last(working_set)
            .filter(|election| election.is_active)
            .ok_or(BallotError::NoActiveElection)
    }

    /// Overwrites an election already in history. Only elections handed out by `push` exist.
    pub(crate) fn store_election(
        &self,
        election: &Election,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<()> {
        Ok(self.elections.set(election.id, election, working_set)?)
    }

    fn exit_if_not_admin(
        &self,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<()> {
        match self.admin.get(working_set) {
            Some(admin) if &admin == context.sender() => Ok(()),
            _ => Err(BallotError::Unauthorized),
        }
    }
}
