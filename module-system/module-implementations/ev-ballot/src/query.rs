use ev_modules_api::{Context, Spec, Timestamp, WorkingSet};

use crate::{Ballot, BallotError, Candidate, Election};

/// Standings of an election: candidates ordered by votes, ties kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ElectionResults {
    pub election: Election,
    pub ranking: Vec<Candidate>,
    pub total_votes: u64,
}

impl<C: Context> Ballot<C> {
    /// The current election, active or not. `None` until the first election is created.
    pub fn get_election_info(
        &self,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Option<Election> {
        self.elections.last(working_set)
    }

    pub fn get_election(
        &self,
        id: u64,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Option<Election> {
        self.elections.get(id, working_set)
    }

    pub fn election_count(&self, working_set: &mut WorkingSet<<C as Spec>::Storage>) -> u64 {
        self.elections.len(working_set)
    }

    /// Number of candidates in the current election.
    pub fn get_candidate_count(&self, working_set: &mut WorkingSet<<C as Spec>::Storage>) -> u64 {
        match self.elections.last(working_set) {
            Some(election) => self.candidate_count_of(election.id, working_set),
            None => 0,
        }
    }

    pub fn get_candidate(
        &self,
        index: u64,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<Candidate, BallotError> {
        let election = self
            .elections
            .last(working_set)
            .ok_or(BallotError::IndexOutOfRange)?;
        self.candidates
            .get(&(election.id, index), working_set)
            .ok_or(BallotError::IndexOutOfRange)
    }

    /// Whether a vote submitted at `now` would pass the election checks.
    pub fn is_voting_open(
        &self,
        now: Timestamp,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> bool {
        self.elections
            .last(working_set)
            .map(|election| election.is_active && election.is_open_at(now))
            .unwrap_or_default()
    }

    pub fn get_results(
        &self,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Option<ElectionResults> {
        let election = self.elections.last(working_set)?;
        let mut ranking = self.candidates_of(election.id, working_set);
        let total_votes = sum_votes(&ranking);

        // Stable sort: equal tallies stay in insertion order.
        ranking.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

        Some(ElectionResults {
            election,
            ranking,
            total_votes,
        })
    }

    /// Votes cast in the current election.
    pub fn total_votes(&self, working_set: &mut WorkingSet<<C as Spec>::Storage>) -> u64 {
        match self.elections.last(working_set) {
            Some(election) => sum_votes(&self.candidates_of(election.id, working_set)),
            None => 0,
        }
    }

    pub(crate) fn candidate_count_of(
        &self,
        election_id: u64,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> u64 {
        self.candidate_counts
            .get(&election_id, working_set)
            .unwrap_or_default()
    }

    fn candidates_of(
        &self,
        election_id: u64,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Vec<Candidate> {
        let count = self.candidate_count_of(election_id, working_set);
        (0..count)
            .filter_map(|index| self.candidates.get(&(election_id, index), working_set))
            .collect()
    }
}

/// Saturates at `u64::MAX` instead of overflowing.
fn sum_votes(candidates: &[Candidate]) -> u64 {
    candidates
        .iter()
        .fold(0, |total: u64, candidate| total.saturating_add(candidate.vote_count))
}
