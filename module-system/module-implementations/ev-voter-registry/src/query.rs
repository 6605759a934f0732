use ev_modules_api::{Context, Spec, WorkingSet};

use crate::VoterRegistry;

/// Public view of a voter. Unknown identities map to the default (empty) record.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VoterRecord {
    pub personal_id: String,
    pub full_name: String,
    pub is_registered: bool,
    pub has_voted: bool,
}

impl<C: Context> VoterRegistry<C> {
    pub fn is_voter_registered(
        &self,
        voter: &C::Address,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> bool {
        self.voters.contains(voter, working_set)
    }

    pub fn has_voter_voted(
        &self,
        voter: &C::Address,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> bool {
        self.voters
            .get(voter, working_set)
            .map(|record| record.has_voted)
            .unwrap_or_default()
    }

    pub fn get_voter_details(
        &self,
        voter: &C::Address,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> VoterRecord {
        match self.voters.get(voter, working_set) {
            Some(record) => VoterRecord {
                personal_id: record.personal_id,
                full_name: record.full_name,
                is_registered: true,
                has_voted: record.has_voted,
            },
            None => VoterRecord::default(),
        }
    }

    pub fn is_authorized(
        &self,
        caller: &C::Address,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> bool {
        self.authorized_callers.contains(caller, working_set)
    }

    /// The administrator set at genesis; `None` before genesis ran.
    pub fn admin(&self, working_set: &mut WorkingSet<<C as Spec>::Storage>) -> Option<C::Address> {
        self.admin.get(working_set)
    }

    pub fn voter_count(&self, working_set: &mut WorkingSet<<C as Spec>::Storage>) -> u64 {
        self.voter_count.get(working_set).unwrap_or_default()
    }
}
