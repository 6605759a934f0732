use ev_modules_api::{CallResponse, Context, Spec, WorkingSet};
use tracing::{debug, info};

use crate::{RegistryError, Voter, VoterRegistry};

/// Call actions supported by the module. All of them are administrator-only.
#[cfg_attr(
    feature = "native",
    derive(schemars::JsonSchema),
    schemars(
        bound = "C::Address: ::schemars::JsonSchema",
        rename = "VoterRegistryCallMessage"
    )
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
#[serde(
    bound = "C::Address: serde::Serialize + serde::de::DeserializeOwned",
    rename_all = "snake_case"
)]
pub enum CallMessage<C: Context> {
    /// Registers `voter` under a personal identifier that no other voter uses.
    RegisterVoter {
        voter: C::Address,
        personal_id: String,
        full_name: String,
    },
    /// Allows `caller` to mark voters as having voted.
    AuthorizeContract { caller: C::Address },
    /// Withdraws a previous authorization.
    RevokeContract { caller: C::Address },
}

type Result<T> = std::result::Result<T, RegistryError>;

impl<C: Context> VoterRegistry<C> {
    pub(crate) fn register_voter(
        &self,
        voter: C::Address,
        personal_id: String,
        full_name: String,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        self.exit_if_not_admin(context, working_set)?;

        if self.voters.contains(&voter, working_set) {
            return Err(RegistryError::AlreadyRegistered);
        }
        if self.personal_ids.contains(&personal_id, working_set) {
            return Err(RegistryError::PersonalIdTaken);
        }
        let voter_count = self
            .voter_count
            .get(working_set)
            .unwrap_or_default()
            .checked_add(1)
            .ok_or(RegistryError::VoterCountOverflow)?;

        let record = Voter {
            personal_id,
            full_name,
            has_voted: false,
        };
        self.voters.set(&voter, &record, working_set);
        self.personal_ids
            .set(&record.personal_id, &voter, working_set);
        self.voter_count.set(&voter_count, working_set);

        info!("Registered voter {} ({} in total)", voter, voter_count);
        working_set.add_event(
            "VoterRegistry: register_voter",
            &format!("Voter registered: {voter}"),
        );

        Ok(CallResponse::default())
    }

    pub(crate) fn authorize_contract(
        &self,
        caller: C::Address,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        self.exit_if_not_admin(context, working_set)?;

        if self.authorized_callers.contains(&caller, working_set) {
            debug!("Caller {} is already authorized", caller);
            return Ok(CallResponse::default());
        }

        self.authorized_callers.set(&caller, &true, working_set);

        info!("Authorized caller {}", caller);
        working_set.add_event(
            "VoterRegistry: authorize_contract",
            &format!("Caller authorized: {caller}"),
        );

        Ok(CallResponse::default())
    }

    pub(crate) fn revoke_contract(
        &self,
        caller: &C::Address,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        self.exit_if_not_admin(context, working_set)?;

        if self.authorized_callers.remove(caller, working_set).is_none() {
            debug!("Caller {} was not authorized", caller);
            return Ok(CallResponse::default());
        }

        info!("Revoked caller {}", caller);
        working_set.add_event(
            "VoterRegistry: revoke_contract",
            &format!("Caller revoked: {caller}"),
        );

        Ok(CallResponse::default())
    }

    /// Records that `voter` has voted. The sender of `context` must be an
    /// authorized caller; other modules pass a context carrying their own address.
    pub fn mark_voted(
        &self,
        voter: &C::Address,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<CallResponse> {
        if !self.authorized_callers.contains(context.sender(), working_set) {
            return Err(RegistryError::Unauthorized);
        }

        let mut record = self
            .voters
            .get(voter, working_set)
            .ok_or(RegistryError::NotRegistered)?;

        if record.has_voted {
            return Err(RegistryError::AlreadyVoted);
        }

        record.has_voted = true;
        self.voters.set(voter, &record, working_set);

        debug!("Voter {} marked as voted by {}", voter, context.sender());
        working_set.add_event(
            "VoterRegistry: mark_voted",
            &format!("Voter marked as voted: {voter}"),
        );

        Ok(CallResponse::default())
    }

    fn exit_if_not_admin(
        &self,
        context: &C,
        working_set: &mut WorkingSet<<C as Spec>::Storage>,
    ) -> Result<()> {
        match self.admin.get(working_set) {
            Some(admin) if &admin == context.sender() => Ok(()),
            _ => Err(RegistryError::Unauthorized),
        }
    }
}
