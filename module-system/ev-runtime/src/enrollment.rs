use ev_modules_api::{Clock, Context};
use ev_voter_registry::VoterRecord;
use thiserror::Error;
use tracing::info;

use crate::eligibility::{EligibilityError, EligibilityGate};
use crate::identity::{Challenge, ChallengeAction, IdentityVerifier};
use crate::ledger::{ElectionLedger, LedgerError, Receipt};

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Challenge {0:?} was not issued by this ledger, has expired or was already used")]
    UnknownChallenge(Challenge),
    #[error("Signature does not prove control of the identity")]
    InvalidSignature,
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A sign-up attempt: the identity, the one-time voter ID it claims and a
/// signature over a registration challenge issued by the ledger.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnrollmentRequest<A> {
    pub identity: A,
    pub voter_id: String,
    pub personal_id: String,
    pub full_name: String,
    pub challenge: Challenge,
    pub signature: Vec<u8>,
}

impl<C, K, G> ElectionLedger<C, K, G>
where
    C: Context,
    K: Clock,
    G: EligibilityGate<C::Address>,
{
    /// Registers a voter who proved control of their identity and presented an
    /// eligible, unused voter ID. Either the voter is registered and the ID consumed,
    /// or nothing changes.
    pub fn enroll(
        &self,
        request: EnrollmentRequest<C::Address>,
        verifier: &impl IdentityVerifier<C::Address>,
    ) -> Result<Receipt, EnrollmentError> {
        let mut writer = self.lock_writer();
        let EnrollmentRequest {
            identity,
            voter_id,
            personal_id,
            full_name,
            challenge,
            signature,
        } = request;

        let now = self.now();
        if challenge.action != ChallengeAction::Register
            || !writer.challenges.is_redeemable(&challenge, now)
        {
            return Err(EnrollmentError::UnknownChallenge(challenge));
        }
        if !verifier.verify(&identity, &challenge.message(), &signature) {
            return Err(EnrollmentError::InvalidSignature);
        }
        writer.gate.check(&voter_id, &identity)?;

        let register = ev_voter_registry::CallMessage::RegisterVoter {
            voter: identity.clone(),
            personal_id,
            full_name,
        };
        let pending = self.execute(self.admin(), |runtime, context, working_set| {
            ev_modules_api::Module::call(&runtime.voter_registry, register, context, working_set)
        })?;

        // Dropping `pending` discards the registration if the ID cannot be bound.
        writer.gate.bind(&voter_id, identity.clone())?;
        writer.challenges.redeem(&challenge);
        let receipt = self.commit(pending);

        info!("Voter {} enrolled with voter ID {}", identity, voter_id);
        Ok(receipt)
    }

    /// Checks a signed login challenge and returns the registry record of the identity.
    /// The challenge is consumed whether or not the identity is registered.
    pub fn login(
        &self,
        identity: &C::Address,
        challenge: Challenge,
        signature: &[u8],
        verifier: &impl IdentityVerifier<C::Address>,
    ) -> Result<VoterRecord, EnrollmentError> {
        {
            let now = self.now();
            let mut writer = self.lock_writer();
            if challenge.action != ChallengeAction::Login
                || !writer.challenges.is_redeemable(&challenge, now)
            {
                return Err(EnrollmentError::UnknownChallenge(challenge));
            }
            if !verifier.verify(identity, &challenge.message(), signature) {
                return Err(EnrollmentError::InvalidSignature);
            }
            writer.challenges.redeem(&challenge);
        }

        Ok(self.get_voter_details(identity))
    }
}
