use ev_state::StateVecError;
use ev_voter_registry::RegistryError;
use thiserror::Error;

/// Reasons a ballot operation is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BallotError {
    #[error("Only admin can trigger this action")]
    Unauthorized,
    #[error("No active election")]
    NoActiveElection,
    #[error("Election has not started")]
    NotStarted,
    #[error("Election has ended")]
    Ended,
    #[error("Invalid candidate")]
    InvalidCandidate,
    #[error("End time must be after start time")]
    InvalidWindow,
    #[error("Candidate index out of range")]
    IndexOutOfRange,
    #[error("Vote count overflow")]
    TallyOverflow,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Election history is inconsistent: {0}")]
    History(#[from] StateVecError),
}

impl From<BallotError> for ev_modules_api::Error {
    fn from(err: BallotError) -> Self {
        anyhow::Error::new(err).into()
    }
}
