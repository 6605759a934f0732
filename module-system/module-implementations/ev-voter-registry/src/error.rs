use thiserror::Error;

/// Reasons a registry operation is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Voter already registered")]
    AlreadyRegistered,
    #[error("Personal ID is already bound to another voter")]
    PersonalIdTaken,
    #[error("Caller is not authorized to perform this action")]
    Unauthorized,
    #[error("Voter not registered")]
    NotRegistered,
    #[error("Voter has already voted")]
    AlreadyVoted,
    #[error("Voter count overflow")]
    VoterCountOverflow,
}

impl From<RegistryError> for ev_modules_api::Error {
    fn from(err: RegistryError) -> Self {
        anyhow::Error::new(err).into()
    }
}
