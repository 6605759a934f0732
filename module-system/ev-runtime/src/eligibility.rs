use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EligibilityError {
    #[error("Unknown voter ID: {0}")]
    UnknownVoterId(String),
    #[error("Voter ID {0} is not eligible to vote")]
    NotEligible(String),
    #[error("Voter ID {0} is already linked to a wallet")]
    AlreadyBound(String),
}

/// Pre-registration check run before an identity is added to the registry.
///
/// A one-time voter ID must exist, be eligible and not be bound yet. Once bound
/// it is consumed for good; there is no way to unbind it.
pub trait EligibilityGate<A>: Send {
    fn check(&self, voter_id: &str, identity: &A) -> Result<(), EligibilityError>;

    fn bind(&mut self, voter_id: &str, identity: A) -> Result<(), EligibilityError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<A> {
    eligible: bool,
    bound_to: Option<A>,
}

/// In-memory [`EligibilityGate`] keyed by voter ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterIdDirectory<A> {
    entries: BTreeMap<String, Entry<A>>,
}

impl<A> Default for VoterIdDirectory<A> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<A> VoterIdDirectory<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an unbound voter ID.
    pub fn insert(&mut self, voter_id: impl Into<String>, eligible: bool) {
        self.entries.insert(
            voter_id.into(),
            Entry {
                eligible,
                bound_to: None,
            },
        );
    }

    /// The identity a voter ID is bound to, if any.
    pub fn bound_identity(&self, voter_id: &str) -> Option<&A> {
        self.entries
            .get(voter_id)
            .and_then(|entry| entry.bound_to.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> FromIterator<(String, bool)> for VoterIdDirectory<A> {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        let mut directory = Self::new();
        for (voter_id, eligible) in iter {
            directory.insert(voter_id, eligible);
        }
        directory
    }
}

impl<A: Send> EligibilityGate<A> for VoterIdDirectory<A> {
    fn check(&self, voter_id: &str, _identity: &A) -> Result<(), EligibilityError> {
        let entry = self
            .entries
            .get(voter_id)
            .ok_or_else(|| EligibilityError::UnknownVoterId(voter_id.to_owned()))?;

        if !entry.eligible {
            return Err(EligibilityError::NotEligible(voter_id.to_owned()));
        }
        if entry.bound_to.is_some() {
            return Err(EligibilityError::AlreadyBound(voter_id.to_owned()));
        }
        Ok(())
    }

    fn bind(&mut self, voter_id: &str, identity: A) -> Result<(), EligibilityError> {
        self.check(voter_id, &identity)?;

        if let Some(entry) = self.entries.get_mut(voter_id) {
            entry.bound_to = Some(identity);
        }
        debug!("Voter ID {} bound", voter_id);
        Ok(())
    }
}
