use std::collections::BTreeMap;
use std::fmt;

use ev_modules_api::Timestamp;
use tracing::debug;

/// Seconds an issued challenge stays redeemable.
pub const CHALLENGE_TTL: Timestamp = 300;

/// Upper bound on challenges waiting to be redeemed. Issuing past it drops the oldest.
pub const MAX_OUTSTANDING_CHALLENGES: usize = 1024;

/// What the holder of an identity is asked to prove control for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeAction {
    Login,
    Register,
}

/// A nonce-bearing message the identity provider signs. Rendered exactly as the
/// wallet displays it, so signatures produced there verify against [`Challenge::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Challenge {
    pub action: ChallengeAction,
    pub nonce: u64,
}

impl Challenge {
    pub fn new(action: ChallengeAction, nonce: u64) -> Self {
        Self { action, nonce }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let purpose = match self.action {
            ChallengeAction::Login => "login to",
            ChallengeAction::Register => "register for",
        };
        write!(
            f,
            "Sign this message to {purpose} E-Voting System\nNonce: {}",
            self.nonce
        )
    }
}

/// Challenges handed out by the ledger and not yet redeemed, keyed by nonce.
///
/// Nonces only grow, so the first entry is always the oldest challenge.
#[derive(Debug)]
pub(crate) struct ChallengeBook {
    ttl: Timestamp,
    capacity: usize,
    next_nonce: u64,
    outstanding: BTreeMap<u64, (ChallengeAction, Timestamp)>,
}

impl Default for ChallengeBook {
    fn default() -> Self {
        Self::new(CHALLENGE_TTL, MAX_OUTSTANDING_CHALLENGES)
    }
}

impl ChallengeBook {
    pub(crate) fn new(ttl: Timestamp, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            next_nonce: 0,
            outstanding: BTreeMap::new(),
        }
    }

    /// Issues a fresh challenge at `now`, dropping expired ones and, when full, the oldest.
    pub(crate) fn issue(&mut self, action: ChallengeAction, now: Timestamp) -> Challenge {
        self.evict_expired(now);
        while self.outstanding.len() >= self.capacity {
            if let Some((nonce, _)) = self.outstanding.pop_first() {
                debug!("Dropped unredeemed challenge {}", nonce);
            }
        }

        let nonce = self.next_nonce;
        // Wrapping needs 2^64 challenges; by then nonce 0 is long gone.
        self.next_nonce = self.next_nonce.wrapping_add(1);
        self.outstanding.insert(nonce, (action, now));
        Challenge::new(action, nonce)
    }

    /// Whether `challenge` was issued by this book, is unused and has not expired at `now`.
    pub(crate) fn is_redeemable(&self, challenge: &Challenge, now: Timestamp) -> bool {
        match self.outstanding.get(&challenge.nonce) {
            Some((action, issued_at)) => {
                *action == challenge.action && now <= issued_at.saturating_add(self.ttl)
            }
            None => false,
        }
    }

    pub(crate) fn redeem(&mut self, challenge: &Challenge) {
        self.outstanding.remove(&challenge.nonce);
    }

    pub(crate) fn len(&self) -> usize {
        self.outstanding.len()
    }

    fn evict_expired(&mut self, now: Timestamp) {
        let ttl = self.ttl;
        self.outstanding
            .retain(|_, (_, issued_at)| now <= issued_at.saturating_add(ttl));
    }
}

/// Opaque proof that the caller controls an identity, typically a wallet signature check.
/// The ledger never verifies signatures itself.
pub trait IdentityVerifier<A> {
    fn verify(&self, identity: &A, message: &str, signature: &[u8]) -> bool;
}

impl<A, F> IdentityVerifier<A> for F
where
    F: Fn(&A, &str, &[u8]) -> bool,
{
    fn verify(&self, identity: &A, message: &str, signature: &[u8]) -> bool {
        self(identity, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_messages() {
        assert_eq!(
            Challenge::new(ChallengeAction::Login, 42).message(),
            "Sign this message to login to E-Voting System\nNonce: 42"
        );
        assert_eq!(
            Challenge::new(ChallengeAction::Register, 7).message(),
            "Sign this message to register for E-Voting System\nNonce: 7"
        );
    }

    #[test]
    fn expired_challenges_are_evicted_on_issue() {
        let mut book = ChallengeBook::new(300, 1024);
        let stale = book.issue(ChallengeAction::Login, 1_000);
        for _ in 0..99 {
            book.issue(ChallengeAction::Login, 1_000);
        }
        assert_eq!(book.len(), 100);
        assert!(book.is_redeemable(&stale, 1_300));
        assert!(!book.is_redeemable(&stale, 1_301));

        let fresh = book.issue(ChallengeAction::Register, 1_301);
        assert_eq!(book.len(), 1);
        assert!(book.is_redeemable(&fresh, 1_301));
        assert!(!book.is_redeemable(&stale, 1_000));
    }

    #[test]
    fn capacity_drops_the_oldest_challenge() {
        let mut book = ChallengeBook::new(300, 3);
        let issued: Vec<_> = (0..5)
            .map(|_| book.issue(ChallengeAction::Register, 10))
            .collect();

        assert_eq!(book.len(), 3);
        assert!(!book.is_redeemable(&issued[0], 10));
        assert!(!book.is_redeemable(&issued[1], 10));
        assert!(issued[2..]
            .iter()
            .all(|challenge| book.is_redeemable(challenge, 10)));
    }

    #[test]
    fn redeemed_or_mismatched_challenges_are_rejected() {
        let mut book = ChallengeBook::default();
        let challenge = book.issue(ChallengeAction::Login, 0);

        let as_register = Challenge::new(ChallengeAction::Register, challenge.nonce);
        assert!(!book.is_redeemable(&as_register, 0));
        assert!(!book.is_redeemable(&Challenge::new(ChallengeAction::Login, 99), 0));

        book.redeem(&challenge);
        assert!(!book.is_redeemable(&challenge, 0));
        assert_eq!(book.len(), 0);
    }

    #[test]
    fn closures_are_verifiers() {
        let verifier = |identity: &u8, message: &str, signature: &[u8]| {
            signature == [*identity] && message.ends_with("Nonce: 1")
        };
        let message = Challenge::new(ChallengeAction::Login, 1).message();

        assert!(verifier.verify(&3, &message, &[3]));
        assert!(!verifier.verify(&3, &message, &[4]));
    }
}
