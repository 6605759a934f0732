//! Wires the voter registry and ballot modules into a runtime and runs it as a
//! serialized transaction ledger.

pub mod config;
mod eligibility;
mod enrollment;
mod identity;
mod ledger;
mod runtime;

pub use config::{from_toml_path, ClockConfig, ConfiguredClock, EligibilityEntry, LedgerConfig};
pub use eligibility::{EligibilityError, EligibilityGate, VoterIdDirectory};
pub use enrollment::{EnrollmentError, EnrollmentRequest};
pub use identity::{
    Challenge, ChallengeAction, IdentityVerifier, CHALLENGE_TTL, MAX_OUTSTANDING_CHALLENGES,
};
pub use ledger::{ElectionLedger, LedgerError, Receipt};
pub use runtime::{GenesisConfig, Runtime, RuntimeCall};
