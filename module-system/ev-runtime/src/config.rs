use std::fs::File;
use std::io::Read;
use std::path::Path;

use ev_modules_api::{Clock, Context, MockClock, SystemClock, Timestamp};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::eligibility::VoterIdDirectory;
use crate::runtime::GenesisConfig;

/// Where the ledger reads `now` from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockConfig {
    /// Wall-clock time.
    #[default]
    System,
    /// A manually advanced clock starting at the given timestamp.
    Mock { start: Timestamp },
}

/// One pre-registered voter ID.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EligibilityEntry {
    pub voter_id: String,
    #[serde(default = "default_eligible")]
    pub eligible: bool,
}

fn default_eligible() -> bool {
    true
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "C::Address: DeserializeOwned")]
pub struct LedgerConfig<C: Context> {
    /// Administrator of both the registry and the ballot.
    pub admin: C::Address,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default = "Vec::new")]
    pub eligibility: Vec<EligibilityEntry>,
}

impl<C: Context> LedgerConfig<C> {
    pub fn genesis_config(&self) -> GenesisConfig<C> {
        GenesisConfig::with_admin(self.admin.clone())
    }

    pub fn voter_directory(&self) -> VoterIdDirectory<C::Address> {
        self.eligibility
            .iter()
            .map(|entry| (entry.voter_id.clone(), entry.eligible))
            .collect()
    }

    pub fn clock(&self) -> ConfiguredClock {
        match self.clock {
            ClockConfig::System => ConfiguredClock::System(SystemClock),
            ClockConfig::Mock { start } => ConfiguredClock::Mock(MockClock::new(start)),
        }
    }
}

/// The clock selected by a [`ClockConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredClock {
    System(SystemClock),
    Mock(MockClock),
}

impl ConfiguredClock {
    /// The underlying mock clock, so a driver can move time forward.
    pub fn as_mock(&self) -> Option<&MockClock> {
        match self {
            ConfiguredClock::Mock(clock) => Some(clock),
            ConfiguredClock::System(_) => None,
        }
    }
}

impl Clock for ConfiguredClock {
    fn now(&self) -> Timestamp {
        match self {
            ConfiguredClock::System(clock) => clock.now(),
            ConfiguredClock::Mock(clock) => clock.now(),
        }
    }
}

/// Reads a TOML file and deserializes it into `R`.
pub fn from_toml_path<P: AsRef<Path>, R: DeserializeOwned>(path: P) -> anyhow::Result<R> {
    let mut contents = String::new();
    {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    }

    let result: R = toml::from_str(&contents)?;

    Ok(result)
}
