#![allow(dead_code)]

use ev_modules_api::default_context::DefaultContext;
use ev_modules_api::{generate_address, Address, MockClock};
use ev_runtime::{ElectionLedger, GenesisConfig, VoterIdDirectory};
use ev_state::InMemoryStorage;

pub type C = DefaultContext;
pub type Ledger = ElectionLedger<C, MockClock>;

pub const T: u64 = 1_700_000_000;

pub struct TestLedger {
    pub ledger: Ledger,
    pub clock: MockClock,
    pub admin: Address,
}

impl TestLedger {
    pub fn deploy() -> Self {
        Self::with_directory(VoterIdDirectory::new())
    }

    pub fn with_directory(directory: VoterIdDirectory<Address>) -> Self {
        let admin = generate_address::<C>("admin");
        let clock = MockClock::new(T);
        let ledger = ElectionLedger::deploy(
            InMemoryStorage::new(),
            GenesisConfig::with_admin(admin),
            clock.clone(),
            directory,
        )
        .unwrap();

        Self {
            ledger,
            clock,
            admin,
        }
    }

    pub fn register(&self, voter: Address, personal_id: &str) {
        self.ledger
            .register_voter(&self.admin, voter, personal_id, "Test Voter")
            .unwrap();
    }

    /// An election from `T + 100` to `T + 3700` with two candidates.
    pub fn open_election(&self) {
        self.ledger
            .create_election(&self.admin, "Presidential Election", "2024", T + 100, T + 3700)
            .unwrap();
        for name in ["Candidate 1", "Candidate 2"] {
            self.ledger
                .add_candidate(&self.admin, name, "Party", "")
                .unwrap();
        }
    }
}

pub fn voter(name: &str) -> Address {
    generate_address::<C>(name)
}
