//! Batch execution behind the `evoting` binary.

use anyhow::bail;
use ev_ballot::ElectionResults;
use ev_modules_api::{Context, Event, Timestamp};
use ev_runtime::{ConfiguredClock, ElectionLedger, LedgerError, RuntimeCall};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One call of a batch file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "C::Address: serde::de::DeserializeOwned")]
pub struct BatchEntry<C: Context> {
    pub sender: C::Address,
    /// Time at which the call is applied. Only honoured by a mock clock.
    #[serde(default)]
    pub at: Option<Timestamp>,
    pub call: RuntimeCall<C>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Committed {
        executed_at: Timestamp,
        events: Vec<Event>,
    },
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub results: Option<ElectionResults>,
}

/// Applies every entry in order. A rejected call is reported and the batch goes on;
/// anything else (a malformed entry, a missing mock clock) aborts the run.
pub fn run_batch<C: Context>(
    ledger: &ElectionLedger<C, ConfiguredClock>,
    entries: Vec<BatchEntry<C>>,
) -> anyhow::Result<BatchReport> {
    let mut outcomes = Vec::with_capacity(entries.len());

    for (position, entry) in entries.into_iter().enumerate() {
        if let Some(at) = entry.at {
            let Some(clock) = ledger.clock().as_mock() else {
                bail!("Entry {position} sets `at` but the ledger runs on the system clock");
            };
            clock.set(at);
        }

        let outcome = match ledger.submit(&entry.sender, entry.call) {
            Ok(receipt) => Outcome::Committed {
                executed_at: receipt.executed_at,
                events: receipt.events,
            },
            Err(LedgerError::Rejected(err)) => Outcome::Rejected {
                reason: err.to_string(),
            },
            Err(err) => return Err(err.into()),
        };
        outcomes.push(outcome);
    }

    let committed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Outcome::Committed { .. }))
        .count();
    info!(
        "Batch applied: {} committed, {} rejected",
        committed,
        outcomes.len() - committed
    );

    Ok(BatchReport {
        outcomes,
        results: ledger.get_results(),
    })
}

#[cfg(test)]
mod tests {
    use ev_modules_api::default_context::DefaultContext;
    use ev_modules_api::generate_address;
    use ev_runtime::{ClockConfig, LedgerConfig};

    use super::*;

    type C = DefaultContext;

    fn ledger(clock: ClockConfig) -> ElectionLedger<C, ConfiguredClock> {
        let config = LedgerConfig::<C> {
            admin: generate_address::<C>("admin"),
            clock,
            eligibility: Vec::new(),
        };
        ElectionLedger::from_config(&config).unwrap()
    }

    fn entries(json: &str) -> Vec<BatchEntry<C>> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn batch_reports_each_outcome() {
        let ledger = ledger(ClockConfig::Mock { start: 1_000 });
        let admin = generate_address::<C>("admin");
        let voter = generate_address::<C>("voter1");

        let batch = entries(&format!(
            r#"[
                {{ "sender": "{admin}", "call": {{ "ballot": {{ "create_election": {{
                    "name": "Board", "description": "Annual vote", "start_time": 1100, "end_time": 2000 }} }} }} }},
                {{ "sender": "{admin}", "call": {{ "ballot": {{ "add_candidate": {{
                    "name": "Candidate 1", "party": "A", "image_ref": "" }} }} }} }},
                {{ "sender": "{admin}", "call": {{ "voter_registry": {{ "register_voter": {{
                    "voter": "{voter}", "personal_id": "CIN001", "full_name": "John Doe" }} }} }} }},
                {{ "sender": "{voter}", "call": {{ "ballot": {{ "cast_vote": {{ "candidate_index": 0 }} }} }} }},
                {{ "sender": "{voter}", "at": 1101, "call": {{ "ballot": {{ "cast_vote": {{ "candidate_index": 0 }} }} }} }}
            ]"#
        ));

        let report = run_batch(&ledger, batch).unwrap();

        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(
            report.outcomes[3],
            Outcome::Rejected {
                reason: "Election has not started".to_owned()
            }
        );
        assert!(matches!(
            report.outcomes[4],
            Outcome::Committed {
                executed_at: 1101,
                ..
            }
        ));
        assert_eq!(report.results.unwrap().total_votes, 1);
    }

    #[test]
    fn timed_entries_need_a_mock_clock() {
        let ledger = ledger(ClockConfig::System);
        let admin = generate_address::<C>("admin");
        let batch = entries(&format!(
            r#"[{{ "sender": "{admin}", "at": 5, "call": {{ "ballot": "end_election" }} }}]"#
        ));

        assert!(run_batch(&ledger, batch).is_err());
    }
}
