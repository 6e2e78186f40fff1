/// Ledger Engine: Scenario Harness
///
/// A scenario is a genesis ledger plus an ordered list of contracts, each
/// with the time it runs at and the outcome it must produce. Used by the
/// `ledger_replay` binary and the fixture-driven tests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::ManualClock;
use crate::config::EngineConfig;
use crate::contract::Contract;
use crate::engine::Engine;
use crate::error::ContractError;
use crate::hashing::state_hash;
use crate::invariants::check_invariants;
use crate::state::MemoryLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub genesis: MemoryLedger,
    #[serde(default)]
    pub config: EngineConfig,
    pub steps: Vec<Step>,
    /// Expected final state hash, when pinned.
    #[serde(default)]
    pub expected_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub now: i64,
    pub contract: Contract,
    pub expect: Outcome,
    /// Expected fee on the result record, when pinned.
    #[serde(default)]
    pub fee: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Rejected,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub ledger: MemoryLedger,
    pub hash: String,
    pub mismatches: Vec<String>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Run every step against a copy of the genesis ledger.
pub fn run_scenario(scenario: &Scenario) -> ScenarioReport {
    let mut mismatches = Vec::new();
    let mut ledger = scenario.genesis.clone();
    if let Err(e) = check_invariants(&ledger) {
        mismatches.push(format!("genesis: {}", e));
    }

    let clock = Arc::new(ManualClock::new(0));
    let engine = Engine::new(scenario.config.clone(), clock.clone());

    for (i, step) in scenario.steps.iter().enumerate() {
        clock.set(step.now);
        let kind = step.contract.contract_type();
        let (outcome, fee) = match engine.apply(&mut ledger, step.contract.clone()) {
            Ok(result) => (Outcome::Success, Some(result.fee)),
            Err(ContractError::Validation(_)) => (Outcome::Rejected, None),
            Err(ContractError::Execution { result, .. }) => (Outcome::Failed, Some(result.fee)),
            Err(ContractError::Commit(e)) => {
                mismatches.push(format!("step {} ({}): commit failed: {}", i, kind, e));
                continue;
            }
        };

        if outcome != step.expect {
            mismatches.push(format!(
                "step {} ({}): expected {:?}, got {:?}",
                i, kind, step.expect, outcome
            ));
        }
        if let (Some(expected), Some(actual)) = (step.fee, fee) {
            if expected != actual {
                mismatches.push(format!(
                    "step {} ({}): expected fee {}, got {}",
                    i, kind, expected, actual
                ));
            }
        }
    }

    if let Err(e) = check_invariants(&ledger) {
        mismatches.push(format!("final state: {}", e));
    }

    let hash = state_hash(&ledger);
    if let Some(expected) = &scenario.expected_hash {
        if *expected != hash {
            mismatches.push(format!("hash mismatch: expected {}, got {}", expected, hash));
        }
    }

    info!(scenario = %scenario.name, steps = scenario.steps.len(), %hash, "scenario finished");
    ScenarioReport {
        name: scenario.name.clone(),
        ledger,
        hash,
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::TransferContract;
    use crate::domain::{Account, AccountType, Address};

    fn addr(n: u8) -> Address {
        Address::from_body([n; 20])
    }

    fn scenario(expect: Outcome) -> Scenario {
        let mut genesis = MemoryLedger::new(addr(0xbb));
        genesis.insert_account(Account::new(addr(1), AccountType::Normal, 0).with_balance(100));
        genesis.insert_account(Account::new(addr(2), AccountType::Normal, 0));
        Scenario {
            name: "transfer".into(),
            genesis,
            config: EngineConfig::default(),
            steps: vec![Step {
                now: 1_000,
                contract: Contract::Transfer(TransferContract {
                    owner_address: addr(1).to_vec(),
                    to_address: addr(2).to_vec(),
                    amount: 40,
                }),
                expect,
                fee: Some(0),
            }],
            expected_hash: None,
        }
    }

    #[test]
    fn matching_expectations_pass() {
        let report = run_scenario(&scenario(Outcome::Success));
        assert!(report.passed(), "{:?}", report.mismatches);
        assert_eq!(report.ledger.balance_of(&addr(2)), Some(40));
    }

    #[test]
    fn wrong_expectation_is_reported() {
        let report = run_scenario(&scenario(Outcome::Rejected));
        assert_eq!(report.mismatches.len(), 1);
        assert!(report.mismatches[0].contains("expected Rejected, got Success"));
    }

    #[test]
    fn repeated_runs_agree() {
        let s = scenario(Outcome::Success);
        assert_eq!(run_scenario(&s).hash, run_scenario(&s).hash);
    }
}
