/// Fixture-driven scenarios and the end-to-end behaviours they pin:
/// fee-gated asset issuance, freeze/unfreeze round trip, vote replacement,
/// witness lifecycle and withdraw cooldown.

use std::fs;
use std::sync::Arc;

use ledger_engine::arithmetic::MS_PER_DAY;
use ledger_engine::contract::{
    AssetIssueContract, FreezeBalanceContract, TransferContract, UnfreezeBalanceContract,
};
use ledger_engine::hashing::state_hash;
use ledger_engine::invariants::check_invariants;
use ledger_engine::scenario::{run_scenario, Scenario};
use ledger_engine::{
    Account, Address, Contract, ContractError, Engine, EngineConfig, ManualClock, MemoryLedger,
};

const T0: i64 = 1_700_000_000_000;
const ISSUE_FEE: i64 = 1_024_000_000;

fn load_scenarios() -> Vec<Scenario> {
    let data = fs::read_to_string("tests/fixtures/scenarios.json")
        .unwrap_or_else(|e| panic!("Failed to read scenarios: {}", e));
    serde_json::from_str(&data).expect("Failed to parse scenarios JSON")
}

fn addr(n: u8) -> Address {
    Address::from_body([n; 20])
}

fn ledger_with(accounts: &[(u8, i64)]) -> MemoryLedger {
    let mut l = MemoryLedger::new(addr(0xbb));
    for (n, balance) in accounts {
        l.insert_account(Account::new(addr(*n), Default::default(), 0).with_balance(*balance));
    }
    l
}

fn engine_at(now: i64) -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    (Engine::new(EngineConfig::default(), clock.clone()), clock)
}

#[test]
fn fixture_scenarios_pass() {
    let scenarios = load_scenarios();
    assert!(!scenarios.is_empty());
    for s in &scenarios {
        let report = run_scenario(s);
        assert!(report.passed(), "scenario {} failed: {:#?}", s.name, report.mismatches);
    }
}

#[test]
fn fixture_scenarios_are_deterministic() {
    for s in &load_scenarios() {
        assert_eq!(run_scenario(s).hash, run_scenario(s).hash, "scenario {}", s.name);
    }
}

#[test]
fn asset_issue_requires_fee_funds_then_credits_supply() {
    let issue = |owner: Address| {
        Contract::AssetIssue(AssetIssueContract {
            owner_address: owner.to_vec(),
            name: b"FOO".to_vec(),
            total_supply: 1000,
            trx_num: 1,
            num: 1,
            start_time: T0,
            end_time: T0 + MS_PER_DAY,
            description: Vec::new(),
            url: Vec::new(),
        })
    };
    let (engine, _) = engine_at(T0);

    let mut poor = ledger_with(&[(1, 10_000_000)]);
    let before = state_hash(&poor);
    let err = engine.apply(&mut poor, issue(addr(1))).unwrap_err();
    assert!(matches!(err, ContractError::Validation(_)));
    assert_eq!(state_hash(&poor), before);

    let mut rich = ledger_with(&[(1, ISSUE_FEE + 10_000_000)]);
    let result = engine.apply(&mut rich, issue(addr(1))).unwrap();
    assert_eq!(result.fee, ISSUE_FEE);
    assert_eq!(rich.accounts[&addr(1)].asset.get("FOO"), Some(&1000));
    assert_eq!(rich.balance_of(&addr(1)), Some(10_000_000));
    assert_eq!(rich.balance_of(&addr(0xbb)), Some(ISSUE_FEE));
    assert_eq!(check_invariants(&rich), Ok(()));
}

#[test]
fn freeze_then_unfreeze_returns_exact_amount() {
    let mut l = ledger_with(&[(1, 7_000_000)]);
    let (engine, clock) = engine_at(T0);
    let owner = addr(1).to_vec();

    engine
        .apply(
            &mut l,
            Contract::FreezeBalance(FreezeBalanceContract {
                owner_address: owner.clone(),
                frozen_balance: 3_000_000,
                frozen_duration: 3,
            }),
        )
        .unwrap();
    assert_eq!(l.balance_of(&addr(1)), Some(4_000_000));

    clock.set(T0 + 3 * MS_PER_DAY);
    engine
        .apply(
            &mut l,
            Contract::UnfreezeBalance(UnfreezeBalanceContract { owner_address: owner }),
        )
        .unwrap();
    let acct = &l.accounts[&addr(1)];
    assert_eq!(acct.balance, 7_000_000);
    assert!(acct.frozen.is_empty());
}

#[test]
fn transfer_total_supply_is_conserved_with_fees() {
    let mut l = ledger_with(&[(1, 50_000_000), (2, 0)]);
    let mut config = EngineConfig::default();
    config.fees.transfer = 100_000;
    let engine = Engine::new(config, Arc::new(ManualClock::new(T0)));
    let total = l.total_native();

    for amount in [1_000_000, 2_500_000, 7] {
        engine
            .apply(
                &mut l,
                Contract::Transfer(TransferContract {
                    owner_address: addr(1).to_vec(),
                    to_address: addr(2).to_vec(),
                    amount,
                }),
            )
            .unwrap();
    }
    assert_eq!(l.total_native(), total);
    assert_eq!(l.balance_of(&addr(0xbb)), Some(300_000));
}
