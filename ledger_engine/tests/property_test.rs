/// Property tests: random contract sequences never create or destroy
/// native units and always leave the ledger consistent.

use std::sync::Arc;

use proptest::prelude::*;

use ledger_engine::arithmetic::MS_PER_DAY;
use ledger_engine::contract::{
    AccountUpdateContract, AssetIssueContract, FreezeBalanceContract,
    ParticipateAssetIssueContract, TransferAssetContract, TransferContract,
    UnfreezeBalanceContract, Vote, VoteWitnessContract, WithdrawBalanceContract,
    WitnessCreateContract, WitnessUpdateContract,
};
use ledger_engine::domain::Frozen;
use ledger_engine::invariants::check_invariants;
use ledger_engine::{
    Account, Address, AssetIssue, Contract, Engine, EngineConfig, FailedFeePolicy, ManualClock,
    MemoryLedger, Witness,
};

const T0: i64 = 1_700_000_000_000;

fn addr(n: u8) -> Address {
    Address::from_body([n; 20])
}

fn genesis(balances: &[i64]) -> MemoryLedger {
    let mut l = MemoryLedger::new(addr(0xbb));
    for (i, b) in balances.iter().enumerate() {
        l.insert_account(Account::new(addr(i as u8 + 1), Default::default(), 0).with_balance(*b));
    }
    l
}

/// Two witnesses (one with allowance), a frozen voter, an issued asset on
/// sale, a small account, and a sink.
fn seeded() -> MemoryLedger {
    let mut l = MemoryLedger::new(addr(0xbb));

    let mut w1 = Account::new(addr(1), Default::default(), 0).with_balance(50_000_000_000);
    w1.is_witness = true;
    w1.allowance = 5_000_000;
    w1.asset.insert("GOLD".to_string(), 1_000_000);
    l.insert_account(w1);

    let mut w2 = Account::new(addr(2), Default::default(), 0).with_balance(20_000_000_000);
    w2.is_witness = true;
    w2.frozen = vec![Frozen { frozen_balance: 10_000_000, expire_time: T0 + MS_PER_DAY }];
    w2.votes.insert(addr(1), 5);
    l.insert_account(w2);

    let mut holder = Account::new(addr(3), Default::default(), 0).with_balance(15_000_000_000);
    holder.asset.insert("GOLD".to_string(), 0);
    l.insert_account(holder);
    l.insert_account(Account::new(addr(4), Default::default(), 0).with_balance(2_000_000));

    for n in [1, 2] {
        l.insert_witness(Witness {
            address: addr(n),
            url: format!("https://w{n}.example"),
            vote_count: 0,
        });
    }
    l.insert_asset(AssetIssue {
        name: "GOLD".to_string(),
        owner_address: addr(1),
        total_supply: 1_000_000,
        trx_num: 1,
        num: 10,
        start_time: T0,
        end_time: T0 + 10 * MS_PER_DAY,
        description: String::new(),
        url: String::new(),
    });
    l
}

/// Actors and targets; the last address has no account.
const PARTIES: [u8; 5] = [1, 2, 3, 4, 9];

fn amount() -> impl Strategy<Value = i64> {
    prop_oneof![
        -10i64..=0,
        1i64..20_000_000_000,
        (i64::MAX - 1_000)..=i64::MAX,
    ]
}

fn build(kind: u8, actor: usize, target: usize, amount: i64, now: i64) -> Contract {
    let owner_address = addr(PARTIES[actor]).to_vec();
    let other = addr(PARTIES[target]).to_vec();
    let asset = if amount % 2 == 0 { b"GOLD".to_vec() } else { b"SILVER".to_vec() };
    match kind {
        0 => Contract::Transfer(TransferContract { owner_address, to_address: other, amount }),
        1 => Contract::TransferAsset(TransferAssetContract {
            asset_name: asset,
            owner_address,
            to_address: other,
            amount,
        }),
        2 => Contract::AssetIssue(AssetIssueContract {
            owner_address,
            name: asset,
            total_supply: amount,
            trx_num: 1,
            num: 3,
            start_time: now,
            end_time: now + 3 * MS_PER_DAY,
            description: b"issued".to_vec(),
            url: b"https://asset.example".to_vec(),
        }),
        3 => Contract::ParticipateAssetIssue(ParticipateAssetIssueContract {
            owner_address,
            to_address: other,
            asset_name: asset,
            amount,
        }),
        4 => Contract::FreezeBalance(FreezeBalanceContract {
            owner_address,
            frozen_balance: amount,
            frozen_duration: 3,
        }),
        5 => Contract::UnfreezeBalance(UnfreezeBalanceContract { owner_address }),
        6 => Contract::WitnessCreate(WitnessCreateContract {
            owner_address,
            url: b"https://new.example".to_vec(),
        }),
        7 => Contract::WitnessUpdate(WitnessUpdateContract {
            owner_address,
            update_url: b"https://moved.example".to_vec(),
        }),
        8 => Contract::AccountUpdate(AccountUpdateContract {
            account_name: format!("acct{target}").into_bytes(),
            owner_address,
        }),
        9 => Contract::VoteWitness(VoteWitnessContract {
            owner_address,
            votes: vec![Vote { vote_address: other, vote_count: amount }],
        }),
        _ => Contract::WithdrawBalance(WithdrawBalanceContract { owner_address }),
    }
}

proptest! {
    #[test]
    fn mixed_contracts_keep_invariants_and_supply(
        fee in 0i64..2_000_000,
        record_only in any::<bool>(),
        ops in prop::collection::vec(
            (0u8..11, 0usize..5, 0usize..5, amount(), 0i64..5 * MS_PER_DAY),
            1..60,
        ),
    ) {
        let mut l = seeded();
        prop_assert_eq!(check_invariants(&l), Ok(()));
        let mut config = EngineConfig::default();
        config.fees.transfer = fee;
        config.fees.transfer_asset = fee;
        config.fees.freeze_balance = fee;
        config.fees.vote_witness = fee;
        config.fees.withdraw_balance = fee;
        if record_only {
            config.failed_fee_policy = FailedFeePolicy::RecordOnly;
        }
        let clock = Arc::new(ManualClock::new(T0));
        let engine = Engine::new(config, clock.clone());
        let total = l.total_native();
        prop_assert!(total.is_some());

        let mut now = T0;
        for (kind, actor, target, amount, advance) in ops {
            clock.advance(advance);
            now += advance;
            let _ = engine.apply(&mut l, build(kind, actor, target, amount, now));
            prop_assert_eq!(check_invariants(&l), Ok(()));
            prop_assert_eq!(l.total_native(), total);
        }
    }

    #[test]
    fn transfers_conserve_native_units(
        balances in prop::collection::vec(0i64..5_000_000_000, 2..5),
        fee in 0i64..1_000_000,
        ops in prop::collection::vec((1u8..7, 1u8..7, -10i64..3_000_000_000), 1..40),
    ) {
        let mut l = genesis(&balances);
        let mut config = EngineConfig::default();
        config.fees.transfer = fee;
        let engine = Engine::new(config, Arc::new(ManualClock::new(1_000)));
        let total = l.total_native();

        for (from, to, amount) in ops {
            let contract = Contract::Transfer(TransferContract {
                owner_address: addr(from).to_vec(),
                to_address: addr(to).to_vec(),
                amount,
            });
            // Rejections and successes both keep the ledger consistent.
            let _ = engine.apply(&mut l, contract);
            prop_assert_eq!(l.total_native(), total);
            prop_assert!(l.accounts.values().all(|a| a.balance >= 0));
        }
        prop_assert_eq!(check_invariants(&l), Ok(()));
    }

    #[test]
    fn rejected_transfers_leave_ledger_untouched(
        balance in 0i64..1_000_000,
        amount in 1_000_001i64..i64::MAX,
    ) {
        let mut l = genesis(&[balance, 0]);
        let engine = Engine::new(EngineConfig::default(), Arc::new(ManualClock::new(1_000)));
        let before = l.clone();
        let contract = Contract::Transfer(TransferContract {
            owner_address: addr(1).to_vec(),
            to_address: addr(2).to_vec(),
            amount,
        });
        prop_assert!(engine.apply(&mut l, contract).is_err());
        prop_assert_eq!(l, before);
    }
}
