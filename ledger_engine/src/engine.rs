/// Ledger Engine: Engine
///
/// Top-level orchestrator for one contract:
///   1. Read the clock once and build the actuator context
///   2. Dispatch to a fresh actuator
///   3. validate() against the live store (read-only)
///   4. execute() into a staged overlay
///   5. Commit the overlay in one batch, or discard it on failure
///
/// A failed execution leaves the store exactly as it was, except for the
/// fee settlement that `FailedFeePolicy::Charge` applies in its own batch.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::actuator::{charge_fee, Actuator, ActuatorContext};
use crate::clock::Clock;
use crate::config::{EngineConfig, FailedFeePolicy};
use crate::contract::Contract;
use crate::dispatcher::create_actuator;
use crate::domain::{Address, ContractResult, ContractStatus};
use crate::error::{ContractError, ValidationError};
use crate::store::{LedgerStoreMut, Staged};

pub struct Engine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Context for one contract. Time is sampled here and nowhere else.
    pub fn context(&self) -> ActuatorContext {
        ActuatorContext {
            now: self.clock.now_millis(),
            fees: self.config.fees.clone(),
            update_account_policy: self.config.update_account_policy,
        }
    }

    /// Validate only. Never touches the store.
    pub fn validate<S: LedgerStoreMut>(
        &self,
        store: &S,
        contract: Contract,
    ) -> Result<(), ValidationError> {
        create_actuator(contract, &self.context()).validate(store)
    }

    /// Run one contract end to end against `store`.
    pub fn apply<S: LedgerStoreMut>(
        &self,
        store: &mut S,
        contract: Contract,
    ) -> Result<ContractResult, ContractError> {
        let actuator = create_actuator(contract, &self.context());
        self.run(store, actuator.as_ref())
    }

    /// Drive an already-built actuator through the protocol.
    pub fn run<S: LedgerStoreMut>(
        &self,
        store: &mut S,
        actuator: &dyn Actuator,
    ) -> Result<ContractResult, ContractError> {
        let kind = actuator.contract_type();

        if let Err(e) = actuator.validate(&*store) {
            debug!(contract = %kind, reason = %e, "contract rejected");
            return Err(ContractError::Validation(e));
        }

        let mut result = ContractResult::default();
        let outcome = {
            let mut staged = Staged::new(&*store);
            actuator
                .execute(&mut staged, &mut result)
                .map(|()| staged.into_batch())
        };

        match outcome {
            Ok(batch) => {
                debug!(contract = %kind, writes = batch.len(), fee = result.fee, "contract executed");
                store.commit(batch).map_err(ContractError::Commit)?;
                Ok(result)
            }
            Err(source) => {
                warn!(contract = %kind, error = %source, "execution failed, writes discarded");
                self.settle_failed_fee(store, actuator, &mut result);
                Err(ContractError::Execution { result, source })
            }
        }
    }

    /// Apply the failed-fee policy to a FAILED result whose writes were
    /// discarded.
    fn settle_failed_fee<S: LedgerStoreMut>(
        &self,
        store: &mut S,
        actuator: &dyn Actuator,
        result: &mut ContractResult,
    ) {
        let fee = actuator.calc_fee();
        result.set_status(fee, ContractStatus::Failed);
        if self.config.failed_fee_policy == FailedFeePolicy::RecordOnly || fee == 0 {
            return;
        }

        let batch = Address::from_slice(actuator.owner_address())
            .ok()
            .and_then(|owner| {
                let mut staged = Staged::new(&*store);
                charge_fee(&mut staged, &owner, fee).ok()?;
                Some(staged.into_batch())
            });
        let charged = match batch {
            Some(batch) => store.commit(batch).is_ok(),
            None => false,
        };

        if !charged {
            warn!(contract = %actuator.contract_type(), fee, "owner cannot cover fee of failed contract");
            result.fee = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{finish, testing::*};
    use crate::clock::ManualClock;
    use crate::contract::{ContractType, TransferContract};
    use crate::domain::{Account, AccountType, ContractStatus};
    use crate::error::ExecutionError;
    use crate::hashing::state_hash;
    use crate::state::MemoryLedger;
    use crate::store::{LedgerStore, LedgerWriter};

    /// Writes a new account, then fails.
    struct Faulty {
        owner: Address,
        fee: i64,
    }

    impl Actuator for Faulty {
        fn contract_type(&self) -> ContractType {
            ContractType::Transfer
        }

        fn owner_address(&self) -> &[u8] {
            self.owner.as_bytes()
        }

        fn calc_fee(&self) -> i64 {
            self.fee
        }

        fn validate(&self, _store: &dyn LedgerStore) -> Result<(), ValidationError> {
            Ok(())
        }

        fn execute(
            &self,
            store: &mut dyn LedgerWriter,
            result: &mut ContractResult,
        ) -> Result<(), ExecutionError> {
            store.put_account(Account::new(addr(0x77), AccountType::Normal, 0));
            let outcome = store
                .adjust_balance(&self.owner, i64::MIN)
                .map_err(ExecutionError::from);
            finish(ContractType::Transfer, result, self.fee, outcome)
        }
    }

    /// Fails before recording anything on the result.
    struct Unrecorded(Faulty);

    impl Actuator for Unrecorded {
        fn contract_type(&self) -> ContractType {
            self.0.contract_type()
        }

        fn owner_address(&self) -> &[u8] {
            self.0.owner_address()
        }

        fn calc_fee(&self) -> i64 {
            self.0.calc_fee()
        }

        fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
            self.0.validate(store)
        }

        fn execute(
            &self,
            _store: &mut dyn LedgerWriter,
            _result: &mut ContractResult,
        ) -> Result<(), ExecutionError> {
            Err(ExecutionError::Inconsistent("aborted".into()))
        }
    }

    fn engine(policy: FailedFeePolicy) -> Engine {
        let config = EngineConfig {
            failed_fee_policy: policy,
            ..EngineConfig::default()
        };
        Engine::new(config, Arc::new(ManualClock::new(NOW)))
    }

    #[test]
    fn failed_execution_discards_staged_writes() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 100);
        let err = engine(FailedFeePolicy::RecordOnly)
            .run(&mut l, &Faulty { owner: a, fee: 0 })
            .unwrap_err();
        assert_eq!(err.result().map(|r| r.status), Some(ContractStatus::Failed));
        assert!(!l.accounts.contains_key(&addr(0x77)));
        assert_eq!(l.balance_of(&a), Some(100));
    }

    #[test]
    fn charge_policy_debits_fee_of_failed_contract() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 100);
        let err = engine(FailedFeePolicy::Charge)
            .run(&mut l, &Faulty { owner: a, fee: 30 })
            .unwrap_err();
        assert_eq!(err.result().map(|r| r.fee), Some(30));
        assert_eq!(l.balance_of(&a), Some(70));
        assert_eq!(l.balance_of(&sink()), Some(30));
        assert!(!l.accounts.contains_key(&addr(0x77)));
    }

    #[test]
    fn charge_policy_uses_the_schedule_fee_not_the_recorded_one() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 100);
        let err = engine(FailedFeePolicy::Charge)
            .run(&mut l, &Unrecorded(Faulty { owner: a, fee: 30 }))
            .unwrap_err();
        assert_eq!(err.result().map(|r| r.fee), Some(30));
        assert_eq!(err.result().map(|r| r.status), Some(ContractStatus::Failed));
        assert_eq!(l.balance_of(&a), Some(70));
        assert_eq!(l.balance_of(&sink()), Some(30));
    }

    #[test]
    fn charge_policy_reports_zero_when_owner_cannot_pay() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 10);
        let err = engine(FailedFeePolicy::Charge)
            .run(&mut l, &Faulty { owner: a, fee: 30 })
            .unwrap_err();
        assert_eq!(err.result().map(|r| r.fee), Some(0));
        assert_eq!(l.balance_of(&a), Some(10));
    }

    #[test]
    fn record_only_policy_reports_fee_without_debit() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 100);
        let err = engine(FailedFeePolicy::RecordOnly)
            .run(&mut l, &Faulty { owner: a, fee: 30 })
            .unwrap_err();
        assert_eq!(err.result().map(|r| r.fee), Some(30));
        assert_eq!(l.balance_of(&a), Some(100));
        assert_eq!(l.balance_of(&sink()), Some(0));
    }

    #[test]
    fn rejected_contract_leaves_state_hash_unchanged() {
        let mut l: MemoryLedger = ledger();
        let a = funded(&mut l, 1, 100);
        let before = state_hash(&l);
        let contract = Contract::Transfer(TransferContract {
            owner_address: a.to_vec(),
            to_address: addr(2).to_vec(),
            amount: 1_000,
        });
        let err = engine(FailedFeePolicy::Charge).apply(&mut l, contract).unwrap_err();
        assert!(matches!(err, ContractError::Validation(_)));
        assert_eq!(state_hash(&l), before);
    }

    #[test]
    fn contract_time_comes_from_the_clock() {
        let clock = Arc::new(ManualClock::new(NOW));
        let engine = Engine::new(EngineConfig::default(), clock.clone());
        assert_eq!(engine.context().now, NOW);
        clock.advance(5);
        assert_eq!(engine.context().now, NOW + 5);
    }

    #[test]
    fn successful_contract_commits() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 5_000_000);
        let contract = Contract::Transfer(TransferContract {
            owner_address: a.to_vec(),
            to_address: addr(2).to_vec(),
            amount: 2_000_000,
        });
        let engine = engine(FailedFeePolicy::Charge);
        assert_eq!(engine.validate(&l, contract.clone()), Ok(()));
        let result = engine.apply(&mut l, contract).unwrap();
        assert!(result.is_success());
        assert_eq!(l.balance_of(&addr(2)), Some(2_000_000));
        assert_eq!(l.accounts[&addr(2)].create_time, NOW);
    }
}
