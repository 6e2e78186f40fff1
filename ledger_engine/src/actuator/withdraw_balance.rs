use super::{
    charge_fee, finish, load_account, parse_address, require_account, Actuator, ActuatorContext,
};
use crate::arithmetic::{checked_add, checked_sub, days_to_millis};
use crate::contract::{ContractType, WithdrawBalanceContract};
use crate::domain::{Address, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Moves a witness's accrued allowance into its balance, at most once
/// per cooldown period.
pub struct WithdrawBalanceActuator {
    contract: WithdrawBalanceContract,
    now: i64,
    fee: i64,
}

impl WithdrawBalanceActuator {
    pub fn new(contract: WithdrawBalanceContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            now: ctx.now,
            fee: ctx.fees.fee_for(ContractType::WithdrawBalance),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let mut account = load_account(store, "owner", &owner)?;
        account.balance = checked_add(account.balance, account.allowance)?;
        account.allowance = 0;
        account.latest_withdraw_time = self.now;
        store.put_account(account);
        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for WithdrawBalanceActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::WithdrawBalance
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        let owner = parse_address("owner", &self.contract.owner_address)?;
        let account = require_account(store, "owner", &owner)?;
        if !store.has_witness(&owner) {
            return Err(ValidationError::WitnessNotFound(owner));
        }

        let cooldown = days_to_millis(store.parameters().witness_allowance_frozen_time)?;
        let elapsed = checked_sub(self.now, account.latest_withdraw_time)?;
        if elapsed < cooldown {
            return Err(ValidationError::rejected(format!(
                "last withdrawal was {} ms ago, cooldown is {} ms",
                elapsed, cooldown
            )));
        }
        if account.allowance <= 0 {
            return Err(ValidationError::NonPositive { field: "allowance" });
        }

        let balance = checked_add(account.balance, account.allowance)?;
        if balance < self.fee {
            return Err(ValidationError::InsufficientBalance {
                required: self.fee,
                available: balance,
            });
        }
        Ok(())
    }

    fn execute(
        &self,
        store: &mut dyn LedgerWriter,
        result: &mut ContractResult,
    ) -> Result<(), ExecutionError> {
        let outcome = self.apply(store);
        finish(ContractType::WithdrawBalance, result, self.fee, outcome)
    }
}
