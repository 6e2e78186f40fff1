use super::{
    charge_fee, finish, load_account, parse_address, require_account, Actuator, ActuatorContext,
};
use crate::arithmetic::{checked_add, checked_sum};
use crate::contract::{ContractType, UnfreezeBalanceContract};
use crate::domain::{Account, Address, ContractResult};
use crate::error::{ArithmeticError, ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Releases every expired lock back into the spendable balance.
pub struct UnfreezeBalanceActuator {
    contract: UnfreezeBalanceContract,
    now: i64,
    fee: i64,
}

impl UnfreezeBalanceActuator {
    pub fn new(contract: UnfreezeBalanceContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            now: ctx.now,
            fee: ctx.fees.fee_for(ContractType::UnfreezeBalance),
        }
    }

    fn released(&self, account: &Account) -> Result<i64, ArithmeticError> {
        checked_sum(
            account
                .frozen
                .iter()
                .filter(|f| f.expire_time <= self.now)
                .map(|f| f.frozen_balance),
        )
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let mut account = load_account(store, "owner", &owner)?;

        let released = self.released(&account)?;
        account.balance = checked_add(account.balance, released)?;
        let now = self.now;
        account.frozen.retain(|f| f.expire_time > now);
        store.put_account(account);

        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for UnfreezeBalanceActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::UnfreezeBalance
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
        if account.frozen.is_empty() {
            return Err(ValidationError::rejected("no frozen balance"));
        }
        if !account.frozen.iter().any(|f| f.expire_time <= self.now) {
            return Err(ValidationError::rejected("it is not time to unfreeze"));
        }

        let released = self.released(&account)?;
        let balance = checked_add(account.balance, released)?;
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
        finish(ContractType::UnfreezeBalance, result, self.fee, outcome)
    }
}
