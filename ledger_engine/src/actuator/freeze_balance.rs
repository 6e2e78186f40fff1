use super::{
    charge_fee, finish, load_account, parse_address, require_account, Actuator, ActuatorContext,
};
use crate::arithmetic::{checked_add, checked_mul, days_to_millis};
use crate::contract::{ContractType, FreezeBalanceContract};
use crate::domain::{Address, ContractResult, Frozen};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Locks part of the balance for a number of days in exchange for
/// bandwidth. An account holds at most one lock; freezing again merges
/// into it and pushes its expiry out.
pub struct FreezeBalanceActuator {
    contract: FreezeBalanceContract,
    now: i64,
    fee: i64,
}

impl FreezeBalanceActuator {
    pub fn new(contract: FreezeBalanceContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            now: ctx.now,
            fee: ctx.fees.fee_for(ContractType::FreezeBalance),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let amount = self.contract.frozen_balance;
        let days = self.contract.frozen_duration;
        let rate = store.parameters().bandwidth_per_coinday;

        store.adjust_balance(&owner, -amount)?;
        let mut account = load_account(store, "owner", &owner)?;

        let expire_time = checked_add(self.now, days_to_millis(days)?)?;
        match account.frozen.as_mut_slice() {
            [] => account.frozen.push(Frozen {
                frozen_balance: amount,
                expire_time,
            }),
            [slot] => {
                slot.frozen_balance = checked_add(slot.frozen_balance, amount)?;
                slot.expire_time = expire_time;
            }
            slots => {
                return Err(ExecutionError::Inconsistent(format!(
                    "account {} holds {} frozen slots",
                    owner,
                    slots.len()
                )))
            }
        }

        let credit = checked_mul(checked_mul(amount, days)?, rate)?;
        account.bandwidth = checked_add(account.bandwidth, credit)?;
        store.put_account(account);

        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for FreezeBalanceActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::FreezeBalance
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
        let params = store.parameters();
        let amount = self.contract.frozen_balance;

        if amount <= 0 {
            return Err(ValidationError::NonPositive { field: "frozen_balance" });
        }
        if amount < params.min_frozen_balance {
            return Err(ValidationError::rejected(format!(
                "frozen balance must be at least {}",
                params.min_frozen_balance
            )));
        }
        let required = checked_add(amount, self.fee)?;
        if required > account.balance {
            return Err(ValidationError::InsufficientBalance {
                required,
                available: account.balance,
            });
        }

        let days = self.contract.frozen_duration;
        if days < params.min_frozen_time || days > params.max_frozen_time {
            return Err(ValidationError::rejected(format!(
                "frozen duration must be between {} and {} days",
                params.min_frozen_time, params.max_frozen_time
            )));
        }
        if account.frozen.len() > 1 {
            return Err(ValidationError::rejected(format!(
                "account {} holds more than one frozen slot",
                owner
            )));
        }

        let credit = checked_mul(checked_mul(amount, days)?, params.bandwidth_per_coinday)?;
        checked_add(account.bandwidth, credit)?;
        if let Some(slot) = account.frozen.first() {
            checked_add(slot.frozen_balance, amount)?;
        }
        Ok(())
    }

    fn execute(
        &self,
        store: &mut dyn LedgerWriter,
        result: &mut ContractResult,
    ) -> Result<(), ExecutionError> {
        let outcome = self.apply(store);
        finish(ContractType::FreezeBalance, result, self.fee, outcome)
    }
}
