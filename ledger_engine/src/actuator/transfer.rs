use tracing::debug;

use super::{finish, parse_address, require_account, Actuator, ActuatorContext};
use crate::arithmetic::checked_add;
use crate::contract::{ContractType, TransferContract};
use crate::domain::{Account, AccountType, Address, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Native-balance transfer. Creates the recipient when it does not exist
/// yet and the amount clears the creation minimum.
pub struct TransferActuator {
    contract: TransferContract,
    now: i64,
    fee: i64,
}

impl TransferActuator {
    pub fn new(contract: TransferContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            now: ctx.now,
            fee: ctx.fees.fee_for(ContractType::Transfer),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let to = Address::from_slice(&self.contract.to_address)?;
        let amount = self.contract.amount;

        if !store.has_account(&to) {
            debug!(to = %to, "creating recipient account");
            store.put_account(Account::new(to, AccountType::Normal, self.now));
        }

        store.adjust_balance(&owner, -checked_add(amount, self.fee)?)?;
        store.adjust_balance(&to, amount)?;
        if self.fee > 0 {
            let sink = store.blackhole();
            store.adjust_balance(&sink, self.fee)?;
        }
        Ok(())
    }
}

impl Actuator for TransferActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::Transfer
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        let owner = parse_address("owner", &self.contract.owner_address)?;
        let to = parse_address("to", &self.contract.to_address)?;
        if owner == to {
            return Err(ValidationError::SameAccount);
        }

        let owner_account = require_account(store, "owner", &owner)?;
        let balance = owner_account.balance;
        if balance < self.fee {
            return Err(ValidationError::InsufficientBalance {
                required: self.fee,
                available: balance,
            });
        }

        let amount = self.contract.amount;
        if amount <= 0 {
            return Err(ValidationError::NonPositive { field: "amount" });
        }
        let required = checked_add(amount, self.fee)?;
        if balance < required {
            return Err(ValidationError::InsufficientBalance {
                required,
                available: balance,
            });
        }

        match store.get_account(&to) {
            None => {
                let min = store.parameters().non_existent_account_transfer_min;
                if amount < min {
                    return Err(ValidationError::rejected(format!(
                        "for a non-existent account transfer, the minimum amount is {}",
                        min
                    )));
                }
            }
            Some(to_account) => {
                checked_add(to_account.balance, amount)?;
            }
        }
        Ok(())
    }

    fn execute(
        &self,
        store: &mut dyn LedgerWriter,
        result: &mut ContractResult,
    ) -> Result<(), ExecutionError> {
        let outcome = self.apply(store);
        finish(ContractType::Transfer, result, self.fee, outcome)
    }
}
