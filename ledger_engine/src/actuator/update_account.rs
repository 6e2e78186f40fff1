use super::{charge_fee, finish, load_account, parse_address, Actuator, ActuatorContext};
use crate::config::UpdateAccountPolicy;
use crate::contract::{AccountUpdateContract, ContractType};
use crate::domain::{Account, AccountType, Address, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Sets the display name of the owner account.
///
/// The existence check on the owner depends on [`UpdateAccountPolicy`]:
/// `RequireExisting` renames an existing account, while `RejectExisting`
/// keeps the legacy rule and only accepts an address with no account yet,
/// creating it under the given name.
pub struct UpdateAccountActuator {
    contract: AccountUpdateContract,
    now: i64,
    fee: i64,
    policy: UpdateAccountPolicy,
}

impl UpdateAccountActuator {
    pub fn new(contract: AccountUpdateContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            now: ctx.now,
            fee: ctx.fees.fee_for(ContractType::AccountUpdate),
            policy: ctx.update_account_policy,
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let mut account = match self.policy {
            UpdateAccountPolicy::RequireExisting => load_account(store, "owner", &owner)?,
            UpdateAccountPolicy::RejectExisting => {
                Account::new(owner, AccountType::Normal, self.now)
            }
        };
        account.account_name = self.contract.account_name.clone();
        store.put_account(account);
        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for UpdateAccountActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::AccountUpdate
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        if self.contract.account_name.is_empty() {
            return Err(ValidationError::rejected("account name must not be empty"));
        }
        let owner = parse_address("owner", &self.contract.owner_address)?;

        let balance = match (self.policy, store.get_account(&owner)) {
            (UpdateAccountPolicy::RequireExisting, Some(account)) => account.balance,
            (UpdateAccountPolicy::RequireExisting, None) => {
                return Err(ValidationError::AccountNotFound {
                    role: "owner",
                    address: owner,
                })
            }
            (UpdateAccountPolicy::RejectExisting, Some(_)) => {
                return Err(ValidationError::rejected(format!(
                    "account {} already exists",
                    owner
                )))
            }
            (UpdateAccountPolicy::RejectExisting, None) => 0,
        };

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
        finish(ContractType::AccountUpdate, result, self.fee, outcome)
    }
}
