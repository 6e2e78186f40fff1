use tracing::debug;

use super::{
    charge_fee, finish, load_account, parse_address, parse_url, require_account, Actuator,
    ActuatorContext,
};
use crate::arithmetic::checked_add;
use crate::contract::{ContractType, WitnessCreateContract};
use crate::domain::{Address, ContractResult, Witness};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Registers the owner as a witness candidate. The upgrade cost is paid
/// into the sink.
pub struct WitnessCreateActuator {
    contract: WitnessCreateContract,
    fee: i64,
}

impl WitnessCreateActuator {
    pub fn new(contract: WitnessCreateContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            fee: ctx.fees.fee_for(ContractType::WitnessCreate),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let url = String::from_utf8_lossy(&self.contract.url).into_owned();
        let cost = store.parameters().account_upgrade_cost;

        store.put_witness(Witness {
            address: owner,
            url,
            vote_count: 0,
        });

        let mut account = load_account(store, "owner", &owner)?;
        account.is_witness = true;
        store.put_account(account);

        charge_fee(store, &owner, checked_add(cost, self.fee)?)?;
        debug!(witness = %owner, "witness registered");
        Ok(())
    }
}

impl Actuator for WitnessCreateActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::WitnessCreate
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        let owner = parse_address("owner", &self.contract.owner_address)?;
        parse_url(&self.contract.url)?;
        let account = require_account(store, "owner", &owner)?;
        if store.has_witness(&owner) {
            return Err(ValidationError::WitnessExists(owner));
        }

        let required = checked_add(store.parameters().account_upgrade_cost, self.fee)?;
        if account.balance < required {
            return Err(ValidationError::InsufficientBalance {
                required,
                available: account.balance,
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
        finish(ContractType::WitnessCreate, result, self.fee, outcome)
    }
}
