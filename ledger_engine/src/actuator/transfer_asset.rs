use super::{
    charge_fee, finish, load_account, parse_address, parse_asset_name, require_account, Actuator,
    ActuatorContext,
};
use crate::arithmetic::checked_add;
use crate::contract::{ContractType, TransferAssetContract};
use crate::domain::{Address, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Moves issued asset tokens between two existing accounts.
pub struct TransferAssetActuator {
    contract: TransferAssetContract,
    fee: i64,
}

impl TransferAssetActuator {
    pub fn new(contract: TransferAssetContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            fee: ctx.fees.fee_for(ContractType::TransferAsset),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let to = Address::from_slice(&self.contract.to_address)?;
        let asset = String::from_utf8_lossy(&self.contract.asset_name).into_owned();
        let amount = self.contract.amount;

        let mut owner_account = load_account(store, "owner", &owner)?;
        if !owner_account.reduce_asset_amount(&asset, amount)? {
            return Err(ExecutionError::AssetReduction {
                address: owner,
                asset,
                amount,
            });
        }
        store.put_account(owner_account);

        let mut to_account = load_account(store, "to", &to)?;
        to_account.add_asset_amount(&asset, amount)?;
        store.put_account(to_account);

        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for TransferAssetActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::TransferAsset
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
        let asset = parse_asset_name(&self.contract.asset_name)?;
        let amount = self.contract.amount;
        if amount <= 0 {
            return Err(ValidationError::NonPositive { field: "amount" });
        }
        if owner == to {
            return Err(ValidationError::SameAccount);
        }

        let owner_account = require_account(store, "owner", &owner)?;
        if !store.has_asset(&asset) {
            return Err(ValidationError::AssetNotFound(asset));
        }
        if owner_account.balance < self.fee {
            return Err(ValidationError::InsufficientBalance {
                required: self.fee,
                available: owner_account.balance,
            });
        }

        let held = owner_account.asset_balance(&asset);
        if held <= 0 || amount > held {
            return Err(ValidationError::InsufficientAsset {
                asset,
                required: amount,
                available: held,
            });
        }

        let to_account = require_account(store, "to", &to)?;
        checked_add(to_account.asset_balance(&asset), amount)?;
        Ok(())
    }

    fn execute(
        &self,
        store: &mut dyn LedgerWriter,
        result: &mut ContractResult,
    ) -> Result<(), ExecutionError> {
        let outcome = self.apply(store);
        finish(ContractType::TransferAsset, result, self.fee, outcome)
    }
}
