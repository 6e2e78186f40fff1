use super::{
    charge_fee, finish, load_account, parse_address, parse_asset_name, require_account, Actuator,
    ActuatorContext,
};
use crate::arithmetic::{checked_add, checked_mul, floor_div};
use crate::contract::{ContractType, ParticipateAssetIssueContract};
use crate::domain::{Address, AssetIssue, ContractResult};
use crate::error::{ArithmeticError, ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Buys asset tokens from their issuer at the registered exchange ratio
/// while the sale window is open.
pub struct ParticipateAssetIssueActuator {
    contract: ParticipateAssetIssueContract,
    now: i64,
    fee: i64,
}

/// Tokens received for `amount` native units: floor(amount * num / trx_num).
pub fn exchange_amount(asset: &AssetIssue, amount: i64) -> Result<i64, ArithmeticError> {
    floor_div(checked_mul(amount, i64::from(asset.num))?, i64::from(asset.trx_num))
}

impl ParticipateAssetIssueActuator {
    pub fn new(contract: ParticipateAssetIssueContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            now: ctx.now,
            fee: ctx.fees.fee_for(ContractType::ParticipateAssetIssue),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let issuer = Address::from_slice(&self.contract.to_address)?;
        let name = String::from_utf8_lossy(&self.contract.asset_name).into_owned();
        let amount = self.contract.amount;

        let asset = store
            .get_asset(&name)
            .ok_or_else(|| ExecutionError::Inconsistent(format!("asset {:?} vanished", name)))?;
        let exchange = exchange_amount(&asset, amount)?;

        store.adjust_balance(&owner, -amount)?;
        let mut buyer = load_account(store, "owner", &owner)?;
        buyer.add_asset_amount(&name, exchange)?;
        store.put_account(buyer);

        store.adjust_balance(&issuer, amount)?;
        let mut seller = load_account(store, "to", &issuer)?;
        if !seller.reduce_asset_amount(&name, exchange)? {
            return Err(ExecutionError::AssetReduction {
                address: issuer,
                asset: name,
                amount: exchange,
            });
        }
        store.put_account(seller);

        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for ParticipateAssetIssueActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::ParticipateAssetIssue
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        let owner = parse_address("owner", &self.contract.owner_address)?;
        let issuer = parse_address("to", &self.contract.to_address)?;
        let name = parse_asset_name(&self.contract.asset_name)?;
        let amount = self.contract.amount;
        if amount <= 0 {
            return Err(ValidationError::NonPositive { field: "amount" });
        }
        if owner == issuer {
            return Err(ValidationError::SameAccount);
        }

        let buyer = require_account(store, "owner", &owner)?;
        let required = checked_add(amount, self.fee)?;
        if buyer.balance < required {
            return Err(ValidationError::InsufficientBalance {
                required,
                available: buyer.balance,
            });
        }

        let asset = store
            .get_asset(&name)
            .ok_or_else(|| ValidationError::AssetNotFound(name.clone()))?;
        if asset.owner_address != issuer {
            return Err(ValidationError::rejected(format!(
                "asset {:?} is not issued by {}",
                name, issuer
            )));
        }
        if !asset.is_open_at(self.now) {
            return Err(ValidationError::rejected(format!(
                "asset {:?} is not on sale at {}",
                name, self.now
            )));
        }

        let exchange = exchange_amount(&asset, amount)?;
        if exchange <= 0 {
            return Err(ValidationError::NonPositive { field: "exchange amount" });
        }

        let seller = require_account(store, "to", &issuer)?;
        let held = seller.asset_balance(&name);
        if held < exchange {
            return Err(ValidationError::InsufficientAsset {
                asset: name,
                required: exchange,
                available: held,
            });
        }
        checked_add(buyer.asset_balance(&name), exchange)?;
        checked_add(seller.balance, amount)?;
        Ok(())
    }

    fn execute(
        &self,
        store: &mut dyn LedgerWriter,
        result: &mut ContractResult,
    ) -> Result<(), ExecutionError> {
        let outcome = self.apply(store);
        finish(ContractType::ParticipateAssetIssue, result, self.fee, outcome)
    }
}
