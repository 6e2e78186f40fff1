use tracing::debug;

use super::{
    charge_fee, finish, load_account, parse_address, parse_asset_name, require_account, Actuator,
    ActuatorContext,
};
use crate::contract::{AssetIssueContract, ContractType};
use crate::domain::{Address, AssetIssue, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Registers a new asset and credits its whole supply to the issuer.
pub struct AssetIssueActuator {
    contract: AssetIssueContract,
    fee: i64,
}

impl AssetIssueActuator {
    pub fn new(contract: AssetIssueContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            fee: ctx.fees.fee_for(ContractType::AssetIssue),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let c = &self.contract;
        let owner = Address::from_slice(&c.owner_address)?;
        let name = String::from_utf8_lossy(&c.name).into_owned();

        store.put_asset(AssetIssue {
            name: name.clone(),
            owner_address: owner,
            total_supply: c.total_supply,
            trx_num: c.trx_num,
            num: c.num,
            start_time: c.start_time,
            end_time: c.end_time,
            description: String::from_utf8_lossy(&c.description).into_owned(),
            url: String::from_utf8_lossy(&c.url).into_owned(),
        });

        charge_fee(store, &owner, self.fee)?;

        let mut account = load_account(store, "owner", &owner)?;
        account.add_asset_amount(&name, c.total_supply)?;
        store.put_account(account);

        debug!(asset = %name, owner = %owner, supply = c.total_supply, "asset issued");
        Ok(())
    }
}

impl Actuator for AssetIssueActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::AssetIssue
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        let c = &self.contract;
        let owner = parse_address("owner", &c.owner_address)?;
        let name = parse_asset_name(&c.name)?;
        if c.total_supply <= 0 {
            return Err(ValidationError::NonPositive { field: "total_supply" });
        }
        if c.trx_num <= 0 {
            return Err(ValidationError::NonPositive { field: "trx_num" });
        }
        if c.num <= 0 {
            return Err(ValidationError::NonPositive { field: "num" });
        }
        if c.start_time >= c.end_time {
            return Err(ValidationError::rejected(
                "start time must be earlier than end time",
            ));
        }

        let account = require_account(store, "owner", &owner)?;
        if store.has_asset(&name) {
            return Err(ValidationError::AssetExists(name));
        }
        if account.balance < self.fee {
            return Err(ValidationError::InsufficientBalance {
                required: self.fee,
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
        finish(ContractType::AssetIssue, result, self.fee, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::testing::*;

    const FEE: i64 = 1_024_000_000;

    fn issue(owner: &Address, name: &str) -> AssetIssueContract {
        AssetIssueContract {
            owner_address: owner.to_vec(),
            name: name.as_bytes().to_vec(),
            total_supply: 1000,
            trx_num: 1,
            num: 1,
            start_time: NOW,
            end_time: NOW + 86_400_000,
            description: b"test token".to_vec(),
            url: b"https://example.org".to_vec(),
        }
    }

    #[test]
    fn rejects_when_fee_exceeds_balance() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 10_000_000);
        let act = AssetIssueActuator::new(issue(&a, "FOO"), &ctx());
        assert_eq!(
            act.validate(&l),
            Err(ValidationError::InsufficientBalance { required: FEE, available: 10_000_000 })
        );
    }

    #[test]
    fn issues_asset_and_routes_fee_to_sink() {
        let mut l = ledger();
        let a = funded(&mut l, 1, FEE + 5);
        let act = AssetIssueActuator::new(issue(&a, "FOO"), &ctx());
        let result = run(&mut l, &act).unwrap();
        assert_eq!(result.fee, FEE);
        assert_eq!(l.balance_of(&a), Some(5));
        assert_eq!(l.balance_of(&sink()), Some(FEE));
        assert_eq!(l.accounts[&a].asset_balance("FOO"), 1000);
        let entry = &l.assets["FOO"];
        assert_eq!(entry.owner_address, a);
        assert_eq!(entry.description, "test token");
    }

    #[test]
    fn rejects_duplicate_name() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 3 * FEE);
        run(&mut l, &AssetIssueActuator::new(issue(&a, "FOO"), &ctx())).unwrap();
        let again = AssetIssueActuator::new(issue(&a, "FOO"), &ctx());
        assert_eq!(again.validate(&l), Err(ValidationError::AssetExists("FOO".into())));
    }

    #[test]
    fn rejects_non_positive_terms() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 2 * FEE);
        let mut c = issue(&a, "FOO");
        c.num = 0;
        let act = AssetIssueActuator::new(c, &ctx());
        assert_eq!(act.validate(&l), Err(ValidationError::NonPositive { field: "num" }));

        let mut c = issue(&a, "FOO");
        c.total_supply = -1;
        let act = AssetIssueActuator::new(c, &ctx());
        assert_eq!(
            act.validate(&l),
            Err(ValidationError::NonPositive { field: "total_supply" })
        );
    }

    #[test]
    fn rejects_empty_window_and_empty_name() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 2 * FEE);
        let mut c = issue(&a, "FOO");
        c.end_time = c.start_time;
        assert!(matches!(
            AssetIssueActuator::new(c, &ctx()).validate(&l),
            Err(ValidationError::Rejected(_))
        ));
        assert!(matches!(
            AssetIssueActuator::new(issue(&a, ""), &ctx()).validate(&l),
            Err(ValidationError::Rejected(_))
        ));
    }
}
