use super::{charge_fee, finish, parse_address, parse_url, require_account, Actuator, ActuatorContext};
use crate::contract::{ContractType, WitnessUpdateContract};
use crate::domain::{Address, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

pub struct WitnessUpdateActuator {
    contract: WitnessUpdateContract,
    fee: i64,
}

impl WitnessUpdateActuator {
    pub fn new(contract: WitnessUpdateContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            fee: ctx.fees.fee_for(ContractType::WitnessUpdate),
        }
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let mut witness = store.get_witness(&owner).ok_or_else(|| {
            ExecutionError::Inconsistent(format!("witness {} vanished", owner))
        })?;
        witness.url = String::from_utf8_lossy(&self.contract.update_url).into_owned();
        store.put_witness(witness);
        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for WitnessUpdateActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::WitnessUpdate
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
        parse_url(&self.contract.update_url)?;
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
        finish(ContractType::WitnessUpdate, result, self.fee, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::testing::*;
    use crate::domain::Witness;

    fn update(owner: &Address, url: &[u8]) -> WitnessUpdateContract {
        WitnessUpdateContract {
            owner_address: owner.to_vec(),
            update_url: url.to_vec(),
        }
    }

    #[test]
    fn replaces_url_only() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 0);
        l.insert_witness(Witness { address: a, url: "old".into(), vote_count: 42 });
        run(&mut l, &WitnessUpdateActuator::new(update(&a, b"new"), &ctx())).unwrap();
        assert_eq!(l.witnesses[&a], Witness { address: a, url: "new".into(), vote_count: 42 });
    }

    #[test]
    fn rejects_non_witness() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 0);
        let act = WitnessUpdateActuator::new(update(&a, b"new"), &ctx());
        assert_eq!(act.validate(&l), Err(ValidationError::WitnessNotFound(a)));
    }

    #[test]
    fn rejects_invalid_utf8_url() {
        let mut l = ledger();
        let a = funded(&mut l, 1, 0);
        l.insert_witness(Witness { address: a, url: "old".into(), vote_count: 0 });
        let act = WitnessUpdateActuator::new(update(&a, &[0xff, 0xfe]), &ctx());
        assert!(matches!(act.validate(&l), Err(ValidationError::Rejected(_))));
    }
}
