use std::collections::BTreeMap;

use super::{
    charge_fee, finish, load_account, parse_address, require_account, Actuator, ActuatorContext,
};
use crate::arithmetic::{checked_add, checked_mul, checked_sum};
use crate::contract::{ContractType, VoteWitnessContract};
use crate::domain::{Address, ContractResult};
use crate::error::{ExecutionError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

/// Replaces the owner's delegated votes wholesale. Prior votes are
/// dropped, not merged. Witness vote counts are tallied elsewhere.
pub struct VoteWitnessActuator {
    contract: VoteWitnessContract,
    fee: i64,
}

impl VoteWitnessActuator {
    pub fn new(contract: VoteWitnessContract, ctx: &ActuatorContext) -> Self {
        Self {
            contract,
            fee: ctx.fees.fee_for(ContractType::VoteWitness),
        }
    }

    /// Votes keyed by target; repeated targets are summed.
    fn tally(&self) -> Result<BTreeMap<Address, i64>, ValidationError> {
        let mut votes = BTreeMap::new();
        for vote in &self.contract.votes {
            let target = parse_address("vote", &vote.vote_address)?;
            if vote.vote_count <= 0 {
                return Err(ValidationError::NonPositive { field: "vote_count" });
            }
            let entry = votes.entry(target).or_insert(0i64);
            *entry = checked_add(*entry, vote.vote_count)?;
        }
        Ok(votes)
    }

    fn apply(&self, store: &mut dyn LedgerWriter) -> Result<(), ExecutionError> {
        let owner = Address::from_slice(&self.contract.owner_address)?;
        let votes = self.tally().map_err(|e| ExecutionError::Inconsistent(e.to_string()))?;
        let mut account = load_account(store, "owner", &owner)?;
        account.votes = votes;
        store.put_account(account);
        charge_fee(store, &owner, self.fee)?;
        Ok(())
    }
}

impl Actuator for VoteWitnessActuator {
    fn contract_type(&self) -> ContractType {
        ContractType::VoteWitness
    }

    fn owner_address(&self) -> &[u8] {
        &self.contract.owner_address
    }

    fn calc_fee(&self) -> i64 {
        self.fee
    }

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError> {
        let owner = parse_address("owner", &self.contract.owner_address)?;
        if self.contract.votes.is_empty() {
            return Err(ValidationError::rejected("vote list must not be empty"));
        }

        let votes = self.tally()?;
        for target in votes.keys() {
            require_account(store, "vote", target)?;
            if !store.has_witness(target) {
                return Err(ValidationError::WitnessNotFound(*target));
            }
        }

        let account = require_account(store, "owner", &owner)?;
        let max = store.parameters().max_vote_number;
        if self.contract.votes.len() > max {
            return Err(ValidationError::rejected(format!(
                "vote count {} exceeds the maximum of {}",
                self.contract.votes.len(),
                max
            )));
        }

        let weight = checked_mul(checked_sum(votes.values().copied())?, store.parameters().vote_unit)?;
        let power = account.voting_power()?;
        if weight > power {
            return Err(ValidationError::rejected(format!(
                "vote weight {} exceeds voting power {}",
                weight, power
            )));
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
        finish(ContractType::VoteWitness, result, self.fee, outcome)
    }
}
