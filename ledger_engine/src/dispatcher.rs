/// Ledger Engine: Dispatcher
///
/// Maps a decoded contract to a fresh actuator bound to its payload.
/// The match is exhaustive over `Contract`, so every kind has a handler;
/// unknown wire tags are rejected before a `Contract` exists.

use crate::actuator::{
    Actuator, ActuatorContext, AssetIssueActuator, FreezeBalanceActuator,
    ParticipateAssetIssueActuator, TransferActuator, TransferAssetActuator,
    UnfreezeBalanceActuator, UpdateAccountActuator, VoteWitnessActuator, WithdrawBalanceActuator,
    WitnessCreateActuator, WitnessUpdateActuator,
};
use crate::contract::{Contract, ContractType};
use crate::error::ValidationError;

/// Build the actuator for `contract`. Stateless; each call yields a new
/// instance that serves exactly one validate/execute pair.
pub fn create_actuator(contract: Contract, ctx: &ActuatorContext) -> Box<dyn Actuator> {
    match contract {
        Contract::Transfer(c) => Box::new(TransferActuator::new(c, ctx)),
        Contract::TransferAsset(c) => Box::new(TransferAssetActuator::new(c, ctx)),
        Contract::AssetIssue(c) => Box::new(AssetIssueActuator::new(c, ctx)),
        Contract::ParticipateAssetIssue(c) => Box::new(ParticipateAssetIssueActuator::new(c, ctx)),
        Contract::FreezeBalance(c) => Box::new(FreezeBalanceActuator::new(c, ctx)),
        Contract::UnfreezeBalance(c) => Box::new(UnfreezeBalanceActuator::new(c, ctx)),
        Contract::WitnessCreate(c) => Box::new(WitnessCreateActuator::new(c, ctx)),
        Contract::WitnessUpdate(c) => Box::new(WitnessUpdateActuator::new(c, ctx)),
        Contract::AccountUpdate(c) => Box::new(UpdateAccountActuator::new(c, ctx)),
        Contract::VoteWitness(c) => Box::new(VoteWitnessActuator::new(c, ctx)),
        Contract::WithdrawBalance(c) => Box::new(WithdrawBalanceActuator::new(c, ctx)),
    }
}

/// Resolve a wire type tag, failing for kinds this engine has no
/// actuator for.
pub fn resolve_type(tag: i32) -> Result<ContractType, ValidationError> {
    ContractType::from_tag(tag).ok_or(ValidationError::UnsupportedContractType(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{TransferContract, UnfreezeBalanceContract};

    #[test]
    fn actuator_kind_matches_contract_kind() {
        let ctx = ActuatorContext::default();
        let transfer = Contract::Transfer(TransferContract {
            owner_address: vec![1],
            to_address: vec![2],
            amount: 3,
        });
        let actuator = create_actuator(transfer, &ctx);
        assert_eq!(actuator.contract_type(), ContractType::Transfer);
        assert_eq!(actuator.owner_address(), &[1]);

        let unfreeze = Contract::UnfreezeBalance(UnfreezeBalanceContract { owner_address: vec![9] });
        assert_eq!(create_actuator(unfreeze, &ctx).contract_type(), ContractType::UnfreezeBalance);
    }

    #[test]
    fn unknown_tags_are_unsupported() {
        assert_eq!(resolve_type(1), Ok(ContractType::Transfer));
        assert_eq!(resolve_type(3), Err(ValidationError::UnsupportedContractType(3)));
        assert_eq!(resolve_type(-1), Err(ValidationError::UnsupportedContractType(-1)));
    }
}
