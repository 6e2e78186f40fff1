/// Ledger Engine: Engine Configuration
///
/// Fee schedule and the behavioural policies that are not network
/// parameters. All fields have defaults so partial TOML/JSON files load.

use serde::{Deserialize, Serialize};

use crate::contract::ContractType;

/// Fixed fee charged per contract kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeeSchedule {
    pub transfer: i64,
    pub transfer_asset: i64,
    pub asset_issue: i64,
    pub participate_asset_issue: i64,
    pub freeze_balance: i64,
    pub unfreeze_balance: i64,
    pub witness_create: i64,
    pub witness_update: i64,
    pub account_update: i64,
    pub vote_witness: i64,
    pub withdraw_balance: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            transfer: 0,
            transfer_asset: 0,
            asset_issue: 1_024_000_000,
            participate_asset_issue: 0,
            freeze_balance: 0,
            unfreeze_balance: 0,
            witness_create: 0,
            witness_update: 0,
            account_update: 0,
            vote_witness: 0,
            withdraw_balance: 0,
        }
    }
}

impl FeeSchedule {
    pub fn fee_for(&self, kind: ContractType) -> i64 {
        match kind {
            ContractType::Transfer => self.transfer,
            ContractType::TransferAsset => self.transfer_asset,
            ContractType::AssetIssue => self.asset_issue,
            ContractType::ParticipateAssetIssue => self.participate_asset_issue,
            ContractType::FreezeBalance => self.freeze_balance,
            ContractType::UnfreezeBalance => self.unfreeze_balance,
            ContractType::WitnessCreate => self.witness_create,
            ContractType::WitnessUpdate => self.witness_update,
            ContractType::AccountUpdate => self.account_update,
            ContractType::VoteWitness => self.vote_witness,
            ContractType::WithdrawBalance => self.withdraw_balance,
        }
    }
}

/// Which existence check `AccountUpdate` applies to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateAccountPolicy {
    /// Reject when the owner account does not exist; rename it otherwise.
    #[default]
    RequireExisting,
    /// Legacy check: reject when the owner account already exists, and
    /// create it carrying the new name otherwise.
    RejectExisting,
}

/// What happens to the fee of a contract whose execution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedFeePolicy {
    /// Discard the execution's writes, then debit the fee from the owner
    /// into the sink in a separate batch. If the owner cannot cover it the
    /// result reports a fee of 0.
    #[default]
    Charge,
    /// Report the fee on the FAILED result without debiting anything.
    RecordOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub fees: FeeSchedule,
    pub update_account_policy: UpdateAccountPolicy,
    pub failed_fee_policy: FailedFeePolicy,
}
