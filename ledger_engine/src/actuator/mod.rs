/// Ledger Engine: Actuators
///
/// One actuator per contract kind. Every actuator follows the same
/// two-phase protocol:
///   1. `validate()`: read-only, first failing check wins
///   2. `execute()`: writes into a staged overlay, records fee + status
///
/// Actuators are built fresh per contract by the dispatcher and dropped
/// after one (validate, execute) pair.

use tracing::debug;

use crate::config::{FeeSchedule, UpdateAccountPolicy};
use crate::contract::ContractType;
use crate::domain::{Account, Address, ContractResult, ContractStatus};
use crate::error::{ExecutionError, StoreError, ValidationError};
use crate::store::{LedgerStore, LedgerWriter};

mod asset_issue;
mod freeze_balance;
mod participate_asset_issue;
mod transfer;
mod transfer_asset;
mod unfreeze_balance;
mod update_account;
mod vote_witness;
mod withdraw_balance;
mod witness_create;
mod witness_update;

pub use asset_issue::AssetIssueActuator;
pub use freeze_balance::FreezeBalanceActuator;
pub use participate_asset_issue::ParticipateAssetIssueActuator;
pub use transfer::TransferActuator;
pub use transfer_asset::TransferAssetActuator;
pub use unfreeze_balance::UnfreezeBalanceActuator;
pub use update_account::UpdateAccountActuator;
pub use vote_witness::VoteWitnessActuator;
pub use withdraw_balance::WithdrawBalanceActuator;
pub use witness_create::WitnessCreateActuator;
pub use witness_update::WitnessUpdateActuator;

/// Maximum witness URL length in bytes.
pub const MAX_URL_LEN: usize = 256;

/// Everything an actuator needs besides its payload and the store.
#[derive(Debug, Clone, Default)]
pub struct ActuatorContext {
    /// Time of execution, ms since epoch. Read once per contract.
    pub now: i64,
    pub fees: FeeSchedule,
    pub update_account_policy: UpdateAccountPolicy,
}

pub trait Actuator: Send {
    fn contract_type(&self) -> ContractType;

    /// Raw owner address bytes from the payload.
    fn owner_address(&self) -> &[u8];

    fn calc_fee(&self) -> i64;

    fn validate(&self, store: &dyn LedgerStore) -> Result<(), ValidationError>;

    fn execute(
        &self,
        store: &mut dyn LedgerWriter,
        result: &mut ContractResult,
    ) -> Result<(), ExecutionError>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn parse_address(field: &'static str, bytes: &[u8]) -> Result<Address, ValidationError> {
    Address::from_slice(bytes).map_err(|source| ValidationError::InvalidAddress { field, source })
}

/// Asset names are non-empty UTF-8.
pub(crate) fn parse_asset_name(bytes: &[u8]) -> Result<String, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::rejected("asset name must not be empty"));
    }
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ValidationError::rejected("asset name must be valid UTF-8"))
}

pub(crate) fn parse_url(bytes: &[u8]) -> Result<String, ValidationError> {
    if bytes.is_empty() || bytes.len() > MAX_URL_LEN {
        return Err(ValidationError::rejected(format!(
            "invalid url: length must be between 1 and {} bytes",
            MAX_URL_LEN
        )));
    }
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ValidationError::rejected("invalid url: must be valid UTF-8"))
}

pub(crate) fn require_account(
    store: &dyn LedgerStore,
    role: &'static str,
    address: &Address,
) -> Result<Account, ValidationError> {
    store
        .get_account(address)
        .ok_or(ValidationError::AccountNotFound { role, address: *address })
}

pub(crate) fn load_account(
    store: &dyn LedgerWriter,
    role: &'static str,
    address: &Address,
) -> Result<Account, ExecutionError> {
    store
        .get_account(address)
        .ok_or(ExecutionError::MissingAccount { role, address: *address })
}

/// Move `fee` from `owner` into the sink account.
pub(crate) fn charge_fee(
    store: &mut dyn LedgerWriter,
    owner: &Address,
    fee: i64,
) -> Result<(), StoreError> {
    if fee == 0 {
        return Ok(());
    }
    store.adjust_balance(owner, -fee)?;
    let sink = store.blackhole();
    store.adjust_balance(&sink, fee)
}

/// Record the outcome of an execution on the result record.
pub(crate) fn finish(
    kind: ContractType,
    result: &mut ContractResult,
    fee: i64,
    outcome: Result<(), ExecutionError>,
) -> Result<(), ExecutionError> {
    match outcome {
        Ok(()) => {
            result.set_status(fee, ContractStatus::Success);
            Ok(())
        }
        Err(e) => {
            debug!(contract = %kind, error = %e, "execution failed");
            result.set_status(fee, ContractStatus::Failed);
            Err(e)
        }
    }
}
