//! Error families for the ledger engine.
//!
//! `ValidationError` means the contract is inadmissible and nothing was
//! written. `ExecutionError` means an admissible contract failed while
//! mutating state; its staged writes are discarded by the engine.

use thiserror::Error;

use crate::contract::ContractType;
use crate::domain::{Address, ContractResult};

/// Checked arithmetic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("arithmetic overflow: {lhs} {op} {rhs}")]
    Overflow {
        op: &'static str,
        lhs: i64,
        rhs: i64,
    },
    #[error("division by zero: {lhs} / 0")]
    DivisionByZero { lhs: i64 },
}

/// Malformed address bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("address prefix must be {expected:#04x}, got {actual:#04x}")]
    InvalidPrefix { expected: u8, actual: u8 },
    #[error("address is not valid hex")]
    InvalidHex,
}

/// Failure reported by a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("account {0} not found")]
    AccountNotFound(Address),
    #[error("account {address} has insufficient balance {balance} for delta {delta}")]
    InsufficientBalance {
        address: Address,
        balance: i64,
        delta: i64,
    },
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// The contract is inadmissible against the current ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("contract type error, expected type [{expected}]: {reason}")]
    Decode {
        expected: ContractType,
        reason: String,
    },
    #[error("unsupported contract type {0}")]
    UnsupportedContractType(i32),
    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: AddressError,
    },
    #[error("owner and recipient must be different accounts")]
    SameAccount,
    #[error("{role} account {address} does not exist")]
    AccountNotFound {
        role: &'static str,
        address: Address,
    },
    #[error("witness {0} does not exist")]
    WitnessNotFound(Address),
    #[error("witness {0} already exists")]
    WitnessExists(Address),
    #[error("asset {0:?} does not exist")]
    AssetNotFound(String),
    #[error("asset {0:?} already exists")]
    AssetExists(String),
    #[error("{field} must be greater than 0")]
    NonPositive { field: &'static str },
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },
    #[error("insufficient asset {asset:?}: required {required}, available {available}")]
    InsufficientAsset {
        asset: String,
        required: i64,
        available: i64,
    },
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error("{0}")]
    Rejected(String),
}

impl ValidationError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        ValidationError::Rejected(reason.into())
    }
}

/// An admissible contract failed while applying its writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid address in validated contract: {0}")]
    Address(#[from] AddressError),
    #[error("{role} account {address} disappeared before execution")]
    MissingAccount {
        role: &'static str,
        address: Address,
    },
    #[error("asset {asset:?} balance of {address} cannot be reduced by {amount}")]
    AssetReduction {
        address: Address,
        asset: String,
        amount: i64,
    },
    #[error("inconsistent ledger state: {0}")]
    Inconsistent(String),
}

/// Outcome of running one contract through the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("execution failed: {source}")]
    Execution {
        result: ContractResult,
        #[source]
        source: ExecutionError,
    },
    #[error("commit failed: {0}")]
    Commit(#[source] StoreError),
}

impl ContractError {
    /// The result record to report upstream, if the contract got far
    /// enough to produce one.
    pub fn result(&self) -> Option<&ContractResult> {
        match self {
            ContractError::Execution { result, .. } => Some(result),
            _ => None,
        }
    }
}
