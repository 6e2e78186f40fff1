#![forbid(unsafe_code)]

/// Engine v1. Bumped when canonical hashing or contract semantics change.
pub const ENGINE_VERSION: u32 = 1;

pub mod arithmetic;
pub mod error;
pub mod domain;
pub mod contract;
pub mod config;
pub mod clock;
pub mod store;
pub mod state;
pub mod actuator;
pub mod dispatcher;
pub mod invariants;
pub mod hashing;
pub mod engine;
pub mod scenario;

pub use actuator::{Actuator, ActuatorContext};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, FailedFeePolicy, FeeSchedule, UpdateAccountPolicy};
pub use contract::{Contract, ContractType};
pub use domain::{Account, Address, AssetIssue, ChainParameters, ContractResult, ContractStatus, Witness};
pub use engine::Engine;
pub use error::{ContractError, ExecutionError, ValidationError};
pub use state::MemoryLedger;
pub use store::{LedgerStore, LedgerStoreMut, LedgerWriter, Staged, WriteBatch};
