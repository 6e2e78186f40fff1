#![forbid(unsafe_code)]

//! Ledger runtime: wire layer around `ledger_engine`.
//!
//! Decodes protobuf transactions, filters duplicates, and drives each
//! contract through the engine. Genesis loading, TOML configuration and
//! transaction replay live here too.
//!
//! No contract semantics live here; validation and execution are
//! delegated to the engine.

pub mod proto_types;
pub mod proto_bridge;
pub mod duplicate_filter;
pub mod processor;
pub mod genesis;
pub mod config;
pub mod replay;

pub use config::{ConfigError, RuntimeConfig};
pub use duplicate_filter::{BloomFilter, DuplicateFilter, DuplicateFilterConfig, FilterConfigError};
pub use genesis::GenesisError;
pub use processor::{ProcessError, SharedProcessor, TransactionProcessor, TransactionReceipt};
