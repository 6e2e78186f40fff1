//! Genesis Codec: deterministic ledger encoder/decoder.
//!
//! - `encode_genesis`:  MemoryLedger → JSON string
//! - `decode_genesis`:  JSON string → MemoryLedger (unknown fields rejected)
//! - `restore_genesis`: decode + invariant validation
//! - `export_genesis_to_file` / `import_genesis_from_file`: file I/O
//! - `genesis_hash`:    canonical state hash of the decoded ledger

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use ledger_engine::hashing::state_hash;
use ledger_engine::invariants::check_invariants;
use ledger_engine::MemoryLedger;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("genesis violates ledger invariants: {0}")]
    InvariantViolation(String),
    #[error("genesis file I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub fn encode_genesis(ledger: &MemoryLedger) -> Result<String, GenesisError> {
    serde_json::to_string_pretty(ledger).map_err(GenesisError::Serialization)
}

/// Decode without checking invariants. Use `restore_genesis` for
/// untrusted input.
pub fn decode_genesis(json: &str) -> Result<MemoryLedger, GenesisError> {
    serde_json::from_str(json).map_err(GenesisError::Deserialization)
}

pub fn restore_genesis(json: &str) -> Result<MemoryLedger, GenesisError> {
    let ledger = decode_genesis(json)?;
    check_invariants(&ledger).map_err(GenesisError::InvariantViolation)?;
    Ok(ledger)
}

/// Write the ledger as JSON, creating parent directories as needed.
pub fn export_genesis_to_file(ledger: &MemoryLedger, path: &Path) -> Result<(), GenesisError> {
    let json = encode_genesis(ledger)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_genesis_from_file(path: &Path) -> Result<MemoryLedger, GenesisError> {
    let content = fs::read_to_string(path)?;
    restore_genesis(&content)
}

/// State hash of a validated genesis document.
pub fn genesis_hash(json: &str) -> Result<String, GenesisError> {
    restore_genesis(json).map(|ledger| state_hash(&ledger))
}
