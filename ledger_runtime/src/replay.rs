//! Replay orchestrator: rebuild a ledger from genesis plus an ordered
//! list of encoded transactions.
//!
//! Each transaction runs at its own `raw_data.timestamp`, so the result
//! depends only on the inputs. Transactions the processor refuses are
//! skipped, exactly as they were when first submitted.

use std::sync::Arc;

use prost::Message;
use tracing::debug;

use ledger_engine::hashing::state_hash;
use ledger_engine::{Engine, EngineConfig, ManualClock, MemoryLedger};

use crate::duplicate_filter::{DuplicateFilter, DuplicateFilterConfig, FilterConfigError};
use crate::processor::TransactionProcessor;
use crate::proto_types::ProtoTransaction;

/// Rebuild the ledger and return `(final_ledger, state_hash)`.
///
/// Fails only when the batch is too large for one duplicate-filter
/// generation.
pub fn rebuild_state(
    genesis: &MemoryLedger,
    config: &EngineConfig,
    transactions: &[Vec<u8>],
) -> Result<(MemoryLedger, String), FilterConfigError> {
    let clock = Arc::new(ManualClock::new(0));
    let engine = Engine::new(config.clone(), clock.clone());
    // One generation that holds the whole batch.
    let filter = DuplicateFilter::new(DuplicateFilterConfig {
        tps: (transactions.len() as u64).max(1),
        cycle_secs: 1,
        false_positive_rate: 1e-6,
    })?;
    let mut processor = TransactionProcessor::new(engine, genesis.clone(), filter);

    for (index, bytes) in transactions.iter().enumerate() {
        let tx = match ProtoTransaction::decode(bytes.as_slice()) {
            Ok(tx) => tx,
            Err(e) => {
                debug!(index, error = %e, "undecodable transaction skipped");
                continue;
            }
        };
        if let Some(raw) = &tx.raw_data {
            clock.set(raw.timestamp);
        }
        if let Err(e) = processor.process_transaction(&tx) {
            debug!(index, error = %e, "transaction refused during replay");
        }
    }

    let ledger = processor.into_ledger();
    let hash = state_hash(&ledger);
    Ok((ledger, hash))
}

/// Rebuild and return only the state hash.
pub fn rebuild_hash(
    genesis: &MemoryLedger,
    config: &EngineConfig,
    transactions: &[Vec<u8>],
) -> Result<String, FilterConfigError> {
    rebuild_state(genesis, config, transactions).map(|(_, hash)| hash)
}
