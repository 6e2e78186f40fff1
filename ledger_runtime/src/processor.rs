//! Transaction processor: wire bytes in, committed ledger changes out.
//!
//! Per transaction:
//!   1. Decode the envelope (prost)
//!   2. Require exactly one contract and compute the transaction id
//!   3. Reject ids the duplicate filter has already seen
//!   4. Convert the contract (decode failure is a validation failure)
//!   5. Run it through the engine (validate, execute, commit)
//!   6. Record the id once the contract was admitted
//!
//! `SharedProcessor` serializes callers behind one mutex.

use parking_lot::Mutex;
use prost::Message;
use thiserror::Error;
use tracing::{debug, info};

use ledger_engine::hashing::state_hash;
use ledger_engine::{ContractError, ContractResult, Engine, MemoryLedger, ValidationError};

use crate::duplicate_filter::DuplicateFilter;
use crate::proto_bridge::{proto_to_contract, transaction_id};
use crate::proto_types::ProtoTransaction;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("malformed transaction: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("transaction has no raw_data")]
    MissingRawData,
    #[error("transaction carries {0} contracts, expected exactly one")]
    ContractCount(usize),
    #[error("duplicate transaction {0}")]
    Duplicate(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ProcessError {
    /// The FAILED result of an admitted contract, if any.
    pub fn result(&self) -> Option<&ContractResult> {
        match self {
            ProcessError::Contract(e) => e.result(),
            _ => None,
        }
    }
}

/// A successfully applied transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Lowercase hex transaction id.
    pub id: String,
    pub result: ContractResult,
}

pub struct TransactionProcessor {
    engine: Engine,
    ledger: MemoryLedger,
    filter: DuplicateFilter,
}

impl TransactionProcessor {
    pub fn new(engine: Engine, ledger: MemoryLedger, filter: DuplicateFilter) -> Self {
        Self {
            engine,
            ledger,
            filter,
        }
    }

    /// Decode and apply one encoded transaction.
    pub fn process(&mut self, bytes: &[u8]) -> Result<TransactionReceipt, ProcessError> {
        let tx = ProtoTransaction::decode(bytes)?;
        self.process_transaction(&tx)
    }

    pub fn process_transaction(
        &mut self,
        tx: &ProtoTransaction,
    ) -> Result<TransactionReceipt, ProcessError> {
        let raw = tx.raw_data.as_ref().ok_or(ProcessError::MissingRawData)?;
        let proto = match raw.contract.as_slice() {
            [single] => single,
            other => return Err(ProcessError::ContractCount(other.len())),
        };

        let id = transaction_id(raw);
        let id_hex = hex::encode(id);
        if self.filter.might_contain(&id) {
            info!(tx = %id_hex, "duplicate transaction rejected");
            return Err(ProcessError::Duplicate(id_hex));
        }

        let contract = proto_to_contract(proto)?;
        match self.engine.apply(&mut self.ledger, contract) {
            Ok(result) => {
                self.filter.put(&id);
                debug!(tx = %id_hex, fee = result.fee, "transaction applied");
                Ok(TransactionReceipt { id: id_hex, result })
            }
            Err(e @ ContractError::Execution { .. }) => {
                self.filter.put(&id);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Start a new duplicate-filter generation. Call once per cycle.
    pub fn rotate_filter(&self) {
        self.filter.rotate();
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn state_hash(&self) -> String {
        state_hash(&self.ledger)
    }

    pub fn into_ledger(self) -> MemoryLedger {
        self.ledger
    }
}

/// Thread-safe processor handle.
pub struct SharedProcessor {
    inner: Mutex<TransactionProcessor>,
}

impl SharedProcessor {
    pub fn new(processor: TransactionProcessor) -> Self {
        Self {
            inner: Mutex::new(processor),
        }
    }

    pub fn process(&self, bytes: &[u8]) -> Result<TransactionReceipt, ProcessError> {
        self.inner.lock().process(bytes)
    }

    pub fn rotate_filter(&self) {
        self.inner.lock().rotate_filter();
    }

    pub fn state_hash(&self) -> String {
        self.inner.lock().state_hash()
    }

    /// Copy of the current ledger.
    pub fn snapshot(&self) -> MemoryLedger {
        self.inner.lock().ledger().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ledger_engine::contract::{TransferContract, WithdrawBalanceContract};
    use ledger_engine::{Account, Address, Contract, EngineConfig, ManualClock};

    use crate::duplicate_filter::DuplicateFilterConfig;
    use crate::proto_bridge::{build_transaction, contract_to_proto};
    use crate::proto_types::ProtoRawData;

    fn addr(n: u8) -> Address {
        Address::from_body([n; 20])
    }

    fn processor() -> TransactionProcessor {
        let mut ledger = MemoryLedger::new(addr(0xbb));
        ledger.insert_account(Account::new(addr(1), Default::default(), 0).with_balance(10_000_000));
        let engine = Engine::new(EngineConfig::default(), Arc::new(ManualClock::new(1_000)));
        let filter = DuplicateFilter::new(DuplicateFilterConfig {
            tps: 10,
            cycle_secs: 10,
            false_positive_rate: 0.001,
        })
        .unwrap();
        TransactionProcessor::new(engine, ledger, filter)
    }

    fn transfer(amount: i64) -> Contract {
        Contract::Transfer(TransferContract {
            owner_address: addr(1).to_vec(),
            to_address: addr(2).to_vec(),
            amount,
        })
    }

    #[test]
    fn applies_and_then_rejects_the_same_bytes() {
        let mut p = processor();
        let bytes = build_transaction(&transfer(2_000_000), 1, 2).encode_to_vec();

        let receipt = p.process(&bytes).unwrap();
        assert!(receipt.result.is_success());
        assert_eq!(receipt.id.len(), 64);
        assert_eq!(p.ledger().balance_of(&addr(2)), Some(2_000_000));

        assert!(matches!(p.process(&bytes), Err(ProcessError::Duplicate(id)) if id == receipt.id));
        assert_eq!(p.ledger().balance_of(&addr(2)), Some(2_000_000));
    }

    #[test]
    fn rejected_contract_is_not_recorded() {
        let mut p = processor();
        let bytes = build_transaction(&transfer(20_000_000), 1, 2).encode_to_vec();
        let before = p.state_hash();

        for _ in 0..2 {
            assert!(matches!(
                p.process(&bytes),
                Err(ProcessError::Contract(ContractError::Validation(_)))
            ));
        }
        assert_eq!(p.state_hash(), before);
    }

    #[test]
    fn contract_count_must_be_one() {
        let mut p = processor();
        let mut tx = build_transaction(&transfer(1_000_000), 1, 2);
        tx.raw_data.as_mut().unwrap().contract.clear();
        assert!(matches!(p.process_transaction(&tx), Err(ProcessError::ContractCount(0))));

        let c = contract_to_proto(&transfer(1_000_000));
        let tx = ProtoTransaction {
            raw_data: Some(ProtoRawData {
                expiration: 2,
                contract: vec![c.clone(), c],
                timestamp: 1,
            }),
            signature: Vec::new(),
        };
        assert!(matches!(p.process_transaction(&tx), Err(ProcessError::ContractCount(2))));

        let empty = ProtoTransaction::default();
        assert!(matches!(p.process_transaction(&empty), Err(ProcessError::MissingRawData)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let mut p = processor();
        assert!(matches!(p.process(&[0xff, 0xff, 0xff]), Err(ProcessError::Decode(_))));
    }

    #[test]
    fn unsupported_type_surfaces_as_validation_error() {
        let mut p = processor();
        let mut tx = build_transaction(
            &Contract::WithdrawBalance(WithdrawBalanceContract { owner_address: addr(1).to_vec() }),
            1,
            2,
        );
        tx.raw_data.as_mut().unwrap().contract[0].r#type = 31;
        assert!(matches!(
            p.process_transaction(&tx),
            Err(ProcessError::Validation(ValidationError::UnsupportedContractType(31)))
        ));
    }

    #[test]
    fn shared_processor_serializes_threads() {
        let shared = Arc::new(SharedProcessor::new(processor()));
        let handles: Vec<_> = (0..4i64)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let bytes = build_transaction(&transfer(1_000_000), i, 100).encode_to_vec();
                    shared.process(&bytes).is_ok()
                })
            })
            .collect();
        let applied = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
        assert_eq!(applied, 4);
        assert_eq!(shared.snapshot().balance_of(&addr(2)), Some(4_000_000));
    }
}
