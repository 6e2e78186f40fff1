//! Storage collaborator contracts.
//!
//! Actuators read through [`LedgerStore`] and write through
//! [`LedgerWriter`]. Writes never reach the backing store directly: the
//! engine hands every `execute()` a [`Staged`] overlay and commits its
//! [`WriteBatch`] in one call to [`LedgerStoreMut::commit`], so a failure
//! part-way through an execution leaves the ledger untouched.

use std::collections::BTreeMap;

use crate::arithmetic::checked_add;
use crate::domain::{Account, Address, AssetIssue, ChainParameters, Witness};
use crate::error::StoreError;

/// Read access to accounts, registries and network parameters.
pub trait LedgerStore {
    fn get_account(&self, address: &Address) -> Option<Account>;

    fn has_account(&self, address: &Address) -> bool {
        self.get_account(address).is_some()
    }

    fn get_asset(&self, name: &str) -> Option<AssetIssue>;

    fn has_asset(&self, name: &str) -> bool {
        self.get_asset(name).is_some()
    }

    fn get_witness(&self, address: &Address) -> Option<Witness>;

    fn has_witness(&self, address: &Address) -> bool {
        self.get_witness(address).is_some()
    }

    fn parameters(&self) -> &ChainParameters;

    /// Sink account that absorbs collected fees.
    fn blackhole(&self) -> Address;
}

/// Write access used by actuators during `execute()`.
pub trait LedgerWriter: LedgerStore {
    fn put_account(&mut self, account: Account);

    fn put_asset(&mut self, asset: AssetIssue);

    fn put_witness(&mut self, witness: Witness);

    /// Add `delta` to the balance of an existing account.
    /// Fails rather than let the balance go negative or overflow.
    fn adjust_balance(&mut self, address: &Address, delta: i64) -> Result<(), StoreError> {
        let mut account = self
            .get_account(address)
            .ok_or(StoreError::AccountNotFound(*address))?;
        let balance = checked_add(account.balance, delta)?;
        if balance < 0 {
            return Err(StoreError::InsufficientBalance {
                address: *address,
                balance: account.balance,
                delta,
            });
        }
        account.balance = balance;
        self.put_account(account);
        Ok(())
    }
}

/// A backing store that accepts whole batches atomically.
pub trait LedgerStoreMut: LedgerStore {
    /// Apply every write in `batch`, or none of them.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Buffered writes of one execution, keyed so later puts replace earlier
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    pub accounts: BTreeMap<Address, Account>,
    pub assets: BTreeMap<String, AssetIssue>,
    pub witnesses: BTreeMap<Address, Witness>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.assets.is_empty() && self.witnesses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len() + self.assets.len() + self.witnesses.len()
    }
}

/// Read-through overlay that buffers writes over a base store.
pub struct Staged<'a> {
    base: &'a dyn LedgerStore,
    batch: WriteBatch,
}

impl<'a> Staged<'a> {
    pub fn new(base: &'a dyn LedgerStore) -> Self {
        Self {
            base,
            batch: WriteBatch::default(),
        }
    }

    /// Give up the overlay and hand back the buffered writes.
    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }
}

impl LedgerStore for Staged<'_> {
    fn get_account(&self, address: &Address) -> Option<Account> {
        match self.batch.accounts.get(address) {
            Some(a) => Some(a.clone()),
            None => self.base.get_account(address),
        }
    }

    fn get_asset(&self, name: &str) -> Option<AssetIssue> {
        match self.batch.assets.get(name) {
            Some(a) => Some(a.clone()),
            None => self.base.get_asset(name),
        }
    }

    fn get_witness(&self, address: &Address) -> Option<Witness> {
        match self.batch.witnesses.get(address) {
            Some(w) => Some(w.clone()),
            None => self.base.get_witness(address),
        }
    }

    fn parameters(&self) -> &ChainParameters {
        self.base.parameters()
    }

    fn blackhole(&self) -> Address {
        self.base.blackhole()
    }
}

impl LedgerWriter for Staged<'_> {
    fn put_account(&mut self, account: Account) {
        self.batch.accounts.insert(account.address, account);
    }

    fn put_asset(&mut self, asset: AssetIssue) {
        self.batch.assets.insert(asset.name.clone(), asset);
    }

    fn put_witness(&mut self, witness: Witness) {
        self.batch.witnesses.insert(witness.address, witness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountType;
    use crate::state::MemoryLedger;

    fn addr(n: u8) -> Address {
        Address::from_body([n; 20])
    }

    #[test]
    fn staged_reads_through_and_shadows() {
        let mut ledger = MemoryLedger::new(addr(0));
        ledger.insert_account(Account::new(addr(1), AccountType::Normal, 0).with_balance(10));

        let mut staged = Staged::new(&ledger);
        assert_eq!(staged.get_account(&addr(1)).map(|a| a.balance), Some(10));
        staged.adjust_balance(&addr(1), -4).unwrap();
        assert_eq!(staged.get_account(&addr(1)).map(|a| a.balance), Some(6));

        // base untouched until commit
        assert_eq!(ledger.get_account(&addr(1)).map(|a| a.balance), Some(10));
        let batch = staged.into_batch();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn adjust_balance_refuses_negative() {
        let mut ledger = MemoryLedger::new(addr(0));
        ledger.insert_account(Account::new(addr(1), AccountType::Normal, 0).with_balance(3));
        let mut staged = Staged::new(&ledger);
        assert!(matches!(
            staged.adjust_balance(&addr(1), -4),
            Err(StoreError::InsufficientBalance { balance: 3, delta: -4, .. })
        ));
        assert!(matches!(
            staged.adjust_balance(&addr(2), 1),
            Err(StoreError::AccountNotFound(_))
        ));
        assert!(staged.into_batch().is_empty());
    }

    #[test]
    fn adjust_balance_is_overflow_checked() {
        let mut ledger = MemoryLedger::new(addr(0));
        ledger.insert_account(
            Account::new(addr(1), AccountType::Normal, 0).with_balance(i64::MAX),
        );
        let mut staged = Staged::new(&ledger);
        assert!(matches!(
            staged.adjust_balance(&addr(1), 1),
            Err(StoreError::Arithmetic(_))
        ));
    }
}
