/// Ledger Engine: In-Memory Ledger
///
/// A complete ledger snapshot held in sorted maps. Serves as the genesis
/// format, the replay target, and the reference `LedgerStoreMut`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountType, Address, AssetIssue, ChainParameters, Witness};
use crate::error::StoreError;
use crate::store::{LedgerStore, LedgerStoreMut, WriteBatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryLedger {
    pub blackhole: Address,
    #[serde(default)]
    pub parameters: ChainParameters,
    #[serde(default)]
    pub accounts: BTreeMap<Address, Account>,
    #[serde(default)]
    pub assets: BTreeMap<String, AssetIssue>,
    #[serde(default)]
    pub witnesses: BTreeMap<Address, Witness>,
}

impl MemoryLedger {
    /// Create an empty ledger with default parameters and a zero-balance
    /// sink account.
    pub fn new(blackhole: Address) -> Self {
        Self::with_parameters(blackhole, ChainParameters::default())
    }

    pub fn with_parameters(blackhole: Address, parameters: ChainParameters) -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert(blackhole, Account::new(blackhole, AccountType::Normal, 0));
        Self {
            blackhole,
            parameters,
            accounts,
            assets: BTreeMap::new(),
            witnesses: BTreeMap::new(),
        }
    }

    /// Seed an account directly, bypassing actuators. Genesis and tests only.
    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.address, account);
    }

    pub fn insert_asset(&mut self, asset: AssetIssue) {
        self.assets.insert(asset.name.clone(), asset);
    }

    pub fn insert_witness(&mut self, witness: Witness) {
        self.witnesses.insert(witness.address, witness);
    }

    pub fn balance_of(&self, address: &Address) -> Option<i64> {
        self.accounts.get(address).map(|a| a.balance)
    }

    /// Sum of every spendable balance, locked stake and allowance.
    /// Native units are only ever moved, so this is constant across
    /// contracts.
    pub fn total_native(&self) -> Option<i64> {
        self.accounts.values().try_fold(0i64, |acc, a| {
            let frozen = a.frozen_balance().ok()?;
            acc.checked_add(a.balance)?
                .checked_add(frozen)?
                .checked_add(a.allowance)
        })
    }
}

impl LedgerStore for MemoryLedger {
    fn get_account(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn has_account(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn get_asset(&self, name: &str) -> Option<AssetIssue> {
        self.assets.get(name).cloned()
    }

    fn has_asset(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    fn get_witness(&self, address: &Address) -> Option<Witness> {
        self.witnesses.get(address).cloned()
    }

    fn has_witness(&self, address: &Address) -> bool {
        self.witnesses.contains_key(address)
    }

    fn parameters(&self) -> &ChainParameters {
        &self.parameters
    }

    fn blackhole(&self) -> Address {
        self.blackhole
    }
}

impl LedgerStoreMut for MemoryLedger {
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        // BTreeMap inserts cannot fail, so applying in sequence is atomic.
        self.accounts.extend(batch.accounts);
        self.assets.extend(batch.assets);
        self.witnesses.extend(batch.witnesses);
        Ok(())
    }
}
