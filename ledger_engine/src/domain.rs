/// Ledger Engine: Core Domain Types
///
/// Accounts, asset registry entries, witness registry entries, network
/// parameters and the per-contract result record.
/// All amounts: i64 in the smallest ledger unit.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::arithmetic::{checked_add, checked_sub, checked_sum};
use crate::error::{AddressError, ArithmeticError};

// ── Address ───────────────────────────────────────────────────────

/// Length of an account address in bytes (prefix byte + 20-byte hash).
pub const ADDRESS_SIZE: usize = 21;

/// Network prefix carried by every well-formed address.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// A well-formed 21-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Parse raw wire bytes, checking length and network prefix.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_SIZE {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0] != ADDRESS_PREFIX {
            return Err(AddressError::InvalidPrefix {
                expected: ADDRESS_PREFIX,
                actual: bytes[0],
            });
        }
        let mut raw = [0u8; ADDRESS_SIZE];
        raw.copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// Build an address from a 20-byte body, adding the network prefix.
    pub fn from_body(body: [u8; ADDRESS_SIZE - 1]) -> Self {
        let mut raw = [0u8; ADDRESS_SIZE];
        raw[0] = ADDRESS_PREFIX;
        raw[1..].copy_from_slice(&body);
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| AddressError::InvalidHex)?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Account ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    Normal,
    AssetIssue,
    Contract,
}

/// A stake lock: `frozen_balance` is immobilized until `expire_time` (ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frozen {
    pub frozen_balance: i64,
    pub expire_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    pub address: Address,
    #[serde(default, with = "hex")]
    pub account_name: Vec<u8>,
    #[serde(default)]
    pub account_type: AccountType,
    pub balance: i64,
    /// Zero or one active lock. Re-freezing merges into slot 0.
    #[serde(default)]
    pub frozen: Vec<Frozen>,
    #[serde(default)]
    pub bandwidth: i64,
    /// Accrued witness reward, withdrawable after the cooldown.
    #[serde(default)]
    pub allowance: i64,
    #[serde(default)]
    pub latest_withdraw_time: i64,
    /// Asset name -> held token amount.
    #[serde(default)]
    pub asset: BTreeMap<String, i64>,
    /// Witness address -> delegated vote count. Replaced wholesale per vote.
    #[serde(default)]
    pub votes: BTreeMap<Address, i64>,
    #[serde(default)]
    pub is_witness: bool,
    #[serde(default)]
    pub create_time: i64,
}

impl Account {
    pub fn new(address: Address, account_type: AccountType, create_time: i64) -> Self {
        Self {
            address,
            account_name: Vec::new(),
            account_type,
            balance: 0,
            frozen: Vec::new(),
            bandwidth: 0,
            allowance: 0,
            latest_withdraw_time: 0,
            asset: BTreeMap::new(),
            votes: BTreeMap::new(),
            is_witness: false,
            create_time,
        }
    }

    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    /// Total locked across every frozen slot.
    pub fn frozen_balance(&self) -> Result<i64, ArithmeticError> {
        checked_sum(self.frozen.iter().map(|f| f.frozen_balance))
    }

    /// Voting power ("share"): spendable balance plus locked stake.
    pub fn voting_power(&self) -> Result<i64, ArithmeticError> {
        checked_add(self.balance, self.frozen_balance()?)
    }

    /// Held amount of `asset`, zero when absent.
    pub fn asset_balance(&self, asset: &str) -> i64 {
        self.asset.get(asset).copied().unwrap_or(0)
    }

    /// Credit `amount` tokens of `asset`, creating the entry if absent.
    pub fn add_asset_amount(&mut self, asset: &str, amount: i64) -> Result<(), ArithmeticError> {
        let current = self.asset_balance(asset);
        let updated = checked_add(current, amount)?;
        self.asset.insert(asset.to_string(), updated);
        Ok(())
    }

    /// Debit `amount` tokens of `asset`. Returns `Ok(false)` without
    /// touching the map when the holding cannot cover it.
    pub fn reduce_asset_amount(&mut self, asset: &str, amount: i64) -> Result<bool, ArithmeticError> {
        let current = match self.asset.get(asset) {
            Some(v) => *v,
            None => return Ok(false),
        };
        if amount <= 0 || current < amount {
            return Ok(false);
        }
        self.asset.insert(asset.to_string(), checked_sub(current, amount)?);
        Ok(true)
    }
}

// ── Registries ────────────────────────────────────────────────────

/// One issued asset. `trx_num` native units buy `num` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetIssue {
    pub name: String,
    pub owner_address: Address,
    pub total_supply: i64,
    pub trx_num: i32,
    pub num: i32,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl AssetIssue {
    /// Whether `now` lies within `[start_time, end_time)`.
    pub fn is_open_at(&self, now: i64) -> bool {
        now >= self.start_time && now < self.end_time
    }
}

/// A registered block-producer candidate. `vote_count` is maintained by
/// the external tally, never by an actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Witness {
    pub address: Address,
    pub url: String,
    #[serde(default)]
    pub vote_count: i64,
}

// ── Network Parameters ────────────────────────────────────────────

/// Tunable network parameters, stored with the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainParameters {
    /// Minimum stake unit for a freeze.
    pub min_frozen_balance: i64,
    /// Freeze duration bounds, in days.
    pub min_frozen_time: i64,
    pub max_frozen_time: i64,
    pub max_vote_number: usize,
    /// Withdraw cooldown, in days.
    pub witness_allowance_frozen_time: i64,
    pub account_upgrade_cost: i64,
    pub bandwidth_per_coinday: i64,
    /// Minimum amount for a transfer that creates the recipient.
    pub non_existent_account_transfer_min: i64,
    /// Native units per vote.
    pub vote_unit: i64,
}

impl Default for ChainParameters {
    fn default() -> Self {
        Self {
            min_frozen_balance: 1_000_000,
            min_frozen_time: 3,
            max_frozen_time: 3,
            max_vote_number: 30,
            witness_allowance_frozen_time: 1,
            account_upgrade_cost: 9_999_000_000,
            bandwidth_per_coinday: 1,
            non_existent_account_transfer_min: 1_000_000,
            vote_unit: 1_000_000,
        }
    }
}

// ── Result Record ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContractStatus {
    /// Not yet executed.
    #[default]
    Pending,
    Success,
    Failed,
}

/// Fee charged and final status of one contract execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractResult {
    pub fee: i64,
    pub status: ContractStatus,
}

impl ContractResult {
    pub fn set_status(&mut self, fee: i64, status: ContractStatus) {
        self.fee = fee;
        self.status = status;
    }

    pub fn is_success(&self) -> bool {
        self.status == ContractStatus::Success
    }
}
