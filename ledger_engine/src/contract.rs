/// Ledger Engine: Contract Definitions
///
/// Contracts are pure data. They carry intent and payload only.
/// They contain ZERO execution logic.
///
/// Address and name fields hold raw wire bytes; well-formedness is a
/// validation concern of the actuator that consumes them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Contract kind tags. Numbering follows the wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractType {
    Transfer = 1,
    TransferAsset = 2,
    VoteWitness = 4,
    WitnessCreate = 5,
    AssetIssue = 6,
    WitnessUpdate = 8,
    ParticipateAssetIssue = 9,
    AccountUpdate = 10,
    FreezeBalance = 11,
    UnfreezeBalance = 12,
    WithdrawBalance = 13,
}

impl ContractType {
    pub const ALL: [ContractType; 11] = [
        ContractType::Transfer,
        ContractType::TransferAsset,
        ContractType::VoteWitness,
        ContractType::WitnessCreate,
        ContractType::AssetIssue,
        ContractType::WitnessUpdate,
        ContractType::ParticipateAssetIssue,
        ContractType::AccountUpdate,
        ContractType::FreezeBalance,
        ContractType::UnfreezeBalance,
        ContractType::WithdrawBalance,
    ];

    /// Resolve a wire tag. `None` for kinds this engine has no actuator for.
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as i32 == tag)
    }

    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Protobuf message name of the payload.
    pub fn message_name(self) -> &'static str {
        match self {
            ContractType::Transfer => "TransferContract",
            ContractType::TransferAsset => "TransferAssetContract",
            ContractType::VoteWitness => "VoteWitnessContract",
            ContractType::WitnessCreate => "WitnessCreateContract",
            ContractType::AssetIssue => "AssetIssueContract",
            ContractType::WitnessUpdate => "WitnessUpdateContract",
            ContractType::ParticipateAssetIssue => "ParticipateAssetIssueContract",
            ContractType::AccountUpdate => "AccountUpdateContract",
            ContractType::FreezeBalance => "FreezeBalanceContract",
            ContractType::UnfreezeBalance => "UnfreezeBalanceContract",
            ContractType::WithdrawBalance => "WithdrawBalanceContract",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_name())
    }
}

// ── Payloads ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    #[serde(with = "hex")]
    pub to_address: Vec<u8>,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAssetContract {
    #[serde(with = "hex")]
    pub asset_name: Vec<u8>,
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    #[serde(with = "hex")]
    pub to_address: Vec<u8>,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIssueContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    #[serde(with = "hex")]
    pub name: Vec<u8>,
    pub total_supply: i64,
    pub trx_num: i32,
    pub num: i32,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default, with = "hex")]
    pub description: Vec<u8>,
    #[serde(default, with = "hex")]
    pub url: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipateAssetIssueContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    #[serde(with = "hex")]
    pub to_address: Vec<u8>,
    #[serde(with = "hex")]
    pub asset_name: Vec<u8>,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeBalanceContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    pub frozen_balance: i64,
    /// Lock duration in days.
    pub frozen_duration: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfreezeBalanceContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessCreateContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    #[serde(with = "hex")]
    pub url: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessUpdateContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    #[serde(with = "hex")]
    pub update_url: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateContract {
    #[serde(with = "hex")]
    pub account_name: Vec<u8>,
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(with = "hex")]
    pub vote_address: Vec<u8>,
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteWitnessContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawBalanceContract {
    #[serde(with = "hex")]
    pub owner_address: Vec<u8>,
}

// ── Contract ──────────────────────────────────────────────────────

/// One decoded ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameter")]
pub enum Contract {
    Transfer(TransferContract),
    TransferAsset(TransferAssetContract),
    AssetIssue(AssetIssueContract),
    ParticipateAssetIssue(ParticipateAssetIssueContract),
    FreezeBalance(FreezeBalanceContract),
    UnfreezeBalance(UnfreezeBalanceContract),
    WitnessCreate(WitnessCreateContract),
    WitnessUpdate(WitnessUpdateContract),
    AccountUpdate(AccountUpdateContract),
    VoteWitness(VoteWitnessContract),
    WithdrawBalance(WithdrawBalanceContract),
}

impl Contract {
    pub fn contract_type(&self) -> ContractType {
        match self {
            Contract::Transfer(_) => ContractType::Transfer,
            Contract::TransferAsset(_) => ContractType::TransferAsset,
            Contract::AssetIssue(_) => ContractType::AssetIssue,
            Contract::ParticipateAssetIssue(_) => ContractType::ParticipateAssetIssue,
            Contract::FreezeBalance(_) => ContractType::FreezeBalance,
            Contract::UnfreezeBalance(_) => ContractType::UnfreezeBalance,
            Contract::WitnessCreate(_) => ContractType::WitnessCreate,
            Contract::WitnessUpdate(_) => ContractType::WitnessUpdate,
            Contract::AccountUpdate(_) => ContractType::AccountUpdate,
            Contract::VoteWitness(_) => ContractType::VoteWitness,
            Contract::WithdrawBalance(_) => ContractType::WithdrawBalance,
        }
    }

    /// Raw owner address bytes as carried on the wire.
    pub fn owner_address(&self) -> &[u8] {
        match self {
            Contract::Transfer(c) => &c.owner_address,
            Contract::TransferAsset(c) => &c.owner_address,
            Contract::AssetIssue(c) => &c.owner_address,
            Contract::ParticipateAssetIssue(c) => &c.owner_address,
            Contract::FreezeBalance(c) => &c.owner_address,
            Contract::UnfreezeBalance(c) => &c.owner_address,
            Contract::WitnessCreate(c) => &c.owner_address,
            Contract::WitnessUpdate(c) => &c.owner_address,
            Contract::AccountUpdate(c) => &c.owner_address,
            Contract::VoteWitness(c) => &c.owner_address,
            Contract::WithdrawBalance(c) => &c.owner_address,
        }
    }
}
