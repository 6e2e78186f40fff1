//! Hand-written protobuf types for the transaction envelope and the
//! eleven contract payloads.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Field numbers follow the Tron `Tron.proto` / `Contract.proto` schema;
//! fields this engine does not consume are left out and skipped on decode.

use prost::Message;

/// `type_url` prefix of every packed contract parameter.
pub const TYPE_URL_PREFIX: &str = "type.googleapis.com/protocol.";

// ── Envelope ───────────────────────────────────────────────────

/// `google.protobuf.Any`.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoAny {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoContract {
    /// Contract type tag (`Transaction.Contract.ContractType`).
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub parameter: Option<ProtoAny>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoRawData {
    #[prost(int64, tag = "8")]
    pub expiration: i64,
    #[prost(message, repeated, tag = "11")]
    pub contract: Vec<ProtoContract>,
    #[prost(int64, tag = "14")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoTransaction {
    #[prost(message, optional, tag = "1")]
    pub raw_data: Option<ProtoRawData>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signature: Vec<Vec<u8>>,
}

// ── Balance contracts ──────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoTransferContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoFreezeBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub frozen_balance: i64,
    #[prost(int64, tag = "3")]
    pub frozen_duration: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoUnfreezeBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoWithdrawBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoAccountUpdateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub account_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
}

// ── Asset contracts ────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoTransferAssetContract {
    #[prost(bytes = "vec", tag = "1")]
    pub asset_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoAssetIssueContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub name: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub total_supply: i64,
    #[prost(int32, tag = "6")]
    pub trx_num: i32,
    #[prost(int32, tag = "8")]
    pub num: i32,
    #[prost(int64, tag = "9")]
    pub start_time: i64,
    #[prost(int64, tag = "10")]
    pub end_time: i64,
    #[prost(bytes = "vec", tag = "20")]
    pub description: Vec<u8>,
    #[prost(bytes = "vec", tag = "21")]
    pub url: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoParticipateAssetIssueContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub asset_name: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

// ── Witness contracts ──────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoWitnessCreateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub url: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoWitnessUpdateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "12")]
    pub update_url: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoVote {
    #[prost(bytes = "vec", tag = "1")]
    pub vote_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub vote_count: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoVoteWitnessContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub votes: Vec<ProtoVote>,
}
