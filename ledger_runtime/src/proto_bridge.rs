//! Proto ↔ engine conversion bridge.
//!
//! Converts between the protobuf wire types (proto_types.rs) and the
//! engine's `Contract` sum type. A parameter that fails to unpack is a
//! validation failure of the contract, never a panic.

use ledger_engine::contract::{
    AccountUpdateContract, AssetIssueContract, Contract, ContractType, FreezeBalanceContract,
    ParticipateAssetIssueContract, TransferAssetContract, TransferContract,
    UnfreezeBalanceContract, Vote, VoteWitnessContract, WithdrawBalanceContract,
    WitnessCreateContract, WitnessUpdateContract,
};
use ledger_engine::dispatcher::resolve_type;
use ledger_engine::error::ValidationError;
use prost::Message;
use sha2::{Digest, Sha256};

use crate::proto_types::*;

/// `type_url` a packed parameter of `kind` must carry.
pub fn type_url(kind: ContractType) -> String {
    format!("{}{}", TYPE_URL_PREFIX, kind.message_name())
}

fn decode_error(kind: ContractType, reason: impl ToString) -> ValidationError {
    ValidationError::Decode {
        expected: kind,
        reason: reason.to_string(),
    }
}

/// Check the `type_url` and decode the packed message.
fn unpack<M: Message + Default>(kind: ContractType, any: &ProtoAny) -> Result<M, ValidationError> {
    let expected = type_url(kind);
    if any.type_url != expected {
        return Err(decode_error(
            kind,
            format!("type_url {:?} does not match {:?}", any.type_url, expected),
        ));
    }
    M::decode(any.value.as_slice()).map_err(|e| decode_error(kind, e))
}

fn pack<M: Message>(kind: ContractType, msg: &M) -> ProtoAny {
    ProtoAny {
        type_url: type_url(kind),
        value: msg.encode_to_vec(),
    }
}

/// Convert a protobuf contract to the engine's `Contract`.
///
/// Fails with `UnsupportedContractType` for tags without an actuator and
/// with `Decode` when the parameter is missing, mislabelled or malformed.
pub fn proto_to_contract(proto: &ProtoContract) -> Result<Contract, ValidationError> {
    let kind = resolve_type(proto.r#type)?;
    let any = proto
        .parameter
        .as_ref()
        .ok_or_else(|| decode_error(kind, "missing parameter"))?;

    let contract = match kind {
        ContractType::Transfer => {
            let p: ProtoTransferContract = unpack(kind, any)?;
            Contract::Transfer(TransferContract {
                owner_address: p.owner_address,
                to_address: p.to_address,
                amount: p.amount,
            })
        }
        ContractType::TransferAsset => {
            let p: ProtoTransferAssetContract = unpack(kind, any)?;
            Contract::TransferAsset(TransferAssetContract {
                asset_name: p.asset_name,
                owner_address: p.owner_address,
                to_address: p.to_address,
                amount: p.amount,
            })
        }
        ContractType::AssetIssue => {
            let p: ProtoAssetIssueContract = unpack(kind, any)?;
            Contract::AssetIssue(AssetIssueContract {
                owner_address: p.owner_address,
                name: p.name,
                total_supply: p.total_supply,
                trx_num: p.trx_num,
                num: p.num,
                start_time: p.start_time,
                end_time: p.end_time,
                description: p.description,
                url: p.url,
            })
        }
        ContractType::ParticipateAssetIssue => {
            let p: ProtoParticipateAssetIssueContract = unpack(kind, any)?;
            Contract::ParticipateAssetIssue(ParticipateAssetIssueContract {
                owner_address: p.owner_address,
                to_address: p.to_address,
                asset_name: p.asset_name,
                amount: p.amount,
            })
        }
        ContractType::FreezeBalance => {
            let p: ProtoFreezeBalanceContract = unpack(kind, any)?;
            Contract::FreezeBalance(FreezeBalanceContract {
                owner_address: p.owner_address,
                frozen_balance: p.frozen_balance,
                frozen_duration: p.frozen_duration,
            })
        }
        ContractType::UnfreezeBalance => {
            let p: ProtoUnfreezeBalanceContract = unpack(kind, any)?;
            Contract::UnfreezeBalance(UnfreezeBalanceContract {
                owner_address: p.owner_address,
            })
        }
        ContractType::WitnessCreate => {
            let p: ProtoWitnessCreateContract = unpack(kind, any)?;
            Contract::WitnessCreate(WitnessCreateContract {
                owner_address: p.owner_address,
                url: p.url,
            })
        }
        ContractType::WitnessUpdate => {
            let p: ProtoWitnessUpdateContract = unpack(kind, any)?;
            Contract::WitnessUpdate(WitnessUpdateContract {
                owner_address: p.owner_address,
                update_url: p.update_url,
            })
        }
        ContractType::AccountUpdate => {
            let p: ProtoAccountUpdateContract = unpack(kind, any)?;
            Contract::AccountUpdate(AccountUpdateContract {
                account_name: p.account_name,
                owner_address: p.owner_address,
            })
        }
        ContractType::VoteWitness => {
            let p: ProtoVoteWitnessContract = unpack(kind, any)?;
            Contract::VoteWitness(VoteWitnessContract {
                owner_address: p.owner_address,
                votes: p
                    .votes
                    .into_iter()
                    .map(|v| Vote {
                        vote_address: v.vote_address,
                        vote_count: v.vote_count,
                    })
                    .collect(),
            })
        }
        ContractType::WithdrawBalance => {
            let p: ProtoWithdrawBalanceContract = unpack(kind, any)?;
            Contract::WithdrawBalance(WithdrawBalanceContract {
                owner_address: p.owner_address,
            })
        }
    };
    Ok(contract)
}

/// Convert an engine `Contract` to its protobuf form.
pub fn contract_to_proto(contract: &Contract) -> ProtoContract {
    let kind = contract.contract_type();
    let parameter = match contract {
        Contract::Transfer(c) => pack(
            kind,
            &ProtoTransferContract {
                owner_address: c.owner_address.clone(),
                to_address: c.to_address.clone(),
                amount: c.amount,
            },
        ),
        Contract::TransferAsset(c) => pack(
            kind,
            &ProtoTransferAssetContract {
                asset_name: c.asset_name.clone(),
                owner_address: c.owner_address.clone(),
                to_address: c.to_address.clone(),
                amount: c.amount,
            },
        ),
        Contract::AssetIssue(c) => pack(
            kind,
            &ProtoAssetIssueContract {
                owner_address: c.owner_address.clone(),
                name: c.name.clone(),
                total_supply: c.total_supply,
                trx_num: c.trx_num,
                num: c.num,
                start_time: c.start_time,
                end_time: c.end_time,
                description: c.description.clone(),
                url: c.url.clone(),
            },
        ),
        Contract::ParticipateAssetIssue(c) => pack(
            kind,
            &ProtoParticipateAssetIssueContract {
                owner_address: c.owner_address.clone(),
                to_address: c.to_address.clone(),
                asset_name: c.asset_name.clone(),
                amount: c.amount,
            },
        ),
        Contract::FreezeBalance(c) => pack(
            kind,
            &ProtoFreezeBalanceContract {
                owner_address: c.owner_address.clone(),
                frozen_balance: c.frozen_balance,
                frozen_duration: c.frozen_duration,
            },
        ),
        Contract::UnfreezeBalance(c) => pack(
            kind,
            &ProtoUnfreezeBalanceContract {
                owner_address: c.owner_address.clone(),
            },
        ),
        Contract::WitnessCreate(c) => pack(
            kind,
            &ProtoWitnessCreateContract {
                owner_address: c.owner_address.clone(),
                url: c.url.clone(),
            },
        ),
        Contract::WitnessUpdate(c) => pack(
            kind,
            &ProtoWitnessUpdateContract {
                owner_address: c.owner_address.clone(),
                update_url: c.update_url.clone(),
            },
        ),
        Contract::AccountUpdate(c) => pack(
            kind,
            &ProtoAccountUpdateContract {
                account_name: c.account_name.clone(),
                owner_address: c.owner_address.clone(),
            },
        ),
        Contract::VoteWitness(c) => pack(
            kind,
            &ProtoVoteWitnessContract {
                owner_address: c.owner_address.clone(),
                votes: c
                    .votes
                    .iter()
                    .map(|v| ProtoVote {
                        vote_address: v.vote_address.clone(),
                        vote_count: v.vote_count,
                    })
                    .collect(),
            },
        ),
        Contract::WithdrawBalance(c) => pack(
            kind,
            &ProtoWithdrawBalanceContract {
                owner_address: c.owner_address.clone(),
            },
        ),
    };

    ProtoContract {
        r#type: kind.tag(),
        parameter: Some(parameter),
    }
}

// ── Transactions ───────────────────────────────────────────────

/// Wrap one contract in an unsigned transaction.
pub fn build_transaction(contract: &Contract, timestamp: i64, expiration: i64) -> ProtoTransaction {
    ProtoTransaction {
        raw_data: Some(ProtoRawData {
            expiration,
            contract: vec![contract_to_proto(contract)],
            timestamp,
        }),
        signature: Vec::new(),
    }
}

/// Transaction id: SHA-256 of the encoded `raw_data`.
pub fn transaction_id(raw: &ProtoRawData) -> [u8; 32] {
    let digest = Sha256::digest(raw.encode_to_vec());
    let mut id = [0u8; 32];
    id.copy_from_slice(&digest);
    id
}
