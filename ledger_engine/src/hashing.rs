/// Ledger Engine: Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing of a ledger
/// snapshot. Produces byte-identical output across platforms.
///
/// Rules:
///   - engine_version first, then blackhole, parameters, accounts,
///     assets, witnesses
///   - Accounts and witnesses sorted by address bytes, assets by name
///   - Per-account asset and vote maps sorted by key
///   - Byte strings as lowercase hex
///   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{Account, AccountType, AssetIssue, ChainParameters, Witness};
use crate::state::MemoryLedger;
use crate::ENGINE_VERSION;

/// Canonical serialization of a ledger to UTF-8 JSON bytes.
pub fn canonical_serialize(ledger: &MemoryLedger) -> Vec<u8> {
    build_canonical_value(ledger).to_string().into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn state_hash(ledger: &MemoryLedger) -> String {
    hex::encode(Sha256::digest(canonical_serialize(ledger)))
}

fn build_canonical_value(ledger: &MemoryLedger) -> Value {
    let mut top = Map::new();
    top.insert("engine_version".into(), Value::from(ENGINE_VERSION));
    top.insert("blackhole".into(), Value::String(ledger.blackhole.to_hex()));
    top.insert("parameters".into(), parameters_value(&ledger.parameters));
    // BTreeMaps iterate in key order.
    top.insert(
        "accounts".into(),
        Value::Array(ledger.accounts.values().map(account_value).collect()),
    );
    top.insert(
        "assets".into(),
        Value::Array(ledger.assets.values().map(asset_value).collect()),
    );
    top.insert(
        "witnesses".into(),
        Value::Array(ledger.witnesses.values().map(witness_value).collect()),
    );
    Value::Object(top)
}

fn parameters_value(p: &ChainParameters) -> Value {
    let mut m = Map::new();
    m.insert("min_frozen_balance".into(), p.min_frozen_balance.into());
    m.insert("min_frozen_time".into(), p.min_frozen_time.into());
    m.insert("max_frozen_time".into(), p.max_frozen_time.into());
    m.insert("max_vote_number".into(), (p.max_vote_number as u64).into());
    m.insert("witness_allowance_frozen_time".into(), p.witness_allowance_frozen_time.into());
    m.insert("account_upgrade_cost".into(), p.account_upgrade_cost.into());
    m.insert("bandwidth_per_coinday".into(), p.bandwidth_per_coinday.into());
    m.insert(
        "non_existent_account_transfer_min".into(),
        p.non_existent_account_transfer_min.into(),
    );
    m.insert("vote_unit".into(), p.vote_unit.into());
    Value::Object(m)
}

fn account_value(a: &Account) -> Value {
    let account_type = match a.account_type {
        AccountType::Normal => "normal",
        AccountType::AssetIssue => "asset_issue",
        AccountType::Contract => "contract",
    };

    let frozen: Vec<Value> = a
        .frozen
        .iter()
        .map(|f| {
            let mut m = Map::new();
            m.insert("frozen_balance".into(), f.frozen_balance.into());
            m.insert("expire_time".into(), f.expire_time.into());
            Value::Object(m)
        })
        .collect();

    let assets: Map<String, Value> = a
        .asset
        .iter()
        .map(|(name, amount)| (name.clone(), Value::from(*amount)))
        .collect();

    let votes: Map<String, Value> = a
        .votes
        .iter()
        .map(|(target, count)| (target.to_hex(), Value::from(*count)))
        .collect();

    let mut m = Map::new();
    m.insert("address".into(), Value::String(a.address.to_hex()));
    m.insert("account_name".into(), Value::String(hex::encode(&a.account_name)));
    m.insert("account_type".into(), Value::String(account_type.into()));
    m.insert("balance".into(), a.balance.into());
    m.insert("frozen".into(), Value::Array(frozen));
    m.insert("bandwidth".into(), a.bandwidth.into());
    m.insert("allowance".into(), a.allowance.into());
    m.insert("latest_withdraw_time".into(), a.latest_withdraw_time.into());
    m.insert("asset".into(), Value::Object(assets));
    m.insert("votes".into(), Value::Object(votes));
    m.insert("is_witness".into(), Value::Bool(a.is_witness));
    m.insert("create_time".into(), a.create_time.into());
    Value::Object(m)
}

fn asset_value(a: &AssetIssue) -> Value {
    let mut m = Map::new();
    m.insert("name".into(), Value::String(a.name.clone()));
    m.insert("owner_address".into(), Value::String(a.owner_address.to_hex()));
    m.insert("total_supply".into(), a.total_supply.into());
    m.insert("trx_num".into(), a.trx_num.into());
    m.insert("num".into(), a.num.into());
    m.insert("start_time".into(), a.start_time.into());
    m.insert("end_time".into(), a.end_time.into());
    m.insert("description".into(), Value::String(a.description.clone()));
    m.insert("url".into(), Value::String(a.url.clone()));
    Value::Object(m)
}

fn witness_value(w: &Witness) -> Value {
    let mut m = Map::new();
    m.insert("address".into(), Value::String(w.address.to_hex()));
    m.insert("url".into(), Value::String(w.url.clone()));
    m.insert("vote_count".into(), w.vote_count.into());
    Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;

    fn ledger() -> MemoryLedger {
        MemoryLedger::new(Address::from_body([0xbb; 20]))
    }

    #[test]
    fn serialization_has_no_whitespace_and_fixed_head() {
        let bytes = canonical_serialize(&ledger());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"engine_version":1,"blackhole":"41bbbb"#));
        assert!(!text.contains(' '));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn hash_is_stable_and_sensitive() {
        let a = ledger();
        let b = ledger();
        assert_eq!(state_hash(&a), state_hash(&b));
        assert_eq!(state_hash(&a).len(), 64);

        let mut c = ledger();
        c.parameters.vote_unit += 1;
        assert_ne!(state_hash(&a), state_hash(&c));
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut a = ledger();
        let mut b = ledger();
        let x = Account::new(Address::from_body([1; 20]), AccountType::Normal, 0);
        let y = Account::new(Address::from_body([2; 20]), AccountType::Normal, 0);
        a.insert_account(x.clone());
        a.insert_account(y.clone());
        b.insert_account(y);
        b.insert_account(x);
        assert_eq!(state_hash(&a), state_hash(&b));
    }
}
