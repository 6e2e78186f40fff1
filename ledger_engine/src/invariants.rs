/// Ledger Engine: Invariant Checks
///
/// Whole-ledger consistency checks. Run over genesis before use and over
/// replay output; actuators keep these true one contract at a time.
/// Returns `Err(message)` on the first failure.

use crate::state::MemoryLedger;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all invariant checks in a fixed order.
pub fn check_invariants(ledger: &MemoryLedger) -> Result<(), String> {
    check_sink_account(ledger)?;
    check_keys_match_records(ledger)?;
    check_non_negative_balances(ledger)?;
    check_single_frozen_slot(ledger)?;
    check_asset_holdings(ledger)?;
    check_asset_registry(ledger)?;
    check_vote_targets(ledger)?;
    check_witness_accounts(ledger)?;
    check_native_supply(ledger)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// The fee sink must exist as an account.
fn check_sink_account(ledger: &MemoryLedger) -> Result<(), String> {
    if !ledger.accounts.contains_key(&ledger.blackhole) {
        return Err(format!(
            "[INVARIANT:sink_account] Sink account {} does not exist",
            ledger.blackhole
        ));
    }
    Ok(())
}

fn check_keys_match_records(ledger: &MemoryLedger) -> Result<(), String> {
    for (key, account) in &ledger.accounts {
        if *key != account.address {
            return Err(format!(
                "[INVARIANT:record_keys] Account stored under {} has address {}",
                key, account.address
            ));
        }
    }
    for (key, asset) in &ledger.assets {
        if *key != asset.name {
            return Err(format!(
                "[INVARIANT:record_keys] Asset stored under {:?} is named {:?}",
                key, asset.name
            ));
        }
    }
    for (key, witness) in &ledger.witnesses {
        if *key != witness.address {
            return Err(format!(
                "[INVARIANT:record_keys] Witness stored under {} has address {}",
                key, witness.address
            ));
        }
    }
    Ok(())
}

/// Balance, allowance and bandwidth are never negative.
fn check_non_negative_balances(ledger: &MemoryLedger) -> Result<(), String> {
    for account in ledger.accounts.values() {
        for (field, value) in [
            ("balance", account.balance),
            ("allowance", account.allowance),
            ("bandwidth", account.bandwidth),
        ] {
            if value < 0 {
                return Err(format!(
                    "[INVARIANT:non_negative] Account {} has {} {}",
                    account.address, field, value
                ));
            }
        }
    }
    Ok(())
}

/// Zero or one stake lock, holding a positive amount.
fn check_single_frozen_slot(ledger: &MemoryLedger) -> Result<(), String> {
    for account in ledger.accounts.values() {
        if account.frozen.len() > 1 {
            return Err(format!(
                "[INVARIANT:frozen_slot] Account {} holds {} frozen slots, at most 1 allowed",
                account.address,
                account.frozen.len()
            ));
        }
        if let Some(slot) = account.frozen.iter().find(|f| f.frozen_balance <= 0) {
            return Err(format!(
                "[INVARIANT:frozen_slot] Account {} has a frozen slot of {}",
                account.address, slot.frozen_balance
            ));
        }
    }
    Ok(())
}

/// Held asset amounts are non-negative and refer to registered assets.
fn check_asset_holdings(ledger: &MemoryLedger) -> Result<(), String> {
    for account in ledger.accounts.values() {
        for (name, amount) in &account.asset {
            if *amount < 0 {
                return Err(format!(
                    "[INVARIANT:asset_holdings] Account {} holds {} of asset {:?}",
                    account.address, amount, name
                ));
            }
            if !ledger.assets.contains_key(name) {
                return Err(format!(
                    "[INVARIANT:asset_holdings] Account {} holds unregistered asset {:?}",
                    account.address, name
                ));
            }
        }
    }
    Ok(())
}

fn check_asset_registry(ledger: &MemoryLedger) -> Result<(), String> {
    for asset in ledger.assets.values() {
        if asset.total_supply <= 0 || asset.trx_num <= 0 || asset.num <= 0 {
            return Err(format!(
                "[INVARIANT:asset_registry] Asset {:?} has non-positive terms \
                 (total_supply={}, trx_num={}, num={})",
                asset.name, asset.total_supply, asset.trx_num, asset.num
            ));
        }
        if !ledger.accounts.contains_key(&asset.owner_address) {
            return Err(format!(
                "[INVARIANT:asset_registry] Asset {:?} issuer {} has no account",
                asset.name, asset.owner_address
            ));
        }
    }
    Ok(())
}

/// Every vote targets a registered witness with a positive count.
fn check_vote_targets(ledger: &MemoryLedger) -> Result<(), String> {
    for account in ledger.accounts.values() {
        for (target, count) in &account.votes {
            if !ledger.witnesses.contains_key(target) {
                return Err(format!(
                    "[INVARIANT:vote_targets] Account {} votes for {}, which is not a witness",
                    account.address, target
                ));
            }
            if *count <= 0 {
                return Err(format!(
                    "[INVARIANT:vote_targets] Account {} casts {} votes for {}",
                    account.address, count, target
                ));
            }
        }
    }
    Ok(())
}

fn check_witness_accounts(ledger: &MemoryLedger) -> Result<(), String> {
    for address in ledger.witnesses.keys() {
        if !ledger.accounts.contains_key(address) {
            return Err(format!(
                "[INVARIANT:witness_accounts] Witness {} has no account",
                address
            ));
        }
    }
    Ok(())
}

/// Total native units (balance + frozen + allowance) fit in an i64.
fn check_native_supply(ledger: &MemoryLedger) -> Result<(), String> {
    match ledger.total_native() {
        Some(_) => Ok(()),
        None => Err("[INVARIANT:native_supply] Total native supply overflows i64".to_string()),
    }
}
