//! Lifecycle rules for chart-of-accounts mutations.
//!
//! These checks are pure; the caller supplies the facts (line counts,
//! existing codes) read from storage inside its own transaction.

use std::collections::{BTreeSet, HashSet};

use super::types::{Account, AccountUpdate, NewAccount};
use crate::ledger::error::LedgerError;

/// Checks that an account may be archived.
///
/// # Errors
///
/// Returns `SystemAccountProtected` for system accounts.
pub fn ensure_archivable(account: &Account) -> Result<(), LedgerError> {
    if account.is_system_account {
        return Err(LedgerError::SystemAccountProtected(account.id));
    }
    Ok(())
}

/// Checks that an account may be hard-deleted.
///
/// An account with any journal line can only be archived.
///
/// # Errors
///
/// Returns `SystemAccountProtected` or `AccountHasPostings`.
pub fn ensure_deletable(account: &Account, line_count: u64) -> Result<(), LedgerError> {
    ensure_archivable(account)?;
    if line_count > 0 {
        return Err(LedgerError::AccountHasPostings {
            account_id: account.id,
            line_count,
        });
    }
    Ok(())
}

/// Checks that an update does not change the type of an account in use.
///
/// # Errors
///
/// Returns `AccountTypeLocked` if the type changes and lines exist.
pub fn ensure_update_allowed(
    account: &Account,
    update: &AccountUpdate,
    line_count: u64,
) -> Result<(), LedgerError> {
    let type_changes = update
        .account_type
        .is_some_and(|account_type| account_type != account.account_type);
    if type_changes && line_count > 0 {
        return Err(LedgerError::AccountTypeLocked(account.id));
    }
    Ok(())
}

/// Returns the codes of a creation batch that repeat inside the batch or
/// already exist, sorted and deduplicated.
#[must_use]
pub fn find_duplicate_codes(existing: &HashSet<String>, batch: &[NewAccount]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(batch.len());
    let mut duplicates = BTreeSet::new();

    for account in batch {
        if existing.contains(&account.code) || !seen.insert(account.code.as_str()) {
            duplicates.insert(account.code.clone());
        }
    }

    duplicates.into_iter().collect()
}
