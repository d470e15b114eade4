//! Double-entry general ledger.
//!
//! This module implements the ledger computation engine:
//! - Journal entry and line types, entry lifecycle
//! - Posting validation (balance invariant, account checks)
//! - Entry number format and ordering
//! - Balance aggregation with per-type sign convention
//! - Account ledger view with opening/running/closing balances
//! - Store traits and the service orchestrating them

pub mod balance;
pub mod error;
pub mod numbering;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;
pub mod view;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, AccountTotals, aggregate_balances, group_totals};
pub use error::{ErrorKind, LedgerError, PostingSide};
pub use numbering::{EntryNumber, compare_entry_numbers};
pub use service::LedgerService;
pub use store::{JournalStore, PostingQueries};
pub use types::{
    CreatedEntry, DateRange, EntrySource, EntryStatus, EntryTotals, JournalEntry,
    JournalEntryUpdate, JournalLine, NewJournalEntry, NewJournalLine, PostedLine,
};
pub use validation::{referenced_accounts, validate_line_accounts, validate_lines};
pub use view::{AccountLedger, LedgerQuery, LedgerRow, build_ledger, sort_posted_lines};
