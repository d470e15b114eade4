//! Persistence seams of the ledger.
//!
//! These traits are implemented by the db crate. The service injects them
//! instead of reaching for a shared storage instance.

use chrono::NaiveDate;
use tally_shared::types::{AccountId, CompanyId, JournalEntryId};

use super::balance::AccountTotals;
use super::error::LedgerError;
use super::types::{DateRange, EntryStatus, JournalEntry, NewJournalEntry, NewJournalLine, PostedLine};

/// Atomic writes and reads of journal entries.
pub trait JournalStore: Send + Sync {
    /// Persists a validated entry with all its lines as one unit.
    ///
    /// When `entry.entry_number` is `None` the store allocates the next
    /// number for `(company, date)` atomically with the insert, retrying on
    /// a uniqueness conflict. An explicit number that already exists fails
    /// with `DuplicateEntryNumber`.
    fn create_entry(
        &self,
        entry: &NewJournalEntry,
    ) -> impl std::future::Future<Output = Result<JournalEntry, LedgerError>> + Send;

    /// Finds an entry with its lines.
    fn find_entry(
        &self,
        id: JournalEntryId,
    ) -> impl std::future::Future<Output = Result<Option<JournalEntry>, LedgerError>> + Send;

    /// Rewrites a draft entry's header and, when given, replaces its lines.
    ///
    /// Fails with `ConcurrentModification` if the entry stopped being a draft.
    fn update_draft(
        &self,
        id: JournalEntryId,
        date: NaiveDate,
        memo: Option<String>,
        lines: Option<&[NewJournalLine]>,
    ) -> impl std::future::Future<Output = Result<JournalEntry, LedgerError>> + Send;

    /// Deletes a draft entry and, by cascade, its lines.
    ///
    /// Fails with `ConcurrentModification` if the entry stopped being a draft.
    fn delete_draft(
        &self,
        id: JournalEntryId,
    ) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// Moves an entry from `from` to `to` only if it is still in `from`.
    ///
    /// Fails with `ConcurrentModification` if the status changed meanwhile.
    fn transition_status(
        &self,
        id: JournalEntryId,
        from: EntryStatus,
        to: EntryStatus,
    ) -> impl std::future::Future<Output = Result<JournalEntry, LedgerError>> + Send;

    /// Previews the number the next entry of `(company, date)` would get.
    /// Nothing is reserved.
    fn peek_entry_number(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<String, LedgerError>> + Send;
}

/// Read-only aggregate queries over posted lines.
///
/// Implementations filter by status and date server-side; nothing here
/// returns lines of draft or void entries.
pub trait PostingQueries: Send + Sync {
    /// One grouped total per account of the company that has posted lines
    /// inside `range`.
    fn account_totals(
        &self,
        company_id: CompanyId,
        range: DateRange,
    ) -> impl std::future::Future<Output = Result<Vec<AccountTotals>, LedgerError>> + Send;

    /// Totals of an account's posted lines dated strictly before `before`.
    fn totals_before(
        &self,
        account_id: AccountId,
        before: NaiveDate,
    ) -> impl std::future::Future<Output = Result<AccountTotals, LedgerError>> + Send;

    /// An account's posted lines inside `range`, ordered by
    /// `(date, entry number, line_no)`.
    fn posted_lines(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> impl std::future::Future<Output = Result<Vec<PostedLine>, LedgerError>> + Send;
}
