//! Ledger service.
//!
//! Orchestrates validation, numbering, persistence and the derived views.
//! All state lives behind the injected store traits.

use std::sync::Arc;

use chrono::NaiveDate;
use tally_shared::types::{AccountId, CompanyId, JournalEntryId};
use tracing::{debug, info, warn};

use super::balance::{AccountBalance, AccountTotals, aggregate_balances};
use super::error::LedgerError;
use super::store::{JournalStore, PostingQueries};
use super::types::{
    CreatedEntry, DateRange, EntryStatus, EntryTotals, JournalEntry, JournalEntryUpdate,
    NewJournalEntry, NewJournalLine,
};
use super::validation::{referenced_accounts, validate_line_accounts, validate_lines};
use super::view::{AccountLedger, LedgerQuery, build_ledger};
use crate::accounts::AccountRegistry;
use crate::documents::{
    ExpensePosting, PostingHeader, SalesInvoicePosting, build_expense_entry,
    build_sales_invoice_entry,
};

/// General-ledger service over injected stores.
pub struct LedgerService<A, J, Q>
where
    A: AccountRegistry,
    J: JournalStore,
    Q: PostingQueries,
{
    accounts: Arc<A>,
    journal: Arc<J>,
    queries: Arc<Q>,
}

impl<A, J, Q> LedgerService<A, J, Q>
where
    A: AccountRegistry,
    J: JournalStore,
    Q: PostingQueries,
{
    /// Creates a new ledger service.
    #[must_use]
    pub fn new(accounts: Arc<A>, journal: Arc<J>, queries: Arc<Q>) -> Self {
        Self {
            accounts,
            journal,
            queries,
        }
    }

    /// Validates lines and their accounts for `company_id`.
    async fn check_lines(
        &self,
        company_id: CompanyId,
        lines: &[NewJournalLine],
    ) -> Result<EntryTotals, LedgerError> {
        let totals = validate_lines(lines)?;
        if totals.memo_lines > 0 {
            warn!(
                company_id = %company_id,
                memo_lines = totals.memo_lines,
                "Journal entry contains zero-amount memo lines"
            );
        }

        let ids = referenced_accounts(lines);
        let accounts = self.accounts.accounts_by_ids(&ids).await?;
        validate_line_accounts(company_id, lines, &accounts)?;
        Ok(totals)
    }

    async fn load_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.journal
            .find_entry(id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// Creates a journal entry with its lines.
    ///
    /// Validation runs before anything is written; a rejected entry leaves
    /// no trace. The entry number is allocated by the store.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed lines, `DuplicateEntryNumber`
    /// for a colliding explicit number, or `NumberAllocationExhausted` if
    /// allocation kept racing.
    pub async fn create_journal_entry(
        &self,
        entry: NewJournalEntry,
    ) -> Result<CreatedEntry, LedgerError> {
        if entry.status == EntryStatus::Void {
            return Err(LedgerError::InvalidInitialStatus(entry.status));
        }

        let totals = self.check_lines(entry.company_id, &entry.lines).await?;
        let stored = self.journal.create_entry(&entry).await?;

        info!(
            company_id = %stored.company_id,
            entry_id = %stored.id,
            entry_number = %stored.entry_number,
            status = %stored.status,
            total_debit = %totals.total_debit,
            "Journal entry created"
        );

        Ok(CreatedEntry::from(&stored))
    }

    /// Gets a journal entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist.
    pub async fn get_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.load_entry(id).await
    }

    /// Updates a draft entry. A replaced line set is re-validated; the entry
    /// number never changes.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotEditable` unless the entry is a draft.
    pub async fn update_entry(
        &self,
        id: JournalEntryId,
        update: JournalEntryUpdate,
    ) -> Result<JournalEntry, LedgerError> {
        let current = self.load_entry(id).await?;
        if !current.status.is_editable() {
            return Err(LedgerError::EntryNotEditable {
                id,
                status: current.status,
            });
        }

        if let Some(lines) = &update.lines {
            self.check_lines(current.company_id, lines).await?;
        }

        let date = update.date.unwrap_or(current.date);
        let memo = update.memo.unwrap_or(current.memo);
        let updated = self
            .journal
            .update_draft(id, date, memo, update.lines.as_deref())
            .await?;

        info!(entry_id = %id, entry_number = %updated.entry_number, "Draft journal entry updated");
        Ok(updated)
    }

    /// Deletes a draft entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotEditable` unless the entry is a draft.
    pub async fn delete_entry(&self, id: JournalEntryId) -> Result<(), LedgerError> {
        let current = self.load_entry(id).await?;
        if !current.status.is_editable() {
            return Err(LedgerError::EntryNotEditable {
                id,
                status: current.status,
            });
        }

        self.journal.delete_draft(id).await?;
        info!(entry_id = %id, entry_number = %current.entry_number, "Draft journal entry deleted");
        Ok(())
    }

    async fn transition(
        &self,
        id: JournalEntryId,
        to: EntryStatus,
    ) -> Result<JournalEntry, LedgerError> {
        let current = self.load_entry(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(LedgerError::InvalidStatusTransition {
                from: current.status,
                to,
            });
        }

        if to == EntryStatus::Posted {
            self.check_lines(current.company_id, &current.line_inputs())
                .await?;
        }

        self.journal.transition_status(id, current.status, to).await
    }

    /// Posts a draft entry, re-validating its stored lines.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` unless the entry is a draft.
    pub async fn post_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let entry = self.transition(id, EntryStatus::Posted).await?;
        info!(entry_id = %id, entry_number = %entry.entry_number, "Journal entry posted");
        Ok(entry)
    }

    /// Voids a posted entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` unless the entry is posted.
    pub async fn void_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let entry = self.transition(id, EntryStatus::Void).await?;
        info!(entry_id = %id, entry_number = %entry.entry_number, "Journal entry voided");
        Ok(entry)
    }

    /// Previews the next entry number for `(company, date)` without
    /// reserving it.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn next_entry_number(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<String, LedgerError> {
        self.journal.peek_entry_number(company_id, date).await
    }

    /// Lists every account of a company with its balance over posted lines
    /// inside `range`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` for inverted bounds.
    pub async fn accounts_with_balances(
        &self,
        company_id: CompanyId,
        range: DateRange,
    ) -> Result<Vec<AccountBalance>, LedgerError> {
        range.validate()?;

        let accounts = self.accounts.list_accounts(company_id).await?;
        let totals = self.queries.account_totals(company_id, range).await?;
        debug!(
            company_id = %company_id,
            accounts = accounts.len(),
            accounts_with_lines = totals.len(),
            "Aggregated account balances"
        );

        Ok(aggregate_balances(accounts, &totals))
    }

    /// Builds the ledger of one account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist, or
    /// `InvalidDateRange` for inverted bounds.
    pub async fn account_ledger(
        &self,
        account_id: AccountId,
        query: LedgerQuery,
    ) -> Result<AccountLedger, LedgerError> {
        query.range.validate()?;

        let account = self
            .accounts
            .find_account(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let opening = match query.range.start {
            Some(start) => self.queries.totals_before(account_id, start).await?,
            None => AccountTotals::zero(account_id),
        };
        let lines = self.queries.posted_lines(account_id, query.range).await?;
        debug!(
            account_id = %account_id,
            lines = lines.len(),
            "Loaded posted lines for account ledger"
        );

        Ok(build_ledger(account, &opening, lines, &query))
    }

    /// Posts an expense receipt.
    ///
    /// # Errors
    ///
    /// Returns `MissingPostingAccount`, `InvalidAmount`, or any error of
    /// [`Self::create_journal_entry`].
    pub async fn post_expense(
        &self,
        header: &PostingHeader,
        posting: &ExpensePosting,
    ) -> Result<CreatedEntry, LedgerError> {
        let entry = build_expense_entry(header, posting)?;
        self.create_journal_entry(entry).await
    }

    /// Posts a sales invoice.
    ///
    /// # Errors
    ///
    /// Returns `MissingPostingAccount`, `InvalidAmount`, or any error of
    /// [`Self::create_journal_entry`].
    pub async fn post_sales_invoice(
        &self,
        header: &PostingHeader,
        posting: &SalesInvoicePosting,
    ) -> Result<CreatedEntry, LedgerError> {
        let entry = build_sales_invoice_entry(header, posting)?;
        self.create_journal_entry(entry).await
    }
}
