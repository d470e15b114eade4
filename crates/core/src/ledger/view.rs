//! Account ledger view with opening, running and closing balances.
//!
//! The builder works on the posted lines of one account inside the query
//! window plus the totals of everything before the window. Rows are ordered
//! by `(date, entry number, line_no)`, balances are computed over the
//! filtered list, and only then is the list paginated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{JournalEntryId, JournalLineId, PageWindow};

use super::balance::AccountTotals;
use super::numbering::compare_entry_numbers;
use super::types::{DateRange, PostedLine};
use crate::accounts::Account;
use chrono::NaiveDate;

/// Filters for an account ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerQuery {
    /// Date window (inclusive, either bound optional).
    #[serde(flatten)]
    pub range: DateRange,
    /// Case-insensitive substring matched against entry number, memo and
    /// line description.
    #[serde(default)]
    pub search: Option<String>,
    /// Page over the filtered rows.
    #[serde(flatten)]
    pub window: PageWindow,
}

impl LedgerQuery {
    /// Returns the lowercased search needle, if any. Whitespace is kept.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// One ledger row: a posted line with the balance after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Line ID.
    pub line_id: JournalLineId,
    /// Owning entry.
    pub entry_id: JournalEntryId,
    /// Entry number.
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry memo.
    pub memo: Option<String>,
    /// Line description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this line, positive on the account's normal side.
    pub running_balance: Decimal,
}

/// A chronological ledger for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    /// The account.
    pub account: Account,
    /// Rows of the requested page.
    pub entries: Vec<LedgerRow>,
    /// Balance of all posted lines before the window start.
    pub opening_balance: Decimal,
    /// Sum of debits over the filtered rows (all pages).
    pub total_debit: Decimal,
    /// Sum of credits over the filtered rows (all pages).
    pub total_credit: Decimal,
    /// `opening_balance` plus the movement of the filtered rows.
    pub closing_balance: Decimal,
    /// Number of filtered rows before pagination.
    pub total_count: usize,
}

/// Sorts posted lines by `(date, entry number, line_no)`.
pub fn sort_posted_lines(lines: &mut [PostedLine]) {
    lines.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| compare_entry_numbers(&a.entry_number, &b.entry_number))
            .then_with(|| a.line_no.cmp(&b.line_no))
    });
}

fn matches_search(line: &PostedLine, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);
    contains(&line.entry_number)
        || line.memo.as_deref().is_some_and(contains)
        || line.description.as_deref().is_some_and(contains)
}

/// Builds an account ledger.
///
/// `opening` holds the totals of posted lines strictly before
/// `query.range.start` (zero when the range has no start). `lines` are the
/// account's posted lines; any outside `query.range` are dropped.
#[must_use]
pub fn build_ledger(
    account: Account,
    opening: &AccountTotals,
    mut lines: Vec<PostedLine>,
    query: &LedgerQuery,
) -> AccountLedger {
    let side = account.normal_balance();
    let opening_balance = opening.balance(side);

    sort_posted_lines(&mut lines);

    let needle = query.needle();
    let mut running = opening_balance;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    let rows: Vec<LedgerRow> = lines
        .into_iter()
        .filter(|line| query.range.contains(line.date))
        .filter(|line| needle.as_deref().is_none_or(|n| matches_search(line, n)))
        .map(|line| {
            running += side.movement(line.debit, line.credit);
            total_debit += line.debit;
            total_credit += line.credit;
            LedgerRow {
                line_id: line.line_id,
                entry_id: line.entry_id,
                entry_number: line.entry_number,
                date: line.date,
                memo: line.memo,
                description: line.description,
                debit: line.debit,
                credit: line.credit,
                running_balance: running,
            }
        })
        .collect();

    let total_count = rows.len();
    let closing_balance = opening_balance + side.movement(total_debit, total_credit);

    AccountLedger {
        account,
        entries: query.window.apply(rows),
        opening_balance,
        total_debit,
        total_credit,
        closing_balance,
        total_count,
    }
}
