//! Translation of business documents into balanced journal entries.
//!
//! Builders only assemble lines; the result still goes through the normal
//! validate → number → store path.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CompanyId, UserId, round_minor};

use super::invoice::InvoiceTotals;
use crate::ledger::error::{LedgerError, PostingSide};
use crate::ledger::types::{EntrySource, EntryStatus, NewJournalEntry, NewJournalLine};

/// Header fields shared by document postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingHeader {
    /// Owning company.
    pub company_id: CompanyId,
    /// Posting date.
    pub date: NaiveDate,
    /// Entry memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// Creator.
    #[serde(default)]
    pub created_by: Option<UserId>,
}

/// An expense receipt to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePosting {
    /// Expense account (debit side).
    pub debit_account: Option<AccountId>,
    /// Payment account, e.g. cash or bank (credit side).
    pub credit_account: Option<AccountId>,
    /// Recoverable VAT account.
    #[serde(default)]
    pub vat_account: Option<AccountId>,
    /// Amount paid, VAT included.
    pub gross: Decimal,
    /// VAT included in `gross`.
    #[serde(default)]
    pub vat: Option<Decimal>,
}

/// A sales invoice to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoicePosting {
    /// Receivable (or cash) account (debit side).
    pub receivable_account: Option<AccountId>,
    /// Income account (credit side).
    pub income_account: Option<AccountId>,
    /// VAT output account.
    #[serde(default)]
    pub vat_account: Option<AccountId>,
    /// Totals from [`compute_invoice_totals`](super::compute_invoice_totals).
    pub totals: InvoiceTotals,
}

fn require(account: Option<AccountId>, side: PostingSide) -> Result<AccountId, LedgerError> {
    account.ok_or(LedgerError::MissingPostingAccount { side })
}

fn posted_entry(header: &PostingHeader, source: EntrySource, lines: Vec<NewJournalLine>) -> NewJournalEntry {
    NewJournalEntry {
        company_id: header.company_id,
        date: header.date,
        memo: header.memo.clone(),
        source,
        status: EntryStatus::Posted,
        created_by: header.created_by,
        entry_number: None,
        lines,
    }
}

/// Builds the entry for an expense receipt.
///
/// `Dr expense (gross - vat) / Dr VAT input (vat) / Cr payment (gross)`.
/// Without a VAT account the whole gross goes to the expense account.
///
/// # Errors
///
/// Returns `MissingPostingAccount` if either side has no account, and
/// `InvalidAmount` if the gross is not positive or the VAT is negative or
/// exceeds the gross.
pub fn build_expense_entry(
    header: &PostingHeader,
    posting: &ExpensePosting,
) -> Result<NewJournalEntry, LedgerError> {
    let expense = require(posting.debit_account, PostingSide::Debit)?;
    let payment = require(posting.credit_account, PostingSide::Credit)?;

    let gross = round_minor(posting.gross);
    if gross <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "gross amount must be positive, got {gross}"
        )));
    }

    let vat = round_minor(posting.vat.unwrap_or(Decimal::ZERO));
    if vat < Decimal::ZERO || vat > gross {
        return Err(LedgerError::InvalidAmount(format!(
            "VAT {vat} must be between 0 and the gross amount {gross}"
        )));
    }

    let mut lines = Vec::with_capacity(3);
    match posting.vat_account {
        Some(vat_account) if !vat.is_zero() => {
            let net = gross - vat;
            if !net.is_zero() {
                lines.push(NewJournalLine::debit(expense, net).with_description("Expense"));
            }
            lines.push(NewJournalLine::debit(vat_account, vat).with_description("VAT input"));
        }
        _ => lines.push(NewJournalLine::debit(expense, gross).with_description("Expense")),
    }
    lines.push(NewJournalLine::credit(payment, gross).with_description("Payment"));

    Ok(posted_entry(header, EntrySource::Receipt, lines))
}

/// Builds the entry for a sales invoice.
///
/// `Dr receivable (total) / Cr income (subtotal) / Cr VAT output (vat)`.
/// Without a VAT account the whole total goes to the income account.
///
/// # Errors
///
/// Returns `MissingPostingAccount` if either side has no account, and
/// `InvalidAmount` if the total is not positive or the VAT is negative.
pub fn build_sales_invoice_entry(
    header: &PostingHeader,
    posting: &SalesInvoicePosting,
) -> Result<NewJournalEntry, LedgerError> {
    let receivable = require(posting.receivable_account, PostingSide::Debit)?;
    let income = require(posting.income_account, PostingSide::Credit)?;

    let InvoiceTotals {
        subtotal,
        vat_amount,
        total,
    } = posting.totals;
    if total <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "invoice total must be positive, got {total}"
        )));
    }
    if vat_amount < Decimal::ZERO || subtotal < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "subtotal {subtotal} and VAT {vat_amount} must not be negative"
        )));
    }

    let mut lines = vec![NewJournalLine::debit(receivable, total).with_description("Receivable")];
    match posting.vat_account {
        Some(vat_account) if !vat_amount.is_zero() => {
            if !subtotal.is_zero() {
                lines.push(NewJournalLine::credit(income, subtotal).with_description("Sales"));
            }
            lines.push(NewJournalLine::credit(vat_account, vat_amount).with_description("VAT output"));
        }
        _ => lines.push(NewJournalLine::credit(income, total).with_description("Sales")),
    }

    Ok(posted_entry(header, EntrySource::Invoice, lines))
}
