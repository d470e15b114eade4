//! Journal domain types.
//!
//! A journal entry is a dated, numbered header with balanced debit/credit
//! lines. Only `posted` entries count toward balances and ledgers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CompanyId, JournalEntryId, JournalLineId, UserId};

use super::error::LedgerError;

/// Journal entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Being drafted; may be changed or deleted.
    Draft,
    /// Counts toward balances and ledgers (immutable).
    Posted,
    /// Cancelled after posting (immutable).
    Void,
}

impl EntryStatus {
    /// Returns true if the entry may still be changed or deleted.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if `self -> to` is an allowed transition.
    ///
    /// Only `draft -> posted` and `posted -> void` are allowed.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!((self, to), (Self::Draft, Self::Posted) | (Self::Posted, Self::Void))
    }

    /// Returns the lowercase name used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a journal entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Typed in by a user.
    #[default]
    Manual,
    /// Posted from a sales invoice.
    Invoice,
    /// Posted from an expense receipt.
    Receipt,
    /// Imported from another system.
    Import,
}

impl EntrySource {
    /// Returns the lowercase name used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::Import => "import",
        }
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJournalLine {
    /// Target account.
    pub account_id: AccountId,
    /// Debit amount (>= 0).
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount (>= 0).
    #[serde(default)]
    pub credit: Decimal,
    /// Optional line description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewJournalLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a journal entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    /// Owning company.
    pub company_id: CompanyId,
    /// Entry date.
    pub date: NaiveDate,
    /// Header memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// Origin of the entry.
    #[serde(default)]
    pub source: EntrySource,
    /// Initial status: `draft` or `posted`.
    pub status: EntryStatus,
    /// Creator, supplied by the caller's authentication layer.
    #[serde(default)]
    pub created_by: Option<UserId>,
    /// Explicit entry number (imports only). Allocated when absent.
    #[serde(default)]
    pub entry_number: Option<String>,
    /// Lines in entry order.
    pub lines: Vec<NewJournalLine>,
}

/// Explicit update for a draft entry. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalEntryUpdate {
    /// New entry date.
    pub date: Option<NaiveDate>,
    /// New memo (`Some(None)` clears it).
    pub memo: Option<Option<String>>,
    /// Replacement line set.
    pub lines: Option<Vec<NewJournalLine>>,
}

/// A stored journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Line ID.
    pub id: JournalLineId,
    /// Owning entry.
    pub entry_id: JournalEntryId,
    /// 1-based position in the entry.
    pub line_no: u32,
    /// Target account.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// A stored journal entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Human-readable number, unique per company.
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Header memo.
    pub memo: Option<String>,
    /// Origin of the entry.
    pub source: EntrySource,
    /// Current status.
    pub status: EntryStatus,
    /// Creator.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Lines ordered by `line_no`.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Returns the lines as creation inputs, for re-validation.
    #[must_use]
    pub fn line_inputs(&self) -> Vec<NewJournalLine> {
        self.lines
            .iter()
            .map(|line| NewJournalLine {
                account_id: line.account_id,
                debit: line.debit,
                credit: line.credit,
                description: line.description.clone(),
            })
            .collect()
    }
}

/// Result of creating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEntry {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Allocated entry number.
    pub entry_number: String,
    /// Initial status.
    pub status: EntryStatus,
}

impl From<&JournalEntry> for CreatedEntry {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id,
            entry_number: entry.entry_number.clone(),
            status: entry.status,
        }
    }
}

/// Totals of a validated line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Number of lines.
    pub line_count: usize,
    /// Number of zero/zero memo lines.
    pub memo_lines: usize,
}

/// An inclusive date window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First included date.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Last included date.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a checked range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, LedgerError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// A range with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Checks that the bounds are ordered.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(LedgerError::InvalidDateRange { start, end })
            }
            _ => Ok(()),
        }
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// A posted line joined to its entry header, as read for ledger views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
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
    /// Position in the entry.
    pub line_no: u32,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(EntryStatus::Draft, EntryStatus::Posted, true)]
    #[case(EntryStatus::Posted, EntryStatus::Void, true)]
    #[case(EntryStatus::Draft, EntryStatus::Void, false)]
    #[case(EntryStatus::Posted, EntryStatus::Draft, false)]
    #[case(EntryStatus::Void, EntryStatus::Posted, false)]
    #[case(EntryStatus::Void, EntryStatus::Draft, false)]
    #[case(EntryStatus::Posted, EntryStatus::Posted, false)]
    fn test_status_transitions(
        #[case] from: EntryStatus,
        #[case] to: EntryStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_only_draft_is_editable() {
        assert!(EntryStatus::Draft.is_editable());
        assert!(!EntryStatus::Posted.is_editable());
        assert!(!EntryStatus::Void.is_editable());
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let err = DateRange::new(Some(date(2024, 3, 1)), Some(date(2024, 2, 1))).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDateRange { .. }));
        assert!(DateRange::new(Some(date(2024, 2, 1)), Some(date(2024, 2, 1))).is_ok());
    }

    #[test]
    fn test_date_range_contains_inclusive_bounds() {
        let range = DateRange::new(Some(date(2024, 2, 1)), Some(date(2024, 2, 29))).unwrap();
        assert!(range.contains(date(2024, 2, 1)));
        assert!(range.contains(date(2024, 2, 29)));
        assert!(!range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 3, 1)));
    }

    #[test]
    fn test_open_ended_ranges() {
        let from_feb = DateRange::new(Some(date(2024, 2, 1)), None).unwrap();
        assert!(from_feb.contains(date(2030, 1, 1)));
        assert!(!from_feb.contains(date(2024, 1, 5)));
        assert!(DateRange::unbounded().contains(date(1999, 12, 31)));
    }

    #[test]
    fn test_line_rejects_unknown_fields() {
        let json = r#"{"account_id":"0190d6a4-4b3c-7c3e-8a61-3f1f7d2c9a10","debit":"10.00","tax":"1"}"#;
        assert!(serde_json::from_str::<NewJournalLine>(json).is_err());
    }
}
