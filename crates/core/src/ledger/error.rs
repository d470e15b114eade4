//! Ledger error types for validation, state, and concurrency errors.
//!
//! Every variant belongs to exactly one [`ErrorKind`], which is what callers
//! branch on. Validation errors are raised before anything is written.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{AccountId, CompanyId, JournalEntryId};
use thiserror::Error;

use super::types::EntryStatus;

/// Error taxonomy for ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; nothing was written.
    Validation,
    /// Input is well formed but the current state forbids the operation.
    BusinessRule,
    /// A uniqueness rule would be violated.
    Conflict,
    /// The target does not exist.
    NotFound,
    /// A concurrent writer won a race; the caller may retry.
    Concurrency,
    /// Storage or programming error.
    Internal,
}

/// Posting side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingSide {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

impl std::fmt::Display for PostingSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => f.write_str("debit"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry has no lines.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// Debits and credits differ by more than the tolerance.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}, Difference: {diff}")]
    UnbalancedEntry {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
        /// `debit - credit`.
        diff: Decimal,
    },

    /// A line carries a negative amount.
    #[error("Line {line_no} has a negative amount")]
    NegativeAmount {
        /// 1-based line position.
        line_no: usize,
    },

    /// A line carries both a debit and a credit.
    #[error("Line {line_no} has both a debit and a credit")]
    BothSidesOnLine {
        /// 1-based line position.
        line_no: usize,
    },

    /// A line references an account that does not exist.
    #[error("Line references unknown account: {0}")]
    UnknownAccount(AccountId),

    /// A line references an account of another company.
    #[error("Account {account_id} does not belong to company {company_id}")]
    AccountCompanyMismatch {
        /// The referenced account.
        account_id: AccountId,
        /// The entry's company.
        company_id: CompanyId,
    },

    /// A line references an inactive or archived account.
    #[error("Account {0} is inactive or archived")]
    AccountInactive(AccountId),

    /// A document posting has no account selected for one side.
    #[error("No {side} account selected for posting")]
    MissingPostingAccount {
        /// The side that is missing.
        side: PostingSide,
    },

    /// A document amount is zero or negative.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Start date is after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Entries cannot be created directly in this status.
    #[error("Journal entries cannot be created as {0}")]
    InvalidInitialStatus(EntryStatus),

    // ========== Business Rule Errors ==========
    /// Entry is not a draft and cannot be changed or deleted.
    #[error("Journal entry {id} is {status}; only draft entries can be changed")]
    EntryNotEditable {
        /// The entry.
        id: JournalEntryId,
        /// Its current status.
        status: EntryStatus,
    },

    /// Status transition is not allowed.
    #[error("Cannot move journal entry from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: EntryStatus,
        /// Requested status.
        to: EntryStatus,
    },

    /// System accounts cannot be archived or deleted.
    #[error("Account {0} is a system account")]
    SystemAccountProtected(AccountId),

    /// Account has posted lines and can only be archived.
    #[error("Account {account_id} has {line_count} journal lines and can only be archived")]
    AccountHasPostings {
        /// The account.
        account_id: AccountId,
        /// Number of lines referencing it.
        line_count: u64,
    },

    /// Account type cannot change once lines exist.
    #[error("Cannot change account type for account {0} because it has journal lines")]
    AccountTypeLocked(AccountId),

    // ========== Conflict Errors ==========
    /// Entry number already used in the company.
    #[error("Entry number '{0}' already exists")]
    DuplicateEntryNumber(String),

    /// One account code already exists in the company.
    #[error("Account code '{0}' already exists")]
    DuplicateAccountCode(String),

    /// A bulk creation batch contains conflicting codes.
    #[error("Account codes already exist or repeat in batch: {}", .0.join(", "))]
    DuplicateAccountCodes(Vec<String>),

    // ========== Not Found Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    // ========== Concurrency Errors ==========
    /// Entry-number allocation kept colliding with concurrent writers.
    #[error("Could not allocate a unique entry number after {attempts} attempts, please retry")]
    NumberAllocationExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// A concurrent status change won.
    #[error("Journal entry {0} was modified concurrently, please retry")]
    ConcurrentModification(JournalEntryId),

    // ========== Internal Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyEntry
            | Self::UnbalancedEntry { .. }
            | Self::NegativeAmount { .. }
            | Self::BothSidesOnLine { .. }
            | Self::UnknownAccount(_)
            | Self::AccountCompanyMismatch { .. }
            | Self::AccountInactive(_)
            | Self::MissingPostingAccount { .. }
            | Self::InvalidAmount(_)
            | Self::InvalidDateRange { .. }
            | Self::InvalidInitialStatus(_) => ErrorKind::Validation,

            Self::EntryNotEditable { .. }
            | Self::InvalidStatusTransition { .. }
            | Self::SystemAccountProtected(_)
            | Self::AccountHasPostings { .. }
            | Self::AccountTypeLocked(_) => ErrorKind::BusinessRule,

            Self::DuplicateEntryNumber(_)
            | Self::DuplicateAccountCode(_)
            | Self::DuplicateAccountCodes(_) => ErrorKind::Conflict,

            Self::AccountNotFound(_) | Self::EntryNotFound(_) => ErrorKind::NotFound,

            Self::NumberAllocationExhausted { .. } | Self::ConcurrentModification(_) => {
                ErrorKind::Concurrency
            }

            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSidesOnLine { .. } => "BOTH_SIDES_ON_LINE",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::AccountCompanyMismatch { .. } => "ACCOUNT_COMPANY_MISMATCH",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::MissingPostingAccount { .. } => "MISSING_POSTING_ACCOUNT",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidInitialStatus(_) => "INVALID_INITIAL_STATUS",
            Self::EntryNotEditable { .. } => "ENTRY_NOT_EDITABLE",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::SystemAccountProtected(_) => "SYSTEM_ACCOUNT_PROTECTED",
            Self::AccountHasPostings { .. } => "ACCOUNT_HAS_POSTINGS",
            Self::AccountTypeLocked(_) => "ACCOUNT_TYPE_LOCKED",
            Self::DuplicateEntryNumber(_) => "DUPLICATE_ENTRY_NUMBER",
            Self::DuplicateAccountCode(_) | Self::DuplicateAccountCodes(_) => {
                "DUPLICATE_ACCOUNT_CODE"
            }
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::NumberAllocationExhausted { .. } => "NUMBER_ALLOCATION_EXHAUSTED",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::BusinessRule => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict | ErrorKind::Concurrency => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Concurrency)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Database(_) => Self::Database(message),
            other => match other.kind() {
                ErrorKind::Validation => Self::Validation(message),
                ErrorKind::BusinessRule => Self::BusinessRule(message),
                ErrorKind::Conflict => Self::Conflict(message),
                ErrorKind::NotFound => Self::NotFound(message),
                ErrorKind::Concurrency => Self::Concurrency(message),
                ErrorKind::Internal => Self::Internal(message),
            },
        }
    }
}
