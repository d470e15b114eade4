//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! The account, journal and ledger repositories implement the store traits
//! of `tally-core`, so `LedgerService` runs on them unchanged.

pub mod account;
pub mod company;
pub mod journal;
pub mod ledger;

pub use account::AccountRepository;
pub use company::CompanyRepository;
pub use journal::JournalRepository;
pub use ledger::LedgerQueryRepository;

use sea_orm::{DbErr, SqlErr};
use tally_core::ledger::LedgerError;

/// Maps a database error into the ledger's internal error.
pub(crate) fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Returns true if the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Returns true if the error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
