//! Core business logic for Tally.
//!
//! This crate contains pure general-ledger logic with ZERO web or database
//! dependencies. Persistence is reached only through the store traits in
//! [`accounts::AccountRegistry`] and [`ledger::store`].
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts, normal balances, lifecycle rules
//! - `ledger` - Journal entries, validation, numbering, balances, ledger views
//! - `documents` - Invoice arithmetic and document-to-entry posting

pub mod accounts;
pub mod documents;
pub mod ledger;
