//! Chart of accounts.
//!
//! - Account types and their normal balance side
//! - Lifecycle rules (archive, delete, type lock, bulk duplicates)
//! - The default onboarding chart
//! - The registry trait the ledger reads accounts through

pub mod chart;
pub mod registry;
pub mod rules;
pub mod types;

pub use chart::default_chart_of_accounts;
pub use registry::AccountRegistry;
pub use rules::{ensure_archivable, ensure_deletable, ensure_update_allowed, find_duplicate_codes};
pub use types::{Account, AccountType, AccountUpdate, NewAccount, NormalBalance};
