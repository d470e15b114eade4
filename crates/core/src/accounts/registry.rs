//! Read access to the chart of accounts.

use std::collections::HashMap;

use tally_shared::types::{AccountId, CompanyId};

use super::types::Account;
use crate::ledger::error::LedgerError;

/// Account lookups used by the ledger service.
///
/// Implemented by the persistence layer; tests use an in-memory double.
pub trait AccountRegistry: Send + Sync {
    /// Finds an account by id.
    fn find_account(
        &self,
        id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Account>, LedgerError>> + Send;

    /// Finds an account by its code within a company.
    fn find_account_by_code(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>, LedgerError>> + Send;

    /// Lists every account of a company, archived included, ordered by code.
    fn list_accounts(
        &self,
        company_id: CompanyId,
    ) -> impl std::future::Future<Output = Result<Vec<Account>, LedgerError>> + Send;

    /// Loads the given accounts. Unknown ids are simply absent from the map.
    fn accounts_by_ids(
        &self,
        ids: &[AccountId],
    ) -> impl std::future::Future<Output = Result<HashMap<AccountId, Account>, LedgerError>> + Send;
}
