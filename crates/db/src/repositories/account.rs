//! Account repository for chart of accounts database operations.
//!
//! Lookups implement [`AccountRegistry`]; mutations enforce the lifecycle
//! rules from `tally_core::accounts::rules` before touching the table.

use std::collections::{BTreeMap, HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::accounts::{
    Account, AccountRegistry, AccountUpdate, NewAccount, ensure_archivable, ensure_deletable,
    ensure_update_allowed, find_duplicate_codes,
};
use tally_core::ledger::LedgerError;
use tally_shared::types::{AccountId, CompanyId};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{db_err, is_foreign_key_violation, is_unique_violation};
use crate::entities::{accounts, journal_lines};

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

fn new_active_model(
    id: Uuid,
    input: &NewAccount,
    now: sea_orm::prelude::DateTimeWithTimeZone,
) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(id),
        company_id: Set(input.company_id.into_inner()),
        code: Set(input.code.clone()),
        name: Set(input.name.clone()),
        localized_name: Set(input.localized_name.clone()),
        account_type: Set(input.account_type.into()),
        is_vat_account: Set(input.is_vat_account),
        is_system_account: Set(input.is_system_account),
        is_active: Set(true),
        is_archived: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Codes in `by_company` that repeat within their batch or already exist in
/// their company, sorted and deduplicated.
async fn conflicting_codes<C: ConnectionTrait>(
    conn: &C,
    by_company: &BTreeMap<CompanyId, Vec<NewAccount>>,
) -> Result<Vec<String>, LedgerError> {
    let company_ids: Vec<Uuid> = by_company.keys().map(|id| id.into_inner()).collect();
    let existing: Vec<(Uuid, String)> = accounts::Entity::find()
        .select_only()
        .column(accounts::Column::CompanyId)
        .column(accounts::Column::Code)
        .filter(accounts::Column::CompanyId.is_in(company_ids))
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)?;

    let mut existing_codes: HashMap<CompanyId, HashSet<String>> = HashMap::new();
    for (company_id, code) in existing {
        existing_codes
            .entry(CompanyId::from_uuid(company_id))
            .or_default()
            .insert(code);
    }

    let empty = HashSet::new();
    let mut duplicates: Vec<String> = by_company
        .iter()
        .flat_map(|(company_id, batch)| {
            find_duplicate_codes(existing_codes.get(company_id).unwrap_or(&empty), batch)
        })
        .collect();
    duplicates.sort();
    duplicates.dedup();
    Ok(duplicates)
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: AccountId) -> Result<accounts::Model, LedgerError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Creates a single account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode` if the code is already used in the company.
    #[instrument(skip(self, input), fields(company_id = %input.company_id, code = %input.code))]
    pub async fn create_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        if self.code_exists(input.company_id, &input.code).await? {
            return Err(LedgerError::DuplicateAccountCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let model = new_active_model(AccountId::new().into_inner(), &input, now)
            .insert(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    LedgerError::DuplicateAccountCode(input.code.clone())
                } else {
                    db_err(err)
                }
            })?;

        info!(account_id = %model.id, "Account created");
        Ok(model.into())
    }

    /// Creates a batch of accounts in one transaction.
    ///
    /// Codes repeating inside the batch or already present in their company
    /// are reported together and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCodes` listing every conflicting code.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn create_accounts(&self, inputs: Vec<NewAccount>) -> Result<Vec<Account>, LedgerError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_company: BTreeMap<CompanyId, Vec<NewAccount>> = BTreeMap::new();
        for input in &inputs {
            by_company
                .entry(input.company_id)
                .or_default()
                .push(input.clone());
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let duplicates = conflicting_codes(&txn, &by_company).await?;
        if !duplicates.is_empty() {
            return Err(LedgerError::DuplicateAccountCodes(duplicates));
        }

        let now = chrono::Utc::now().into();
        let ids: Vec<Uuid> = inputs.iter().map(|_| AccountId::new().into_inner()).collect();
        let models: Vec<accounts::ActiveModel> = ids
            .iter()
            .zip(&inputs)
            .map(|(id, input)| new_active_model(*id, input, now))
            .collect();

        if let Err(err) = accounts::Entity::insert_many(models).exec(&txn).await {
            // A concurrent batch committed one of the codes after our check.
            if is_unique_violation(&err) {
                txn.rollback().await.map_err(db_err)?;
                let mut duplicates = conflicting_codes(&self.db, &by_company).await?;
                if duplicates.is_empty() {
                    duplicates = inputs.iter().map(|input| input.code.clone()).collect();
                    duplicates.sort();
                    duplicates.dedup();
                }
                warn!(codes = ?duplicates, "Account batch lost a race on codes");
                return Err(LedgerError::DuplicateAccountCodes(duplicates));
            }
            return Err(db_err(err));
        }

        let created = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids))
            .order_by_asc(accounts::Column::CompanyId)
            .order_by_asc(accounts::Column::Code)
            .all(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(count = created.len(), "Accounts created");
        Ok(created.into_iter().map(Account::from).collect())
    }

    /// Applies an explicit update to an account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account not found
    /// - The new code is already used in the company
    /// - The type changes while the account has journal lines
    #[instrument(skip(self, update), fields(account_id = %id))]
    pub async fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let model = self.find_model(id).await?;
        if update.is_empty() {
            return Ok(model.into());
        }

        let current: Account = model.clone().into();
        let type_changes = update
            .account_type
            .is_some_and(|account_type| account_type != current.account_type);
        let line_count = if type_changes {
            self.count_lines(id).await?
        } else {
            0
        };
        ensure_update_allowed(&current, &update, line_count)?;

        if let Some(new_code) = &update.code
            && *new_code != current.code
            && self.code_exists(current.company_id, new_code).await?
        {
            return Err(LedgerError::DuplicateAccountCode(new_code.clone()));
        }

        let mut active: accounts::ActiveModel = model.into();
        let attempted_code = update.code.clone();
        if let Some(code) = update.code {
            active.code = Set(code);
        }
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(localized_name) = update.localized_name {
            active.localized_name = Set(localized_name);
        }
        if let Some(account_type) = update.account_type {
            active.account_type = Set(account_type.into());
        }
        if let Some(is_vat_account) = update.is_vat_account {
            active.is_vat_account = Set(is_vat_account);
        }
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await.map_err(|err| {
            match attempted_code {
                Some(code) if is_unique_violation(&err) => LedgerError::DuplicateAccountCode(code),
                _ => db_err(err),
            }
        })?;

        Ok(updated.into())
    }

    /// Soft-deletes an account: archived accounts stay in balance listings
    /// but accept no new postings.
    ///
    /// # Errors
    ///
    /// Returns `SystemAccountProtected` for system accounts.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn archive_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let model = self.find_model(id).await?;
        ensure_archivable(&model.clone().into())?;

        let mut active: accounts::ActiveModel = model.into();
        active.is_archived = Set(true);
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&self.db).await.map_err(db_err)?;

        info!("Account archived");
        Ok(updated.into())
    }

    /// Hard-deletes an account that no journal line references.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account not found
    /// - Account is a system account
    /// - Account has journal lines (archive it instead)
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn delete_account(&self, id: AccountId) -> Result<(), LedgerError> {
        let model = self.find_model(id).await?;
        let line_count = self.count_lines(id).await?;
        ensure_deletable(&model.into(), line_count)?;

        if let Err(err) = accounts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
        {
            // A line may have been written since the count.
            if is_foreign_key_violation(&err) {
                let line_count = self.count_lines(id).await?;
                return Err(LedgerError::AccountHasPostings {
                    account_id: id,
                    line_count,
                });
            }
            return Err(db_err(err));
        }

        info!("Account deleted");
        Ok(())
    }

    /// Counts journal lines referencing an account, whatever the entry status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_lines(&self, id: AccountId) -> Result<u64, LedgerError> {
        journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(id.into_inner()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    /// Checks if an account code exists in a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn code_exists(&self, company_id: CompanyId, code: &str) -> Result<bool, LedgerError> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(count > 0)
    }
}

impl AccountRegistry for AccountRepository {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Account::from))
    }

    async fn find_account_by_code(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Account::from))
    }

    async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LedgerError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn accounts_by_ids(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, Account>, LedgerError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models
            .into_iter()
            .map(|model| (AccountId::from_uuid(model.id), Account::from(model)))
            .collect())
    }
}
