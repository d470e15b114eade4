//! Journal repository: atomic entry writes and lifecycle transitions.
//!
//! Entry numbers are allocated from `entry_number_sequences` inside the
//! same database transaction that writes the header and its lines, so an
//! entry either exists completely with a unique number or not at all.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set, Statement,
    TransactionTrait,
};
use tally_core::ledger::{
    EntryNumber, EntryStatus, JournalEntry, JournalStore, LedgerError, NewJournalEntry,
    NewJournalLine,
};
use tally_shared::LedgerConfig;
use tally_shared::types::{CompanyId, JournalEntryId, JournalLineId};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{db_err, is_unique_violation};
use crate::entities::{journal_entries, journal_lines};

/// Bumps the day counter, seeding it from the entries already numbered for
/// that day on first use. The counter row stays locked until commit.
const ALLOCATE_SEQUENCE_SQL: &str = r"
INSERT INTO entry_number_sequences (company_id, entry_date, last_value)
VALUES (
    $1,
    $2,
    (SELECT COUNT(*) FROM journal_entries WHERE company_id = $1 AND entry_number LIKE $3)::INT + 1
)
ON CONFLICT (company_id, entry_date)
DO UPDATE SET last_value = entry_number_sequences.last_value + 1
RETURNING last_value
";

const PEEK_SEQUENCE_SQL: &str = r"
SELECT (COALESCE(
    (SELECT last_value FROM entry_number_sequences WHERE company_id = $1 AND entry_date = $2),
    (SELECT COUNT(*) FROM journal_entries WHERE company_id = $1 AND entry_number LIKE $3)
) + 1)::INT AS last_value
";

const UPDATE_DRAFT_SQL: &str = r"
UPDATE journal_entries
SET entry_date = $2, memo = $3, updated_at = now()
WHERE id = $1 AND status = 'draft'
";

const DELETE_DRAFT_SQL: &str = r"
DELETE FROM journal_entries
WHERE id = $1 AND status = 'draft'
";

const TRANSITION_SQL: &str = r"
UPDATE journal_entries
SET status = $3::entry_status, updated_at = now()
WHERE id = $1 AND status = $2::entry_status
";

#[derive(Debug, FromQueryResult)]
struct SequenceRow {
    last_value: i32,
}

impl SequenceRow {
    fn sequence(&self) -> Result<u32, LedgerError> {
        u32::try_from(self.last_value).map_err(|_| {
            LedgerError::Internal(format!("invalid entry sequence value {}", self.last_value))
        })
    }
}

fn sequence_statement(sql: &str, company_id: CompanyId, date: NaiveDate) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [
            company_id.into_inner().into(),
            date.into(),
            format!("{}%", EntryNumber::day_prefix(date)).into(),
        ],
    )
}

fn line_models(entry_id: Uuid, lines: &[NewJournalLine]) -> Vec<journal_lines::ActiveModel> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    lines
        .iter()
        .zip(1i32..)
        .map(|(line, line_no)| journal_lines::ActiveModel {
            id: Set(JournalLineId::new().into_inner()),
            entry_id: Set(entry_id),
            line_no: Set(line_no),
            account_id: Set(line.account_id.into_inner()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            description: Set(line.description.clone()),
            created_at: Set(now),
        })
        .collect()
}

async fn insert_lines<C: ConnectionTrait>(
    db: &C,
    entry_id: Uuid,
    lines: &[NewJournalLine],
) -> Result<(), DbErr> {
    if lines.is_empty() {
        return Ok(());
    }
    journal_lines::Entity::insert_many(line_models(entry_id, lines))
        .exec(db)
        .await?;
    Ok(())
}

async fn load_lines<C: ConnectionTrait>(
    db: &C,
    entry_id: Uuid,
) -> Result<Vec<journal_lines::Model>, DbErr> {
    journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.eq(entry_id))
        .order_by_asc(journal_lines::Column::LineNo)
        .all(db)
        .await
}

/// Inserts the header inside a savepoint so a number collision leaves the
/// outer transaction usable.
async fn insert_header(
    txn: &DatabaseTransaction,
    header: journal_entries::ActiveModel,
) -> Result<journal_entries::Model, DbErr> {
    let savepoint = txn.begin().await?;
    match header.insert(&savepoint).await {
        Ok(model) => {
            savepoint.commit().await?;
            Ok(model)
        }
        Err(err) => {
            savepoint.rollback().await?;
            Err(err)
        }
    }
}

/// Journal repository implementing [`JournalStore`] on Postgres.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    max_attempts: u32,
}

impl JournalRepository {
    /// Creates a journal repository with default ledger settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, &LedgerConfig::default())
    }

    /// Creates a journal repository using the configured retry budget.
    #[must_use]
    pub fn with_config(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            max_attempts: config.numbering_max_attempts.max(1),
        }
    }

    fn header_model(
        id: Uuid,
        entry: &NewJournalEntry,
        entry_number: String,
    ) -> journal_entries::ActiveModel {
        let now = chrono::Utc::now().into();
        journal_entries::ActiveModel {
            id: Set(id),
            company_id: Set(entry.company_id.into_inner()),
            entry_number: Set(entry_number),
            entry_date: Set(entry.date),
            memo: Set(entry.memo.clone()),
            source: Set(entry.source.into()),
            status: Set(entry.status.into()),
            created_by: Set(entry.created_by.map(|id| id.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    /// Allocates a number and inserts the header, allocating again while the
    /// number collides with an existing entry.
    async fn insert_numbered_header(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        entry: &NewJournalEntry,
    ) -> Result<journal_entries::Model, LedgerError> {
        for attempt in 1..=self.max_attempts {
            let row = SequenceRow::find_by_statement(sequence_statement(
                ALLOCATE_SEQUENCE_SQL,
                entry.company_id,
                entry.date,
            ))
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::Internal("entry sequence returned no row".to_string()))?;

            let entry_number = EntryNumber::new(entry.date, row.sequence()?).to_string();
            match insert_header(txn, Self::header_model(id, entry, entry_number.clone())).await {
                Ok(model) => return Ok(model),
                Err(err) if is_unique_violation(&err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        entry_number = %entry_number,
                        "Entry number already taken, allocating again"
                    );
                }
                Err(err) => return Err(db_err(err)),
            }
        }

        Err(LedgerError::NumberAllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    async fn load_entry<C: ConnectionTrait>(
        db: &C,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        let Some(header) = journal_entries::Entity::find_by_id(id.into_inner())
            .one(db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let lines = load_lines(db, header.id).await.map_err(db_err)?;
        Ok(Some(header.into_entry(lines)))
    }
}

impl JournalStore for JournalRepository {
    #[instrument(skip(self, entry), fields(company_id = %entry.company_id, date = %entry.date))]
    async fn create_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let id = JournalEntryId::new().into_inner();

        let header = match &entry.entry_number {
            Some(number) => insert_header(&txn, Self::header_model(id, entry, number.clone()))
                .await
                .map_err(|err| {
                    if is_unique_violation(&err) {
                        LedgerError::DuplicateEntryNumber(number.clone())
                    } else {
                        db_err(err)
                    }
                })?,
            None => self.insert_numbered_header(&txn, id, entry).await?,
        };

        insert_lines(&txn, id, &entry.lines).await.map_err(db_err)?;
        let lines = load_lines(&txn, id).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(entry_id = %id, entry_number = %header.entry_number, "Journal entry stored");
        Ok(header.into_entry(lines))
    }

    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, LedgerError> {
        Self::load_entry(&self.db, id).await
    }

    #[instrument(skip(self, memo, lines), fields(entry_id = %id))]
    async fn update_draft(
        &self,
        id: JournalEntryId,
        date: NaiveDate,
        memo: Option<String>,
        lines: Option<&[NewJournalLine]>,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let result = txn
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                UPDATE_DRAFT_SQL,
                [id.into_inner().into(), date.into(), memo.into()],
            ))
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::ConcurrentModification(id));
        }

        if let Some(lines) = lines {
            journal_lines::Entity::delete_many()
                .filter(journal_lines::Column::EntryId.eq(id.into_inner()))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            insert_lines(&txn, id.into_inner(), lines)
                .await
                .map_err(db_err)?;
        }

        let entry = Self::load_entry(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        txn.commit().await.map_err(db_err)?;
        Ok(entry)
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn delete_draft(&self, id: JournalEntryId) -> Result<(), LedgerError> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                DELETE_DRAFT_SQL,
                [id.into_inner().into()],
            ))
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::ConcurrentModification(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(entry_id = %id, from = %from, to = %to))]
    async fn transition_status(
        &self,
        id: JournalEntryId,
        from: EntryStatus,
        to: EntryStatus,
    ) -> Result<JournalEntry, LedgerError> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                TRANSITION_SQL,
                [
                    id.into_inner().into(),
                    from.as_str().into(),
                    to.as_str().into(),
                ],
            ))
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::ConcurrentModification(id));
        }

        Self::load_entry(&self.db, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))
    }

    async fn peek_entry_number(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<String, LedgerError> {
        let row = SequenceRow::find_by_statement(sequence_statement(
            PEEK_SEQUENCE_SQL,
            company_id,
            date,
        ))
        .one(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| LedgerError::Internal("entry sequence preview returned no row".to_string()))?;

        Ok(EntryNumber::new(date, row.sequence()?).to_string())
    }
}
