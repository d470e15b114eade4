//! Aggregate queries over posted journal lines.
//!
//! Status and date filtering happen in SQL; only posted entries are ever
//! summed or listed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};
use tally_core::ledger::{AccountTotals, DateRange, LedgerError, PostedLine, PostingQueries};
use tally_shared::types::{AccountId, CompanyId, JournalEntryId, JournalLineId};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::db_err;

const ACCOUNT_TOTALS_SQL: &str = r"
SELECT
    l.account_id,
    COALESCE(SUM(l.debit), 0) AS debit_total,
    COALESCE(SUM(l.credit), 0) AS credit_total
FROM journal_lines l
JOIN journal_entries e ON e.id = l.entry_id
WHERE e.company_id = $1
  AND e.status = 'posted'
  AND ($2::DATE IS NULL OR e.entry_date >= $2::DATE)
  AND ($3::DATE IS NULL OR e.entry_date <= $3::DATE)
GROUP BY l.account_id
";

const TOTALS_BEFORE_SQL: &str = r"
SELECT
    COALESCE(SUM(l.debit), 0) AS debit_total,
    COALESCE(SUM(l.credit), 0) AS credit_total
FROM journal_lines l
JOIN journal_entries e ON e.id = l.entry_id
WHERE l.account_id = $1
  AND e.status = 'posted'
  AND e.entry_date < $2
";

const POSTED_LINES_SQL: &str = r#"
SELECT
    l.id AS line_id,
    l.entry_id,
    e.entry_number,
    e.entry_date,
    e.memo,
    l.description,
    l.line_no,
    l.debit,
    l.credit
FROM journal_lines l
JOIN journal_entries e ON e.id = l.entry_id
WHERE l.account_id = $1
  AND e.status = 'posted'
  AND ($2::DATE IS NULL OR e.entry_date >= $2::DATE)
  AND ($3::DATE IS NULL OR e.entry_date <= $3::DATE)
ORDER BY e.entry_date, LENGTH(e.entry_number), e.entry_number COLLATE "C", l.line_no
"#;

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    account_id: Uuid,
    debit_total: Decimal,
    credit_total: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct SumsRow {
    debit_total: Decimal,
    credit_total: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct PostedLineRow {
    line_id: Uuid,
    entry_id: Uuid,
    entry_number: String,
    entry_date: NaiveDate,
    memo: Option<String>,
    description: Option<String>,
    line_no: i32,
    debit: Decimal,
    credit: Decimal,
}

impl From<PostedLineRow> for PostedLine {
    fn from(row: PostedLineRow) -> Self {
        Self {
            line_id: JournalLineId::from_uuid(row.line_id),
            entry_id: JournalEntryId::from_uuid(row.entry_id),
            entry_number: row.entry_number,
            date: row.entry_date,
            memo: row.memo,
            description: row.description,
            line_no: row.line_no.unsigned_abs(),
            debit: row.debit,
            credit: row.credit,
        }
    }
}

/// Read-only ledger queries implementing [`PostingQueries`].
#[derive(Debug, Clone)]
pub struct LedgerQueryRepository {
    db: DatabaseConnection,
}

impl LedgerQueryRepository {
    /// Creates a new ledger query repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostingQueries for LedgerQueryRepository {
    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn account_totals(
        &self,
        company_id: CompanyId,
        range: DateRange,
    ) -> Result<Vec<AccountTotals>, LedgerError> {
        let rows = TotalsRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ACCOUNT_TOTALS_SQL,
            [
                company_id.into_inner().into(),
                range.start.into(),
                range.end.into(),
            ],
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        debug!(accounts = rows.len(), "Account totals aggregated");
        Ok(rows
            .into_iter()
            .map(|row| AccountTotals {
                account_id: AccountId::from_uuid(row.account_id),
                debit_total: row.debit_total,
                credit_total: row.credit_total,
            })
            .collect())
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn totals_before(
        &self,
        account_id: AccountId,
        before: NaiveDate,
    ) -> Result<AccountTotals, LedgerError> {
        let row = SumsRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            TOTALS_BEFORE_SQL,
            [account_id.into_inner().into(), before.into()],
        ))
        .one(&self.db)
        .await
        .map_err(db_err)?;

        let mut totals = AccountTotals::zero(account_id);
        if let Some(row) = row {
            totals.add(row.debit_total, row.credit_total);
        }
        debug!(
            debit_total = %totals.debit_total,
            credit_total = %totals.credit_total,
            "Opening totals aggregated"
        );
        Ok(totals)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn posted_lines(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<PostedLine>, LedgerError> {
        let rows = PostedLineRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            POSTED_LINES_SQL,
            [
                account_id.into_inner().into(),
                range.start.into(),
                range.end.into(),
            ],
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        debug!(lines = rows.len(), "Posted lines loaded");
        Ok(rows.into_iter().map(PostedLine::from).collect())
    }
}
