//! Database seeder for Tally development and testing.
//!
//! Seeds a demo company with the default chart of accounts and a handful of
//! postings (owner capital, an expense receipt with VAT, a sales invoice and
//! one draft) so balances and ledgers have something to show.
//!
//! Usage: TALLY__DATABASE__URL=postgres://... cargo run --bin seeder

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tally_core::accounts::chart::{
    ACCOUNTS_RECEIVABLE, BANK, CASH, OWNER_EQUITY, SALES, VAT_INPUT, VAT_OUTPUT,
};
use tally_core::accounts::{AccountRegistry, default_chart_of_accounts};
use tally_core::documents::{
    ExpensePosting, InvoiceLine, PostingHeader, SalesInvoicePosting, compute_invoice_totals,
};
use tally_core::ledger::{DateRange, EntrySource, EntryStatus, NewJournalEntry, NewJournalLine};
use tally_db::{AccountRepository, CompanyRepository, PgLedgerService, ledger_service};
use tally_shared::AppConfig;
use tally_shared::types::{AccountId, CompanyId};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo company ID (consistent for all seeds)
const DEMO_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";

const RENT: &str = "6100";
const OFFICE_SUPPLIES: &str = "6400";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,sea_orm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = tally_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;

    let company_id = CompanyId::from_uuid(Uuid::parse_str(DEMO_COMPANY_ID)?);
    let accounts = AccountRepository::new(db.clone());
    let service = ledger_service(&db, &config.ledger);

    if seed_company(&db, company_id).await? {
        let chart = accounts
            .create_accounts(default_chart_of_accounts(company_id))
            .await?;
        info!(count = chart.len(), "Chart of accounts seeded");

        seed_postings(&accounts, &service, company_id).await?;
    } else {
        info!(company_id = %company_id, "Demo company already exists, skipping");
    }

    for balance in service
        .accounts_with_balances(company_id, DateRange::unbounded())
        .await?
    {
        info!(
            code = %balance.account.code,
            name = %balance.account.name,
            balance = %balance.balance,
            "Account balance"
        );
    }

    info!("Seeding complete");
    Ok(())
}

/// Inserts the demo company. Returns false if it already exists.
async fn seed_company(db: &DatabaseConnection, company_id: CompanyId) -> Result<bool> {
    let companies = CompanyRepository::new(db.clone());
    if companies.find_by_id(company_id).await?.is_some() {
        return Ok(false);
    }

    companies
        .create_with_id(company_id, "Demo Trading LLC")
        .await?;
    Ok(true)
}

async fn account_id(
    accounts: &AccountRepository,
    company_id: CompanyId,
    code: &str,
) -> Result<AccountId> {
    accounts
        .find_account_by_code(company_id, code)
        .await?
        .map(|account| account.id)
        .with_context(|| format!("Account {code} missing from the chart"))
}

fn day(d: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 1, d).context("invalid seed date")
}

async fn seed_postings(
    accounts: &AccountRepository,
    service: &PgLedgerService,
    company_id: CompanyId,
) -> Result<()> {
    let bank = account_id(accounts, company_id, BANK).await?;
    let cash = account_id(accounts, company_id, CASH).await?;
    let equity = account_id(accounts, company_id, OWNER_EQUITY).await?;
    let receivable = account_id(accounts, company_id, ACCOUNTS_RECEIVABLE).await?;
    let supplies = account_id(accounts, company_id, OFFICE_SUPPLIES).await?;

    let capital = service
        .create_journal_entry(NewJournalEntry {
            company_id,
            date: day(2)?,
            memo: Some("Owner capital contribution".to_string()),
            source: EntrySource::Manual,
            status: EntryStatus::Posted,
            created_by: None,
            entry_number: None,
            lines: vec![
                NewJournalLine::debit(bank, dec!(50000.00)),
                NewJournalLine::credit(equity, dec!(50000.00)),
            ],
        })
        .await?;
    info!(entry_number = %capital.entry_number, "Capital seeded");

    let rent = service
        .post_expense(
            &PostingHeader {
                company_id,
                date: day(10)?,
                memo: Some("January office rent".to_string()),
                created_by: None,
            },
            &ExpensePosting {
                debit_account: Some(account_id(accounts, company_id, RENT).await?),
                credit_account: Some(bank),
                vat_account: Some(account_id(accounts, company_id, VAT_INPUT).await?),
                gross: dec!(5250.00),
                vat: Some(dec!(250.00)),
            },
        )
        .await?;
    info!(entry_number = %rent.entry_number, "Expense receipt seeded");

    let totals = compute_invoice_totals(&[
        InvoiceLine {
            quantity: dec!(3),
            unit_price: dec!(1200.00),
            vat_rate: dec!(0.05),
        },
        InvoiceLine {
            quantity: dec!(2),
            unit_price: dec!(450.50),
            vat_rate: dec!(0.05),
        },
    ])?;
    let invoice = service
        .post_sales_invoice(
            &PostingHeader {
                company_id,
                date: day(15)?,
                memo: Some("Invoice INV-0001".to_string()),
                created_by: None,
            },
            &SalesInvoicePosting {
                receivable_account: Some(receivable),
                income_account: Some(account_id(accounts, company_id, SALES).await?),
                vat_account: Some(account_id(accounts, company_id, VAT_OUTPUT).await?),
                totals,
            },
        )
        .await?;
    info!(
        entry_number = %invoice.entry_number,
        total = %totals.total,
        "Sales invoice seeded"
    );

    let draft = service
        .create_journal_entry(NewJournalEntry {
            company_id,
            date: day(20)?,
            memo: Some("Stationery, awaiting receipt".to_string()),
            source: EntrySource::Manual,
            status: EntryStatus::Draft,
            created_by: None,
            entry_number: None,
            lines: vec![
                NewJournalLine::debit(supplies, dec!(120.00)).with_description("Printer paper"),
                NewJournalLine::credit(cash, dec!(120.00)),
            ],
        })
        .await?;
    info!(entry_number = %draft.entry_number, "Draft entry seeded");

    Ok(())
}
