//! Property-based tests for `LedgerService` over the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::CompanyId;

use super::memory::MemoryLedger;
use super::service::LedgerService;
use super::types::{DateRange, EntrySource, EntryStatus, NewJournalEntry, NewJournalLine};
use super::view::LedgerQuery;
use crate::accounts::{AccountType, NormalBalance};

/// One generated posting: day of June 2024, amount, status, direction.
#[derive(Debug, Clone)]
struct Posting {
    day: u32,
    amount: Decimal,
    status: EntryStatus,
    cash_debit: bool,
}

fn posting_strategy() -> impl Strategy<Value = Posting> {
    (
        1u32..=30,
        (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        prop_oneof![
            3 => Just(EntryStatus::Posted),
            1 => Just(EntryStatus::Draft),
        ],
        any::<bool>(),
    )
        .prop_map(|(day, amount, status, cash_debit)| Posting {
            day,
            amount,
            status,
            cash_debit,
        })
}

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// *For any* mix of posted and draft entries, the cash balance equals the
    /// signed sum of posted movements only, and the unwindowed ledger's
    /// closing balance agrees with it.
    #[test]
    fn prop_balances_count_posted_only(postings in prop::collection::vec(posting_strategy(), 1..25)) {
        runtime().block_on(async {
            let store = Arc::new(MemoryLedger::new());
            let service = LedgerService::new(store.clone(), store.clone(), store.clone());
            let company = CompanyId::new();
            let cash = store.add_account(company, "1000", AccountType::Asset);
            let sales = store.add_account(company, "4000", AccountType::Income);

            let mut expected = Decimal::ZERO;
            for p in &postings {
                let (debit_account, credit_account) = if p.cash_debit { (cash.id, sales.id) } else { (sales.id, cash.id) };
                service
                    .create_journal_entry(NewJournalEntry {
                        company_id: company,
                        date: june(p.day),
                        memo: None,
                        source: EntrySource::Manual,
                        status: p.status,
                        created_by: None,
                        entry_number: None,
                        lines: vec![
                            NewJournalLine::debit(debit_account, p.amount),
                            NewJournalLine::credit(credit_account, p.amount),
                        ],
                    })
                    .await
                    .unwrap();
                if p.status == EntryStatus::Posted {
                    expected += if p.cash_debit { p.amount } else { -p.amount };
                }
            }

            let balances = service.accounts_with_balances(company, DateRange::unbounded()).await.unwrap();
            let cash_balance = balances.iter().find(|b| b.account.id == cash.id).unwrap();
            let sales_balance = balances.iter().find(|b| b.account.id == sales.id).unwrap();
            prop_assert_eq!(cash_balance.balance, expected);
            prop_assert_eq!(sales_balance.balance, expected);

            let ledger = service.account_ledger(cash.id, LedgerQuery::default()).await.unwrap();
            prop_assert_eq!(ledger.closing_balance, expected);
            let posted = postings.iter().filter(|p| p.status == EntryStatus::Posted).count();
            prop_assert_eq!(ledger.total_count, posted);
            Ok(())
        })?;
    }

    /// *For any* window start, opening balance plus the window's movement
    /// equals the balance over everything up to the window end.
    #[test]
    fn prop_window_opening_matches_prior_balance(
        postings in prop::collection::vec(posting_strategy(), 1..25),
        start_day in 1u32..=30,
    ) {
        runtime().block_on(async {
            let store = Arc::new(MemoryLedger::new());
            let service = LedgerService::new(store.clone(), store.clone(), store.clone());
            let company = CompanyId::new();
            let cash = store.add_account(company, "1000", AccountType::Asset);
            let equity = store.add_account(company, "3000", AccountType::Equity);

            for p in &postings {
                let lines = if p.cash_debit {
                    vec![NewJournalLine::debit(cash.id, p.amount), NewJournalLine::credit(equity.id, p.amount)]
                } else {
                    vec![NewJournalLine::debit(equity.id, p.amount), NewJournalLine::credit(cash.id, p.amount)]
                };
                service
                    .create_journal_entry(NewJournalEntry {
                        company_id: company,
                        date: june(p.day),
                        memo: None,
                        source: EntrySource::Manual,
                        status: EntryStatus::Posted,
                        created_by: None,
                        entry_number: None,
                        lines,
                    })
                    .await
                    .unwrap();
            }

            let windowed = service
                .account_ledger(
                    cash.id,
                    LedgerQuery {
                        range: DateRange::new(Some(june(start_day)), None).unwrap(),
                        ..LedgerQuery::default()
                    },
                )
                .await
                .unwrap();

            let before = DateRange::new(None, june(start_day).pred_opt()).unwrap();
            let prior = service.accounts_with_balances(company, before).await.unwrap();
            let prior_cash = prior.iter().find(|b| b.account.id == cash.id).unwrap();
            prop_assert_eq!(windowed.opening_balance, prior_cash.balance);

            let full = service.account_ledger(cash.id, LedgerQuery::default()).await.unwrap();
            prop_assert_eq!(windowed.closing_balance, full.closing_balance);
            prop_assert_eq!(
                windowed.closing_balance,
                windowed.opening_balance
                    + NormalBalance::Debit.movement(windowed.total_debit, windowed.total_credit)
            );
            Ok(())
        })?;
    }
}
