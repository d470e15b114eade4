//! Posting validation.
//!
//! Runs strictly before any write. The line checks are pure; the account
//! checks work on a per-call id → account map loaded by the caller.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::{
    AMOUNT_DP, AccountId, CompanyId, MAX_AMOUNT, is_storable_amount, within_tolerance,
};

use super::error::LedgerError;
use super::types::{EntryTotals, NewJournalLine};
use crate::accounts::Account;

/// Validates a proposed line set against the double-entry invariant.
///
/// Rules:
/// 1. At least one line
/// 2. No negative amounts
/// 3. Amounts fit the stored precision (see [`MAX_AMOUNT`])
/// 4. At most one non-zero side per line (zero/zero is a memo line)
/// 5. `|Σdebit - Σcredit| <= 0.01`
///
/// # Errors
///
/// Returns the first rule violation found.
pub fn validate_lines(lines: &[NewJournalLine]) -> Result<EntryTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut memo_lines = 0;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;

        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line_no });
        }

        if !is_storable_amount(line.debit) || !is_storable_amount(line.credit) {
            return Err(LedgerError::InvalidAmount(format!(
                "line {line_no} must be at most {MAX_AMOUNT} with at most {AMOUNT_DP} decimal places"
            )));
        }

        match (line.debit.is_zero(), line.credit.is_zero()) {
            (false, false) => return Err(LedgerError::BothSidesOnLine { line_no }),
            (true, true) => memo_lines += 1,
            _ => {}
        }

        total_debit = checked_total(total_debit, line.debit)?;
        total_credit = checked_total(total_credit, line.credit)?;
    }

    if !within_tolerance(total_debit, total_credit) {
        return Err(LedgerError::UnbalancedEntry {
            debit: total_debit,
            credit: total_credit,
            diff: total_debit - total_credit,
        });
    }

    Ok(EntryTotals {
        total_debit,
        total_credit,
        line_count: lines.len(),
        memo_lines,
    })
}

fn checked_total(total: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::InvalidAmount("entry total overflows".to_string()))
}

/// Checks every line's account: it must exist, belong to `company_id`,
/// and accept postings.
///
/// # Errors
///
/// Returns `UnknownAccount`, `AccountCompanyMismatch` or `AccountInactive`.
pub fn validate_line_accounts(
    company_id: CompanyId,
    lines: &[NewJournalLine],
    accounts: &HashMap<AccountId, Account>,
) -> Result<(), LedgerError> {
    for line in lines {
        let account = accounts
            .get(&line.account_id)
            .ok_or(LedgerError::UnknownAccount(line.account_id))?;

        if account.company_id != company_id {
            return Err(LedgerError::AccountCompanyMismatch {
                account_id: account.id,
                company_id,
            });
        }

        if !account.accepts_postings() {
            return Err(LedgerError::AccountInactive(account.id));
        }
    }
    Ok(())
}

/// Returns the distinct account ids referenced by a line set, in first-use order.
#[must_use]
pub fn referenced_accounts(lines: &[NewJournalLine]) -> Vec<AccountId> {
    let mut ids: Vec<AccountId> = Vec::with_capacity(lines.len());
    for line in lines {
        if !ids.contains(&line.account_id) {
            ids.push(line.account_id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountType;
    use crate::ledger::ErrorKind;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn account(company_id: CompanyId, account_type: AccountType) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            company_id,
            code: "1000".to_string(),
            name: "Cash".to_string(),
            localized_name: None,
            account_type,
            is_vat_account: false,
            is_system_account: false,
            is_active: true,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_balanced_entry() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let totals = validate_lines(&[
            NewJournalLine::debit(a, dec!(100.00)),
            NewJournalLine::credit(b, dec!(100.00)),
        ])
        .unwrap();
        assert_eq!(totals.total_debit, dec!(100.00));
        assert_eq!(totals.total_credit, dec!(100.00));
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.memo_lines, 0);
    }

    #[test]
    fn test_empty_entry_rejected() {
        assert!(matches!(validate_lines(&[]), Err(LedgerError::EmptyEntry)));
    }

    #[test]
    fn test_unbalanced_entry_rejected() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let err = validate_lines(&[
            NewJournalLine::debit(a, dec!(100.00)),
            NewJournalLine::credit(b, dec!(90.00)),
        ])
        .unwrap_err();
        match err {
            LedgerError::UnbalancedEntry {
                debit,
                credit,
                diff,
            } => {
                assert_eq!(debit, dec!(100.00));
                assert_eq!(credit, dec!(90.00));
                assert_eq!(diff, dec!(10.00));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_one_cent_difference_tolerated() {
        let (a, b) = (AccountId::new(), AccountId::new());
        assert!(
            validate_lines(&[
                NewJournalLine::debit(a, dec!(100.01)),
                NewJournalLine::credit(b, dec!(100.00)),
            ])
            .is_ok()
        );
        assert!(
            validate_lines(&[
                NewJournalLine::debit(a, dec!(100.02)),
                NewJournalLine::credit(b, dec!(100.00)),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let err = validate_lines(&[
            NewJournalLine::debit(a, dec!(100)),
            NewJournalLine::credit(b, dec!(-100)),
        ])
        .unwrap_err();
        assert!(matches!(err, LedgerError::NegativeAmount { line_no: 2 }));
    }

    #[test]
    fn test_both_sides_on_line_rejected() {
        let a = AccountId::new();
        let line = NewJournalLine {
            account_id: a,
            debit: dec!(10),
            credit: dec!(10),
            description: None,
        };
        assert!(matches!(
            validate_lines(&[line]),
            Err(LedgerError::BothSidesOnLine { line_no: 1 })
        ));
    }

    #[test]
    fn test_amount_beyond_storable_range_rejected() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let err = validate_lines(&[
            NewJournalLine::debit(a, dec!(10000000000000000)),
            NewJournalLine::credit(b, dec!(10000000000000000)),
        ])
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(ref msg) if msg.starts_with("line 1")));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = validate_lines(&[
            NewJournalLine::debit(a, dec!(1.00001)),
            NewJournalLine::credit(b, dec!(1.00001)),
        ])
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        assert!(
            validate_lines(&[
                NewJournalLine::debit(a, MAX_AMOUNT),
                NewJournalLine::credit(b, MAX_AMOUNT),
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_huge_amounts_fail_without_panicking() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let err = validate_lines(&[
            NewJournalLine::debit(a, Decimal::MAX),
            NewJournalLine::debit(a, Decimal::MAX),
            NewJournalLine::credit(b, Decimal::MAX),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_memo_line_counted() {
        let (a, b, c) = (AccountId::new(), AccountId::new(), AccountId::new());
        let totals = validate_lines(&[
            NewJournalLine::debit(a, dec!(50)),
            NewJournalLine::credit(b, dec!(50)),
            NewJournalLine::debit(c, Decimal::ZERO).with_description("see attachment"),
        ])
        .unwrap();
        assert_eq!(totals.memo_lines, 1);
        assert_eq!(totals.line_count, 3);
    }

    #[test]
    fn test_account_checks() {
        let company = CompanyId::new();
        let cash = account(company, AccountType::Asset);
        let mut archived = account(company, AccountType::Expense);
        archived.is_archived = true;
        let foreign = account(CompanyId::new(), AccountType::Asset);

        let accounts: HashMap<_, _> = [&cash, &archived, &foreign]
            .into_iter()
            .map(|a| (a.id, a.clone()))
            .collect();

        let ok = [NewJournalLine::debit(cash.id, dec!(1))];
        assert!(validate_line_accounts(company, &ok, &accounts).is_ok());

        let unknown = [NewJournalLine::debit(AccountId::new(), dec!(1))];
        assert!(matches!(
            validate_line_accounts(company, &unknown, &accounts),
            Err(LedgerError::UnknownAccount(_))
        ));

        let mismatch = [NewJournalLine::debit(foreign.id, dec!(1))];
        assert!(matches!(
            validate_line_accounts(company, &mismatch, &accounts),
            Err(LedgerError::AccountCompanyMismatch { .. })
        ));

        let inactive = [NewJournalLine::debit(archived.id, dec!(1))];
        assert!(matches!(
            validate_line_accounts(company, &inactive, &accounts),
            Err(LedgerError::AccountInactive(id)) if id == archived.id
        ));
    }

    #[test]
    fn test_referenced_accounts_deduplicates() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let lines = [
            NewJournalLine::debit(a, dec!(1)),
            NewJournalLine::debit(a, dec!(1)),
            NewJournalLine::credit(b, dec!(2)),
        ];
        assert_eq!(referenced_accounts(&lines), vec![a, b]);
    }
}
