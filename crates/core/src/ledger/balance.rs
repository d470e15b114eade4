//! Account balance aggregation.
//!
//! Balances are derived views, recomputed on read. The store supplies one
//! grouped total per account (posted entries only); this module applies the
//! per-type sign convention and fills in accounts without lines.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use crate::accounts::{Account, NormalBalance};

/// Raw debit/credit sums for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountTotals {
    /// Creates zero totals for an account.
    #[must_use]
    pub const fn zero(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Adds one line's amounts.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
    }

    /// Signed balance under the given normal balance side.
    #[must_use]
    pub fn balance(&self, side: NormalBalance) -> Decimal {
        side.movement(self.debit_total, self.credit_total)
    }
}

/// An account with its balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account.
    pub account: Account,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance, positive on the account's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds a balance from an account and its totals.
    #[must_use]
    pub fn new(account: Account, totals: &AccountTotals) -> Self {
        let balance = totals.balance(account.normal_balance());
        Self {
            account,
            debit_total: totals.debit_total,
            credit_total: totals.credit_total,
            balance,
        }
    }
}

/// Combines a company's accounts with their grouped totals.
///
/// Every account appears exactly once, in input order; accounts without
/// totals get zero. Totals for accounts not in `accounts` are ignored.
#[must_use]
pub fn aggregate_balances(accounts: Vec<Account>, totals: &[AccountTotals]) -> Vec<AccountBalance> {
    let mut by_account: HashMap<AccountId, AccountTotals> = HashMap::with_capacity(totals.len());
    for row in totals {
        by_account
            .entry(row.account_id)
            .or_insert_with(|| AccountTotals::zero(row.account_id))
            .add(row.debit_total, row.credit_total);
    }

    accounts
        .into_iter()
        .map(|account| {
            let row = by_account
                .get(&account.id)
                .copied()
                .unwrap_or_else(|| AccountTotals::zero(account.id));
            AccountBalance::new(account, &row)
        })
        .collect()
}

/// Sums raw `(account, debit, credit)` rows into one total per account,
/// ordered by account id.
#[must_use]
pub fn group_totals<I>(rows: I) -> Vec<AccountTotals>
where
    I: IntoIterator<Item = (AccountId, Decimal, Decimal)>,
{
    let mut grouped: HashMap<AccountId, AccountTotals> = HashMap::new();
    for (account_id, debit, credit) in rows {
        grouped
            .entry(account_id)
            .or_insert_with(|| AccountTotals::zero(account_id))
            .add(debit, credit);
    }
    let mut totals: Vec<_> = grouped.into_values().collect();
    totals.sort_by_key(|t| t.account_id);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountType;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::CompanyId;

    fn account(code: &str, account_type: AccountType) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            company_id: CompanyId::new(),
            code: code.to_string(),
            name: code.to_string(),
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

    fn totals(account: &Account, debit: Decimal, credit: Decimal) -> AccountTotals {
        AccountTotals {
            account_id: account.id,
            debit_total: debit,
            credit_total: credit,
        }
    }

    #[test]
    fn test_expense_paid_in_cash() {
        // Dr Expense 100 / Cr Cash 100
        let expense = account("6000", AccountType::Expense);
        let cash = account("1000", AccountType::Asset);
        let rows = [
            totals(&expense, dec!(100), dec!(0)),
            totals(&cash, dec!(0), dec!(100)),
        ];

        let balances = aggregate_balances(vec![cash.clone(), expense.clone()], &rows);
        assert_eq!(balances[0].account.id, cash.id);
        assert_eq!(balances[0].balance, dec!(-100));
        assert_eq!(balances[1].account.id, expense.id);
        assert_eq!(balances[1].balance, dec!(100));
    }

    #[test]
    fn test_credit_normal_accounts() {
        let sales = account("4000", AccountType::Income);
        let payable = account("2000", AccountType::Liability);
        let equity = account("3000", AccountType::Equity);
        let rows = [
            totals(&sales, dec!(10), dec!(250)),
            totals(&payable, dec!(0), dec!(80)),
            totals(&equity, dec!(5), dec!(0)),
        ];

        let balances = aggregate_balances(vec![sales, payable, equity], &rows);
        assert_eq!(balances[0].balance, dec!(240));
        assert_eq!(balances[1].balance, dec!(80));
        assert_eq!(balances[2].balance, dec!(-5));
    }

    #[test]
    fn test_accounts_without_lines_get_zero() {
        let cash = account("1000", AccountType::Asset);
        let mut archived = account("1900", AccountType::Asset);
        archived.is_archived = true;

        let balances = aggregate_balances(vec![cash, archived], &[]);
        assert_eq!(balances.len(), 2);
        for b in &balances {
            assert_eq!(b.debit_total, Decimal::ZERO);
            assert_eq!(b.credit_total, Decimal::ZERO);
            assert_eq!(b.balance, Decimal::ZERO);
        }
    }

    #[test]
    fn test_foreign_totals_ignored() {
        let cash = account("1000", AccountType::Asset);
        let stranger = account("9999", AccountType::Asset);
        let balances = aggregate_balances(
            vec![cash.clone()],
            &[totals(&stranger, dec!(500), dec!(0))],
        );
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_group_totals() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let grouped = group_totals([
            (a, dec!(10), dec!(0)),
            (b, dec!(0), dec!(4)),
            (a, dec!(0), dec!(3)),
        ]);
        let a_row = grouped.iter().find(|t| t.account_id == a).unwrap();
        assert_eq!(a_row.debit_total, dec!(10));
        assert_eq!(a_row.credit_total, dec!(3));
        assert_eq!(grouped.len(), 2);
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// *For any* totals, a debit-normal and a credit-normal account with
        /// the same totals have opposite balances.
        #[test]
        fn prop_sign_convention_is_symmetric(
            debit in amount_strategy(),
            credit in amount_strategy(),
        ) {
            let asset = account("1000", AccountType::Asset);
            let income = account("4000", AccountType::Income);
            let asset_balance = AccountBalance::new(asset.clone(), &totals(&asset, debit, credit));
            let income_balance = AccountBalance::new(income.clone(), &totals(&income, debit, credit));

            prop_assert_eq!(asset_balance.balance, debit - credit);
            prop_assert_eq!(income_balance.balance, -asset_balance.balance);
        }

        /// *For any* set of balanced postings, debit-normal balances minus
        /// credit-normal balances sum to zero.
        #[test]
        fn prop_balanced_postings_net_to_zero(
            amounts in prop::collection::vec(amount_strategy(), 1..20),
        ) {
            let cash = account("1000", AccountType::Asset);
            let sales = account("4000", AccountType::Income);
            let expense = account("6000", AccountType::Expense);

            let mut rows = Vec::new();
            for (i, amount) in amounts.iter().enumerate() {
                if i % 2 == 0 {
                    rows.push((cash.id, *amount, Decimal::ZERO));
                    rows.push((sales.id, Decimal::ZERO, *amount));
                } else {
                    rows.push((expense.id, *amount, Decimal::ZERO));
                    rows.push((cash.id, Decimal::ZERO, *amount));
                }
            }

            let balances = aggregate_balances(
                vec![cash, sales, expense],
                &group_totals(rows),
            );
            let net: Decimal = balances
                .iter()
                .map(|b| match b.account.normal_balance() {
                    NormalBalance::Debit => b.balance,
                    NormalBalance::Credit => -b.balance,
                })
                .sum();
            prop_assert_eq!(net, Decimal::ZERO);
        }
    }
}
