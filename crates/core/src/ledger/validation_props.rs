//! Property-based tests for posting validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::NewJournalLine;
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a negative amount.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to split `total` into 1..=5 positive parts that sum to it exactly.
fn split_amount(total_cents: i64) -> impl Strategy<Value = Vec<Decimal>> {
    // Distinct cut points inside (0, total) give strictly positive parts.
    prop::collection::btree_set(1..total_cents, 0..5).prop_map(move |cuts| {
        let mut parts = Vec::with_capacity(cuts.len() + 1);
        let mut previous = 0;
        for cut in cuts.into_iter().chain(std::iter::once(total_cents)) {
            parts.push(Decimal::new(cut - previous, 2));
            previous = cut;
        }
        parts
    })
}

fn debit_lines(amounts: &[Decimal]) -> Vec<NewJournalLine> {
    amounts
        .iter()
        .map(|amount| NewJournalLine::debit(AccountId::new(), *amount))
        .collect()
}

fn credit_lines(amounts: &[Decimal]) -> Vec<NewJournalLine> {
    amounts
        .iter()
        .map(|amount| NewJournalLine::credit(AccountId::new(), *amount))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* line set whose debit and credit sides both sum to the same
    /// total, validation accepts it and reports that total on both sides.
    #[test]
    fn prop_balanced_line_sets_accepted(
        (debits, credits) in (100i64..10_000_000i64)
            .prop_flat_map(|total| (split_amount(total), split_amount(total))),
    ) {
        let mut lines = debit_lines(&debits);
        lines.extend(credit_lines(&credits));

        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "balanced lines rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.total_debit, totals.total_credit);
        prop_assert_eq!(totals.total_debit, debits.iter().copied().sum::<Decimal>());
        prop_assert_eq!(totals.line_count, lines.len());
    }

    /// *For any* imbalance larger than one cent, validation rejects the entry
    /// and reports `diff = debit - credit`.
    #[test]
    fn prop_imbalance_beyond_tolerance_rejected(
        amount in positive_amount(),
        extra_cents in 2i64..1_000_000i64,
        debit_heavy in any::<bool>(),
    ) {
        let extra = Decimal::new(extra_cents, 2);
        let (debit, credit) = if debit_heavy { (amount + extra, amount) } else { (amount, amount + extra) };
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), debit),
            NewJournalLine::credit(AccountId::new(), credit),
        ];

        match validate_lines(&lines) {
            Err(LedgerError::UnbalancedEntry { debit: d, credit: c, diff }) => {
                prop_assert_eq!(d, debit);
                prop_assert_eq!(c, credit);
                prop_assert_eq!(diff, debit - credit);
            }
            other => prop_assert!(false, "expected UnbalancedEntry, got {:?}", other),
        }
    }

    /// *For any* imbalance of at most one cent, validation accepts the entry.
    #[test]
    fn prop_rounding_difference_tolerated(
        amount in positive_amount(),
        cents in 0i64..=1i64,
    ) {
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), amount + Decimal::new(cents, 2)),
            NewJournalLine::credit(AccountId::new(), amount),
        ];
        prop_assert!(validate_lines(&lines).is_ok());
    }

    /// *For any* negative amount, validation rejects the line regardless of side.
    #[test]
    fn prop_negative_amount_rejected(
        neg in negative_amount(),
        other in positive_amount(),
        on_debit in any::<bool>(),
    ) {
        let bad = if on_debit {
            NewJournalLine::debit(AccountId::new(), neg)
        } else {
            NewJournalLine::credit(AccountId::new(), neg)
        };
        let lines = vec![NewJournalLine::debit(AccountId::new(), other), bad];

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::NegativeAmount { line_no: 2 })),
            "negative amount should be rejected, got: {:?}",
            result
        );
    }

    /// *For any* line carrying both a debit and a credit, validation rejects it.
    #[test]
    fn prop_two_sided_line_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        let line = NewJournalLine {
            account_id: AccountId::new(),
            debit,
            credit,
            description: None,
        };
        let result = validate_lines(&[line]);
        prop_assert!(
            matches!(result, Err(LedgerError::BothSidesOnLine { line_no: 1 })),
            "two-sided line should be rejected, got: {:?}",
            result
        );
    }

    /// *For any* number of zero/zero lines added to a balanced entry, the
    /// entry stays valid and every one is counted as a memo line.
    #[test]
    fn prop_memo_lines_counted(
        amount in positive_amount(),
        memo_count in 0usize..5,
    ) {
        let mut lines = vec![
            NewJournalLine::debit(AccountId::new(), amount),
            NewJournalLine::credit(AccountId::new(), amount),
        ];
        for _ in 0..memo_count {
            lines.push(NewJournalLine::debit(AccountId::new(), Decimal::ZERO));
        }

        let totals = validate_lines(&lines).unwrap();
        prop_assert_eq!(totals.memo_lines, memo_count);
        prop_assert_eq!(totals.line_count, memo_count + 2);
    }
}
