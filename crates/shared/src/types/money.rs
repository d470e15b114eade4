//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of the currency minor unit.
pub const MINOR_UNIT_DP: u32 = 2;

/// Largest debit/credit difference still treated as balanced (one minor unit).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Decimal places stored for journal amounts.
pub const AMOUNT_DP: u32 = 4;

/// Largest journal amount the ledger stores (`NUMERIC(19,4)`: 15 integer
/// digits, 4 fractional): `999_999_999_999_999.9999`.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, AMOUNT_DP);

/// Rounds an amount to the currency minor unit using banker's rounding.
#[must_use]
pub fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if two amounts differ by no more than [`BALANCE_TOLERANCE`].
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= BALANCE_TOLERANCE
}

/// Returns true if `amount` fits the stored precision: at most
/// [`MAX_AMOUNT`] in magnitude and at most [`AMOUNT_DP`] decimal places.
#[must_use]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT && amount.normalize().scale() <= AMOUNT_DP
}
