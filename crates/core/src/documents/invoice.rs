//! Invoice arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::round_minor;

use crate::ledger::LedgerError;

/// One invoice line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit, before VAT.
    pub unit_price: Decimal,
    /// VAT rate as a fraction (0.05 = 5%).
    #[serde(default)]
    pub vat_rate: Decimal,
}

impl InvoiceLine {
    /// Net amount of the line, or `None` on overflow.
    #[must_use]
    pub fn net(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }

    /// VAT amount of the line, unrounded, or `None` on overflow.
    #[must_use]
    pub fn vat(&self) -> Option<Decimal> {
        self.net()?.checked_mul(self.vat_rate)
    }
}

/// Invoice totals in minor-unit precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Σ quantity × unit price.
    pub subtotal: Decimal,
    /// Σ quantity × unit price × VAT rate.
    pub vat_amount: Decimal,
    /// `subtotal + vat_amount`.
    pub total: Decimal,
}

/// Computes invoice totals.
///
/// Sums are taken at full precision and rounded once to the minor unit
/// with banker's rounding, so `total == subtotal + vat_amount` exactly.
///
/// # Errors
///
/// Returns `InvalidAmount` if any product or sum overflows.
pub fn compute_invoice_totals(lines: &[InvoiceLine]) -> Result<InvoiceTotals, LedgerError> {
    let mut subtotal = Decimal::ZERO;
    let mut vat_amount = Decimal::ZERO;
    for line in lines {
        subtotal = line
            .net()
            .and_then(|net| subtotal.checked_add(net))
            .ok_or_else(overflow)?;
        vat_amount = line
            .vat()
            .and_then(|vat| vat_amount.checked_add(vat))
            .ok_or_else(overflow)?;
    }

    let subtotal = round_minor(subtotal);
    let vat_amount = round_minor(vat_amount);
    Ok(InvoiceTotals {
        subtotal,
        vat_amount,
        total: subtotal.checked_add(vat_amount).ok_or_else(overflow)?,
    })
}

fn overflow() -> LedgerError {
    LedgerError::InvalidAmount("invoice total overflows".to_string())
}
