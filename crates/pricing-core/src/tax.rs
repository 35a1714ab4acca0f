//! # Tax Calculator
//!
//! VAT-aware invoice totals.
//!
//! ## Calculation Flow
//! ```text
//! line items ──► Σ (unit_price × qty) ──► subtotal
//!                  (each line first)          │
//!                                             ▼
//!                 TaxProfile ──► effective rate (0 for non-payers)
//!                                             │
//!                                             ▼
//!                      vat = round½even(subtotal × rate)
//!                                             │
//!                                             ▼
//!                          total = subtotal + vat
//! ```
//!
//! The accounting mirror fields feed the append-only ledger kept by the web
//! platform; nothing here persists them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Currency, LineItem, Rate, TaxProfile};

/// Input for [`calculate_tax`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxCalculationInput {
    pub tax: TaxProfile,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub currency: Currency,
}

/// Invoice totals plus the ledger mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxCalculationOutput {
    pub subtotal: Money,
    /// Rate actually applied; zero for non-payers.
    pub vat_rate: Rate,
    /// `vat_rate` as a percentage, for display.
    pub vat_rate_percent: f64,
    pub vat: Money,
    pub total: Money,
    pub currency: Currency,

    /// Ledger: gross income (equals `total`).
    pub income_gross: Money,
    /// Ledger: VAT owed to the revenue service (equals `vat`).
    pub vat_collected: Money,
    /// Ledger: income net of VAT (equals `subtotal`).
    pub net_income: Money,
}

/// Computes subtotal, VAT and total for a set of invoice lines.
///
/// Inputs are assumed validated (see
/// [`crate::validation::validate_tax_input`]).
///
/// ## Example
/// ```rust
/// use pricing_core::money::Money;
/// use pricing_core::tax::{calculate_tax, TaxCalculationInput};
/// use pricing_core::types::{Currency, LineItem, Rate, TaxProfile};
///
/// let output = calculate_tax(&TaxCalculationInput {
///     tax: TaxProfile::vat_payer(Rate::from_bps(1800)),
///     line_items: vec![LineItem::new(Money::from_cents(10000), 1)],
///     currency: Currency::Gel,
/// });
///
/// assert_eq!(output.subtotal.cents(), 10000);
/// assert_eq!(output.vat.cents(), 1800);
/// assert_eq!(output.total.cents(), 11800);
/// ```
pub fn calculate_tax(input: &TaxCalculationInput) -> TaxCalculationOutput {
    let subtotal: Money = input.line_items.iter().map(LineItem::line_total).sum();

    let vat_rate = input.tax.effective_rate();
    let vat = subtotal.percentage(vat_rate);
    let total = subtotal + vat;

    TaxCalculationOutput {
        subtotal,
        vat_rate,
        vat_rate_percent: vat_rate.percentage(),
        vat,
        total,
        currency: input.currency,
        income_gross: total,
        vat_collected: vat,
        net_income: subtotal,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(is_vat_payer: bool, bps: u32, items: &[(i64, i64)]) -> TaxCalculationInput {
        TaxCalculationInput {
            tax: TaxProfile {
                is_vat_payer,
                vat_rate: Rate::from_bps(bps),
            },
            line_items: items
                .iter()
                .map(|&(price, qty)| LineItem::new(Money::from_cents(price), qty))
                .collect(),
            currency: Currency::Gel,
        }
    }

    #[test]
    fn test_georgian_vat_single_line() {
        let output = calculate_tax(&input(true, 1800, &[(10000, 1)]));
        assert_eq!(output.subtotal.cents(), 10000);
        assert_eq!(output.vat.cents(), 1800);
        assert_eq!(output.total.cents(), 11800);
        assert_eq!(output.vat_rate.bps(), 1800);
        assert!((output.vat_rate_percent - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_payer_never_charges_vat() {
        let output = calculate_tax(&input(false, 1800, &[(10000, 2), (550, 3)]));
        assert_eq!(output.subtotal.cents(), 21650);
        assert_eq!(output.vat.cents(), 0);
        assert!(output.vat_rate.is_zero());
        assert_eq!(output.vat_rate_percent, 0.0);
        assert_eq!(output.total, output.subtotal);
    }

    #[test]
    fn test_vat_rounds_half_to_even() {
        // 25 × 18% = 4.5 → 4
        assert_eq!(calculate_tax(&input(true, 1800, &[(25, 1)])).vat.cents(), 4);
        // 75 × 18% = 13.5 → 14
        assert_eq!(calculate_tax(&input(true, 1800, &[(75, 1)])).vat.cents(), 14);
    }

    #[test]
    fn test_multiple_lines_summed_before_vat() {
        let output = calculate_tax(&input(true, 1800, &[(1999, 2), (4999, 1)]));
        assert_eq!(output.subtotal.cents(), 8997);
        // 8997 × 0.18 = 1619.46 → 1619
        assert_eq!(output.vat.cents(), 1619);
        assert_eq!(output.total.cents(), 10616);
    }

    #[test]
    fn test_oversized_invoice_saturates() {
        let output = calculate_tax(&input(true, 1800, &[(10_i64.pow(16), 1000)]));
        assert_eq!(output.subtotal.cents(), i64::MAX);
        assert_eq!(output.total.cents(), i64::MAX);
    }

    #[test]
    fn test_ledger_mirror() {
        let output = calculate_tax(&input(true, 1800, &[(5000, 4)]));
        assert_eq!(output.income_gross, output.total);
        assert_eq!(output.vat_collected, output.vat);
        assert_eq!(output.net_income, output.subtotal);
    }

    #[test]
    fn test_empty_invoice() {
        let output = calculate_tax(&input(true, 1800, &[]));
        assert!(output.subtotal.is_zero());
        assert!(output.total.is_zero());
    }

    proptest! {
        #[test]
        fn prop_non_payer_vat_is_zero(
            bps in 0u32..=10000,
            items in prop::collection::vec((0i64..=1_000_000, 1i64..=100), 0..=20)
        ) {
            let output = calculate_tax(&input(false, bps, &items));
            prop_assert_eq!(output.vat.cents(), 0);
            prop_assert_eq!(output.total, output.subtotal);
        }

        #[test]
        fn prop_total_is_subtotal_plus_vat(
            is_vat_payer in any::<bool>(),
            bps in 0u32..=10000,
            items in prop::collection::vec((0i64..=1_000_000, 1i64..=100), 0..=20)
        ) {
            let output = calculate_tax(&input(is_vat_payer, bps, &items));
            prop_assert_eq!(output.total, output.subtotal + output.vat);
            prop_assert!(!output.vat.is_negative());
        }
    }
}
