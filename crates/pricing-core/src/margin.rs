//! # Margin Calculator
//!
//! Forward (cost → price) and inverse (price → margin) calculations over one
//! shared fee model.
//!
//! ## Forward: `calculate_margin`
//! ```text
//! cost + shipping ─────────────────────────► base_cost
//!                                               │ + target profit (ceil)
//!                                               ▼
//!                                        price_before_fees
//!                                               │ + payment, platform,
//!                                               │   affiliate fees (ceil,
//!                                               │   each on price_before_fees)
//!                                               ▼
//!                                          price ex VAT
//!                                               │ + VAT (ceil) if payer
//!                                               ▼
//!                                        recommended price
//! ```
//!
//! ## Inverse: `analyze_price`
//! ```text
//! selling price ──► back out VAT: ceil(price × r / (1 + r))
//!                        │
//!                        ▼
//!                  price ex VAT ──► fees (ceil, on price ex VAT)
//!                        │
//!                        ▼
//!             net = ex VAT − cost − shipping − fees
//! ```
//!
//! Both directions report gross margin against the VAT-inclusive price, so
//! the two numbers are directly comparable on a dashboard.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::{div_ceil, ratio_bps, saturate, Money};
use crate::types::{Rate, TaxProfile};
use crate::BPS_SCALE;

// =============================================================================
// Fee Model
// =============================================================================

/// Percentage fees charged on a sale, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeSchedule {
    /// Card processor fee.
    #[serde(default)]
    pub payment: Rate,
    /// Marketplace commission.
    #[serde(default)]
    pub platform: Rate,
    /// Affiliate commission.
    #[serde(default)]
    pub affiliate: Rate,
}

impl FeeSchedule {
    /// Builds a schedule from percentage inputs (`2.9` → 290 bps).
    pub fn from_percentages(payment: f64, platform: f64, affiliate: f64) -> CoreResult<Self> {
        Ok(FeeSchedule {
            payment: Rate::from_percentage(payment)?,
            platform: Rate::from_percentage(platform)?,
            affiliate: Rate::from_percentage(affiliate)?,
        })
    }

    /// Sum of all fee rates in basis points.
    pub fn total_bps(&self) -> u32 {
        self.payment.bps() + self.platform.bps() + self.affiliate.bps()
    }

    /// Each fee as `ceil(base × rate)`, computed independently.
    pub fn amounts_on(&self, base: Money) -> FeeAmounts {
        let payment = base.percentage_ceil(self.payment);
        let platform = base.percentage_ceil(self.platform);
        let affiliate = base.percentage_ceil(self.affiliate);

        FeeAmounts {
            payment,
            platform,
            affiliate,
            total: payment + platform + affiliate,
        }
    }
}

/// Fee amounts for one sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeAmounts {
    pub payment: Money,
    pub platform: Money,
    pub affiliate: Money,
    pub total: Money,
}

// =============================================================================
// Inputs
// =============================================================================

/// How much profit the seller wants on top of cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DesiredProfit {
    /// Percentage of `cost + shipping`.
    Percent(Rate),
    /// Fixed amount per order.
    Fixed(Money),
}

/// Input for [`calculate_margin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginCalculatorInput {
    pub cost: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub fees: FeeSchedule,
    #[serde(default)]
    pub tax: TaxProfile,
    pub desired_profit: DesiredProfit,
}

/// Input for [`analyze_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceAnalysisInput {
    /// VAT-inclusive price the buyer pays.
    pub selling_price: Money,
    pub cost: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub fees: FeeSchedule,
    #[serde(default)]
    pub tax: TaxProfile,
}

// =============================================================================
// Outputs
// =============================================================================

/// Where every unit of a VAT-inclusive price goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginBreakdown {
    /// VAT-inclusive price.
    pub price: Money,
    pub price_ex_vat: Money,
    pub cost: Money,
    pub shipping: Money,
    pub fees: FeeAmounts,
    pub vat: Money,
    /// `price − cost − shipping − fees − vat`; negative means a loss.
    pub net_profit: Money,
    /// `(price − cost − shipping) / price`, in bps.
    pub gross_margin_bps: i64,
    /// `gross_margin_bps` as a percentage, for display.
    pub gross_margin_percent: f64,
    /// `net_profit / price`, in bps.
    pub net_margin_bps: i64,
}

impl MarginBreakdown {
    fn new(
        price: Money,
        cost: Money,
        shipping: Money,
        fees: FeeAmounts,
        vat: Money,
    ) -> Self {
        let net_profit = price - cost - shipping - fees.total - vat;
        let gross_margin_bps = ratio_bps(price - cost - shipping, price);

        MarginBreakdown {
            price,
            price_ex_vat: price - vat,
            cost,
            shipping,
            fees,
            vat,
            net_profit,
            gross_margin_bps,
            gross_margin_percent: gross_margin_bps as f64 / 100.0,
            net_margin_bps: ratio_bps(net_profit, price),
        }
    }
}

/// Result of the forward calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginCalculation {
    /// VAT-inclusive price to list the product at.
    pub recommended_price: Money,
    pub target_profit: Money,
    pub price_before_fees: Money,
    pub breakdown: MarginBreakdown,
}

// =============================================================================
// Forward
// =============================================================================

/// Computes a recommended price that covers cost, fees, VAT and the desired
/// profit.
///
/// ## Example
/// ```rust
/// use pricing_core::margin::{calculate_margin, DesiredProfit, FeeSchedule, MarginCalculatorInput};
/// use pricing_core::money::Money;
/// use pricing_core::types::{Rate, TaxProfile};
///
/// let result = calculate_margin(&MarginCalculatorInput {
///     cost: Money::from_cents(1000),
///     shipping: Money::zero(),
///     fees: FeeSchedule::default(),
///     tax: TaxProfile::non_payer(),
///     desired_profit: DesiredProfit::Fixed(Money::from_cents(500)),
/// });
///
/// assert_eq!(result.recommended_price.cents(), 1500);
/// assert_eq!(result.breakdown.net_profit.cents(), 500);
/// ```
pub fn calculate_margin(input: &MarginCalculatorInput) -> MarginCalculation {
    let base_cost = input.cost + input.shipping;

    let target_profit = match input.desired_profit {
        DesiredProfit::Fixed(amount) => amount,
        DesiredProfit::Percent(rate) => base_cost.percentage_ceil(rate),
    };

    let price_before_fees = base_cost + target_profit;
    let fees = input.fees.amounts_on(price_before_fees);
    let price_ex_vat = price_before_fees + fees.total;
    let vat = price_ex_vat.percentage_ceil(input.tax.effective_rate());
    let recommended_price = price_ex_vat + vat;

    MarginCalculation {
        recommended_price,
        target_profit,
        price_before_fees,
        breakdown: MarginBreakdown::new(recommended_price, input.cost, input.shipping, fees, vat),
    }
}

// =============================================================================
// Inverse
// =============================================================================

/// Breaks a VAT-inclusive selling price down into VAT, fees and net profit.
///
/// Not an exact inverse of [`calculate_margin`]: fees here are a percentage
/// of the VAT-exclusive price, which already contains the fees.
///
/// ## Example
/// ```rust
/// use pricing_core::margin::{analyze_price, FeeSchedule, PriceAnalysisInput};
/// use pricing_core::money::Money;
/// use pricing_core::types::{Rate, TaxProfile};
///
/// let breakdown = analyze_price(&PriceAnalysisInput {
///     selling_price: Money::from_cents(11800),
///     cost: Money::from_cents(6000),
///     shipping: Money::zero(),
///     fees: FeeSchedule::default(),
///     tax: TaxProfile::vat_payer(Rate::from_bps(1800)),
/// });
///
/// assert_eq!(breakdown.vat.cents(), 1800);
/// assert_eq!(breakdown.net_profit.cents(), 4000);
/// ```
pub fn analyze_price(input: &PriceAnalysisInput) -> MarginBreakdown {
    let vat_bps = input.tax.effective_rate().bps() as i128;
    let vat = if vat_bps == 0 {
        Money::zero()
    } else {
        let numerator = input.selling_price.cents() as i128 * vat_bps;
        Money::from_cents(saturate(div_ceil(numerator, BPS_SCALE as i128 + vat_bps)))
    };

    let price_ex_vat = input.selling_price - vat;
    let fees = input.fees.amounts_on(price_ex_vat);

    MarginBreakdown::new(input.selling_price, input.cost, input.shipping, fees, vat)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::percentage_of_ceil;
    use proptest::prelude::*;

    fn marketplace_fees() -> FeeSchedule {
        FeeSchedule {
            payment: Rate::from_bps(300),
            platform: Rate::from_bps(1000),
            affiliate: Rate::from_bps(500),
        }
    }

    fn georgian_vat() -> TaxProfile {
        TaxProfile::vat_payer(Rate::from_bps(1800))
    }

    #[test]
    fn test_forward_with_fees_and_vat() {
        let result = calculate_margin(&MarginCalculatorInput {
            cost: Money::from_cents(5000),
            shipping: Money::from_cents(1000),
            fees: marketplace_fees(),
            tax: georgian_vat(),
            desired_profit: DesiredProfit::Percent(Rate::from_bps(2000)),
        });

        assert_eq!(result.target_profit.cents(), 1200);
        assert_eq!(result.price_before_fees.cents(), 7200);
        assert_eq!(result.breakdown.fees.payment.cents(), 216);
        assert_eq!(result.breakdown.fees.platform.cents(), 720);
        assert_eq!(result.breakdown.fees.affiliate.cents(), 360);
        assert_eq!(result.breakdown.fees.total.cents(), 1296);
        // 8496 × 18% = 1529.28 → 1530
        assert_eq!(result.breakdown.vat.cents(), 1530);
        assert_eq!(result.recommended_price.cents(), 10026);
        assert_eq!(result.breakdown.price_ex_vat.cents(), 8496);
        assert_eq!(result.breakdown.net_profit.cents(), 1200);
        // 4026 / 10026 = 40.1556%
        assert_eq!(result.breakdown.gross_margin_bps, 4016);
        assert!((result.breakdown.gross_margin_percent - 40.16).abs() < 1e-9);
        assert_eq!(result.breakdown.net_margin_bps, 1197);
    }

    #[test]
    fn test_forward_fixed_profit_no_vat() {
        let result = calculate_margin(&MarginCalculatorInput {
            cost: Money::from_cents(1000),
            shipping: Money::zero(),
            fees: FeeSchedule::default(),
            tax: TaxProfile::non_payer(),
            desired_profit: DesiredProfit::Fixed(Money::from_cents(500)),
        });

        assert_eq!(result.recommended_price.cents(), 1500);
        assert!(result.breakdown.vat.is_zero());
        assert_eq!(result.breakdown.gross_margin_bps, 3333);
    }

    #[test]
    fn test_non_payer_ignores_configured_rate() {
        let result = calculate_margin(&MarginCalculatorInput {
            cost: Money::from_cents(1000),
            shipping: Money::zero(),
            fees: FeeSchedule::default(),
            tax: TaxProfile {
                is_vat_payer: false,
                vat_rate: Rate::from_bps(1800),
            },
            desired_profit: DesiredProfit::Fixed(Money::zero()),
        });

        assert!(result.breakdown.vat.is_zero());
        assert_eq!(result.recommended_price.cents(), 1000);
    }

    #[test]
    fn test_oversized_cost_saturates() {
        let result = calculate_margin(&MarginCalculatorInput {
            cost: Money::from_cents(i64::MAX - 10),
            shipping: Money::from_cents(100),
            fees: FeeSchedule::default(),
            tax: georgian_vat(),
            desired_profit: DesiredProfit::Percent(Rate::from_bps(2000)),
        });
        assert_eq!(result.recommended_price.cents(), i64::MAX);
    }

    #[test]
    fn test_fees_are_not_compounded() {
        let fees = FeeSchedule {
            payment: Rate::from_bps(1000),
            platform: Rate::from_bps(1000),
            affiliate: Rate::zero(),
        };
        let amounts = fees.amounts_on(Money::from_cents(10000));
        assert_eq!(amounts.payment.cents(), 1000);
        assert_eq!(amounts.platform.cents(), 1000);
        assert_eq!(amounts.total.cents(), 2000);
    }

    #[test]
    fn test_fee_schedule_from_percentages() {
        let fees = FeeSchedule::from_percentages(2.9, 10.0, 0.0).unwrap();
        assert_eq!(fees.payment.bps(), 290);
        assert_eq!(fees.total_bps(), 1290);
        assert!(FeeSchedule::from_percentages(f64::NAN, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_inverse_with_fees_and_vat() {
        let breakdown = analyze_price(&PriceAnalysisInput {
            selling_price: Money::from_cents(10026),
            cost: Money::from_cents(5000),
            shipping: Money::from_cents(1000),
            fees: marketplace_fees(),
            tax: georgian_vat(),
        });

        // 10026 × 18 / 118 = 1529.38 → 1530
        assert_eq!(breakdown.vat.cents(), 1530);
        assert_eq!(breakdown.price_ex_vat.cents(), 8496);
        assert_eq!(breakdown.fees.payment.cents(), 255);
        assert_eq!(breakdown.fees.platform.cents(), 850);
        assert_eq!(breakdown.fees.affiliate.cents(), 425);
        assert_eq!(breakdown.net_profit.cents(), 966);
        assert_eq!(breakdown.gross_margin_bps, 4016);
    }

    #[test]
    fn test_inverse_loss_is_reported_not_hidden() {
        let breakdown = analyze_price(&PriceAnalysisInput {
            selling_price: Money::from_cents(5000),
            cost: Money::from_cents(6000),
            shipping: Money::zero(),
            fees: FeeSchedule::default(),
            tax: TaxProfile::non_payer(),
        });

        assert_eq!(breakdown.net_profit.cents(), -1000);
        assert_eq!(breakdown.gross_margin_bps, -2000);
    }

    #[test]
    fn test_zero_price_yields_zero_margin() {
        let breakdown = analyze_price(&PriceAnalysisInput {
            selling_price: Money::zero(),
            cost: Money::zero(),
            shipping: Money::zero(),
            fees: marketplace_fees(),
            tax: georgian_vat(),
        });

        assert_eq!(breakdown.gross_margin_bps, 0);
        assert_eq!(breakdown.net_margin_bps, 0);
        assert_eq!(breakdown.gross_margin_percent, 0.0);
    }

    #[test]
    fn test_desired_profit_json_shape() {
        let json = serde_json::to_string(&DesiredProfit::Percent(Rate::from_bps(2000))).unwrap();
        assert_eq!(json, r#"{"kind":"percent","value":2000}"#);
    }

    proptest! {
        /// Without fees the only drift is the VAT back-out (at most 1 unit).
        #[test]
        fn prop_round_trip_without_fees(
            cost in 0i64..=5_000_000,
            shipping in 0i64..=100_000,
            profit_bps in 0u32..=20_000,
            vat_bps in 0u32..=3000,
        ) {
            let tax = TaxProfile::vat_payer(Rate::from_bps(vat_bps));
            let forward = calculate_margin(&MarginCalculatorInput {
                cost: Money::from_cents(cost),
                shipping: Money::from_cents(shipping),
                fees: FeeSchedule::default(),
                tax,
                desired_profit: DesiredProfit::Percent(Rate::from_bps(profit_bps)),
            });
            let inverse = analyze_price(&PriceAnalysisInput {
                selling_price: forward.recommended_price,
                cost: Money::from_cents(cost),
                shipping: Money::from_cents(shipping),
                fees: FeeSchedule::default(),
                tax,
            });

            let drift = (inverse.net_profit - forward.breakdown.net_profit).cents();
            prop_assert!(drift.abs() <= 2, "drift {} exceeds 2", drift);
        }

        /// With fees the inverse charges them on a larger base (the price
        /// already contains the fees), so it can only report less profit,
        /// and by no more than the fee rate applied to the fees themselves.
        #[test]
        fn prop_round_trip_with_fees_is_bounded(
            cost in 0i64..=5_000_000,
            profit_bps in 0u32..=20_000,
            payment in 0u32..=500,
            platform in 0u32..=2000,
            affiliate in 0u32..=2000,
            vat_bps in 0u32..=3000,
        ) {
            let fees = FeeSchedule {
                payment: Rate::from_bps(payment),
                platform: Rate::from_bps(platform),
                affiliate: Rate::from_bps(affiliate),
            };
            let tax = TaxProfile::vat_payer(Rate::from_bps(vat_bps));
            let forward = calculate_margin(&MarginCalculatorInput {
                cost: Money::from_cents(cost),
                shipping: Money::zero(),
                fees,
                tax,
                desired_profit: DesiredProfit::Percent(Rate::from_bps(profit_bps)),
            });
            let inverse = analyze_price(&PriceAnalysisInput {
                selling_price: forward.recommended_price,
                cost: Money::from_cents(cost),
                shipping: Money::zero(),
                fees,
                tax,
            });

            let drift = (inverse.net_profit - forward.breakdown.net_profit).cents();
            let bound = percentage_of_ceil(forward.breakdown.fees.total, fees.total_bps()).cents() + 4;
            prop_assert!(drift <= 1, "inverse reported {} more profit", drift);
            prop_assert!(-drift <= bound, "drift {} exceeds bound {}", drift, bound);
        }

        #[test]
        fn prop_forward_meets_fixed_target(
            cost in 0i64..=5_000_000,
            target in 0i64..=1_000_000,
            payment in 0u32..=500,
            platform in 0u32..=2000,
            vat_bps in 0u32..=3000,
        ) {
            let result = calculate_margin(&MarginCalculatorInput {
                cost: Money::from_cents(cost),
                shipping: Money::zero(),
                fees: FeeSchedule {
                    payment: Rate::from_bps(payment),
                    platform: Rate::from_bps(platform),
                    affiliate: Rate::zero(),
                },
                tax: TaxProfile::vat_payer(Rate::from_bps(vat_bps)),
                desired_profit: DesiredProfit::Fixed(Money::from_cents(target)),
            });
            prop_assert_eq!(result.breakdown.net_profit.cents(), target);
        }
    }
}
