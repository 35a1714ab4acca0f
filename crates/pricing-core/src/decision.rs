//! # Decision Engine
//!
//! Decides whether a product candidate may be published and, when it fails
//! its margin floor, which price would pass.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductCandidate                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  computed_at(retail_price)  platform / affiliate / reserve / VAT       │
//! │       │                     as bps of the retail price                  │
//! │       ▼                                                                 │
//! │  Hard rules ──► reasons[]   net ≤ 0, margin < floor[product_type]       │
//! │  Soft rules ──► warnings[]  slow shipping, thin refund reserve          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reasons empty? ── yes ──► PUBLISH                                      │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  REJECT ── margin reason? ── yes ──► reverse-solve recommended price    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reverse-Solve
//! Fees are a fraction of the *solved* price, so the solve is closed form:
//! `price = (supplier + shipping) / (1 − target − fee fractions − VAT)`.
//! A bounded binary search over at most a few units then removes the error
//! introduced by rounding each percentage to a whole minor unit, so the
//! recommended price is one that actually re-evaluates above the floor.
//! [`recommended_price_approximate`] keeps the cheaper stale-price estimate
//! for comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::money::{div_ceil, div_round_half_even, percentage_of, ratio_bps, saturate, Money};
use crate::types::{format_bps, ProductType, Rate};
use crate::{BPS_SCALE, MAX_BUYER_SHIPPING_DAYS, MIN_REFUND_RESERVE_BPS};

/// Upper bound, in minor units, on how far the summed deductions can drift
/// from their exact values: four half-even percentages (platform, affiliate,
/// reserve, VAT), each off by at most half a unit. The starting `high` of the
/// reverse-solve meets the floor only because of this bound.
const ROUNDING_SLACK: i128 = 2;

/// Fallback multiplier (in bps) when no finite price satisfies the floor.
const FALLBACK_MULTIPLIER_BPS: u32 = 15_000;

// =============================================================================
// Thresholds
// =============================================================================

/// Minimum margin per product type.
///
/// | Type          | Floor  |
/// |---------------|--------|
/// | standard      | 15%    |
/// | dropshipping  | 25%    |
/// | digital       | 70%    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginThresholds {
    pub standard: Rate,
    pub dropshipping: Rate,
    pub digital: Rate,
}

impl Default for MarginThresholds {
    fn default() -> Self {
        MarginThresholds {
            standard: Rate::from_bps(1500),
            dropshipping: Rate::from_bps(2500),
            digital: Rate::from_bps(7000),
        }
    }
}

impl MarginThresholds {
    /// The floor for one product type.
    pub fn for_type(&self, product_type: ProductType) -> Rate {
        match product_type {
            ProductType::Standard => self.standard,
            ProductType::Dropshipping => self.dropshipping,
            ProductType::Digital => self.digital,
        }
    }

    /// Returns a copy with every `Some` override applied.
    pub fn with_overrides(mut self, overrides: &ThresholdOverrides) -> Self {
        if let Some(rate) = overrides.standard {
            self.standard = rate;
        }
        if let Some(rate) = overrides.dropshipping {
            self.dropshipping = rate;
        }
        if let Some(rate) = overrides.digital {
            self.digital = rate;
        }
        self
    }
}

/// Caller-supplied partial thresholds; `None` keeps the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ThresholdOverrides {
    #[serde(default)]
    pub standard: Option<Rate>,
    #[serde(default)]
    pub dropshipping: Option<Rate>,
    #[serde(default)]
    pub digital: Option<Rate>,
}

// =============================================================================
// Candidate
// =============================================================================

/// A product a seller wants to list, with its full cost structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductCandidate {
    pub product_type: ProductType,
    pub retail_price: Money,
    pub supplier_cost: Money,
    #[serde(default)]
    pub shipping_cost: Money,
    #[serde(default)]
    pub vat_enabled: bool,
    #[serde(default)]
    pub vat_rate: Rate,
    #[serde(default)]
    pub platform_fee: Rate,
    #[serde(default)]
    pub affiliate: Rate,
    #[serde(default)]
    pub refund_reserve: Rate,
    #[serde(default)]
    pub shipping_days_max: Option<u32>,
}

impl ProductCandidate {
    /// VAT rate actually applied (zero when VAT is disabled).
    fn effective_vat(&self) -> Rate {
        if self.vat_enabled {
            self.vat_rate
        } else {
            Rate::zero()
        }
    }

    /// Basis points of the price claimed by fees, reserve and VAT.
    fn committed_bps(&self) -> i64 {
        self.platform_fee.bps() as i64
            + self.affiliate.bps() as i64
            + self.refund_reserve.bps() as i64
            + self.effective_vat().bps() as i64
    }
}

// =============================================================================
// Result
// =============================================================================

/// Final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Publish,
    Reject,
}

/// Hard rule that blocks publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectReason {
    NonPositiveNetProfit {
        net_per_order: Money,
    },
    BelowMarginThreshold {
        product_type: ProductType,
        actual_bps: i64,
        required_bps: u32,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NonPositiveNetProfit { .. } => {
                write!(f, "Net profit per order is zero or negative")
            }
            RejectReason::BelowMarginThreshold {
                product_type,
                actual_bps,
                required_bps,
            } => write!(
                f,
                "Margin {}% is below the required {}% for {} products",
                format_bps(*actual_bps),
                format_bps(*required_bps as i64),
                product_type
            ),
        }
    }
}

/// Soft rule; reported but never changes the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DecisionWarning {
    SlowShipping {
        shipping_days_max: u32,
        expected_days_max: u32,
    },
    LowRefundReserve {
        refund_reserve_bps: u32,
        minimum_bps: u32,
    },
}

impl fmt::Display for DecisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionWarning::SlowShipping {
                shipping_days_max,
                expected_days_max,
            } => write!(
                f,
                "Shipping exceeds buyer expectation: up to {} days (expected at most {})",
                shipping_days_max, expected_days_max
            ),
            DecisionWarning::LowRefundReserve { minimum_bps, .. } => write!(
                f,
                "Refund reserve below {}% — insufficient safety margin",
                minimum_bps / 100
            ),
        }
    }
}

/// Per-order numbers at the evaluated price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputedMargin {
    pub net_per_order: Money,
    pub margin_bps: i64,
    /// `margin_bps` as a percentage, for display.
    pub margin_percent: f64,
    pub vat_amount: Money,
    pub platform_fee_amount: Money,
    pub affiliate_amount: Money,
    pub refund_reserve_amount: Money,
    /// Supplier + shipping + platform + affiliate + reserve (VAT excluded).
    pub total_costs: Money,
}

/// Outcome of [`evaluate_product_candidate`].
///
/// `recommended_price` is `Some` exactly when the candidate is rejected for
/// missing its margin floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DecisionResult {
    pub decision: Decision,
    pub reasons: Vec<RejectReason>,
    pub warnings: Vec<DecisionWarning>,
    pub computed: ComputedMargin,
    pub recommended_price: Option<Money>,
}

impl DecisionResult {
    pub fn is_publishable(&self) -> bool {
        self.decision == Decision::Publish
    }

    /// Reasons rendered for display.
    pub fn reason_messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    /// Warnings rendered for display.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    fn has_margin_reason(&self) -> bool {
        self.reasons
            .iter()
            .any(|r| matches!(r, RejectReason::BelowMarginThreshold { .. }))
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates a candidate against the margin floors.
///
/// ## Example
/// ```rust
/// use pricing_core::decision::{evaluate_product_candidate, Decision, MarginThresholds, ProductCandidate};
/// use pricing_core::money::Money;
/// use pricing_core::types::{ProductType, Rate};
///
/// let candidate = ProductCandidate {
///     product_type: ProductType::Dropshipping,
///     retail_price: Money::from_cents(10000),
///     supplier_cost: Money::from_cents(7000),
///     shipping_cost: Money::from_cents(500),
///     vat_enabled: false,
///     vat_rate: Rate::zero(),
///     platform_fee: Rate::from_bps(500),
///     affiliate: Rate::zero(),
///     refund_reserve: Rate::from_bps(200),
///     shipping_days_max: None,
/// };
///
/// let result = evaluate_product_candidate(&candidate, &MarginThresholds::default());
/// assert_eq!(result.decision, Decision::Reject);
/// assert!(result.recommended_price.unwrap() > candidate.retail_price);
/// ```
pub fn evaluate_product_candidate(
    candidate: &ProductCandidate,
    thresholds: &MarginThresholds,
) -> DecisionResult {
    let computed = computed_at(candidate, candidate.retail_price);
    let threshold = thresholds.for_type(candidate.product_type);

    let mut reasons = Vec::new();
    if !computed.net_per_order.is_positive() {
        reasons.push(RejectReason::NonPositiveNetProfit {
            net_per_order: computed.net_per_order,
        });
    }
    if computed.margin_bps < threshold.bps() as i64 {
        reasons.push(RejectReason::BelowMarginThreshold {
            product_type: candidate.product_type,
            actual_bps: computed.margin_bps,
            required_bps: threshold.bps(),
        });
    }

    let mut warnings = Vec::new();
    if let Some(days) = candidate.shipping_days_max {
        if days > MAX_BUYER_SHIPPING_DAYS {
            warnings.push(DecisionWarning::SlowShipping {
                shipping_days_max: days,
                expected_days_max: MAX_BUYER_SHIPPING_DAYS,
            });
        }
    }
    if candidate.refund_reserve.bps() < MIN_REFUND_RESERVE_BPS {
        warnings.push(DecisionWarning::LowRefundReserve {
            refund_reserve_bps: candidate.refund_reserve.bps(),
            minimum_bps: MIN_REFUND_RESERVE_BPS,
        });
    }

    let decision = if reasons.is_empty() {
        Decision::Publish
    } else {
        Decision::Reject
    };

    let mut result = DecisionResult {
        decision,
        reasons,
        warnings,
        computed,
        recommended_price: None,
    };

    if result.has_margin_reason() {
        result.recommended_price = Some(recommended_price(candidate, threshold));
    }

    debug!(
        product_type = %candidate.product_type,
        retail_price = candidate.retail_price.cents(),
        margin_bps = result.computed.margin_bps,
        threshold_bps = threshold.bps(),
        decision = ?result.decision,
        recommended_price = ?result.recommended_price.map(|p| p.cents()),
        warnings = result.warnings.len(),
        "Evaluated product candidate"
    );

    result
}

/// [`evaluate_product_candidate`] with partial thresholds merged over the
/// defaults.
pub fn evaluate_with_overrides(
    candidate: &ProductCandidate,
    overrides: &ThresholdOverrides,
) -> DecisionResult {
    let thresholds = MarginThresholds::default().with_overrides(overrides);
    evaluate_product_candidate(candidate, &thresholds)
}

/// Per-order numbers if the candidate sold at `price`.
fn computed_at(candidate: &ProductCandidate, price: Money) -> ComputedMargin {
    let platform_fee_amount = percentage_of(price, candidate.platform_fee.bps());
    let affiliate_amount = percentage_of(price, candidate.affiliate.bps());
    let refund_reserve_amount = percentage_of(price, candidate.refund_reserve.bps());
    let vat_amount = percentage_of(price, candidate.effective_vat().bps());

    let total_costs = candidate.supplier_cost
        + candidate.shipping_cost
        + platform_fee_amount
        + affiliate_amount
        + refund_reserve_amount;
    let net_per_order = price - total_costs - vat_amount;
    let margin_bps = ratio_bps(net_per_order, price);

    ComputedMargin {
        net_per_order,
        margin_bps,
        margin_percent: margin_bps as f64 / 100.0,
        vat_amount,
        platform_fee_amount,
        affiliate_amount,
        refund_reserve_amount,
        total_costs,
    }
}

fn meets_threshold(candidate: &ProductCandidate, price: Money, target: Rate) -> bool {
    computed_at(candidate, price).margin_bps >= target.bps() as i64
}

// =============================================================================
// Reverse-Solve
// =============================================================================

/// Price (never below the submitted one) at which the candidate meets `target`.
///
/// Falls back to 1.5 × the submitted price when the floor plus fees claim the
/// whole price and no finite solution exists.
pub fn recommended_price(candidate: &ProductCandidate, target: Rate) -> Money {
    let solved = solve_exact(candidate, target)
        .unwrap_or_else(|| percentage_of(candidate.retail_price, FALLBACK_MULTIPLIER_BPS));

    solved.max(candidate.retail_price)
}

/// Stale-price estimate: fees and VAT are taken off the *submitted* price,
/// then `price = (costs + VAT) / (1 − target)`.
///
/// Cheaper than [`recommended_price`] but can undershoot, because the fees
/// at the recommended price are larger than the estimate.
pub fn recommended_price_approximate(candidate: &ProductCandidate, target: Rate) -> Money {
    if target.bps() as i64 >= BPS_SCALE {
        return percentage_of(candidate.retail_price, FALLBACK_MULTIPLIER_BPS)
            .max(candidate.retail_price);
    }

    let estimate = computed_at(candidate, candidate.retail_price);
    let numerator = (estimate.total_costs + estimate.vat_amount).cents() as i128 * BPS_SCALE as i128;
    let denominator = BPS_SCALE as i128 - target.bps() as i128;
    let solved = Money::from_cents(saturate(div_round_half_even(numerator, denominator)));

    solved.max(candidate.retail_price)
}

/// Closed-form solve followed by a binary search over the rounding slack.
///
/// `None` when the floor plus fee fractions reach 100%.
fn solve_exact(candidate: &ProductCandidate, target: Rate) -> Option<Money> {
    let target_bps = target.bps() as i64;
    let denominator = BPS_SCALE - target_bps - candidate.committed_bps();
    if target_bps >= BPS_SCALE || denominator <= 0 {
        return None;
    }

    let base = (candidate.supplier_cost + candidate.shipping_cost).cents() as i128;
    let scale = BPS_SCALE as i128;
    let denominator = denominator as i128;

    // `high` always meets the target; `low` is the unrounded solution.
    let mut low = saturate(div_ceil(base * scale, denominator));
    let mut high = saturate(div_ceil((base + ROUNDING_SLACK) * scale, denominator));

    while low < high {
        let mid = low + (high - low) / 2;
        if meets_threshold(candidate, Money::from_cents(mid), target) {
            high = mid;
        } else {
            low = mid + 1;
        }
    }

    Some(Money::from_cents(high))
}

// =============================================================================
// Unit Tests
// =============================================================================
