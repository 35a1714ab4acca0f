//! # Pricing Strategy Selector
//!
//! Picks a pricing posture from unit economics and turns it into a retail
//! price for the Georgian market.
//!
//! ## Suggestion Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LTV / CAC ──► recommend_pricing_mode ──► Growth | Hybrid | Profit      │
//! │                                                │                        │
//! │  tier ──────► calculate_georgian_platform_fee ◄┤                        │
//! │                                                │                        │
//! │  cost, target ─► calculate_retail_price ◄──────┤  (exact solve)         │
//! │                         │                      │                        │
//! │                         ▼                      │                        │
//! │  market ──────► adjust_price_for_market ◄──────┘  (rounded per step)    │
//! │                         │                                               │
//! │                         ▼                                               │
//! │               validate_minimum_margin ──► PriceSuggestion               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike the decision engine, fees here are defined as a fixed fraction of
//! the *output* price, so `cost / (1 − fractions)` is already exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{div_round_half_even, percentage_of, ratio_bps, saturate, Money};
use crate::types::{
    format_bps, DemandLevel, InventoryLevel, PlatformTier, PricingMode, Rate, TaxProfile,
};
use crate::{BPS_SCALE, DEFAULT_MIN_MARGIN_BPS};

const GROWTH_MARGIN_FLOOR_BPS: u32 = 2000;
const GROWTH_MARGIN_DISCOUNT_BPS: u32 = 500;
const PROFIT_MARGIN_CAP_BPS: u32 = 4000;
const PROFIT_MARGIN_PREMIUM_BPS: u32 = 1000;

// =============================================================================
// Types
// =============================================================================

/// Input for [`calculate_retail_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingParameters {
    pub cost: Money,
    /// Margin before the mode adjustment.
    pub target_margin: Rate,
    pub platform_fee: Rate,
    #[serde(default)]
    pub tax: TaxProfile,
}

/// Solved retail price with the amounts it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub mode: PricingMode,
    pub retail_price: Money,
    /// Margin after the mode adjustment.
    pub target_margin: Rate,
    pub platform_fee_amount: Money,
    pub vat_amount: Money,
    pub net_profit: Money,
    pub margin_bps: i64,
}

/// Market signals applied after the base price is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarketConditions {
    #[serde(default)]
    pub competitor_price: Option<Money>,
    #[serde(default)]
    pub demand_level: DemandLevel,
    /// Caller-supplied multiplier, clamped into `[0.8, 1.2]`.
    #[serde(default = "default_seasonal_factor")]
    #[ts(as = "String")]
    pub seasonal_factor: Decimal,
    #[serde(default)]
    pub inventory_level: InventoryLevel,
}

fn default_seasonal_factor() -> Decimal {
    Decimal::ONE
}

impl Default for MarketConditions {
    fn default() -> Self {
        MarketConditions {
            competitor_price: None,
            demand_level: DemandLevel::default(),
            seasonal_factor: default_seasonal_factor(),
            inventory_level: InventoryLevel::default(),
        }
    }
}

/// Outcome of [`validate_minimum_margin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginCheck {
    pub is_valid: bool,
    pub actual_margin_bps: i64,
    pub required_margin_bps: u32,
    /// Georgian / English.
    pub message: String,
}

/// Input for [`suggest_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StrategyRequest {
    pub cost: Money,
    pub ltv: Money,
    pub cac: Money,
    pub target_margin: Rate,
    #[serde(default)]
    pub tax: TaxProfile,
    #[serde(default)]
    pub tier: PlatformTier,
    #[serde(default)]
    pub market: MarketConditions,
    /// Defaults to 20%.
    #[serde(default)]
    pub min_margin: Option<Rate>,
}

/// End-to-end price suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceSuggestion {
    pub mode: PricingMode,
    pub platform_fee: Rate,
    pub base: PricingResult,
    pub final_price: Money,
    pub margin_check: MarginCheck,
}

// =============================================================================
// Mode Selection
// =============================================================================

/// Picks the pricing mode from the LTV/CAC ratio.
///
/// Compared by cross-multiplication, so there is no division:
/// `2·ltv < 3·cac` is growth, `2·ltv > 5·cac` is profit, anything else
/// (both boundaries included) is hybrid. Zero CAC with positive LTV is
/// profit; `0 / 0` is hybrid.
///
/// ## Example
/// ```rust
/// use pricing_core::money::Money;
/// use pricing_core::strategy::recommend_pricing_mode;
/// use pricing_core::types::PricingMode;
///
/// let cac = Money::from_cents(10000);
/// assert_eq!(recommend_pricing_mode(Money::from_cents(12000), cac), PricingMode::Growth);
/// assert_eq!(recommend_pricing_mode(Money::from_cents(15000), cac), PricingMode::Hybrid);
/// assert_eq!(recommend_pricing_mode(Money::from_cents(30000), cac), PricingMode::Profit);
/// ```
pub fn recommend_pricing_mode(ltv: Money, cac: Money) -> PricingMode {
    let ltv2 = 2 * ltv.cents() as i128;
    let cac = cac.cents() as i128;

    if ltv2 < 3 * cac {
        PricingMode::Growth
    } else if ltv2 > 5 * cac {
        PricingMode::Profit
    } else {
        PricingMode::Hybrid
    }
}

/// Shifts the target margin for the mode.
///
/// | Mode   | Adjusted margin             |
/// |--------|-----------------------------|
/// | growth | `max(20%, target − 5%)`     |
/// | profit | `min(40%, target + 10%)`    |
/// | hybrid | unchanged                   |
pub fn adjusted_target_margin(target: Rate, mode: PricingMode) -> Rate {
    match mode {
        PricingMode::Growth => Rate::from_bps(
            target
                .bps()
                .saturating_sub(GROWTH_MARGIN_DISCOUNT_BPS)
                .max(GROWTH_MARGIN_FLOOR_BPS),
        ),
        PricingMode::Profit => Rate::from_bps(
            target
                .bps()
                .saturating_add(PROFIT_MARGIN_PREMIUM_BPS)
                .min(PROFIT_MARGIN_CAP_BPS),
        ),
        PricingMode::Hybrid => target,
    }
}

/// Platform fee for a mode and seller tier.
///
/// Standard 5%, premium 7%, enterprise 4%. Growth sellers on the standard
/// tier get a subsidized 3%.
pub fn calculate_georgian_platform_fee(mode: PricingMode, tier: PlatformTier) -> Rate {
    let bps = match (mode, tier) {
        (PricingMode::Growth, PlatformTier::Standard) => 300,
        (_, PlatformTier::Standard) => 500,
        (_, PlatformTier::Premium) => 700,
        (_, PlatformTier::Enterprise) => 400,
    };
    Rate::from_bps(bps)
}

// =============================================================================
// Retail Price
// =============================================================================

/// Solves `price = cost / (1 − (margin + platform fee + VAT))`.
///
/// ## Errors
/// [`CoreError::UnsolvablePrice`] when margin, fee and VAT claim 100% or more
/// of the price.
///
/// ## Example
/// ```rust
/// use pricing_core::money::Money;
/// use pricing_core::strategy::{calculate_retail_price, PricingParameters};
/// use pricing_core::types::{PricingMode, Rate, TaxProfile};
///
/// let params = PricingParameters {
///     cost: Money::from_cents(5000),
///     target_margin: Rate::from_bps(2000),
///     platform_fee: Rate::from_bps(300),
///     tax: TaxProfile::non_payer(),
/// };
///
/// // 5000 / (1 − 0.20 − 0.03) = 6493.51
/// let result = calculate_retail_price(&params, PricingMode::Growth).unwrap();
/// assert_eq!(result.retail_price.cents(), 6494);
/// ```
pub fn calculate_retail_price(
    params: &PricingParameters,
    mode: PricingMode,
) -> CoreResult<PricingResult> {
    let target_margin = adjusted_target_margin(params.target_margin, mode);
    let vat_rate = params.tax.effective_rate();

    let committed_bps =
        target_margin.bps() as i64 + params.platform_fee.bps() as i64 + vat_rate.bps() as i64;
    let denominator = BPS_SCALE - committed_bps;
    if denominator <= 0 {
        return Err(CoreError::UnsolvablePrice { committed_bps });
    }

    let numerator = params.cost.cents() as i128 * BPS_SCALE as i128;
    let retail_price = Money::from_cents(saturate(div_round_half_even(
        numerator,
        denominator as i128,
    )));

    let platform_fee_amount = percentage_of(retail_price, params.platform_fee.bps());
    let vat_amount = percentage_of(retail_price, vat_rate.bps());
    let net_profit = retail_price - params.cost - platform_fee_amount - vat_amount;

    debug!(
        mode = %mode,
        cost = params.cost.cents(),
        target_margin_bps = target_margin.bps(),
        committed_bps,
        retail_price = retail_price.cents(),
        "Solved retail price"
    );

    Ok(PricingResult {
        mode,
        retail_price,
        target_margin,
        platform_fee_amount,
        vat_amount,
        net_profit,
        margin_bps: ratio_bps(net_profit, retail_price),
    })
}

// =============================================================================
// Market Adjustment
// =============================================================================

fn demand_multiplier(level: DemandLevel) -> Decimal {
    match level {
        DemandLevel::Low => Decimal::new(95, 2),
        DemandLevel::Medium => Decimal::ONE,
        DemandLevel::High => Decimal::new(105, 2),
    }
}

fn clamp_seasonal_factor(factor: Decimal) -> Decimal {
    factor.clamp(Decimal::new(8, 1), Decimal::new(12, 1))
}

/// Applies market signals to a base price.
///
/// Steps run in order and each one rounds to a whole minor unit before the
/// next, so results are reproducible step by step:
///
/// 1. growth with a competitor price: cap at 92% of it
/// 2. demand: low ×0.95, medium ×1.00, high ×1.05
/// 3. seasonal factor, clamped into `[0.8, 1.2]`
/// 4. high inventory outside profit mode: ×0.90
///
/// ## Example
/// ```rust
/// use pricing_core::money::Money;
/// use pricing_core::strategy::{adjust_price_for_market, MarketConditions};
/// use pricing_core::types::{DemandLevel, InventoryLevel, PricingMode};
/// use rust_decimal::Decimal;
///
/// let conditions = MarketConditions {
///     competitor_price: Some(Money::from_cents(9000)),
///     demand_level: DemandLevel::High,
///     seasonal_factor: Decimal::ONE,
///     inventory_level: InventoryLevel::Low,
/// };
///
/// // min(10000, 8280) × 1.05 = 8694
/// let price = adjust_price_for_market(Money::from_cents(10000), &conditions, PricingMode::Growth);
/// assert_eq!(price.cents(), 8694);
/// ```
pub fn adjust_price_for_market(
    base_price: Money,
    conditions: &MarketConditions,
    mode: PricingMode,
) -> Money {
    let mut price = base_price;

    if mode == PricingMode::Growth {
        if let Some(competitor) = conditions.competitor_price {
            price = price.min(competitor.scale(Decimal::new(92, 2)));
        }
    }

    price = price.scale(demand_multiplier(conditions.demand_level));
    price = price.scale(clamp_seasonal_factor(conditions.seasonal_factor));

    if conditions.inventory_level == InventoryLevel::High && mode != PricingMode::Profit {
        price = price.scale(Decimal::new(90, 2));
    }

    price
}

// =============================================================================
// Minimum Margin Check
// =============================================================================

/// Recomputes the margin from its four inputs and checks it against a floor
/// (20% when `min_margin` is `None`).
pub fn validate_minimum_margin(
    price: Money,
    cost: Money,
    platform_fee: Money,
    vat: Money,
    min_margin: Option<Rate>,
) -> MarginCheck {
    let required = min_margin.map_or(DEFAULT_MIN_MARGIN_BPS, |rate| rate.bps());
    let actual = ratio_bps(price - cost - platform_fee - vat, price);
    let is_valid = actual >= required as i64;

    let actual_pct = format_bps(actual);
    let required_pct = format_bps(required as i64);
    let message = if is_valid {
        format!(
            "მარჟა {actual_pct}% აკმაყოფილებს მინიმუმს ({required_pct}%) / \
             Margin {actual_pct}% meets the minimum of {required_pct}%"
        )
    } else {
        format!(
            "მარჟა {actual_pct}% ნაკლებია მინიმალურ {required_pct}%-ზე / \
             Margin {actual_pct}% is below the minimum of {required_pct}%"
        )
    };

    MarginCheck {
        is_valid,
        actual_margin_bps: actual,
        required_margin_bps: required,
        message,
    }
}

// =============================================================================
// Suggestion
// =============================================================================

/// Runs the whole strategy pipeline for one product.
///
/// The margin check runs on the market-adjusted price, with the fee and VAT
/// recomputed at that price.
pub fn suggest_price(request: &StrategyRequest) -> CoreResult<PriceSuggestion> {
    let mode = recommend_pricing_mode(request.ltv, request.cac);
    let platform_fee = calculate_georgian_platform_fee(mode, request.tier);

    let base = calculate_retail_price(
        &PricingParameters {
            cost: request.cost,
            target_margin: request.target_margin,
            platform_fee,
            tax: request.tax,
        },
        mode,
    )?;

    let final_price = adjust_price_for_market(base.retail_price, &request.market, mode);
    let margin_check = validate_minimum_margin(
        final_price,
        request.cost,
        percentage_of(final_price, platform_fee.bps()),
        percentage_of(final_price, request.tax.effective_rate().bps()),
        request.min_margin,
    );

    debug!(
        mode = %mode,
        base_price = base.retail_price.cents(),
        final_price = final_price.cents(),
        margin_bps = margin_check.actual_margin_bps,
        is_valid = margin_check.is_valid,
        "Suggested price"
    );

    Ok(PriceSuggestion {
        mode,
        platform_fee,
        base,
        final_price,
        margin_check,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
