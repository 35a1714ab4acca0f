//! # Validation Module
//!
//! Guards the wrapping layer runs before handing input to the calculators.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web form (TypeScript)                                        │
//! │  ├── Generated types from ts-rs                                        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialization (serde)                                      │
//! │  ├── Integer money, known enum variants                                │
//! │  └── Decimal seasonal factor                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── Money ≥ 0, quantity ≥ 1                                           │
//! │  └── Rates within [0, 10000] bps                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Calculators: assume all of the above, never re-check                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculators do not clamp: a 12000 bps rate passed straight in yields
//! an inverted result instead of an error. Run the matching guard first.
//!
//! ## Usage
//! ```rust
//! use pricing_core::money::Money;
//! use pricing_core::types::Rate;
//! use pricing_core::validation::{validate_money_non_negative, validate_rate};
//!
//! assert!(validate_money_non_negative("cost", Money::from_cents(500)).is_ok());
//! assert!(validate_rate("vat_rate", Rate::from_bps(12000)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::decision::{ProductCandidate, ThresholdOverrides};
use crate::error::ValidationError;
use crate::margin::{DesiredProfit, FeeSchedule, MarginCalculatorInput, PriceAnalysisInput};
use crate::money::Money;
use crate::strategy::{MarketConditions, PricingParameters, StrategyRequest};
use crate::tax::TaxCalculationInput;
use crate::types::{LineItem, Rate, TaxProfile};
use crate::{BPS_SCALE, MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, MAX_MONEY_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Primitive Validators
// =============================================================================

/// Money inputs (prices, costs) must not be negative and must not exceed
/// [`MAX_MONEY_CENTS`].
pub fn validate_money_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    if amount.cents() > MAX_MONEY_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_CENTS,
        });
    }

    Ok(())
}

/// Validates an invoice quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
///
/// ## Example
/// ```rust
/// use pricing_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-1).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Rates must lie within `[0, 10000]` bps (0% to 100%).
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate.bps() as i64 > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: BPS_SCALE,
        });
    }
    Ok(())
}

/// The seasonal multiplier must be positive; range clamping happens in the
/// market adjustment itself.
pub fn validate_seasonal_factor(factor: Decimal) -> ValidationResult<()> {
    if factor <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "seasonal_factor".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

fn validate_tax_profile(tax: &TaxProfile) -> ValidationResult<()> {
    validate_rate("vat_rate", tax.vat_rate)
}

fn validate_fee_schedule(fees: &FeeSchedule) -> ValidationResult<()> {
    validate_rate("fees.payment", fees.payment)?;
    validate_rate("fees.platform", fees.platform)?;
    validate_rate("fees.affiliate", fees.affiliate)?;
    Ok(())
}

/// Validates invoice lines.
///
/// ## Rules
/// - At most [`MAX_LINE_ITEMS`] lines (an empty invoice is allowed)
/// - Each unit price ≥ 0, each quantity valid
/// - Each line total (`unit_price × quantity`) at most [`MAX_MONEY_CENTS`]
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line_items".to_string(),
            min: 0,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    for item in items {
        validate_money_non_negative("unit_price", item.unit_price)?;
        validate_quantity(item.quantity)?;

        let line_total = item.unit_price.cents().checked_mul(item.quantity);
        if !line_total.is_some_and(|total| total <= MAX_MONEY_CENTS) {
            return Err(ValidationError::OutOfRange {
                field: "line_total".to_string(),
                min: 0,
                max: MAX_MONEY_CENTS,
            });
        }
    }

    Ok(())
}

pub fn validate_tax_input(input: &TaxCalculationInput) -> ValidationResult<()> {
    validate_tax_profile(&input.tax)?;
    validate_line_items(&input.line_items)
}

pub fn validate_margin_input(input: &MarginCalculatorInput) -> ValidationResult<()> {
    validate_money_non_negative("cost", input.cost)?;
    validate_money_non_negative("shipping", input.shipping)?;
    validate_fee_schedule(&input.fees)?;
    validate_tax_profile(&input.tax)?;

    match input.desired_profit {
        DesiredProfit::Percent(rate) => validate_rate("desired_profit", rate),
        DesiredProfit::Fixed(amount) => validate_money_non_negative("desired_profit", amount),
    }
}

pub fn validate_price_analysis_input(input: &PriceAnalysisInput) -> ValidationResult<()> {
    validate_money_non_negative("selling_price", input.selling_price)?;
    validate_money_non_negative("cost", input.cost)?;
    validate_money_non_negative("shipping", input.shipping)?;
    validate_fee_schedule(&input.fees)?;
    validate_tax_profile(&input.tax)
}

/// Validates a product candidate before evaluation.
///
/// ## Example
/// ```rust
/// use pricing_core::decision::ProductCandidate;
/// use pricing_core::money::Money;
/// use pricing_core::types::{ProductType, Rate};
/// use pricing_core::validation::validate_candidate;
///
/// let mut candidate = ProductCandidate {
///     product_type: ProductType::Standard,
///     retail_price: Money::from_cents(10000),
///     supplier_cost: Money::from_cents(4000),
///     shipping_cost: Money::zero(),
///     vat_enabled: false,
///     vat_rate: Rate::zero(),
///     platform_fee: Rate::from_bps(500),
///     affiliate: Rate::zero(),
///     refund_reserve: Rate::from_bps(200),
///     shipping_days_max: None,
/// };
/// assert!(validate_candidate(&candidate).is_ok());
///
/// candidate.supplier_cost = Money::from_cents(-1);
/// assert!(validate_candidate(&candidate).is_err());
/// ```
pub fn validate_candidate(candidate: &ProductCandidate) -> ValidationResult<()> {
    validate_money_non_negative("retail_price", candidate.retail_price)?;
    validate_money_non_negative("supplier_cost", candidate.supplier_cost)?;
    validate_money_non_negative("shipping_cost", candidate.shipping_cost)?;
    validate_rate("vat_rate", candidate.vat_rate)?;
    validate_rate("platform_fee", candidate.platform_fee)?;
    validate_rate("affiliate", candidate.affiliate)?;
    validate_rate("refund_reserve", candidate.refund_reserve)?;
    Ok(())
}

pub fn validate_threshold_overrides(overrides: &ThresholdOverrides) -> ValidationResult<()> {
    let fields = [
        ("thresholds.standard", overrides.standard),
        ("thresholds.dropshipping", overrides.dropshipping),
        ("thresholds.digital", overrides.digital),
    ];
    for (field, rate) in fields {
        if let Some(rate) = rate {
            validate_rate(field, rate)?;
        }
    }
    Ok(())
}

pub fn validate_pricing_parameters(params: &PricingParameters) -> ValidationResult<()> {
    validate_money_non_negative("cost", params.cost)?;
    validate_rate("target_margin", params.target_margin)?;
    validate_rate("platform_fee", params.platform_fee)?;
    validate_tax_profile(&params.tax)
}

pub fn validate_market_conditions(market: &MarketConditions) -> ValidationResult<()> {
    if let Some(competitor) = market.competitor_price {
        validate_money_non_negative("competitor_price", competitor)?;
    }
    validate_seasonal_factor(market.seasonal_factor)
}

pub fn validate_strategy_request(request: &StrategyRequest) -> ValidationResult<()> {
    validate_money_non_negative("cost", request.cost)?;
    validate_money_non_negative("ltv", request.ltv)?;
    validate_money_non_negative("cac", request.cac)?;
    validate_rate("target_margin", request.target_margin)?;
    if let Some(min_margin) = request.min_margin {
        validate_rate("min_margin", min_margin)?;
    }
    validate_tax_profile(&request.tax)?;
    validate_market_conditions(&request.market)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, ProductType};
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
        assert_eq!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive {
                field: "quantity".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rate_bounds() {
        assert!(validate_rate("fee", Rate::zero()).is_ok());
        assert!(validate_rate("fee", Rate::from_bps(10000)).is_ok());

        let err = validate_rate("fee", Rate::from_bps(12000)).unwrap_err();
        assert_eq!(err.to_string(), "fee must be between 0 and 10000");
    }

    #[test]
    fn test_validate_money() {
        assert!(validate_money_non_negative("cost", Money::zero()).is_ok());
        let err = validate_money_non_negative("cost", Money::from_cents(-1)).unwrap_err();
        assert_eq!(err.to_string(), "cost must not be negative");

        assert!(validate_money_non_negative("cost", Money::from_cents(MAX_MONEY_CENTS)).is_ok());
        assert_eq!(
            validate_money_non_negative("cost", Money::from_cents(i64::MAX - 10)),
            Err(ValidationError::OutOfRange {
                field: "cost".to_string(),
                min: 0,
                max: MAX_MONEY_CENTS,
            })
        );
    }

    #[test]
    fn test_validate_line_total_cap() {
        let at_cap = [LineItem::new(Money::from_cents(MAX_MONEY_CENTS / 1000), 1000)];
        assert!(validate_line_items(&at_cap).is_ok());

        let overflowing = [LineItem::new(Money::from_cents(10_i64.pow(16)), 1000)];
        assert!(matches!(
            validate_line_items(&overflowing),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "line_total"
        ));

        let wrapping = [LineItem::new(Money::from_cents(MAX_MONEY_CENTS), MAX_ITEM_QUANTITY)];
        assert!(validate_line_items(&wrapping).is_err());
    }

    #[test]
    fn test_huge_amounts_rejected_at_every_entry() {
        let margin = MarginCalculatorInput {
            cost: Money::from_cents(i64::MAX - 10),
            shipping: Money::from_cents(100),
            fees: FeeSchedule::default(),
            tax: TaxProfile::non_payer(),
            desired_profit: DesiredProfit::Percent(Rate::from_bps(2000)),
        };
        assert!(validate_margin_input(&margin).is_err());

        let candidate = ProductCandidate {
            product_type: ProductType::Standard,
            retail_price: Money::from_cents(10000),
            supplier_cost: Money::from_cents(i64::MAX - 10),
            shipping_cost: Money::zero(),
            vat_enabled: false,
            vat_rate: Rate::zero(),
            platform_fee: Rate::zero(),
            affiliate: Rate::zero(),
            refund_reserve: Rate::from_bps(200),
            shipping_days_max: None,
        };
        assert!(validate_candidate(&candidate).is_err());
    }

    #[test]
    fn test_validate_tax_input() {
        let mut input = TaxCalculationInput {
            tax: TaxProfile::vat_payer(Rate::from_bps(1800)),
            line_items: vec![LineItem::new(Money::from_cents(1000), 2)],
            currency: Currency::Gel,
        };
        assert!(validate_tax_input(&input).is_ok());

        input.line_items.push(LineItem::new(Money::from_cents(1000), 0));
        assert!(validate_tax_input(&input).is_err());

        input.line_items.clear();
        assert!(validate_tax_input(&input).is_ok());

        input.tax.vat_rate = Rate::from_bps(10001);
        assert!(validate_tax_input(&input).is_err());
    }

    #[test]
    fn test_validate_margin_input() {
        let input = MarginCalculatorInput {
            cost: Money::from_cents(5000),
            shipping: Money::zero(),
            fees: FeeSchedule::default(),
            tax: TaxProfile::non_payer(),
            desired_profit: DesiredProfit::Fixed(Money::from_cents(-100)),
        };
        assert_eq!(
            validate_margin_input(&input),
            Err(ValidationError::MustBeNonNegative {
                field: "desired_profit".to_string()
            })
        );
    }

    #[test]
    fn test_validate_candidate_rates() {
        let candidate = ProductCandidate {
            product_type: ProductType::Digital,
            retail_price: Money::from_cents(1000),
            supplier_cost: Money::zero(),
            shipping_cost: Money::zero(),
            vat_enabled: true,
            vat_rate: Rate::from_bps(1800),
            platform_fee: Rate::from_bps(500),
            affiliate: Rate::from_bps(20000),
            refund_reserve: Rate::from_bps(200),
            shipping_days_max: Some(3),
        };
        let err = validate_candidate(&candidate).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "affiliate"));
    }

    #[test]
    fn test_validate_overrides() {
        let overrides = ThresholdOverrides {
            digital: Some(Rate::from_bps(10500)),
            ..ThresholdOverrides::default()
        };
        assert!(validate_threshold_overrides(&overrides).is_err());
        assert!(validate_threshold_overrides(&ThresholdOverrides::default()).is_ok());
    }

    #[test]
    fn test_validate_strategy_request() {
        let mut request = StrategyRequest {
            cost: Money::from_cents(5000),
            ltv: Money::from_cents(20000),
            cac: Money::from_cents(5000),
            target_margin: Rate::from_bps(2500),
            tax: TaxProfile::non_payer(),
            tier: Default::default(),
            market: MarketConditions::default(),
            min_margin: None,
        };
        assert!(validate_strategy_request(&request).is_ok());

        request.market.seasonal_factor = dec!(0);
        assert!(validate_strategy_request(&request).is_err());

        request.market.seasonal_factor = dec!(1.1);
        request.cac = Money::from_cents(-5);
        assert!(validate_strategy_request(&request).is_err());
    }
}
