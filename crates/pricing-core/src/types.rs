//! # Domain Types
//!
//! Shared value types used by every calculator in the engine.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │   TaxProfile    │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  is_vat_payer   │   │  unit_price     │       │
//! │  │  1800 = 18.00%  │   │  vat_rate       │   │  quantity ≥ 1   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductType    │   │  PricingMode    │   │  PlatformTier   │       │
//! │  │  Standard       │   │  Growth         │   │  Standard       │       │
//! │  │  Dropshipping   │   │  Profit         │   │  Premium        │       │
//! │  │  Digital        │   │  Hybrid         │   │  Enterprise     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Rate Unit
//! Every rate in the engine is a [`Rate`] in basis points. Percent-based
//! call sites (forms that send `18.00`) convert once, at the boundary, with
//! [`Rate::from_percentage`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{safe_round, Money};

// =============================================================================
// Rate
// =============================================================================

/// A rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (Georgian VAT)
///
/// Values above 10000 are representable on purpose: the engine does not
/// clamp, see [`crate::validation::validate_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (`18.0` → 1800 bps).
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::types::Rate;
    ///
    /// assert_eq!(Rate::from_percentage(18.0).unwrap().bps(), 1800);
    /// assert_eq!(Rate::from_percentage(2.5).unwrap().bps(), 250);
    /// assert!(Rate::from_percentage(f64::NAN).is_err());
    /// assert!(Rate::from_percentage(-1.0).is_err());
    /// ```
    pub fn from_percentage(pct: f64) -> CoreResult<Self> {
        let bps = safe_round("rate", pct * 100.0)?;
        if bps < 0 {
            return Err(ValidationError::MustBeNonNegative {
                field: "rate".to_string(),
            }
            .into());
        }
        u32::try_from(bps).map(Rate).map_err(|_| CoreError::NumericOverflow {
            field: "rate".to_string(),
            value: pct,
        })
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", format_bps(self.0 as i64))
    }
}

/// Formats basis points as a percentage with exactly two decimals.
///
/// Integer formatting, so 1850 is always "18.50" and never "18.499999".
///
/// ## Example
/// ```rust
/// use pricing_core::types::format_bps;
///
/// assert_eq!(format_bps(2500), "25.00");
/// assert_eq!(format_bps(1799), "17.99");
/// assert_eq!(format_bps(-250), "-2.50");
/// ```
pub fn format_bps(bps: i64) -> String {
    let sign = if bps < 0 { "-" } else { "" };
    let abs = bps.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// =============================================================================
// Currency
// =============================================================================

/// Invoice currency (ISO 4217).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Georgian lari (minor unit: tetri).
    #[default]
    Gel,
    Usd,
    Eur,
}

impl Currency {
    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Gel => "GEL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GEL" => Ok(Currency::Gel),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: vec!["GEL".into(), "USD".into(), "EUR".into()],
            }),
        }
    }
}

// =============================================================================
// Tax Profile
// =============================================================================

/// A seller's VAT status.
///
/// ## Hard Rule
/// A seller that is not a VAT payer never charges VAT, whatever rate is
/// configured. [`TaxProfile::effective_rate`] is the only way the
/// calculators read the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxProfile {
    pub is_vat_payer: bool,
    pub vat_rate: Rate,
}

impl TaxProfile {
    /// A registered VAT payer at the given rate.
    pub const fn vat_payer(vat_rate: Rate) -> Self {
        TaxProfile {
            is_vat_payer: true,
            vat_rate,
        }
    }

    /// A seller below the VAT registration threshold.
    pub const fn non_payer() -> Self {
        TaxProfile {
            is_vat_payer: false,
            vat_rate: Rate::zero(),
        }
    }

    /// The rate actually charged: zero for non-payers.
    #[inline]
    pub const fn effective_rate(&self) -> Rate {
        if self.is_vat_payer {
            self.vat_rate
        } else {
            Rate::zero()
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// An invoice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineItem {
    pub const fn new(unit_price: Money, quantity: i64) -> Self {
        LineItem {
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    #[inline]
    pub const fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Product Type
// =============================================================================

/// Fulfilment model of a listed product; selects the margin floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Seller-held stock.
    Standard,
    /// Supplier ships directly to the buyer.
    Dropshipping,
    /// Downloadable / AI-generated content, no shipping.
    Digital,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Standard => write!(f, "standard"),
            ProductType::Dropshipping => write!(f, "dropshipping"),
            ProductType::Digital => write!(f, "digital"),
        }
    }
}

// =============================================================================
// Pricing Mode
// =============================================================================

/// Pricing posture picked from the LTV/CAC ratio.
///
/// ```text
///   LTV/CAC:   0 ──────── 1.5 ════════ 2.5 ──────── ∞
///              │  GROWTH   │  HYBRID    │  PROFIT   │
///                        (both boundaries are HYBRID)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Buy market share: thinner margins, subsidized fees.
    Growth,
    /// Harvest: customers are cheap to acquire relative to their value.
    Profit,
    #[default]
    Hybrid,
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMode::Growth => write!(f, "growth"),
            PricingMode::Profit => write!(f, "profit"),
            PricingMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for PricingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "growth" => Ok(PricingMode::Growth),
            "profit" => Ok(PricingMode::Profit),
            "hybrid" => Ok(PricingMode::Hybrid),
            _ => Err(ValidationError::NotAllowed {
                field: "pricing_mode".to_string(),
                allowed: vec!["growth".into(), "profit".into(), "hybrid".into()],
            }),
        }
    }
}

// =============================================================================
// Platform Tier
// =============================================================================

/// Seller subscription tier; selects the platform fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PlatformTier {
    #[default]
    Standard,
    Premium,
    Enterprise,
}

impl FromStr for PlatformTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(PlatformTier::Standard),
            "premium" => Ok(PlatformTier::Premium),
            "enterprise" => Ok(PlatformTier::Enterprise),
            _ => Err(ValidationError::NotAllowed {
                field: "platform_tier".to_string(),
                allowed: vec!["standard".into(), "premium".into(), "enterprise".into()],
            }),
        }
    }
}

// =============================================================================
// Market Levels
// =============================================================================

/// Observed buyer demand for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Seller's stock position for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InventoryLevel {
    Low,
    #[default]
    Medium,
    High,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_bps() {
        let rate = Rate::from_bps(1800);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
        assert_eq!(rate.to_string(), "18.00%");
    }

    #[test]
    fn test_rate_from_percentage() {
        assert_eq!(Rate::from_percentage(8.25).unwrap().bps(), 825);
        assert_eq!(Rate::from_percentage(0.0).unwrap().bps(), 0);
        assert!(matches!(
            Rate::from_percentage(f64::INFINITY),
            Err(CoreError::NonFinite { .. })
        ));
        assert!(matches!(
            Rate::from_percentage(-3.0),
            Err(CoreError::Validation(ValidationError::MustBeNonNegative { .. }))
        ));
    }

    #[test]
    fn test_format_bps() {
        assert_eq!(format_bps(0), "0.00");
        assert_eq!(format_bps(5), "0.05");
        assert_eq!(format_bps(1800), "18.00");
        assert_eq!(format_bps(-1), "-0.01");
    }

    #[test]
    fn test_tax_profile_effective_rate() {
        let payer = TaxProfile::vat_payer(Rate::from_bps(1800));
        assert_eq!(payer.effective_rate().bps(), 1800);

        let non_payer = TaxProfile {
            is_vat_payer: false,
            vat_rate: Rate::from_bps(1800),
        };
        assert!(non_payer.effective_rate().is_zero());
    }

    #[test]
    fn test_line_total() {
        let item = LineItem::new(Money::from_cents(2999), 3);
        assert_eq!(item.line_total().cents(), 8997);
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("gel".parse::<Currency>().unwrap(), Currency::Gel);
        assert_eq!(" USD ".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("BTC".parse::<Currency>().is_err());
        assert_eq!(Currency::default().code(), "GEL");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Growth".parse::<PricingMode>().unwrap(), PricingMode::Growth);
        assert!("aggressive".parse::<PricingMode>().is_err());
        assert_eq!("premium".parse::<PlatformTier>().unwrap(), PlatformTier::Premium);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ProductType::Dropshipping).unwrap(),
            "\"dropshipping\""
        );
        assert_eq!(serde_json::to_string(&Currency::Gel).unwrap(), "\"GEL\"");
        assert_eq!(serde_json::to_string(&Rate::from_bps(250)).unwrap(), "250");
    }
}
