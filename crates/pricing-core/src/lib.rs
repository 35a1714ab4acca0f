//! # pricing-core: Pure Pricing, Margin & Tax Logic
//!
//! This crate is the **heart** of the marketplace's seller tooling. It decides
//! what a product should cost, what the seller keeps, how much VAT is owed,
//! and whether a listing may go live, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Marketplace Pricing Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Web platform / seller dashboard (React)            │   │
//! │  │    listing form ──► invoice view ──► payouts ──► analytics      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON (types generated by ts-rs)        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pricing-cli / API route handlers                │   │
//! │  │       policy config, validation, logging, JSON in and out       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ pricing-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌──────────┐         │   │
//! │  │   │   tax   │  │ margin  │  │ decision │  │ strategy │         │   │
//! │  │   │   VAT   │  │ forward │  │ publish/ │  │ mode,    │         │   │
//! │  │   │ invoice │  │ inverse │  │ reject   │  │ market   │         │   │
//! │  │   └─────────┘  └─────────┘  └──────────┘  └──────────┘         │   │
//! │  │        money • types • validation • error                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type, rounding primitives (no floating point!)
//! - [`types`] - Rates, tax profiles, product and pricing enums
//! - [`tax`] - Invoice VAT and ledger mirror
//! - [`margin`] - Cost-plus price calculator and its inverse
//! - [`decision`] - Publish / reject with a reverse-solved price
//! - [`strategy`] - LTV/CAC pricing modes and market adjustment
//! - [`validation`] - Input guards to run before the calculators
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Config files, environment and network belong to the caller
//! 3. **Integer Money**: Minor units in i64, rates in basis points
//! 4. **Business Rules Are Data**: A rejected listing is a result, not an error
//!
//! ## Example Usage
//!
//! ```rust
//! use pricing_core::money::Money;
//! use pricing_core::tax::{calculate_tax, TaxCalculationInput};
//! use pricing_core::types::{Currency, LineItem, Rate, TaxProfile};
//!
//! let invoice = calculate_tax(&TaxCalculationInput {
//!     tax: TaxProfile::vat_payer(Rate::from_bps(pricing_core::GEORGIAN_VAT_RATE_BPS)),
//!     line_items: vec![LineItem::new(Money::from_cents(4999), 2)],
//!     currency: Currency::Gel,
//! });
//!
//! // 99.98 GEL × 18% = 17.9964 → 18.00
//! assert_eq!(invoice.vat.cents(), 1800);
//! assert_eq!(invoice.total.cents(), 11798);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod decision;
pub mod error;
pub mod margin;
pub mod money;
pub mod strategy;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pricing_core::Money` instead of
// `use pricing_core::money::Money`

pub use decision::{evaluate_product_candidate, evaluate_with_overrides, DecisionResult};
pub use error::{CoreError, CoreResult, ValidationError};
pub use margin::{analyze_price, calculate_margin};
pub use money::Money;
pub use strategy::{
    adjust_price_for_market, calculate_georgian_platform_fee, calculate_retail_price,
    recommend_pricing_mode, suggest_price, validate_minimum_margin,
};
pub use tax::calculate_tax;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Basis points in 100%.
pub const BPS_SCALE: i64 = 10_000;

/// Standard Georgian VAT rate (18%).
pub const GEORGIAN_VAT_RATE_BPS: u32 = 1800;

/// Margin floor used by the strategy check when the caller gives none (20%).
pub const DEFAULT_MIN_MARGIN_BPS: u32 = 2000;

/// Longest delivery window buyers accept before a listing gets a warning.
pub const MAX_BUYER_SHIPPING_DAYS: u32 = 21;

/// Refund reserve below this rate triggers a warning (2%).
pub const MIN_REFUND_RESERVE_BPS: u32 = 200;

/// Maximum lines on a single invoice
///
/// ## Business Reason
/// Keeps a malformed import from producing a runaway invoice.
pub const MAX_LINE_ITEMS: usize = 1000;

/// Maximum quantity on a single invoice line
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;

/// Largest accepted money amount, and largest invoice line total, in minor
/// units (10 trillion major units).
///
/// A full invoice of [`MAX_LINE_ITEMS`] lines at this cap plus 100% VAT still
/// fits in `i64`.
pub const MAX_MONEY_CENTS: i64 = 1_000_000_000_000_000;
