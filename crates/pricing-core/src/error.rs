//! # Error Types
//!
//! Domain-specific error types for pricing-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pricing-core errors (this file)                                       │
//! │  ├── CoreError        - Numeric failures the engine cannot degrade     │
//! │  └── ValidationError  - Input guard failures (caller-side checks)      │
//! │                                                                         │
//! │  pricing-cli errors (separate crate)                                   │
//! │  └── ConfigError      - Policy file / environment problems             │
//! │                                                                         │
//! │  NOT errors: publish/reject reasons and warnings.                      │
//! │  Those are business data and live in DecisionResult.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core engine errors.
///
/// The engine prefers silent numeric degradation (a zero price yields a zero
/// margin). These variants cover the few cases where no sensible number
/// exists.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A floating point value crossing into the engine was NaN or infinite.
    ///
    /// ## When This Occurs
    /// - A percentage typed into a form arrives as `NaN`
    /// - A JS division by zero produced `Infinity` upstream
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    /// A floating point value does not fit into the integer range.
    #[error("{field} is too large to represent: {value}")]
    NumericOverflow { field: String, value: f64 },

    /// The fixed-fraction price solve has no positive solution.
    ///
    /// ## When This Occurs
    /// Margin + platform fee + VAT add up to 100% or more of the price, so
    /// `cost / (1 - fractions)` divides by zero or a negative number.
    #[error("Cannot solve a retail price: margin, fees and VAT claim {committed_bps} bps of the price (must be below 10000)")]
    UnsolvablePrice { committed_bps: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The calculators assume validated inputs; the wrapping layer runs the
/// guards in [`crate::validation`] and reports these.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnsolvablePrice {
            committed_bps: 10500,
        };
        assert_eq!(
            err.to_string(),
            "Cannot solve a retail price: margin, fees and VAT claim 10500 bps of the price (must be below 10000)"
        );

        let err = CoreError::NonFinite {
            field: "vat_rate".to_string(),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "vat_rate must be a finite number, got NaN");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "platform_fee".to_string(),
            min: 0,
            max: 10000,
        };
        assert_eq!(err.to_string(), "platform_fee must be between 0 and 10000");

        let err = ValidationError::MustBeNonNegative {
            field: "supplier_cost".to_string(),
        };
        assert_eq!(err.to_string(), "supplier_cost must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
