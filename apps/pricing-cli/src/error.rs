//! # CLI Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin / file ── io::Error ──────────► ReadInput   (exit 3)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  serde_json ──── serde_json::Error ──► Parse       (exit 3)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validation ──── ValidationError ────► Validation  (exit 2)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pricing-core ── CoreError ──────────► Core        (exit 4)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JSON on stdout                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected listing is not an error: it is printed like any other result
//! and the process exits 0.

use pricing_core::{CoreError, ValidationError};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read input from {input}: {source}")]
    ReadInput {
        input: String,
        source: std::io::Error,
    },

    #[error("Invalid {what} JSON: {source}")]
    Parse {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render output: {0}")]
    Render(serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) => 2,
            CliError::Core(CoreError::Validation(_)) => 2,
            CliError::ReadInput { .. } | CliError::Parse { .. } => 3,
            CliError::Core(_) => 4,
            CliError::Config(_) => 5,
            CliError::Render(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let validation = CliError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(validation.to_string(), "Invalid input: quantity must be positive");

        let unsolvable = CliError::from(CoreError::UnsolvablePrice { committed_bps: 10800 });
        assert_eq!(unsolvable.exit_code(), 4);

        let parse = CliError::Parse {
            what: "candidate",
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert_eq!(parse.exit_code(), 3);
        assert!(parse.to_string().starts_with("Invalid candidate JSON"));
    }
}
