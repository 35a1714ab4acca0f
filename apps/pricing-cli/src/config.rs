//! # Policy Configuration
//!
//! Marketplace policy loaded once at startup: margin floors, tax defaults
//! and strategy defaults.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`PRICING_*`)
//! 2. Policy file (`--config` path, else `policy.toml` in the platform
//!    config directory)
//! 3. Defaults (this file)
//!
//! ## Example `policy.toml`
//! ```toml
//! [thresholds]
//! dropshipping_bps = 3000
//!
//! [tax]
//! default_vat_rate_bps = 1800
//! currency = "GEL"
//!
//! [strategy]
//! min_margin_bps = 2500
//! default_tier = "premium"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use pricing_core::decision::MarginThresholds;
use pricing_core::{Currency, PlatformTier, Rate, BPS_SCALE, DEFAULT_MIN_MARGIN_BPS, GEORGIAN_VAT_RATE_BPS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const POLICY_FILE_NAME: &str = "policy.toml";

/// Marketplace policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub thresholds: ThresholdPolicy,
    pub tax: TaxPolicy,
    pub strategy: StrategyPolicy,
}

/// Minimum margin per product type, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdPolicy {
    pub standard_bps: u32,
    pub dropshipping_bps: u32,
    pub digital_bps: u32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        let defaults = MarginThresholds::default();
        ThresholdPolicy {
            standard_bps: defaults.standard.bps(),
            dropshipping_bps: defaults.dropshipping.bps(),
            digital_bps: defaults.digital.bps(),
        }
    }
}

/// Defaults applied to invoices that omit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxPolicy {
    pub default_vat_rate_bps: u32,
    pub currency: Currency,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy {
            default_vat_rate_bps: GEORGIAN_VAT_RATE_BPS,
            currency: Currency::Gel,
        }
    }
}

/// Defaults applied to strategy requests that omit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyPolicy {
    pub min_margin_bps: u32,
    pub default_tier: PlatformTier,
}

impl Default for StrategyPolicy {
    fn default() -> Self {
        StrategyPolicy {
            min_margin_bps: DEFAULT_MIN_MARGIN_BPS,
            default_tier: PlatformTier::Standard,
        }
    }
}

impl PolicyConfig {
    /// Loads the policy: defaults, then the file, then `PRICING_*` variables.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(path = %path.display(), "No policy file, using defaults");
                    PolicyConfig::default()
                }
                None => {
                    warn!("Could not determine config directory, using default policy");
                    PolicyConfig::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            standard_bps = config.thresholds.standard_bps,
            dropshipping_bps = config.thresholds.dropshipping_bps,
            digital_bps = config.thresholds.digital_bps,
            vat_bps = config.tax.default_vat_rate_bps,
            currency = %config.tax.currency,
            min_margin_bps = config.strategy.min_margin_bps,
            "Policy loaded"
        );

        Ok(config)
    }

    /// Reads and parses a TOML policy file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Reading policy file");

        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies `PRICING_*` overrides from `lookup`.
    ///
    /// ## Environment Variables
    /// - `PRICING_STANDARD_MARGIN_BPS`, `PRICING_DROPSHIPPING_MARGIN_BPS`,
    ///   `PRICING_DIGITAL_MARGIN_BPS`
    /// - `PRICING_VAT_RATE_BPS`, `PRICING_CURRENCY` (e.g. "GEL")
    /// - `PRICING_MIN_MARGIN_BPS`, `PRICING_DEFAULT_TIER` (e.g. "premium")
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bps_vars = [
            ("PRICING_STANDARD_MARGIN_BPS", &mut self.thresholds.standard_bps),
            ("PRICING_DROPSHIPPING_MARGIN_BPS", &mut self.thresholds.dropshipping_bps),
            ("PRICING_DIGITAL_MARGIN_BPS", &mut self.thresholds.digital_bps),
            ("PRICING_VAT_RATE_BPS", &mut self.tax.default_vat_rate_bps),
            ("PRICING_MIN_MARGIN_BPS", &mut self.strategy.min_margin_bps),
        ];
        for (key, slot) in bps_vars {
            if let Some(value) = lookup(key) {
                *slot = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                })?;
                debug!(key, value = *slot, "Policy override from environment");
            }
        }

        if let Some(value) = lookup("PRICING_CURRENCY") {
            self.tax.currency = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PRICING_CURRENCY".to_string(),
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("PRICING_DEFAULT_TIER") {
            self.strategy.default_tier = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PRICING_DEFAULT_TIER".to_string(),
                value: value.clone(),
            })?;
        }

        Ok(())
    }

    /// Every rate must lie within `[0, 10000]` bps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("thresholds.standard_bps", self.thresholds.standard_bps),
            ("thresholds.dropshipping_bps", self.thresholds.dropshipping_bps),
            ("thresholds.digital_bps", self.thresholds.digital_bps),
            ("tax.default_vat_rate_bps", self.tax.default_vat_rate_bps),
            ("strategy.min_margin_bps", self.strategy.min_margin_bps),
        ];
        for (key, value) in rates {
            if value as i64 > BPS_SCALE {
                return Err(ConfigError::OutOfRange {
                    key: key.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Margin floors for the decision engine.
    pub fn margin_thresholds(&self) -> MarginThresholds {
        MarginThresholds {
            standard: Rate::from_bps(self.thresholds.standard_bps),
            dropshipping: Rate::from_bps(self.thresholds.dropshipping_bps),
            digital: Rate::from_bps(self.thresholds.digital_bps),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `policy.toml` in the platform config directory.
///
/// ## Platform-Specific Paths
/// - Linux: `~/.config/pricing/policy.toml`
/// - macOS: `~/Library/Application Support/ge.marketplace.pricing/policy.toml`
/// - Windows: `%APPDATA%\marketplace\pricing\config\policy.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("ge", "marketplace", "pricing")
        .map(|dirs| dirs.config_dir().join(POLICY_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read policy file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse policy file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("{key} must be between 0 and 10000 bps, got {value}")]
    OutOfRange { key: String, value: u32 },

    #[error("Failed to render policy: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// =============================================================================
// Unit Tests
// =============================================================================
