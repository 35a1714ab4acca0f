//! # Command Handlers
//!
//! One handler per subcommand. Each takes the raw JSON input and the loaded
//! policy, validates, calls `pricing-core` and returns pretty JSON.
//!
//! ## Policy Defaults
//! | Command    | Field omitted in input | Filled from policy                |
//! |------------|------------------------|-----------------------------------|
//! | `tax`      | `tax`                  | VAT payer at `tax.default_vat_rate_bps` |
//! | `tax`      | `currency`             | `tax.currency`                    |
//! | `evaluate` | `thresholds`           | `[thresholds]`                    |
//! | `suggest`  | `tier`                 | `strategy.default_tier`           |
//! | `suggest`  | `min_margin`           | `strategy.min_margin_bps`         |

use std::io::Read;
use std::path::Path;

use pricing_core::decision::{evaluate_product_candidate, ProductCandidate, ThresholdOverrides};
use pricing_core::margin::{analyze_price, calculate_margin, MarginCalculatorInput, PriceAnalysisInput};
use pricing_core::strategy::{recommend_pricing_mode, suggest_price, StrategyRequest};
use pricing_core::tax::{calculate_tax, TaxCalculationInput};
use pricing_core::validation::{
    validate_candidate, validate_margin_input, validate_money_non_negative,
    validate_price_analysis_input, validate_strategy_request, validate_tax_input,
    validate_threshold_overrides,
};
use pricing_core::Money;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::error::CliError;

/// Reads the whole input from `path`, or stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    let buffer = match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
                input: path.display().to_string(),
                source,
            })?
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::ReadInput {
                    input: "stdin".to_string(),
                    source,
                })?;
            buffer
        }
    };

    debug!(bytes = buffer.len(), "Read input");
    Ok(buffer)
}

// =============================================================================
// Handlers
// =============================================================================

pub fn tax(input: &str, policy: &PolicyConfig) -> Result<String, CliError> {
    let mut value = parse_value(input, "tax")?;
    fill_default(
        &mut value,
        "tax",
        json!({ "is_vat_payer": true, "vat_rate": policy.tax.default_vat_rate_bps }),
    );
    fill_default(&mut value, "currency", json!(policy.tax.currency));

    let request: TaxCalculationInput = from_value(value, "tax")?;
    validate_tax_input(&request)?;

    let output = calculate_tax(&request);
    info!(
        lines = request.line_items.len(),
        subtotal = output.subtotal.cents(),
        vat = output.vat.cents(),
        "Invoice computed"
    );
    render(&output)
}

pub fn margin(input: &str) -> Result<String, CliError> {
    let request: MarginCalculatorInput = parse(input, "margin")?;
    validate_margin_input(&request)?;

    let output = calculate_margin(&request);
    info!(
        recommended_price = output.recommended_price.cents(),
        net_profit = output.breakdown.net_profit.cents(),
        "Margin computed"
    );
    render(&output)
}

pub fn analyze(input: &str) -> Result<String, CliError> {
    let request: PriceAnalysisInput = parse(input, "price analysis")?;
    validate_price_analysis_input(&request)?;

    let output = analyze_price(&request);
    info!(
        price = request.selling_price.cents(),
        net_profit = output.net_profit.cents(),
        gross_margin_bps = output.gross_margin_bps,
        "Price analyzed"
    );
    render(&output)
}

/// A candidate with optional per-request threshold overrides.
#[derive(Debug, Deserialize, Serialize)]
struct EvaluateRequest {
    #[serde(flatten)]
    candidate: ProductCandidate,
    #[serde(default)]
    thresholds: ThresholdOverrides,
}

pub fn evaluate(input: &str, policy: &PolicyConfig) -> Result<String, CliError> {
    let request: EvaluateRequest = parse(input, "candidate")?;
    validate_candidate(&request.candidate)?;
    validate_threshold_overrides(&request.thresholds)?;

    let thresholds = policy.margin_thresholds().with_overrides(&request.thresholds);
    let result = evaluate_product_candidate(&request.candidate, &thresholds);

    info!(
        product_type = %request.candidate.product_type,
        decision = ?result.decision,
        margin_bps = result.computed.margin_bps,
        reasons = result.reasons.len(),
        warnings = result.warnings.len(),
        "Candidate evaluated"
    );
    render(&result)
}

pub fn suggest(input: &str, policy: &PolicyConfig) -> Result<String, CliError> {
    let mut value = parse_value(input, "strategy request")?;
    fill_default(&mut value, "tier", json!(policy.strategy.default_tier));
    fill_default(&mut value, "min_margin", json!(policy.strategy.min_margin_bps));

    let request: StrategyRequest = from_value(value, "strategy request")?;
    validate_strategy_request(&request)?;

    let suggestion = suggest_price(&request)?;
    info!(
        mode = %suggestion.mode,
        final_price = suggestion.final_price.cents(),
        margin_ok = suggestion.margin_check.is_valid,
        "Price suggested"
    );
    render(&suggestion)
}

/// `ltv` and `cac` in minor units.
pub fn mode(ltv: i64, cac: i64) -> Result<String, CliError> {
    let ltv = Money::from_cents(ltv);
    let cac = Money::from_cents(cac);
    validate_money_non_negative("ltv", ltv)?;
    validate_money_non_negative("cac", cac)?;

    Ok(recommend_pricing_mode(ltv, cac).to_string())
}

pub fn config(policy: &PolicyConfig) -> Result<String, CliError> {
    Ok(policy.to_toml()?)
}

// =============================================================================
// JSON Helpers
// =============================================================================

fn parse<T: DeserializeOwned>(input: &str, what: &'static str) -> Result<T, CliError> {
    serde_json::from_str(input).map_err(|source| CliError::Parse { what, source })
}

fn parse_value(input: &str, what: &'static str) -> Result<Value, CliError> {
    parse(input, what)
}

fn from_value<T: DeserializeOwned>(value: Value, what: &'static str) -> Result<T, CliError> {
    serde_json::from_value(value).map_err(|source| CliError::Parse { what, source })
}

/// Inserts `default` under `key` when the input object lacks it.
fn fill_default(value: &mut Value, key: &str, default: Value) {
    if let Value::Object(map) = value {
        map.entry(key).or_insert(default);
    }
}

fn render<T: Serialize>(output: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(output).map_err(CliError::Render)
}

// =============================================================================
// Unit Tests
// =============================================================================
