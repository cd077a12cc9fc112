//! Externally tunable knobs of the pipeline.
//!
//! Every field has a default, so a JSON file only needs the keys it wants to
//! override:
//!
//! ```json
//! { "aggregation": { "target_currency": "EUR", "exchange_rates": { "PLN": 0.23 } } }
//! ```

use crate::error::{ReportError, Result};
use crate::llm::retry::RetryPolicy;
use crate::schema::REQUIRED_PERIOD_FIELDS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_FILTER_THRESHOLD: i32 = 50;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TARGET_CURRENCY: &str = "PLN";
pub const DEFAULT_YEARS_AHEAD: u32 = 5;
pub const DEFAULT_DECLINE_FLOOR: f64 = 0.30;
pub const DEFAULT_FALLBACK_GROWTH: f64 = 0.02;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filter: FilterConfig,
    pub extraction: ExtractionConfig,
    pub aggregation: AggregationConfig,
    pub forecast: ForecastConfig,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.extraction.retry.validate()?;
        if !(0.0..=1.0).contains(&self.forecast.decline_floor) {
            return Err(ReportError::InvalidConfig(format!(
                "forecast.decline_floor {} must be between 0.0 and 1.0",
                self.forecast.decline_floor
            )));
        }
        if let Some((currency, rate)) = self
            .aggregation
            .exchange_rates
            .iter()
            .find(|(_, rate)| !rate.is_finite() || **rate <= 0.0)
        {
            return Err(ReportError::InvalidConfig(format!(
                "exchange rate for {} must be positive, got {}",
                currency, rate
            )));
        }
        let target = self.aggregation.target_currency.trim().to_uppercase();
        if let Some(rate) = self
            .aggregation
            .exchange_rates
            .iter()
            .find(|(currency, _)| currency.trim().to_uppercase() == target)
            .map(|(_, rate)| *rate)
        {
            if rate != 1.0 {
                return Err(ReportError::InvalidConfig(format!(
                    "exchange_rates are not expressed in {}: its own rate is {}",
                    target, rate
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Set to false to send the whole document to extraction.
    pub enabled: bool,
    /// A page is kept when its score is strictly greater than this.
    pub threshold: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_FILTER_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub model: String,
    pub retry: RetryPolicy,
    pub required_fields: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
            required_fields: REQUIRED_PERIOD_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub target_currency: String,
    /// Multiplier converting one unit of the keyed currency into the target currency.
    pub exchange_rates: BTreeMap<String, f64>,
    /// Multiply suspiciously small share counts by 1000. See [`crate::aggregator`].
    pub share_scale_correction: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            target_currency: DEFAULT_TARGET_CURRENCY.to_string(),
            exchange_rates: BTreeMap::from([
                ("PLN".to_string(), 1.0),
                ("EUR".to_string(), 4.3),
                ("USD".to_string(), 4.0),
            ]),
            share_scale_correction: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub years_ahead: u32,
    /// Forecast revenue never drops below this fraction of the last observed revenue.
    pub decline_floor: f64,
    /// Growth applied when there are too few observations to fit a trend.
    pub default_growth: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            years_ahead: DEFAULT_YEARS_AHEAD,
            decline_floor: DEFAULT_DECLINE_FLOOR,
            default_growth: DEFAULT_FALLBACK_GROWTH,
        }
    }
}
