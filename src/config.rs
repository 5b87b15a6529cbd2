//! Named business constants and the configuration structs that carry them.
//!
//! Nothing in the pipeline reads these constants directly; callers build a
//! [`CleaningConfig`] or [`AnalysisConfig`] and pass it in.

use anyhow::{Context, Result};
use serde::Deserialize;

/// BDT per EUR used to derive `price_eur`.
pub const BDT_PER_EUR: f64 = 120.0;

/// Inclusive band a retained `price_eur` must fall in.
pub const MIN_PRICE_EUR: f64 = 5.0;
pub const MAX_PRICE_EUR: f64 = 10_000.0;

/// Parameters of the record cleaner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningConfig {
    pub bdt_per_eur: f64,
    pub min_price_eur: f64,
    pub max_price_eur: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            bdt_per_eur: BDT_PER_EUR,
            min_price_eur: MIN_PRICE_EUR,
            max_price_eur: MAX_PRICE_EUR,
        }
    }
}

impl CleaningConfig {
    pub fn price_in_band(&self, price_eur: f64) -> bool {
        price_eur >= self.min_price_eur && price_eur <= self.max_price_eur
    }
}

/// Thresholds and list sizes used when building the analysis report.
///
/// Loaded from JSON; every missing key falls back to its default:
/// ```json
/// { "min_location_hotels": 15, "review_floor": 100 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_location_hotels: usize,
    pub min_label_hotels: usize,
    pub min_room_category_hotels: usize,
    pub min_bed_type_hotels: usize,
    /// Minimum `num_reviews` for a hotel to appear in ranked lists.
    pub review_floor: u64,
    /// Only hotels strictly below this price take part in the regression.
    pub regression_price_cutoff: f64,
    pub top_locations: usize,
    pub top_residuals: usize,
    pub top_gaps: usize,
    pub top_value_hotels: usize,
    pub most_expensive_locations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_location_hotels: 10,
            min_label_hotels: 10,
            min_room_category_hotels: 20,
            min_bed_type_hotels: 30,
            review_floor: 50,
            regression_price_cutoff: 5000.0,
            top_locations: 10,
            top_residuals: 10,
            top_gaps: 10,
            top_value_hotels: 15,
            most_expensive_locations: 20,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis config '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid analysis config '{path}'"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_band_is_inclusive() {
        let config = CleaningConfig::default();
        assert!(config.price_in_band(5.0));
        assert!(config.price_in_band(10_000.0));
        assert!(!config.price_in_band(4.99));
        assert!(!config.price_in_band(10_000.01));
    }

    #[test]
    fn test_partial_analysis_config_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "min_location_hotels": 15 }"#).unwrap();
        assert_eq!(config.min_location_hotels, 15);
        assert_eq!(config.min_bed_type_hotels, 30);
        assert_eq!(config.review_floor, 50);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AnalysisConfig::load("/nonexistent/analysis.json").is_err());
    }
}
