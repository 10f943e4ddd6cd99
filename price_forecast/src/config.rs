//! Pipeline configuration

use crate::error::{ForecastError, Result};
use crate::models::{BoostingParams, ForestParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable constants of the forecasting pipeline
///
/// Missing keys in a JSON config fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum valid feature rows needed to train
    pub min_feature_rows: usize,
    /// Fraction of rows held out for evaluation, taken from the end
    pub test_ratio: f64,
    /// Trailing window for rolling mean and std
    pub rolling_window: usize,
    /// Confidence half-width as a multiple of holdout MAE
    pub confidence_multiplier: f64,
    pub random_forest: ForestParams,
    pub gradient_boosting: BoostingParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_feature_rows: 20,
            test_ratio: 0.2,
            rolling_window: 7,
            confidence_multiplier: 1.5,
            random_forest: ForestParams::default(),
            gradient_boosting: BoostingParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Check every value, including model hyperparameters
    pub fn validate(&self) -> Result<()> {
        if self.min_feature_rows < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "min_feature_rows must be at least 2, got {}",
                self.min_feature_rows
            )));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.rolling_window < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "rolling_window must be at least 2, got {}",
                self.rolling_window
            )));
        }
        if !(self.confidence_multiplier.is_finite() && self.confidence_multiplier >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_multiplier must be non-negative, got {}",
                self.confidence_multiplier
            )));
        }
        self.random_forest.validate()?;
        self.gradient_boosting.validate()
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
