//! Per-feature standardization
//!
//! [`StandardScaler::fit`] returns the learned statistics as a value instead
//! of storing them, so every pipeline run owns its own [`ScalingParams`].

use crate::error::{ForecastError, Result};
use market_math::descriptive::{mean, population_std_dev};
use serde::{Deserialize, Serialize};

/// Per-feature mean and scale learned from a training partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    means: Vec<f64>,
    scales: Vec<f64>,
}

/// Fits [`ScalingParams`] as `(value - mean) / std` per feature
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Learn per-feature mean and population standard deviation
    ///
    /// A feature that is constant across the rows gets a scale of 1, so it
    /// maps to zero instead of dividing by zero.
    pub fn fit(rows: &[Vec<f64>]) -> Result<ScalingParams> {
        let n_features = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => {
                return Err(ForecastError::ValidationError(
                    "Cannot fit a scaler on an empty partition".to_string(),
                ))
            }
        };
        if rows.iter().any(|row| row.len() != n_features) {
            return Err(ForecastError::ValidationError(
                "All rows must have the same number of features".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(n_features);
        let mut scales = Vec::with_capacity(n_features);

        for j in 0..n_features {
            let column: Vec<f64> = rows.iter().map(|row| row[j]).collect();
            let column_mean = mean(&column)?;
            let std = population_std_dev(&column)?;

            let tolerance = 10.0 * f64::EPSILON * column_mean.abs().max(1.0);
            means.push(column_mean);
            scales.push(if std.is_finite() && std > tolerance { std } else { 1.0 });
        }

        Ok(ScalingParams { means, scales })
    }
}

impl ScalingParams {
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardize one row
    pub fn transform_one(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(ForecastError::ValidationError(format!(
                "Expected {} features, got {}",
                self.means.len(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect())
    }

    /// Standardize every row
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_one(row)).collect()
    }
}
