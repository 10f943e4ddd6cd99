//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use crate::utils::is_degenerate;
use serde::{Deserialize, Serialize};

/// Holdout metrics attached to every forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Coefficient of determination
    pub r2_score: f64,
    /// Normalized accuracy percentage in [0, 100]
    pub accuracy: f64,
}

impl std::fmt::Display for ModelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Performance Metrics:")?;
        writeln!(f, "  MAE:       {:.4}", self.mae)?;
        writeln!(f, "  R2:        {:.4}", self.r2_score)?;
        writeln!(f, "  Accuracy:  {:.2}%", self.accuracy)?;
        Ok(())
    }
}

/// Price band around a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Band of `mae * multiplier` either side of the prediction, floored at zero
    pub fn from_error(predicted: f64, mae: f64, multiplier: f64) -> Self {
        let half_width = mae * multiplier;
        Self {
            lower: (predicted - half_width).max(0.0),
            upper: predicted + half_width,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

fn check_lengths(predicted: &[f64], actual: &[f64]) -> Result<()> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(predicted, actual)?;

    let total: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).abs())
        .sum();
    Ok(total / predicted.len() as f64)
}

/// Coefficient of determination
///
/// With zero variance in `actual` the ratio is undefined: exact predictions
/// score 1 and anything else scores 0.
pub fn r2_score(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(predicted, actual)?;

    let mean_actual = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();

    if is_degenerate(ss_tot) {
        return Ok(if is_degenerate(ss_res) { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Accuracy percentage `(1 - mae / mean_actual) * 100`, clamped to [0, 100]
pub fn accuracy_score(mae: f64, mean_actual: f64) -> f64 {
    if is_degenerate(mean_actual) || !mae.is_finite() {
        return 0.0;
    }
    ((1.0 - mae / mean_actual) * 100.0).clamp(0.0, 100.0)
}

/// Percentage change from `current` to `predicted`, or 0 when `current` is ~0
pub fn price_change_percent(predicted: f64, current: f64) -> f64 {
    if is_degenerate(current) {
        return 0.0;
    }
    (predicted - current) / current * 100.0
}

/// Evaluate holdout predictions against the true prices
pub fn evaluate(predicted: &[f64], actual: &[f64]) -> Result<ModelMetrics> {
    let mae = mean_absolute_error(predicted, actual)?;
    let r2 = r2_score(predicted, actual)?;
    let mean_actual = actual.iter().sum::<f64>() / actual.len() as f64;

    Ok(ModelMetrics {
        mae,
        r2_score: r2,
        accuracy: accuracy_score(mae, mean_actual),
    })
}
