//! Feature engineering for price series
//!
//! Turns a commodity's observations into a date-ordered supervised table:
//! calendar fields, three lagged prices and a trailing rolling mean and
//! standard deviation, with the observation's own modal price as target.

use crate::data::MarketObservation;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use market_math::{lag, rolling_mean, rolling_std};
use serde::{Deserialize, Serialize};

/// Number of features in a [`FeatureVector`]
pub const NUM_FEATURES: usize = 9;

/// Feature names in the column order used by [`FeatureVector::to_array`]
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "day_of_week",
    "day_of_month",
    "month",
    "quarter",
    "price_lag_1",
    "price_lag_2",
    "price_lag_3",
    "price_rolling_mean",
    "price_rolling_std",
];

/// Default trailing window for the rolling statistics
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

/// Engineered features for one observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Observation date the features were derived from
    pub date: NaiveDate,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub day_of_month: u32,
    pub month: u32,
    pub quarter: u32,
    pub price_lag_1: f64,
    pub price_lag_2: f64,
    pub price_lag_3: f64,
    pub rolling_mean: f64,
    pub rolling_std: f64,
}

impl FeatureVector {
    /// Feature values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.day_of_week as f64,
            self.day_of_month as f64,
            self.month as f64,
            self.quarter as f64,
            self.price_lag_1,
            self.price_lag_2,
            self.price_lag_3,
            self.rolling_mean,
            self.rolling_std,
        ]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }

    fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Date-ordered feature vectors with aligned target prices
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    vectors: Vec<FeatureVector>,
    targets: Vec<f64>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Row-major feature matrix
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.vectors.iter().map(FeatureVector::to_vec).collect()
    }

    /// Most recent feature vector and its target
    pub fn last(&self) -> Option<(&FeatureVector, f64)> {
        self.vectors.last().zip(self.targets.last().copied())
    }

    /// Split into the first `index` rows and the rest, keeping date order
    pub fn split_at(&self, index: usize) -> Result<(FeatureTable, FeatureTable)> {
        if index > self.len() {
            return Err(ForecastError::ValidationError(format!(
                "Split index {} beyond table length {}",
                index,
                self.len()
            )));
        }

        let (head_vectors, tail_vectors) = self.vectors.split_at(index);
        let (head_targets, tail_targets) = self.targets.split_at(index);

        Ok((
            FeatureTable {
                vectors: head_vectors.to_vec(),
                targets: head_targets.to_vec(),
            },
            FeatureTable {
                vectors: tail_vectors.to_vec(),
                targets: tail_targets.to_vec(),
            },
        ))
    }
}

/// Builds a [`FeatureTable`] from raw observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBuilder {
    rolling_window: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
        }
    }
}

impl FeatureBuilder {
    /// Create a builder with a custom rolling window
    pub fn new(rolling_window: usize) -> Result<Self> {
        if rolling_window < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Rolling window must be at least 2, got {}",
                rolling_window
            )));
        }
        Ok(Self { rolling_window })
    }

    pub fn rolling_window(&self) -> usize {
        self.rolling_window
    }

    /// Derive features for a commodity's observations
    ///
    /// Observations are sorted by date (stable, so same-day reports keep
    /// their input order). Rows lacking three prior prices, or whose rolling
    /// window holds a single value, are dropped rather than imputed.
    pub fn build(&self, observations: &[MarketObservation]) -> Result<FeatureTable> {
        let mut sorted: Vec<&MarketObservation> = observations.iter().collect();
        sorted.sort_by_key(|o| o.date);

        let prices: Vec<f64> = sorted.iter().map(|o| o.modal_price).collect();
        let lag_1 = lag(&prices, 1);
        let lag_2 = lag(&prices, 2);
        let lag_3 = lag(&prices, 3);
        let means = rolling_mean(&prices, self.rolling_window, 1)?;
        let stds = rolling_std(&prices, self.rolling_window, 1)?;

        let mut table = FeatureTable::default();

        for (i, observation) in sorted.iter().enumerate() {
            let (Some(l1), Some(l2), Some(l3), Some(mean), Some(std)) =
                (lag_1[i], lag_2[i], lag_3[i], means[i], stds[i])
            else {
                continue;
            };

            let date = observation.date;
            let vector = FeatureVector {
                date,
                day_of_week: date.weekday().num_days_from_monday(),
                day_of_month: date.day(),
                month: date.month(),
                quarter: (date.month() - 1) / 3 + 1,
                price_lag_1: l1,
                price_lag_2: l2,
                price_lag_3: l3,
                rolling_mean: mean,
                rolling_std: std,
            };

            if !vector.is_finite() || !observation.modal_price.is_finite() {
                continue;
            }

            table.vectors.push(vector);
            table.targets.push(observation.modal_price);
        }

        Ok(table)
    }
}
