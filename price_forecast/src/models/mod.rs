//! Regression models for price forecasting
//!
//! Models come in two halves: an unfitted [`Regressor`] carrying only its
//! hyperparameters, and the [`FittedRegressor`] value returned by `fit`.
//! Fitting never mutates the regressor, so one instance can serve any
//! number of concurrent fits.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod ensemble;
pub mod gradient_boosting;
pub mod random_forest;
pub mod tree;

pub use ensemble::{EnsembleRegressor, FittedEnsemble};
pub use gradient_boosting::{BoostingParams, FittedGradientBoosting, GradientBoostingRegressor};
pub use random_forest::{FittedRandomForest, ForestParams, RandomForestRegressor};
pub use tree::{RegressionTree, TreeNode, TreeParams};

/// Fitted model that maps a feature row to a target value
pub trait FittedRegressor: Debug + Send + Sync {
    /// Predict the target for one feature row
    fn predict_one(&self, row: &[f64]) -> f64;

    /// Predict the target for each row
    fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Regression model that can be fitted on a feature matrix
pub trait Regressor: Debug + Clone + Send + Sync {
    /// The type of fitted model produced
    type Fitted: FittedRegressor;

    /// Fit the model on row-major features and aligned targets
    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// The fixed set of regressor strategies an ensemble can be built from
#[derive(Debug, Clone, PartialEq)]
pub enum RegressorKind {
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
}

/// Fitted counterpart of [`RegressorKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedModel {
    RandomForest(FittedRandomForest),
    GradientBoosting(FittedGradientBoosting),
}

impl Regressor for RegressorKind {
    type Fitted = FittedModel;

    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted> {
        match self {
            RegressorKind::RandomForest(model) => {
                model.fit(features, targets).map(FittedModel::RandomForest)
            }
            RegressorKind::GradientBoosting(model) => model
                .fit(features, targets)
                .map(FittedModel::GradientBoosting),
        }
    }

    fn name(&self) -> &str {
        match self {
            RegressorKind::RandomForest(model) => model.name(),
            RegressorKind::GradientBoosting(model) => model.name(),
        }
    }
}

impl FittedRegressor for FittedModel {
    fn predict_one(&self, row: &[f64]) -> f64 {
        match self {
            FittedModel::RandomForest(model) => model.predict_one(row),
            FittedModel::GradientBoosting(model) => model.predict_one(row),
        }
    }

    fn name(&self) -> &str {
        match self {
            FittedModel::RandomForest(model) => model.name(),
            FittedModel::GradientBoosting(model) => model.name(),
        }
    }
}

/// Check a training set and return its feature count
pub(crate) fn validate_training_data(features: &[Vec<f64>], targets: &[f64]) -> Result<usize> {
    if features.is_empty() {
        return Err(ForecastError::ModelError(
            "Cannot fit a model on an empty training set".to_string(),
        ));
    }
    if features.len() != targets.len() {
        return Err(ForecastError::ValidationError(format!(
            "Feature rows ({}) don't match targets ({})",
            features.len(),
            targets.len()
        )));
    }

    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForecastError::ValidationError(
            "Feature rows must not be empty".to_string(),
        ));
    }
    if features.iter().any(|row| row.len() != n_features) {
        return Err(ForecastError::ValidationError(
            "All feature rows must have the same length".to_string(),
        ));
    }
    if features.iter().flatten().chain(targets.iter()).any(|v| !v.is_finite()) {
        return Err(ForecastError::ValidationError(
            "Training data contains non-finite values".to_string(),
        ));
    }

    Ok(n_features)
}
