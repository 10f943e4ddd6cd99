//! Least-squares gradient boosting over shallow regression trees
//!
//! Starts from the mean target and adds one tree per stage, each fitted to
//! the residuals of the running prediction and shrunk by the learning rate.

use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{validate_training_data, FittedRegressor, Regressor};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gradient boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Number of boosting stages (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to each stage
    pub learning_rate: f64,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples required in a leaf node
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn (without replacement) per stage
    pub subsample: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 5,
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 42,
        }
    }
}

impl BoostingParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Gradient boosting needs at least one stage".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }
        self.tree_params().validate()
    }
}

/// Gradient boosting regressor (unfitted)
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostingRegressor {
    params: BoostingParams,
}

/// Fitted gradient boosting model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedGradientBoosting {
    init: f64,
    learning_rate: f64,
    stages: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    pub fn new(params: BoostingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self {
            params: BoostingParams::default(),
        }
    }
}

impl Regressor for GradientBoostingRegressor {
    type Fitted = FittedGradientBoosting;

    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted> {
        let n_features = validate_training_data(features, targets)?;
        let n_samples = features.len();
        let tree_params = self.params.tree_params();
        let learning_rate = self.params.learning_rate;

        debug!(
            "Fitting gradient boosting: {} stages on {} samples x {} features",
            self.params.n_estimators, n_samples, n_features
        );

        let init = targets.iter().sum::<f64>() / n_samples as f64;
        let mut running = vec![init; n_samples];
        let mut stages = Vec::with_capacity(self.params.n_estimators);
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);

        let sample_size = ((n_samples as f64 * self.params.subsample).round() as usize).max(1);

        for _ in 0..self.params.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(running.iter())
                .map(|(y, p)| y - p)
                .collect();

            let mut indices: Vec<usize> = if sample_size < n_samples {
                index::sample(&mut rng, n_samples, sample_size).into_vec()
            } else {
                (0..n_samples).collect()
            };
            indices.sort_unstable();

            let tree = RegressionTree::fit(&tree_params, features, &residuals, &indices, &mut rng)?;

            for (prediction, row) in running.iter_mut().zip(features.iter()) {
                *prediction += learning_rate * tree.predict_one(row);
            }
            stages.push(tree);
        }

        Ok(FittedGradientBoosting {
            init,
            learning_rate,
            stages,
        })
    }

    fn name(&self) -> &str {
        "gradient_boosting"
    }
}

impl FittedGradientBoosting {
    /// Initial (mean) prediction before any stage
    pub fn init(&self) -> f64 {
        self.init
    }

    pub fn stages(&self) -> &[RegressionTree] {
        &self.stages
    }
}

impl FittedRegressor for FittedGradientBoosting {
    fn predict_one(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate
                * self
                    .stages
                    .iter()
                    .map(|tree| tree.predict_one(row))
                    .sum::<f64>()
    }

    fn name(&self) -> &str {
        "gradient_boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boosting_reduces_training_error() {
        let features: Vec<Vec<f64>> = (0..60).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..60).map(|i| (i as f64 / 6.0).sin() * 10.0 + 50.0).collect();

        let short = GradientBoostingRegressor::new(BoostingParams {
            n_estimators: 5,
            ..Default::default()
        })
        .unwrap()
        .fit(&features, &targets)
        .unwrap();
        let long = GradientBoostingRegressor::default()
            .fit(&features, &targets)
            .unwrap();

        let sse = |model: &FittedGradientBoosting| -> f64 {
            features
                .iter()
                .zip(targets.iter())
                .map(|(x, y)| (model.predict_one(x) - y).powi(2))
                .sum()
        };

        assert!(sse(&long) < sse(&short));
        assert_eq!(long.stages().len(), 100);
    }

    #[test]
    fn test_constant_targets_predict_constant() {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets = vec![50.0; 20];

        let model = GradientBoostingRegressor::default()
            .fit(&features, &targets)
            .unwrap();

        assert_eq!(model.init(), 50.0);
        assert_eq!(model.predict_one(&[3.0]), 50.0);
    }

    #[test]
    fn test_subsampled_fit_is_reproducible() {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 5) as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| i as f64 * 1.5).collect();
        let regressor = GradientBoostingRegressor::new(BoostingParams {
            subsample: 0.5,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            regressor.fit(&features, &targets).unwrap(),
            regressor.fit(&features, &targets).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_learning_rate() {
        let params = BoostingParams {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(GradientBoostingRegressor::new(params).is_err());
    }
}
