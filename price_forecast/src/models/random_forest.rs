//! Bagged ensemble of randomized regression trees

use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{validate_training_data, FittedRegressor, Regressor};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Random forest needs at least one tree".to_string(),
            ));
        }
        self.tree_params().validate()
    }
}

/// Random forest regressor (unfitted)
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestRegressor {
    params: ForestParams,
}

/// Fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(params: ForestParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            params: ForestParams::default(),
        }
    }
}

impl Regressor for RandomForestRegressor {
    type Fitted = FittedRandomForest;

    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted> {
        let n_features = validate_training_data(features, targets)?;
        let n_samples = features.len();
        let tree_params = self.params.tree_params();

        debug!(
            "Fitting random forest: {} trees on {} samples x {} features",
            self.params.n_estimators, n_samples, n_features
        );

        // Each tree owns an RNG derived from its index, so the parallel fit
        // matches a sequential one exactly.
        let trees = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed.wrapping_add(t as u64));
                let indices: Vec<usize> = if self.params.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                RegressionTree::fit(&tree_params, features, targets, &indices, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FittedRandomForest { trees })
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

impl FittedRandomForest {
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl FittedRegressor for FittedRandomForest {
    fn predict_one(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>() / self.trees.len() as f64
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
