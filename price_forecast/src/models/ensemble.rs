//! Unweighted averaging ensemble
//!
//! Fits every member independently on the same data; the ensemble prediction
//! is the arithmetic mean of the member predictions.

use crate::error::{ForecastError, Result};
use crate::models::{
    BoostingParams, FittedModel, FittedRegressor, ForestParams, GradientBoostingRegressor,
    RandomForestRegressor, Regressor, RegressorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ensemble of regressor strategies (unfitted)
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleRegressor {
    members: Vec<RegressorKind>,
}

/// Fitted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedEnsemble {
    members: Vec<FittedModel>,
    n_features: usize,
}

impl EnsembleRegressor {
    /// Create an ensemble from a non-empty list of members
    pub fn new(members: Vec<RegressorKind>) -> Result<Self> {
        if members.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "An ensemble needs at least one member".to_string(),
            ));
        }
        Ok(Self { members })
    }

    /// Random forest plus gradient boosting, the pairing used for price forecasts
    pub fn forest_and_boosting(forest: ForestParams, boosting: BoostingParams) -> Result<Self> {
        Self::new(vec![
            RegressorKind::RandomForest(RandomForestRegressor::new(forest)?),
            RegressorKind::GradientBoosting(GradientBoostingRegressor::new(boosting)?),
        ])
    }

    pub fn members(&self) -> &[RegressorKind] {
        &self.members
    }
}

impl Default for EnsembleRegressor {
    fn default() -> Self {
        Self {
            members: vec![
                RegressorKind::RandomForest(RandomForestRegressor::default()),
                RegressorKind::GradientBoosting(GradientBoostingRegressor::default()),
            ],
        }
    }
}

impl Regressor for EnsembleRegressor {
    type Fitted = FittedEnsemble;

    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted> {
        let members = self
            .members
            .iter()
            .map(|member| {
                debug!("Fitting ensemble member {}", member.name());
                member.fit(features, targets)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FittedEnsemble {
            members,
            n_features: features.first().map(Vec::len).unwrap_or(0),
        })
    }

    fn name(&self) -> &str {
        "ensemble"
    }
}

impl FittedEnsemble {
    /// Predict one row, checking its width against the training data
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(ForecastError::ValidationError(format!(
                "Expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        Ok(self.predict_one(row))
    }

    /// Per-member predictions for one row, in member order
    pub fn member_predictions(&self, row: &[f64]) -> Vec<(&str, f64)> {
        self.members
            .iter()
            .map(|member| (member.name(), member.predict_one(row)))
            .collect()
    }

    pub fn members(&self) -> &[FittedModel] {
        &self.members
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

impl FittedRegressor for FittedEnsemble {
    fn predict_one(&self, row: &[f64]) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members
            .iter()
            .map(|member| member.predict_one(row))
            .sum::<f64>()
            / self.members.len() as f64
    }

    fn name(&self) -> &str {
        "ensemble"
    }
}
