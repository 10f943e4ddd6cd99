//! Forecast pipeline
//!
//! Runs one forecast end to end: feature derivation, a chronological
//! train/holdout split, standardization fitted on the training rows only,
//! the averaging ensemble, holdout evaluation and a prediction from the
//! latest feature vector.
//!
//! The pipeline itself only holds immutable configuration. Scaling
//! statistics and fitted models are values created inside each call and
//! returned to the caller, so a single pipeline can be shared across
//! threads without one run seeing another's state.

use crate::config::PipelineConfig;
use crate::data::MarketObservation;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureBuilder, FeatureVector};
use crate::metrics::{evaluate, price_change_percent, ConfidenceInterval, ModelMetrics};
use crate::models::{EnsembleRegressor, FittedEnsemble, FittedRegressor, Regressor};
use crate::scaling::{ScalingParams, StandardScaler};
use crate::utils::chronological_split_index;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Stages a pipeline run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    FeatureBuilt,
    TrainedAndEvaluated,
    Done,
    Rejected,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "RECEIVED",
            PipelineStage::FeatureBuilt => "FEATURE-BUILT",
            PipelineStage::TrainedAndEvaluated => "TRAINED-AND-EVALUATED",
            PipelineStage::Done => "DONE",
            PipelineStage::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_price: f64,
    pub confidence_interval: ConfidenceInterval,
    pub model_metrics: ModelMetrics,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub training_samples: usize,
    pub test_samples: usize,
}

/// A forecast together with the state fitted to produce it
#[derive(Debug, Clone)]
pub struct TrainedForecast {
    pub result: ForecastResult,
    pub scaling: ScalingParams,
    pub ensemble: FittedEnsemble,
    /// Feature vector the future prediction was made from
    pub latest_features: FeatureVector,
}

/// Forecasting pipeline for one commodity series per call
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: PipelineConfig,
    features: FeatureBuilder,
    ensemble: EnsembleRegressor,
}

impl Default for ForecastPipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
            features: FeatureBuilder::default(),
            ensemble: EnsembleRegressor::default(),
        }
    }
}

impl ForecastPipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let features = FeatureBuilder::new(config.rolling_window)?;
        let ensemble = EnsembleRegressor::forest_and_boosting(
            config.random_forest.clone(),
            config.gradient_boosting.clone(),
        )?;

        Ok(Self {
            config,
            features,
            ensemble,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Forecast the next price of a series
    ///
    /// `horizon` must be positive but does not change the target: the
    /// estimate is always one step ahead of the latest observation.
    pub fn forecast(
        &self,
        observations: &[MarketObservation],
        horizon: usize,
    ) -> Result<ForecastResult> {
        self.train(observations, horizon).map(|trained| trained.result)
    }

    /// Forecast and also return the fitted scaler and ensemble
    pub fn train(
        &self,
        observations: &[MarketObservation],
        horizon: usize,
    ) -> Result<TrainedForecast> {
        let min_required = self.config.min_feature_rows;
        debug!(
            "{}: {} observations, horizon {}",
            PipelineStage::Received,
            observations.len(),
            horizon
        );

        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 day".to_string(),
            ));
        }
        if observations.len() < min_required {
            return Err(self.reject(observations.len()));
        }

        let table = self.features.build(observations)?;
        if table.len() < min_required {
            return Err(self.reject(table.len()));
        }
        debug!("{}: {} feature rows", PipelineStage::FeatureBuilt, table.len());

        let split = chronological_split_index(table.len(), self.config.test_ratio)?;
        let (train, holdout) = table.split_at(split)?;

        let scaling = StandardScaler::fit(&train.matrix())?;
        let x_train = scaling.transform(&train.matrix())?;
        let x_holdout = scaling.transform(&holdout.matrix())?;

        let ensemble = self.ensemble.fit(&x_train, train.targets())?;
        let holdout_predictions = ensemble.predict(&x_holdout);
        let model_metrics = evaluate(&holdout_predictions, holdout.targets())?;
        debug!(
            "{}: train {} / holdout {}, MAE {:.4}",
            PipelineStage::TrainedAndEvaluated,
            train.len(),
            holdout.len(),
            model_metrics.mae
        );

        let (latest, current_price) = table.last().ok_or_else(|| {
            ForecastError::DataError("No feature rows to predict from".to_string())
        })?;
        let latest_scaled = scaling.transform_one(&latest.to_vec())?;
        let predicted_price = ensemble.predict_row(&latest_scaled)?.max(0.0);

        let price_change = predicted_price - current_price;
        let result = ForecastResult {
            predicted_price,
            confidence_interval: ConfidenceInterval::from_error(
                predicted_price,
                model_metrics.mae,
                self.config.confidence_multiplier,
            ),
            model_metrics,
            current_price,
            price_change,
            price_change_percent: price_change_percent(predicted_price, current_price),
            training_samples: train.len(),
            test_samples: holdout.len(),
        };

        info!(
            "{}: predicted {:.2} (current {:.2}), accuracy {:.2}%",
            PipelineStage::Done,
            result.predicted_price,
            result.current_price,
            result.model_metrics.accuracy
        );

        Ok(TrainedForecast {
            result,
            scaling,
            ensemble,
            latest_features: latest.clone(),
        })
    }

    fn reject(&self, available: usize) -> ForecastError {
        warn!(
            "{}: {} usable rows, need {}",
            PipelineStage::Rejected,
            available,
            self.config.min_feature_rows
        );
        ForecastError::InsufficientData {
            min_required: self.config.min_feature_rows,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoostingParams, ForestParams};
    use chrono::NaiveDate;

    fn series(prices: &[f64]) -> Vec<MarketObservation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                MarketObservation::new("Rice", "Punjab", "Khanna", start + chrono::Days::new(i as u64), *p)
                    .unwrap()
            })
            .collect()
    }

    fn small_pipeline() -> ForecastPipeline {
        ForecastPipeline::new(PipelineConfig {
            random_forest: ForestParams {
                n_estimators: 10,
                ..Default::default()
            },
            gradient_boosting: BoostingParams {
                n_estimators: 20,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::FeatureBuilt.to_string(), "FEATURE-BUILT");
        assert_eq!(PipelineStage::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let observations = series(&[50.0; 30]);
        let err = small_pipeline().forecast(&observations, 0).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));
    }

    #[test]
    fn test_rows_lost_to_features_are_counted() {
        // 22 raw rows pass the raw check but only 19 feature rows survive
        let observations = series(&[50.0; 22]);
        let err = small_pipeline().forecast(&observations, 7).unwrap_err();
        let rejection = err.rejection().unwrap();
        assert_eq!(rejection.min_required, 20);
        assert_eq!(rejection.available, 19);
    }

    #[test]
    fn test_horizon_does_not_change_forecast() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let observations = series(&prices);
        let pipeline = small_pipeline();

        let one = pipeline.forecast(&observations, 1).unwrap();
        let thirty = pipeline.forecast(&observations, 30).unwrap();
        assert_eq!(one, thirty);
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ForecastPipeline>();
    }
}
