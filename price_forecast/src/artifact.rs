//! Persisted model artifacts
//!
//! An artifact is the scaling statistics and fitted ensemble from one
//! training run, saved as JSON so later predictions can skip refitting.

use crate::data::MarketObservation;
use crate::error::{ForecastError, Result};
use crate::features::FeatureBuilder;
use crate::metrics::{price_change_percent, ConfidenceInterval, ModelMetrics};
use crate::models::FittedEnsemble;
use crate::pipeline::{ForecastPipeline, TrainedForecast};
use crate::scaling::ScalingParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Trained model state for one commodity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub commodity: String,
    pub state: Option<String>,
    pub trained_at: DateTime<Utc>,
    pub rolling_window: usize,
    pub confidence_multiplier: f64,
    pub scaling: ScalingParams,
    pub ensemble: FittedEnsemble,
    pub metrics: ModelMetrics,
    pub training_samples: usize,
    pub test_samples: usize,
}

/// Prediction served from a saved artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPrediction {
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change_percent: f64,
    pub confidence_interval: ConfidenceInterval,
    /// Holdout accuracy recorded when the model was trained
    pub model_accuracy: f64,
}

impl ModelArtifact {
    /// Capture the fitted state of a training run
    pub fn from_trained(
        commodity: impl Into<String>,
        state: Option<String>,
        pipeline: &ForecastPipeline,
        trained: &TrainedForecast,
    ) -> Self {
        Self {
            commodity: commodity.into(),
            state,
            trained_at: Utc::now(),
            rolling_window: pipeline.config().rolling_window,
            confidence_multiplier: pipeline.config().confidence_multiplier,
            scaling: trained.scaling.clone(),
            ensemble: trained.ensemble.clone(),
            metrics: trained.result.model_metrics,
            training_samples: trained.result.training_samples,
            test_samples: trained.result.test_samples,
        }
    }

    /// Predict from the latest feature vector of `observations`
    pub fn predict(&self, observations: &[MarketObservation]) -> Result<ArtifactPrediction> {
        let table = FeatureBuilder::new(self.rolling_window)?.build(observations)?;
        let (latest, current_price) = table.last().ok_or(ForecastError::InsufficientData {
            min_required: 1,
            available: 0,
        })?;

        let scaled = self.scaling.transform_one(&latest.to_vec())?;
        let predicted_price = self.ensemble.predict_row(&scaled)?.max(0.0);

        Ok(ArtifactPrediction {
            current_price,
            predicted_price,
            price_change_percent: price_change_percent(predicted_price, current_price),
            confidence_interval: ConfidenceInterval::from_error(
                predicted_price,
                self.metrics.mae,
                self.confidence_multiplier,
            ),
            model_accuracy: self.metrics.accuracy,
        })
    }

    /// Write the artifact as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        info!(
            "Saved model for {} to {}",
            self.commodity,
            path.as_ref().display()
        );
        Ok(())
    }

    /// Read an artifact written by [`ModelArtifact::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Directory of artifacts keyed by commodity name
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File an artifact for `commodity` lives in
    pub fn path_for(&self, commodity: &str) -> PathBuf {
        self.root
            .join(format!("price_model_{}.json", commodity.replace(' ', "_")))
    }

    pub fn contains(&self, commodity: &str) -> bool {
        self.path_for(commodity).is_file()
    }

    /// Save under the artifact's commodity, creating the directory if needed
    pub fn save(&self, artifact: &ModelArtifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(&artifact.commodity);
        artifact.save(&path)?;
        Ok(path)
    }

    pub fn load(&self, commodity: &str) -> Result<ModelArtifact> {
        let path = self.path_for(commodity);
        if !path.is_file() {
            return Err(ForecastError::DataError(format!(
                "No saved model for {} at {}",
                commodity,
                path.display()
            )));
        }
        ModelArtifact::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Regressor;

    #[test]
    fn test_path_for_replaces_spaces() {
        let store = ArtifactStore::new("models");
        assert_eq!(
            store.path_for("Green Chilli"),
            PathBuf::from("models/price_model_Green_Chilli.json")
        );
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.contains("Rice"));
        assert!(store.load("Rice").is_err());
    }

    #[test]
    fn test_unwritable_root_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = ArtifactStore::new(file.path());
        let artifact = ModelArtifact {
            commodity: "Rice".to_string(),
            state: None,
            trained_at: Utc::now(),
            rolling_window: 7,
            confidence_multiplier: 1.5,
            scaling: crate::scaling::StandardScaler::fit(&[vec![1.0], vec![2.0]]).unwrap(),
            ensemble: crate::models::EnsembleRegressor::default()
                .fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0])
                .unwrap(),
            metrics: ModelMetrics {
                mae: 0.0,
                r2_score: 1.0,
                accuracy: 100.0,
            },
            training_samples: 2,
            test_samples: 0,
        };

        assert!(store.save(&artifact).is_err());
    }
}
