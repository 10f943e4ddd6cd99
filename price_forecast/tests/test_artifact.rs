use chrono::{Days, NaiveDate};
use price_forecast::models::{BoostingParams, ForestParams};
use price_forecast::{
    ArtifactStore, ForecastPipeline, MarketObservation, ModelArtifact, PipelineConfig,
};

fn observations(commodity: &str, n: usize) -> Vec<MarketObservation> {
    let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    (0..n)
        .map(|i| {
            let price = 1800.0 + (i % 6) as f64 * 25.0 + i as f64;
            MarketObservation::new(commodity, "Bihar", "Patna", start + Days::new(i as u64), price)
                .unwrap()
        })
        .collect()
}

fn pipeline() -> ForecastPipeline {
    ForecastPipeline::new(PipelineConfig {
        random_forest: ForestParams {
            n_estimators: 15,
            ..Default::default()
        },
        gradient_boosting: BoostingParams {
            n_estimators: 25,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let series = observations("Green Gram", 40);
    let pipeline = pipeline();

    let trained = pipeline.train(&series, 7).unwrap();
    let artifact = ModelArtifact::from_trained("Green Gram", None, &pipeline, &trained);

    let path = store.save(&artifact).unwrap();
    assert!(path.ends_with("price_model_Green_Gram.json"));
    assert!(store.contains("Green Gram"));

    let loaded = store.load("Green Gram").unwrap();
    assert_eq!(loaded, artifact);
    assert_eq!(loaded.training_samples, trained.result.training_samples);
}

#[test]
fn test_loaded_artifact_reproduces_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let series = observations("Rice", 35);
    let pipeline = pipeline();

    let trained = pipeline.train(&series, 7).unwrap();
    store
        .save(&ModelArtifact::from_trained("Rice", None, &pipeline, &trained))
        .unwrap();

    let prediction = store.load("Rice").unwrap().predict(&series).unwrap();

    assert_eq!(prediction.predicted_price, trained.result.predicted_price);
    assert_eq!(prediction.current_price, trained.result.current_price);
    assert_eq!(prediction.confidence_interval, trained.result.confidence_interval);
    assert_eq!(
        prediction.price_change_percent,
        trained.result.price_change_percent
    );
    assert_eq!(
        prediction.model_accuracy,
        trained.result.model_metrics.accuracy
    );
}

#[test]
fn test_predict_needs_a_feature_row() {
    let pipeline = pipeline();
    let trained = pipeline.train(&observations("Rice", 30), 7).unwrap();
    let artifact = ModelArtifact::from_trained("Rice", None, &pipeline, &trained);

    let err = artifact.predict(&observations("Rice", 3)).unwrap_err();
    assert!(err.is_insufficient_data());
}
