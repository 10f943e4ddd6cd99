use chrono::{Days, NaiveDate};
use price_forecast::{ArtifactStore, ForecastPipeline, ModelArtifact, ObservationTable};
use std::io::Write;
use tempfile::NamedTempFile;

// Two commodities across two states; Wheat has enough history, Jute does not
fn create_sample_data() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "State,District,Market,Commodity,Arrival_Date,Modal_Price").unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    for i in 0..45u64 {
        let date = (start + Days::new(i)).format("%d/%m/%Y");
        let price = 2200.0 + (i % 7) as f64 * 10.0 + i as f64 * 2.0;
        writeln!(file, "Punjab,Ludhiana,Khanna,Wheat,{},{}", date, price).unwrap();
        if i % 3 == 0 {
            writeln!(file, "Haryana,Karnal,Karnal,Wheat,{},{}", date, price + 15.0).unwrap();
        }
    }
    for i in 0..12u64 {
        let date = (start + Days::new(i)).format("%Y-%m-%d");
        writeln!(file, "West Bengal,Hooghly,Sheoraphuli,Jute,{},5100", date).unwrap();
    }

    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Load data
    let data_file = create_sample_data();
    let table = ObservationTable::from_csv(data_file.path()).unwrap();
    assert_eq!(table.len(), 45 + 15 + 12);
    assert_eq!(table.commodities(), vec!["Jute", "Wheat"]);

    // 2. Forecast one commodity in one state
    let pipeline = ForecastPipeline::default();
    let punjab = table.filter("Wheat", Some("Punjab"));
    let result = pipeline.forecast(&punjab, 7).unwrap();

    assert_eq!(result.training_samples + result.test_samples, 42);
    assert!(result.confidence_interval.lower <= result.predicted_price);
    assert!(result.predicted_price <= result.confidence_interval.upper);
    assert!(result.model_metrics.accuracy > 50.0);

    // 3. The whole-country series is a different forecast
    let national = pipeline.forecast(&table.filter("Wheat", None), 7).unwrap();
    assert_eq!(national.training_samples + national.test_samples, 57);

    // 4. Too little history is rejected, not forecast
    let err = pipeline.forecast(&table.filter("Jute", None), 7).unwrap_err();
    assert_eq!(err.rejection().unwrap().available, 12);

    // 5. Persist and reload
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let trained = pipeline.train(&punjab, 7).unwrap();
    store
        .save(&ModelArtifact::from_trained(
            "Wheat",
            Some("Punjab".to_string()),
            &pipeline,
            &trained,
        ))
        .unwrap();

    let served = store.load("Wheat").unwrap().predict(&punjab).unwrap();
    assert_eq!(served.predicted_price, result.predicted_price);
}

#[test]
fn test_forecast_result_json_shape() {
    let data_file = create_sample_data();
    let table = ObservationTable::from_csv(data_file.path()).unwrap();
    let result = ForecastPipeline::default()
        .forecast(&table.filter("Wheat", Some("Punjab")), 7)
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    for key in [
        "predicted_price",
        "current_price",
        "price_change",
        "price_change_percent",
        "training_samples",
        "test_samples",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert!(json["confidence_interval"]["lower"].is_number());
    assert!(json["confidence_interval"]["upper"].is_number());
    assert!(json["model_metrics"]["mae"].is_number());
    assert!(json["model_metrics"]["r2_score"].is_number());
    assert!(json["model_metrics"]["accuracy"].is_number());
}
