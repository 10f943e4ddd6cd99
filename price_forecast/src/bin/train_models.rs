//! Train and persist a price model for every commodity in an observation table
//!
//! Usage: cargo run --bin train_models -- --data prices.csv --models-dir models

use anyhow::{Context, Result};
use clap::Parser;
use price_forecast::artifact::{ArtifactStore, ModelArtifact};
use price_forecast::config::PipelineConfig;
use price_forecast::data::ObservationTable;
use price_forecast::pipeline::ForecastPipeline;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train commodity price forecasting models")]
struct Args {
    /// Observation table (CSV)
    #[arg(short, long)]
    data: PathBuf,

    /// Directory for model artifacts
    #[arg(short, long, default_value = "models")]
    models_dir: PathBuf,

    /// Pipeline config (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Forecast horizon in days
    #[arg(long, default_value = "7")]
    horizon: usize,

    /// Skip training and only test saved models
    #[arg(long)]
    test_only: bool,

    /// Commodities to test after training
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Rice,Wheat,Potato,Onion,Tomato"
    )]
    test_commodities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    commodity: String,
    accuracy: f64,
    mae: f64,
    r2_score: f64,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("price_forecast=info,train_models=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let pipeline = ForecastPipeline::new(config)?;
    let store = ArtifactStore::new(&args.models_dir);

    let table = ObservationTable::from_csv(&args.data)
        .with_context(|| format!("loading observations {}", args.data.display()))?;
    info!("\n{}", table.summary());

    if !args.test_only {
        train_all(&table, &pipeline, &store, args.horizon)?;
    }
    test_models(&table, &store, &args.test_commodities);

    info!("Done");
    Ok(())
}

fn train_all(
    table: &ObservationTable,
    pipeline: &ForecastPipeline,
    store: &ArtifactStore,
    horizon: usize,
) -> Result<()> {
    let min_rows = pipeline.config().min_feature_rows;
    let mut summary = Vec::new();

    for commodity in table.commodities() {
        let observations = table.filter(&commodity, None);
        if observations.len() < min_rows {
            warn!(
                "Skipping {}: {} rows, need {}",
                commodity,
                observations.len(),
                min_rows
            );
            continue;
        }

        info!("Training model for {}...", commodity);
        let trained = match pipeline.train(&observations, horizon) {
            Ok(trained) => trained,
            Err(e) => {
                error!("Error training {}: {}", commodity, e);
                continue;
            }
        };

        let artifact = ModelArtifact::from_trained(commodity.clone(), None, pipeline, &trained);
        if let Err(e) = store.save(&artifact) {
            error!("Error saving model for {}: {}", commodity, e);
            continue;
        }

        let metrics = trained.result.model_metrics;
        info!("{} accuracy: {:.2}%", commodity, metrics.accuracy);
        summary.push(SummaryRow {
            commodity,
            accuracy: metrics.accuracy,
            mae: metrics.mae,
            r2_score: metrics.r2_score,
        });
    }

    if summary.is_empty() {
        warn!("No models trained");
        return Ok(());
    }

    let summary_path = store.root().join("training_summary.csv");
    let mut writer = csv::Writer::from_path(&summary_path)?;
    for row in &summary {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let n = summary.len() as f64;
    info!("Trained {} models, summary at {}", summary.len(), summary_path.display());
    info!(
        "Average accuracy {:.2}%, MAE {:.2}, R2 {:.4}",
        summary.iter().map(|r| r.accuracy).sum::<f64>() / n,
        summary.iter().map(|r| r.mae).sum::<f64>() / n,
        summary.iter().map(|r| r.r2_score).sum::<f64>() / n
    );

    summary.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
    info!("Top 5 by accuracy:");
    for (i, row) in summary.iter().take(5).enumerate() {
        info!("{:2}. {:20} {:.2}%", i + 1, row.commodity, row.accuracy);
    }

    Ok(())
}

fn test_models(table: &ObservationTable, store: &ArtifactStore, commodities: &[String]) {
    for commodity in commodities {
        if !store.contains(commodity) {
            warn!("No saved model for {}", commodity);
            continue;
        }

        let prediction = store
            .load(commodity)
            .and_then(|artifact| artifact.predict(&table.filter(commodity, None)));

        match prediction {
            Ok(p) => info!(
                "{}: current {:.2}, predicted {:.2} ({:+.2}%), range {:.2} - {:.2}, model accuracy {:.2}%",
                commodity,
                p.current_price,
                p.predicted_price,
                p.price_change_percent,
                p.confidence_interval.lower,
                p.confidence_interval.upper,
                p.model_accuracy
            ),
            Err(e) => error!("Error testing {}: {}", commodity, e),
        }
    }
}
