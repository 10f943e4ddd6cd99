//! # Price Forecast
//!
//! A Rust library for forecasting agricultural commodity prices from
//! per-market observations.
//!
//! ## Features
//!
//! - Observation tables loaded from CSV (`Commodity`, `State`, `Market`,
//!   `Arrival_Date`, `Modal_Price`)
//! - Feature engineering: calendar fields, lagged prices, rolling statistics
//! - Random forest and gradient boosting regressors averaged as an ensemble
//! - Holdout evaluation with MAE, R², an accuracy score and a confidence band
//! - JSON model artifacts for serving predictions without refitting
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_forecast::data::ObservationTable;
//! use price_forecast::pipeline::ForecastPipeline;
//!
//! # fn main() -> price_forecast::error::Result<()> {
//! // Load data
//! let table = ObservationTable::from_csv("prices.csv")?;
//!
//! // Narrow to one commodity, optionally one state
//! let wheat = table.filter("Wheat", Some("Punjab"));
//!
//! // Forecast
//! let pipeline = ForecastPipeline::default();
//! let result = pipeline.forecast(&wheat, 7)?;
//! println!(
//!     "{:.2} ({:.2} - {:.2})",
//!     result.predicted_price, result.confidence_interval.lower, result.confidence_interval.upper
//! );
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod scaling;
pub mod utils;

// Re-export commonly used types
pub use crate::artifact::{ArtifactStore, ModelArtifact};
pub use crate::config::PipelineConfig;
pub use crate::data::{MarketObservation, ObservationTable};
pub use crate::error::{ForecastError, Rejection};
pub use crate::features::{FeatureBuilder, FeatureVector};
pub use crate::metrics::{ConfidenceInterval, ModelMetrics};
pub use crate::models::{FittedRegressor, Regressor};
pub use crate::pipeline::{ForecastPipeline, ForecastResult, TrainedForecast};
pub use crate::scaling::{ScalingParams, StandardScaler};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
