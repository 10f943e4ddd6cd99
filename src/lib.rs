//! # Agri Forecast
//!
//! Workspace facade for the commodity price forecasting crates.
//!
//! ## Example
//!
//! ```
//! use agri_forecast_workspace::{ForecastPipeline, PipelineConfig};
//!
//! let pipeline = ForecastPipeline::new(PipelineConfig::default()).unwrap();
//! assert_eq!(pipeline.config().min_feature_rows, 20);
//! ```

pub use market_math;
pub use price_forecast;

pub use price_forecast::{
    ArtifactStore, ForecastError, ForecastPipeline, ForecastResult, MarketObservation,
    ModelArtifact, ObservationTable, PipelineConfig,
};
