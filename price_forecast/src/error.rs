//! Error types for the price_forecast crate

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few usable rows to train and evaluate a model
    #[error("Insufficient data for training: need at least {min_required} rows, have {available}")]
    InsufficientData {
        /// Minimum number of rows the pipeline requires
        min_required: usize,
        /// Number of rows actually available
        available: usize,
    },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised while fitting or applying a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from series math
    #[error("Math error: {0}")]
    MathError(#[from] market_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from reading or writing CSV
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ForecastError {
    /// Whether this is the insufficient-data rejection
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData { .. })
    }

    /// Structured rejection record for the insufficient-data case
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ForecastError::InsufficientData {
                min_required,
                available,
            } => Some(Rejection {
                error: "Insufficient data for training".to_string(),
                min_required: *min_required,
                available: *available,
            }),
            _ => None,
        }
    }
}

/// Serializable form of an insufficient-data rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub error: String,
    pub min_required: usize,
    pub available: usize,
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}
