//! # Market Math
//!
//! Numeric building blocks for market price series.
//! This crate provides lagged series, trailing-window statistics and
//! descriptive statistics used to derive model features from prices.

use thiserror::Error;

pub mod descriptive;
pub mod rolling;

pub use rolling::{lag, rolling_mean, rolling_std, TrailingWindow};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 2 values, have 1".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 values, have 1"
        );
    }
}
