//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};

/// Number of training rows for a chronological split
///
/// The holdout takes `ceil(n * test_ratio)` rows from the end of the series;
/// the rest, in date order, is training data.
pub fn chronological_split_index(n: usize, test_ratio: f64) -> Result<usize> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "test_ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }

    let test_size = (n as f64 * test_ratio).ceil() as usize;
    let train_size = n.saturating_sub(test_size);

    if train_size == 0 || test_size == 0 {
        return Err(ForecastError::ValidationError(format!(
            "Cannot split {} rows into non-empty training and holdout partitions",
            n
        )));
    }

    Ok(train_size)
}

/// Whether a denominator is too close to zero to divide by
pub(crate) fn is_degenerate(denominator: f64) -> bool {
    !denominator.is_finite() || denominator.abs() < 1e-9
}

/// Date parsing for observation tables
pub mod date_parser {
    use crate::error::{ForecastError, Result};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Formats accepted for arrival dates, tried in order
    pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

    /// Parse a calendar date in any of the accepted formats
    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        let trimmed = s.trim();
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
            .ok_or_else(|| ForecastError::DataError(format!("Unrecognised date: '{}'", s)))
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
