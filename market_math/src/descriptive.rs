//! Descriptive statistics over price slices
//!
//! Thin wrappers around `statrs` that turn the NaN it returns for
//! degenerate input into an explicit error.

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    mean_of(values.iter(), values.len())
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    sample_std_dev_of(values.iter(), values.len())
}

pub(crate) fn mean_of<'a, I>(values: I, len: usize) -> Result<f64>
where
    I: Iterator<Item = &'a f64>,
{
    if len == 0 {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }

    Ok(values.mean())
}

pub(crate) fn sample_std_dev_of<'a, I>(values: I, len: usize) -> Result<f64>
where
    I: Iterator<Item = &'a f64>,
{
    if len < 2 {
        return Err(MathError::InsufficientData(format!(
            "Sample standard deviation needs at least 2 values, have {}",
            len
        )));
    }

    Ok(values.std_dev())
}

/// Population standard deviation (n denominator)
pub fn population_std_dev(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the standard deviation of an empty series".to_string(),
        ));
    }

    Ok(values.iter().population_std_dev())
}
