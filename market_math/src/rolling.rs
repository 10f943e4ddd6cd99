//! Lagged and trailing-window series
//!
//! Contains:
//! - Lag (shift) of a series by a fixed number of steps
//! - A bounded trailing window with mean and standard deviation
//! - Rolling mean and standard deviation with a minimum period count

use crate::descriptive;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded window over the most recent values of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl TrailingWindow {
    /// Create a new trailing window holding at most `capacity` values
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MathError::InvalidInput(
                "Window size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        })
    }

    /// Push a new value, evicting the oldest one once the window is full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);

        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the window holds `capacity` values
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Maximum number of values held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean of the values in the window
    pub fn mean(&self) -> Result<f64> {
        descriptive::mean_of(self.values.iter(), self.values.len())
    }

    /// Sample standard deviation of the values in the window
    pub fn std_dev(&self) -> Result<f64> {
        descriptive::sample_std_dev_of(self.values.iter(), self.values.len())
    }

    /// Clear all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Shift a series forward by `periods` steps
///
/// Position `i` holds `values[i - periods]`; the first `periods` positions
/// have no defined value.
pub fn lag(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(periods).map(|j| values[j]))
        .collect()
}

/// Trailing mean over at most `window` values ending at each position
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Result<Vec<Option<f64>>> {
    rolling(values, window, min_periods, 1, TrailingWindow::mean)
}

/// Trailing sample standard deviation over at most `window` values ending at each position
///
/// A single-value window has no defined standard deviation, whatever `min_periods` says.
pub fn rolling_std(values: &[f64], window: usize, min_periods: usize) -> Result<Vec<Option<f64>>> {
    rolling(values, window, min_periods, 2, TrailingWindow::std_dev)
}

fn rolling<F>(
    values: &[f64],
    window: usize,
    min_periods: usize,
    floor: usize,
    statistic: F,
) -> Result<Vec<Option<f64>>>
where
    F: Fn(&TrailingWindow) -> Result<f64>,
{
    if min_periods == 0 || min_periods > window {
        return Err(MathError::InvalidInput(format!(
            "min_periods must be between 1 and the window size ({}), got {}",
            window, min_periods
        )));
    }

    let mut trailing = TrailingWindow::new(window)?;
    let required = min_periods.max(floor);

    values
        .iter()
        .map(|&value| {
            trailing.push(value);
            if trailing.len() < required {
                Ok(None)
            } else {
                statistic(&trailing).map(Some)
            }
        })
        .collect()
}
