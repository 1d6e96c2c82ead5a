//! Engine configuration.
//!
//! All options are fixed when the engine is constructed; there is no way to
//! resize the grid or change the cadence of a running engine.

use std::time::Duration;

use crate::error::{LifeError, Result};

/// Default grid height.
pub const DEFAULT_ROWS: usize = 20;
/// Default grid width.
pub const DEFAULT_COLS: usize = 15;
/// Default delay between automatic advances.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(200);
/// Default probability that `randomize` makes a cell alive.
pub const DEFAULT_ALIVE_PROBABILITY: f64 = 0.3;

/// Construction-time options for a simulation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Grid height
    pub rows: usize,
    /// Grid width
    pub cols: usize,
    /// Delay between auto-advances while running
    pub step_interval: Duration,
    /// Probability of a cell being alive after `randomize`
    pub random_alive_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            step_interval: DEFAULT_STEP_INTERVAL,
            random_alive_probability: DEFAULT_ALIVE_PROBABILITY,
        }
    }
}

impl EngineConfig {
    pub fn with_dimensions(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_step_interval(mut self, step_interval: Duration) -> Self {
        self.step_interval = step_interval;
        self
    }

    pub fn with_random_alive_probability(mut self, probability: f64) -> Self {
        self.random_alive_probability = probability;
        self
    }

    /// Checks every option, reporting the first one that is out of range.
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.rows, self.cols)?;
        if self.step_interval.is_zero() {
            return Err(LifeError::InvalidInterval);
        }
        validate_probability(self.random_alive_probability)
    }
}

pub(crate) fn validate_dimensions(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 || rows.checked_mul(cols).is_none() {
        return Err(LifeError::InvalidDimension { rows, cols });
    }
    Ok(())
}

pub(crate) fn validate_probability(probability: f64) -> Result<()> {
    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&probability) {
        return Err(LifeError::InvalidProbability(probability));
    }
    Ok(())
}
