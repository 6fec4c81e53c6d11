//! The blackout ratio.

use std::fmt;
use std::str::FromStr;

use crate::error::{RedactorError, RedactorResult};

/// Fraction of eligible pages targeted for blackout, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackoutRatio(f64);

impl BlackoutRatio {
    /// Ratio used when nothing else is configured (40%).
    pub const DEFAULT: Self = Self(0.40);

    /// Creates a ratio, rejecting values outside `(0, 1]` and NaN.
    pub fn new(value: f64) -> RedactorResult<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(RedactorError::InvalidInput {
                parameter: "ratio".to_string(),
                reason: format!("{} is not in (0, 1]", value),
            })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Number of pages to black out among `eligible` pages.
    ///
    /// Truncates: 10 eligible pages at 0.40 yields 4, and 7 yields 2.
    pub fn target_count(self, eligible: usize) -> usize {
        let target = (self.0 * eligible as f64).floor() as usize;
        target.min(eligible)
    }
}

impl Default for BlackoutRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BlackoutRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for BlackoutRatio {
    type Err = RedactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| RedactorError::InvalidInput {
            parameter: "ratio".to_string(),
            reason: format!("'{}' is not a number", s),
        })?;
        Self::new(value)
    }
}
