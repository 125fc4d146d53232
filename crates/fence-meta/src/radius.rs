//! Radius acceptance policy
//!
//! Non-positive and non-finite values are rejected outright. Positive values
//! outside the bounds are clamped, so a slider that overshoots still lands
//! on a usable radius.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Radius assigned to freshly created geofences, in meters.
pub const DEFAULT_RADIUS: f64 = 250.0;

fn default_min() -> f64 {
    1.0
}

fn default_max() -> f64 {
    100_000.0
}

/// Inclusive radius bounds in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusBounds {
    #[serde(default = "default_min")]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
}

impl Default for RadiusBounds {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
        }
    }
}

impl RadiusBounds {
    /// Build bounds, rejecting an empty or non-positive range.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max {
            Ok(())
        } else {
            Err(Error::InvalidBounds {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Accept `value`, clamping it into range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRadius`] for zero, negative or non-finite input.
    pub fn apply(&self, value: f64) -> Result<f64> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidRadius { value });
        }
        Ok(value.clamp(self.min, self.max))
    }
}
