//! Coordinates and geofence identity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and within range.
    pub fn validate(&self) -> Result<()> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lng_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Identity of a geofence, derived from its center.
///
/// The id is `"{latitude}|{longitude}"` using the shortest decimal form
/// that round-trips, so `10.0` renders as `10`. Two fences created at the
/// same coordinate share an id; callers decide what a collision means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FenceId(String);

impl FenceId {
    /// Derive the id for a fence centered at `center`.
    pub fn from_center(center: LatLng) -> Self {
        // Adding zero folds -0.0 into 0.0 so both spell the same id
        Self(format!("{}|{}", center.latitude + 0.0, center.longitude + 0.0))
    }

    /// Wrap an id that was produced elsewhere, e.g. read back from storage.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FenceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
