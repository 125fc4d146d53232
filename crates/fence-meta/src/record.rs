//! Persisted form of a geofence

use serde::{Deserialize, Serialize};

use crate::{CircleStyle, FenceId, LatLng, Result};

/// One geofence as written to durable storage.
///
/// Carries no overlay handle; the snapshot is plain data so it can be
/// replayed into a fresh map after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceRecord {
    pub id: FenceId,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    #[serde(default)]
    pub style: CircleStyle,
}

impl GeofenceRecord {
    pub fn new(id: FenceId, center: LatLng, radius: f64, style: CircleStyle) -> Self {
        Self {
            id,
            latitude: center.latitude,
            longitude: center.longitude,
            radius,
            style,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Check that the record describes a drawable fence.
    pub fn validate(&self) -> Result<()> {
        self.center().validate()?;
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(crate::Error::InvalidRadius { value: self.radius });
        }
        Ok(())
    }
}
