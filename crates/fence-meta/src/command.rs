//! Commands understood by the native geofencing engine

use serde::{Deserialize, Serialize};

use crate::{FenceId, LatLng};

/// Add-or-update payload for the native engine.
///
/// The field names are fixed by the device plugin, which expects
/// `latitud`/`longitud` rather than the English spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceCommand {
    pub id: FenceId,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    pub radius: f64,
}

impl FenceCommand {
    pub fn new(id: FenceId, center: LatLng, radius: f64) -> Self {
        Self {
            id,
            latitude: center.latitude,
            longitude: center.longitude,
            radius,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}
