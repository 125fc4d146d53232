//! Live geofence entries

use std::fmt;

use fence_meta::{CircleStyle, FenceCommand, FenceId, GeofenceRecord, LatLng};
use fence_overlay::OverlayHandle;
use serde::Serialize;

use crate::native::Ticket;

/// Where an entry stands with the native monitoring engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NativeStatus {
    /// Reloaded from storage and not yet confirmed with the engine
    Unverified,
    /// A register (add or update) request is in flight
    Pending,
    Registered,
    /// The last register request failed; the overlay stays on the map
    Failed { reason: String },
    /// A deregister request is in flight; `previous` is restored if it fails
    Removing { previous: Box<NativeStatus> },
}

impl NativeStatus {
    pub fn is_removing(&self) -> bool {
        matches!(self, Self::Removing { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Registered => "registered",
            Self::Failed { .. } => "failed",
            Self::Removing { .. } => "removing",
        }
    }
}

impl fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed ({reason})"),
            other => f.write_str(other.label()),
        }
    }
}

/// A geofence owned by the synchronization core.
///
/// The center and style never change after creation; only the radius does.
/// The overlay is present while the app runs and is never persisted.
#[derive(Debug)]
pub struct GeofenceEntry {
    pub(crate) id: FenceId,
    pub(crate) center: LatLng,
    pub(crate) radius: f64,
    pub(crate) style: CircleStyle,
    pub(crate) overlay: Option<OverlayHandle>,
    pub(crate) native: NativeStatus,
    /// Ticket of the latest native request issued for this entry
    pub(crate) generation: Option<Ticket>,
}

impl GeofenceEntry {
    pub fn id(&self) -> &FenceId {
        &self.id
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn style(&self) -> &CircleStyle {
        &self.style
    }

    pub fn overlay(&self) -> Option<&OverlayHandle> {
        self.overlay.as_ref()
    }

    pub fn native(&self) -> &NativeStatus {
        &self.native
    }

    pub fn generation(&self) -> Option<Ticket> {
        self.generation
    }

    pub fn has_live_overlay(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| !o.is_removed())
    }

    pub fn to_record(&self) -> GeofenceRecord {
        GeofenceRecord::new(self.id.clone(), self.center, self.radius, self.style.clone())
    }

    pub fn to_command(&self) -> FenceCommand {
        FenceCommand::new(self.id.clone(), self.center, self.radius)
    }

    pub fn view(&self) -> GeofenceView {
        GeofenceView {
            id: self.id.clone(),
            center: self.center,
            radius: self.radius,
            style: self.style.clone(),
            native: self.native.clone(),
            overlay: self.has_live_overlay(),
        }
    }
}

/// Detached, serializable view of an entry for the UI and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofenceView {
    pub id: FenceId,
    pub center: LatLng,
    pub radius: f64,
    pub style: CircleStyle,
    pub native: NativeStatus,
    pub overlay: bool,
}
