//! Gestures consumed by the synchronization core

use fence_meta::FenceId;
use fence_overlay::MapEvent;

use crate::GeofenceView;
use crate::native::Ticket;

/// Input from the map or the edit panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Map(MapEvent),
    /// Slider moved; fires many times per drag
    RadiusChanged(f64),
    /// Slider released
    RadiusCommitted,
    RemoveRequested,
}

impl From<MapEvent> for Gesture {
    fn from(event: MapEvent) -> Self {
        Self::Map(event)
    }
}

/// What a gesture did.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Created(GeofenceView),
    Selected { id: FenceId, radius: f64 },
    SelectionCleared,
    Resized { id: FenceId, radius: f64 },
    /// A native request was queued
    Queued(Ticket),
    /// The gesture had nothing to act on
    Ignored,
    /// The gesture was refused; the reason was logged
    Rejected { reason: String },
}
