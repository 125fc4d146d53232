//! Map engine boundary
//!
//! Mirrors the drawing primitives of a mobile map SDK: create a map bound to
//! a view element, add markers and circles synchronously, and listen for
//! gestures.

use fence_meta::{CircleStyle, FenceId, LatLng};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Initial camera position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub target: LatLng,
    pub zoom: f64,
}

impl CameraConfig {
    pub fn new(target: LatLng, zoom: f64) -> Self {
        Self { target, zoom }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleOptions {
    pub center: LatLng,
    pub radius: f64,
    pub style: CircleStyle,
}

/// Gestures and lifecycle events raised by the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Emitted once when the map can accept overlays
    Ready,
    LongPress(LatLng),
    Tap(LatLng),
    Drag,
    /// A geofence marker was tapped
    MarkerTap(FenceId),
}

/// Live handle to a marker drawn on the map.
pub trait MarkerHandle: Send {
    fn position(&self) -> LatLng;

    /// Invoke `listener` every time the marker is tapped.
    fn on_tap(&mut self, listener: Box<dyn Fn() + Send + Sync>);

    fn remove(&mut self);
}

/// Live handle to a circle drawn on the map.
pub trait CircleHandle: Send {
    fn radius(&self) -> f64;
    fn set_radius(&mut self, radius: f64);
    fn style(&self) -> CircleStyle;
    fn remove(&mut self);
}

/// A map that overlays can be drawn on.
pub trait MapSurface {
    fn add_marker_sync(&mut self, options: MarkerOptions) -> Result<Box<dyn MarkerHandle>>;
    fn add_circle_sync(&mut self, options: CircleOptions) -> Result<Box<dyn CircleHandle>>;
}

/// Factory for maps bound to a view element.
pub trait MapEngine {
    type Surface: MapSurface;

    fn create_map(&self, element_id: &str, camera: CameraConfig) -> Result<Self::Surface>;
}
