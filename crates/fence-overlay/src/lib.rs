//! Map overlays for geofences
//!
//! The map engine itself is an external collaborator; this crate only
//! defines its boundary ([`MapEngine`], [`MapSurface`], [`MarkerHandle`],
//! [`CircleHandle`], [`MapEvent`]) and builds on top of it:
//!
//! - [`OverlayFactory`] pairs a marker with a circle for one geofence and
//!   routes marker taps back to the caller by fence id.
//! - [`HeadlessMap`] is an in-memory engine used on emulated devices and in
//!   tests.

pub mod error;
pub mod factory;
pub mod headless;
pub mod map;

pub use error::{Error, Result};
pub use factory::{OverlayFactory, OverlayHandle, TapListener};
pub use headless::{CircleSnapshot, HeadlessEngine, HeadlessMap};
pub use map::{
    CameraConfig, CircleHandle, CircleOptions, MapEngine, MapEvent, MapSurface, MarkerHandle,
    MarkerOptions,
};
