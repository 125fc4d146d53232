//! Shared schema for the geofence workspace
//!
//! Every layer agrees on these types:
//!
//! - [`LatLng`] and [`FenceId`]: where a geofence is and how it is named
//! - [`CircleStyle`]: how its circle is drawn
//! - [`GeofenceRecord`]: the persisted form of one geofence
//! - [`FenceCommand`]: the payload handed to the native monitoring engine
//! - [`RadiusBounds`]: the radius acceptance policy

pub mod command;
pub mod error;
pub mod geo;
pub mod radius;
pub mod record;
pub mod style;

pub use command::FenceCommand;
pub use error::{Error, Result};
pub use geo::{FenceId, LatLng};
pub use radius::{DEFAULT_RADIUS, RadiusBounds};
pub use record::GeofenceRecord;
pub use style::CircleStyle;
