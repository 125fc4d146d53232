//! Native geofence gateway.
//!
//! A thin async command interface to the OS-level geofencing engine:
//! register (add or update), deregister and a one-time init. Monitoring is
//! only available on mobile platforms; see [`Platform`].

pub mod emulated;
pub mod error;
pub mod gateway;
pub mod platform;

pub use emulated::EmulatedGateway;
pub use error::{Error, Result};
pub use gateway::NativeGateway;
pub use platform::Platform;
