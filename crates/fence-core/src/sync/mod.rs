//! Synchronization between overlays, snapshot and native monitoring
//!
//! - [`GeofenceSync`]: the state machine that owns the live collection
//! - [`ConsistencyReport`]: result of comparing the three representations

mod check;
mod engine;

pub use check::{CheckStatus, ConsistencyReport, DriftItem};
pub use engine::GeofenceSync;
