//! User-facing warnings

use std::fmt;

use fence_meta::FenceId;
use serde::Serialize;

/// A non-fatal problem the user should hear about.
///
/// Notices queue up inside the core and are drained by the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The native engine refused a register or deregister call
    NativeFailure { id: FenceId, message: String },
    /// The snapshot could not be written; it is retried on the next change
    PersistenceFailure { message: String },
    /// A previously failed snapshot write went through
    PersistenceRecovered,
    /// The stored snapshot could not be parsed and was ignored
    MalformedSnapshot { message: String },
    /// A stored record was invalid or duplicated and was not loaded
    RecordSkipped { id: FenceId, reason: String },
    /// A stored record could not be drawn; it is kept and retried
    OverlayNotRestored { id: FenceId, reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeFailure { id, message } => {
                write!(f, "geofence {id} is not monitored: {message}")
            }
            Self::PersistenceFailure { message } => {
                write!(f, "could not save geofences, will retry: {message}")
            }
            Self::PersistenceRecovered => f.write_str("geofences saved after earlier failure"),
            Self::MalformedSnapshot { message } => {
                write!(f, "saved geofences were unreadable and were ignored: {message}")
            }
            Self::RecordSkipped { id, reason } => write!(f, "skipped saved geofence {id}: {reason}"),
            Self::OverlayNotRestored { id, reason } => {
                write!(f, "could not redraw geofence {id}: {reason}")
            }
        }
    }
}
