//! Geofence synchronization core
//!
//! Keeps three representations of every geofence in step:
//!
//! - **Overlays**: the marker and circle drawn on the map
//! - **Snapshot**: the persisted record collection
//! - **Native registration**: the region monitored by the OS engine
//!
//! # Architecture
//!
//! ```text
//!                   fence-cli / app
//!                         |
//!                     fence-core
//!           (GeofenceSync  +  Session driver)
//!                         |
//!     +-----------+-------+------+-------------+
//!     |           |              |             |
//! fence-meta fence-store   fence-native   fence-overlay
//! ```
//!
//! [`GeofenceSync`] is a synchronous state machine. Native calls leave it as
//! sequenced [`NativeRequest`]s and come back as [`NativeOutcome`]s, which
//! lets a stale response be recognised and dropped. [`Session`] is the async
//! driver that runs those requests against a
//! [`NativeGateway`](fence_native::NativeGateway) in order.

pub mod config;
pub mod error;
pub mod gesture;
pub mod logging;
pub mod model;
pub mod native;
pub mod notice;
pub mod panel;
pub mod session;
pub mod sync;

pub use config::{DuplicatePolicy, Settings};
pub use error::{Error, Result};
pub use gesture::{Dispatch, Gesture};
pub use model::{GeofenceEntry, GeofenceView, NativeStatus};
pub use native::{NativeOp, NativeOutcome, NativeRequest, Resolution, ResolutionKind, Ticket};
pub use notice::Notice;
pub use panel::{EditPanel, PanelVisibility};
pub use session::{Session, StartReport};
pub use sync::{CheckStatus, ConsistencyReport, DriftItem, GeofenceSync};
