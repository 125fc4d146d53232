//! Durable persistence for geofence definitions
//!
//! Two layers:
//!
//! - [`KeyValueStore`]: a string-keyed store with synchronous get/set of a
//!   single blob per key. [`FileKvStore`] keeps one JSON file per key,
//!   [`MemoryKvStore`] keeps everything in a map.
//! - [`RecordStore`]: the geofence snapshot adapter. It reads and writes the
//!   whole collection under the [`SNAPSHOT_KEY`] key; there are no partial
//!   or delta writes.

pub mod error;
pub mod io;
pub mod kv;
pub mod records;

pub use error::{Error, Result};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore, validate_key};
pub use records::{RecordStore, SNAPSHOT_KEY};
