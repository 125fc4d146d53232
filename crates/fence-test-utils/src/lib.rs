//! Shared test utilities for the geofence-sync workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`gateway`]: [`FakeGateway`], a scriptable native engine
//! - [`store`]: [`FlakyStore`] and on-disk store fixtures
//! - [`records`]: sample geofence records

pub mod gateway;
pub mod records;
pub mod store;

pub use gateway::{FakeGateway, GatewayCall};
pub use records::{sample_record, sample_records, snapshot_json};
pub use store::{FlakyStore, TempStore};
