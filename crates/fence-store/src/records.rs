//! Geofence snapshot adapter

use fence_meta::GeofenceRecord;

use crate::{Error, KeyValueStore, Result};

/// Fixed key under which the geofence snapshot is stored.
pub const SNAPSHOT_KEY: &str = "geofences";

/// Reads and writes the whole geofence collection as one JSON array.
///
/// Every write replaces the full snapshot. This keeps the persisted state a
/// mirror of the live collection at the cost of write volume, which only
/// matters for collections far larger than a user places by hand.
#[derive(Debug, Clone)]
pub struct RecordStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    /// Use a key other than [`SNAPSHOT_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read every persisted record.
    ///
    /// A missing key, an empty blob and a JSON `null` all yield an empty
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSnapshot`] when the blob is not a JSON array
    /// of records, or the backend error when the read itself fails.
    pub fn read_all(&self) -> Result<Vec<GeofenceRecord>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let parsed: Option<Vec<GeofenceRecord>> =
            serde_json::from_str(&raw).map_err(|e| Error::MalformedSnapshot {
                key: self.key.clone(),
                message: e.to_string(),
            })?;
        let records = parsed.unwrap_or_default();

        tracing::debug!(key = %self.key, count = records.len(), "Read geofence snapshot");
        Ok(records)
    }

    /// Replace the persisted snapshot with `records`.
    pub fn write_all(&mut self, records: &[GeofenceRecord]) -> Result<()> {
        let content = serde_json::to_string(records).map_err(Error::Serialize)?;
        self.backend.set(&self.key, &content)?;
        tracing::debug!(key = %self.key, count = records.len(), "Wrote geofence snapshot");
        Ok(())
    }
}
