//! Sample geofence records.

use fence_meta::{CircleStyle, FenceId, GeofenceRecord, LatLng};

/// A valid record centered at (`latitude`, `longitude`).
pub fn sample_record(latitude: f64, longitude: f64, radius: f64) -> GeofenceRecord {
    let center = LatLng::new(latitude, longitude);
    GeofenceRecord::new(
        FenceId::from_center(center),
        center,
        radius,
        CircleStyle::default(),
    )
}

/// `count` distinct records along a diagonal, each with its own radius.
pub fn sample_records(count: usize) -> Vec<GeofenceRecord> {
    (0..count)
        .map(|i| {
            let step = i as f64;
            sample_record(10.0 + step * 0.5, 20.0 - step * 0.25, 100.0 + step * 50.0)
        })
        .collect()
}

/// The stored snapshot text for `records`.
pub fn snapshot_json(records: &[GeofenceRecord]) -> String {
    serde_json::to_string(records).unwrap()
}
