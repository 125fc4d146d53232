//! Circle styling

use serde::{Deserialize, Serialize};

/// Visual style of a geofence circle.
///
/// Fixed when the fence is created and persisted alongside it so a reload
/// redraws the circle exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            fill_color: "#80bfff22".to_string(),
            stroke_color: "#3399ff".to_string(),
            stroke_width: 2.0,
        }
    }
}
