//! Error types for fence-meta

/// Result type for fence-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating geofence schema values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Latitude or longitude outside the WGS84 range, or not a number
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Radius that is zero, negative or not finite
    #[error("Invalid radius: {value}")]
    InvalidRadius { value: f64 },

    /// Radius bounds where min exceeds max or either bound is not positive
    #[error("Invalid radius bounds: min {min}, max {max}")]
    InvalidBounds { min: f64, max: f64 },
}
