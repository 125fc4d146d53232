//! Settings parsed from `fence.toml`
//!
//! Every field has a default, so an empty or absent file yields a working
//! configuration.
//!
//! ```toml
//! [geofence]
//! default_radius = 250.0
//! min_radius = 1.0
//! max_radius = 100000.0
//! duplicate_policy = "reject"
//!
//! [style]
//! fill_color = "#80bfff22"
//! stroke_color = "#3399ff"
//! stroke_width = 2.0
//!
//! [native]
//! platform = "android"
//! reregister_on_reload = true
//!
//! [map]
//! element_id = "map_canvas"
//! zoom = 15.0
//! ```

use std::path::Path;

use fence_meta::{CircleStyle, DEFAULT_RADIUS, LatLng, RadiusBounds};
use fence_native::Platform;
use fence_overlay::CameraConfig;
use fence_store::SNAPSHOT_KEY;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What to do when a geofence is created at the center of an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Refuse the new geofence
    #[default]
    Reject,
    /// Last write wins: the existing geofence and its overlay are replaced
    Replace,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

fn default_min_radius() -> f64 {
    RadiusBounds::default().min
}

fn default_max_radius() -> f64 {
    RadiusBounds::default().max
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceSection {
    #[serde(default = "default_radius")]
    pub default_radius: f64,
    #[serde(default = "default_min_radius")]
    pub min_radius: f64,
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for GeofenceSection {
    fn default() -> Self {
        Self {
            default_radius: default_radius(),
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

fn default_fill_color() -> String {
    CircleStyle::default().fill_color
}

fn default_stroke_color() -> String {
    CircleStyle::default().stroke_color
}

fn default_stroke_width() -> f64 {
    CircleStyle::default().stroke_width
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSection {
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            fill_color: default_fill_color(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
        }
    }
}

fn default_platform() -> Platform {
    Platform::Android
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeSection {
    #[serde(default = "default_platform")]
    pub platform: Platform,
    /// Push every reloaded geofence to the native engine at startup
    #[serde(default = "default_true")]
    pub reregister_on_reload: bool,
}

impl Default for NativeSection {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            reregister_on_reload: true,
        }
    }
}

fn default_element_id() -> String {
    "map_canvas".to_string()
}

fn default_zoom() -> f64 {
    15.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSection {
    #[serde(default = "default_element_id")]
    pub element_id: String,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            element_id: default_element_id(),
            zoom: default_zoom(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

fn default_snapshot_key() -> String {
    SNAPSHOT_KEY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_snapshot_key")]
    pub key: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            key: default_snapshot_key(),
        }
    }
}

/// Complete geofence configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub geofence: GeofenceSection,
    #[serde(default)]
    pub style: StyleSection,
    #[serde(default)]
    pub native: NativeSection,
    #[serde(default)]
    pub map: MapSection,
    #[serde(default)]
    pub storage: StorageSection,
}

impl Settings {
    /// Parse and validate settings from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use fence_core::config::{DuplicatePolicy, Settings};
    ///
    /// let settings = Settings::parse(r#"
    /// [geofence]
    /// default_radius = 300.0
    /// duplicate_policy = "replace"
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.geofence.default_radius, 300.0);
    /// assert_eq!(settings.geofence.duplicate_policy, DuplicatePolicy::Replace);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Write settings to `path` as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = self.radius_bounds()?;
        let radius = self.geofence.default_radius;
        if !radius.is_finite() || radius < bounds.min || radius > bounds.max {
            return Err(Error::config(format!(
                "default_radius {} is outside [{}, {}]",
                radius, bounds.min, bounds.max
            )));
        }
        if !self.style.stroke_width.is_finite() || self.style.stroke_width < 0.0 {
            return Err(Error::config("stroke_width must be a non-negative number"));
        }
        if self.map.element_id.trim().is_empty() {
            return Err(Error::config("map.element_id must not be empty"));
        }
        fence_store::validate_key(&self.storage.key)?;
        Ok(())
    }

    pub fn radius_bounds(&self) -> Result<RadiusBounds> {
        RadiusBounds::new(self.geofence.min_radius, self.geofence.max_radius).map_err(Error::from)
    }

    pub fn default_style(&self) -> CircleStyle {
        CircleStyle {
            fill_color: self.style.fill_color.clone(),
            stroke_color: self.style.stroke_color.clone(),
            stroke_width: self.style.stroke_width,
        }
    }

    pub fn camera(&self) -> CameraConfig {
        CameraConfig::new(LatLng::new(self.map.latitude, self.map.longitude), self.map.zoom)
    }
}
