//! Platform capability flag

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The platform the app runs on.
///
/// Only Android and iOS ship a native geofencing engine. Anything else is a
/// configuration error, never a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Desktop,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
            Self::Web => "web",
        }
    }

    pub fn supports_geofencing(&self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }

    /// Fail with [`Error::UnsupportedPlatform`] unless geofencing is available.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.supports_geofencing() {
            Ok(())
        } else {
            Err(Error::UnsupportedPlatform { platform: *self })
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "desktop" => Ok(Self::Desktop),
            "web" => Ok(Self::Web),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}
