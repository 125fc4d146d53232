//! Emulated native engine
//!
//! Keeps the monitored-region table in a JSON file so it outlives the
//! process the same way the OS engine outlives the app. Used when the app
//! runs on an emulated device.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use fence_meta::{FenceCommand, FenceId};
use tokio::sync::Mutex;

use crate::{Error, NativeGateway, Platform, Result};

/// File-journaled stand-in for the OS geofencing engine.
#[derive(Debug)]
pub struct EmulatedGateway {
    platform: Platform,
    path: PathBuf,
    permission_granted: bool,
    initialized: AtomicBool,
    regions: Mutex<BTreeMap<FenceId, FenceCommand>>,
}

impl EmulatedGateway {
    /// Create a gateway journaling to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] when `platform` has no
    /// geofencing engine.
    pub fn new(platform: Platform, path: impl Into<PathBuf>) -> Result<Self> {
        platform.ensure_supported()?;
        Ok(Self {
            platform,
            path: path.into(),
            permission_granted: true,
            initialized: AtomicBool::new(false),
            regions: Mutex::new(BTreeMap::new()),
        })
    }

    /// Emulate a device where the user refused location access.
    pub fn with_permission(mut self, granted: bool) -> Self {
        self.permission_granted = granted;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the regions currently monitored.
    pub async fn regions(&self) -> Vec<FenceCommand> {
        self.regions.lock().await.values().cloned().collect()
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(Error::NotInitialized);
        }
        if !self.permission_granted {
            return Err(Error::permission("background location access not granted"));
        }
        Ok(())
    }

    async fn persist(&self, regions: &BTreeMap<FenceId, FenceCommand>) -> Result<()> {
        let commands: Vec<&FenceCommand> = regions.values().collect();
        let content = serde_json::to_string_pretty(&commands)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|source| Error::Io {
                path: temp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl NativeGateway for EmulatedGateway {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn init(&self) -> Result<()> {
        let loaded: Vec<FenceCommand> = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(Error::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut regions = self.regions.lock().await;
        regions.clear();
        regions.extend(loaded.into_iter().map(|c| (c.id.clone(), c)));
        self.initialized.store(true, Ordering::Release);

        tracing::info!(
            platform = %self.platform,
            regions = regions.len(),
            "Native geofence engine initialized"
        );
        Ok(())
    }

    async fn register(&self, command: &FenceCommand) -> Result<()> {
        self.ensure_ready()?;
        if command.center().validate().is_err() {
            return Err(Error::platform(&command.id, "center out of range"));
        }
        if !command.radius.is_finite() || command.radius <= 0.0 {
            return Err(Error::platform(&command.id, "radius must be positive"));
        }

        // Only commit the table once the journal holds it
        let mut regions = self.regions.lock().await;
        let mut next = regions.clone();
        let previous = next.insert(command.id.clone(), command.clone());
        self.persist(&next).await?;
        *regions = next;

        tracing::debug!(
            id = %command.id,
            radius = command.radius,
            updated = previous.is_some(),
            "Region registered"
        );
        Ok(())
    }

    async fn deregister(&self, id: &FenceId) -> Result<()> {
        self.ensure_ready()?;

        let mut regions = self.regions.lock().await;
        let mut next = regions.clone();
        if next.remove(id).is_none() {
            tracing::debug!(id = %id, "Deregister for unknown region");
            return Ok(());
        }
        self.persist(&next).await?;
        *regions = next;

        tracing::debug!(id = %id, "Region deregistered");
        Ok(())
    }
}
