//! NativeGateway trait

use async_trait::async_trait;
use fence_meta::{FenceCommand, FenceId};

use crate::{Platform, Result};

/// Command interface to the OS geofencing engine.
///
/// `init` must complete once before any `register` or `deregister` call.
/// All calls may fail for permission or platform reasons and report those
/// failures as distinct [`crate::Error`] variants.
#[async_trait]
pub trait NativeGateway: Send + Sync {
    /// Platform this gateway talks to.
    fn platform(&self) -> Platform;

    async fn init(&self) -> Result<()>;

    /// Add a monitored region, or update it if the id is already known.
    async fn register(&self, command: &FenceCommand) -> Result<()>;

    async fn deregister(&self, id: &FenceId) -> Result<()>;
}

#[async_trait]
impl<G: NativeGateway + ?Sized> NativeGateway for std::sync::Arc<G> {
    fn platform(&self) -> Platform {
        (**self).platform()
    }

    async fn init(&self) -> Result<()> {
        (**self).init().await
    }

    async fn register(&self, command: &FenceCommand) -> Result<()> {
        (**self).register(command).await
    }

    async fn deregister(&self, id: &FenceId) -> Result<()> {
        (**self).deregister(id).await
    }
}
