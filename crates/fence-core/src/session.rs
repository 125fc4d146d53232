//! Async session driver
//!
//! A [`Session`] owns a [`GeofenceSync`] and a native gateway. It feeds
//! gestures to the core and dispatches the queued native requests one at a
//! time, in the order they were issued. Because a request for an entry is
//! never sent before the ones queued ahead of it, a removal issued while a
//! registration is still in flight is always sent after that registration
//! settles, whichever way it settles.

use std::sync::Arc;

use fence_meta::{FenceId, LatLng};
use fence_native::NativeGateway;
use fence_overlay::{MapEvent, MapSurface, TapListener};
use fence_store::KeyValueStore;
use tokio::sync::mpsc;

use crate::native::{NativeOp, NativeOutcome, Resolution, ResolutionKind, Ticket};
use crate::{Dispatch, Error, GeofenceSync, GeofenceView, Gesture, Result, Settings};

/// Summary of [`Session::start`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    /// Geofences redrawn from storage
    pub loaded: usize,
    /// Geofences confirmed with the native engine
    pub registered: usize,
    /// Geofences the native engine refused
    pub failed: usize,
}

/// One app session: a map, a store and a native engine.
pub struct Session<M, S, G> {
    sync: GeofenceSync<M, S>,
    gateway: G,
    reregister_on_reload: bool,
    gestures_tx: mpsc::UnboundedSender<Gesture>,
    gestures_rx: mpsc::UnboundedReceiver<Gesture>,
    started: bool,
}

impl<M: MapSurface, S: KeyValueStore, G: NativeGateway> Session<M, S, G> {
    /// Build a session. Marker taps are routed into the session's gesture
    /// queue; process them with [`pump`](Self::pump).
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or name a different
    /// platform than the gateway serves.
    pub fn new(settings: &Settings, map: M, store: S, gateway: G) -> Result<Self> {
        if settings.native.platform != gateway.platform() {
            return Err(Error::config(format!(
                "settings target {} but the native gateway serves {}",
                settings.native.platform,
                gateway.platform()
            )));
        }

        let (gestures_tx, gestures_rx) = mpsc::unbounded_channel();
        let tap_tx = gestures_tx.clone();
        let on_tap: TapListener = Arc::new(move |id: &FenceId| {
            if tap_tx
                .send(Gesture::Map(MapEvent::MarkerTap(id.clone())))
                .is_err()
            {
                tracing::trace!(id = %id, "Marker tap dropped, session gone");
            }
        });

        Ok(Self {
            sync: GeofenceSync::new(settings, map, store, on_tap)?,
            gateway,
            reregister_on_reload: settings.native.reregister_on_reload,
            gestures_tx,
            gestures_rx,
            started: false,
        })
    }

    pub fn sync(&self) -> &GeofenceSync<M, S> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut GeofenceSync<M, S> {
        &mut self.sync
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Sender for gestures coming from the map or the edit panel.
    pub fn gestures(&self) -> mpsc::UnboundedSender<Gesture> {
        self.gestures_tx.clone()
    }

    /// Initialize the native engine, reload the stored geofences and, if
    /// configured, register them again.
    ///
    /// # Errors
    ///
    /// Fails if the platform has no geofencing engine, if the engine cannot
    /// be initialized, or if the store cannot be read.
    pub async fn start(&mut self) -> Result<StartReport> {
        self.gateway.platform().ensure_supported()?;
        self.gateway.init().await?;
        self.started = true;

        let loaded = self.sync.reload_from_store()?;
        if self.reregister_on_reload {
            self.sync.reregister_all();
        }

        let mut report = StartReport {
            loaded,
            ..StartReport::default()
        };
        for resolution in self.flush().await {
            if resolution.is_failure() {
                report.failed += 1;
            } else if matches!(resolution.kind, ResolutionKind::Registered) {
                report.registered += 1;
            }
        }

        tracing::info!(
            platform = %self.gateway.platform(),
            loaded = report.loaded,
            registered = report.registered,
            failed = report.failed,
            "Session started"
        );
        Ok(report)
    }

    /// Dispatch queued native requests in order and apply their outcomes.
    ///
    /// Does nothing before [`start`](Self::start); requests stay queued
    /// until the engine is initialized.
    pub async fn flush(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        if !self.started {
            if self.sync.pending_requests() > 0 {
                tracing::debug!(
                    pending = self.sync.pending_requests(),
                    "Native engine not initialized, requests held"
                );
            }
            return resolutions;
        }

        while let Some(request) = self.sync.next_request() {
            let result = match &request.op {
                NativeOp::Register(command) => self.gateway.register(command).await,
                NativeOp::Deregister => self.gateway.deregister(&request.id).await,
            };
            if let Err(err) = &result {
                tracing::debug!(
                    id = %request.id,
                    transient = err.is_transient(),
                    "Native request failed"
                );
            }
            let outcome = NativeOutcome::new(request, result);
            resolutions.push(self.sync.apply_native_outcome(outcome));
        }
        resolutions
    }

    /// Handle one gesture and flush the native requests it produced.
    pub async fn dispatch(&mut self, gesture: Gesture) -> Dispatch {
        let dispatch = self.sync.handle(gesture);
        self.flush().await;
        dispatch
    }

    /// Handle every gesture queued so far, marker taps included.
    pub async fn pump(&mut self) -> Vec<Dispatch> {
        let mut dispatched = Vec::new();
        while let Ok(gesture) = self.gestures_rx.try_recv() {
            dispatched.push(self.dispatch(gesture).await);
        }
        dispatched
    }

    /// Create a geofence and wait for its native registration.
    ///
    /// A failed registration does not fail creation; the returned view shows
    /// the entry as failed and a notice is queued.
    pub async fn create_geofence(&mut self, center: LatLng) -> Result<GeofenceView> {
        let view = self.sync.create_geofence(center)?;
        self.flush().await;
        Ok(self
            .sync
            .get(&view.id)
            .map(|entry| entry.view())
            .unwrap_or(view))
    }

    pub fn select_geofence(&mut self, id: &FenceId) -> Option<f64> {
        self.sync.select_geofence(id)
    }

    pub fn clear_selection(&mut self) {
        self.sync.clear_selection();
    }

    pub fn resize_selected(&mut self, radius: f64) -> Result<Option<f64>> {
        self.sync.resize_selected(radius)
    }

    /// Push the selected radius to the native engine and wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Native`] if the engine refused the update.
    pub async fn commit_selected_radius(&mut self) -> Result<Option<Ticket>> {
        let Some(ticket) = self.sync.commit_selected_radius() else {
            return Ok(None);
        };
        for resolution in self.flush().await {
            if resolution.ticket == ticket
                && let ResolutionKind::RegistrationFailed(e) = resolution.kind
            {
                return Err(Error::Native(e));
            }
        }
        Ok(Some(ticket))
    }

    /// Remove the selected geofence and wait for the native engine.
    ///
    /// Returns the removed id, or `None` when nothing was selected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Native`] if the session is not started or if
    /// deregistration failed. The geofence, its overlay and its record are
    /// all still present in that case.
    pub async fn remove_selected(&mut self) -> Result<Option<FenceId>> {
        if !self.started {
            return Err(Error::Native(fence_native::Error::NotInitialized));
        }
        let Some(ticket) = self.sync.remove_selected() else {
            return Ok(None);
        };

        for resolution in self.flush().await {
            if resolution.ticket != ticket {
                continue;
            }
            return match resolution.kind {
                ResolutionKind::Removed => Ok(Some(resolution.id)),
                ResolutionKind::RemovalFailed(e) => Err(Error::Native(e)),
                _ => Ok(None),
            };
        }
        Ok(None)
    }
}
