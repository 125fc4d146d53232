//! GeofenceSync implementation
//!
//! The GeofenceSync owns the live geofence collection and the selection, and
//! keeps overlays, the persisted snapshot and native registrations in step
//! with them.

use std::collections::{HashSet, VecDeque};

use fence_meta::{CircleStyle, FenceId, GeofenceRecord, LatLng, RadiusBounds};
use fence_overlay::{MapEvent, MapSurface, OverlayFactory, TapListener};
use fence_store::{KeyValueStore, RecordStore};
use tokio::sync::watch;

use crate::config::{DuplicatePolicy, Settings};
use crate::gesture::{Dispatch, Gesture};
use crate::model::{GeofenceEntry, GeofenceView, NativeStatus};
use crate::native::{NativeOp, NativeOutcome, NativeRequest, Resolution, ResolutionKind, Ticket};
use crate::notice::Notice;
use crate::panel::EditPanel;
use crate::{Error, Result};

use super::check::{ConsistencyReport, DriftItem};

/// Synchronization core for one map.
///
/// All methods are synchronous. Calls to the native engine are queued as
/// [`NativeRequest`]s (see [`next_request`](Self::next_request)) and their
/// results are fed back through
/// [`apply_native_outcome`](Self::apply_native_outcome).
///
/// Every mutating operation writes the full snapshot. A failed write leaves
/// the in-memory collection authoritative, raises a
/// [`Notice::PersistenceFailure`] and is retried by the next mutation.
pub struct GeofenceSync<M, S> {
    map: M,
    records: RecordStore<S>,
    factory: OverlayFactory,
    default_radius: f64,
    default_style: CircleStyle,
    bounds: RadiusBounds,
    duplicate_policy: DuplicatePolicy,
    entries: Vec<GeofenceEntry>,
    /// Stored records whose overlay could not be drawn at reload
    unrestored: Vec<GeofenceRecord>,
    selected: Option<FenceId>,
    panel: watch::Sender<EditPanel>,
    outbox: VecDeque<NativeRequest>,
    next_ticket: u64,
    notices: Vec<Notice>,
    snapshot_dirty: bool,
}

impl<M: MapSurface, S: KeyValueStore> GeofenceSync<M, S> {
    /// Create a core drawing on `map` and persisting to `store`.
    ///
    /// `on_marker_tap` receives the fence id whenever one of its markers is
    /// tapped; route it back into [`handle`](Self::handle) as a
    /// [`MapEvent::MarkerTap`].
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn new(settings: &Settings, map: M, store: S, on_marker_tap: TapListener) -> Result<Self> {
        settings.validate()?;
        let (panel, _) = watch::channel(EditPanel::hidden());

        Ok(Self {
            map,
            records: RecordStore::new(store).with_key(settings.storage.key.clone()),
            factory: OverlayFactory::new(on_marker_tap),
            default_radius: settings.geofence.default_radius,
            default_style: settings.default_style(),
            bounds: settings.radius_bounds()?,
            duplicate_policy: settings.geofence.duplicate_policy,
            entries: Vec::new(),
            unrestored: Vec::new(),
            selected: None,
            panel,
            outbox: VecDeque::new(),
            next_ticket: 0,
            notices: Vec::new(),
            snapshot_dirty: false,
        })
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Live entries in creation order
    pub fn entries(&self) -> &[GeofenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &FenceId) -> Option<&GeofenceEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn views(&self) -> Vec<GeofenceView> {
        self.entries.iter().map(GeofenceEntry::view).collect()
    }

    pub fn selected(&self) -> Option<&FenceId> {
        self.selected.as_ref()
    }

    pub fn panel(&self) -> EditPanel {
        self.panel.borrow().clone()
    }

    /// Subscribe to edit panel changes.
    pub fn subscribe_panel(&self) -> watch::Receiver<EditPanel> {
        self.panel.subscribe()
    }

    /// Records held back at reload because their overlay failed
    pub fn unrestored(&self) -> &[GeofenceRecord] {
        &self.unrestored
    }

    /// Whether the last snapshot write failed
    pub fn snapshot_dirty(&self) -> bool {
        self.snapshot_dirty
    }

    /// Snapshot the collection as it should be persisted.
    pub fn snapshot(&self) -> Vec<GeofenceRecord> {
        self.entries
            .iter()
            .map(GeofenceEntry::to_record)
            .chain(self.unrestored.iter().cloned())
            .collect()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.records
    }

    /// Drain pending user-facing warnings.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Number of native requests waiting for dispatch
    pub fn pending_requests(&self) -> usize {
        self.outbox.len()
    }

    /// Pop the oldest native request. Requests must be dispatched in order.
    pub fn next_request(&mut self) -> Option<NativeRequest> {
        self.outbox.pop_front()
    }

    // ---------------------------------------------------------------------
    // Gestures
    // ---------------------------------------------------------------------

    /// Route a gesture to the matching operation.
    ///
    /// Errors are logged and reported as [`Dispatch::Rejected`]; nothing is
    /// propagated to the UI.
    pub fn handle(&mut self, gesture: Gesture) -> Dispatch {
        match gesture {
            Gesture::Map(MapEvent::Ready) => Dispatch::Ignored,
            Gesture::Map(MapEvent::LongPress(center)) => match self.create_geofence(center) {
                Ok(view) => Dispatch::Created(view),
                Err(e) => reject(e),
            },
            Gesture::Map(MapEvent::Tap(_)) | Gesture::Map(MapEvent::Drag) => {
                self.clear_selection();
                Dispatch::SelectionCleared
            }
            Gesture::Map(MapEvent::MarkerTap(id)) => match self.select_geofence(&id) {
                Some(radius) => Dispatch::Selected { id, radius },
                None => Dispatch::Ignored,
            },
            Gesture::RadiusChanged(radius) => match self.resize_selected(radius) {
                Ok(Some(applied)) => match self.selected.clone() {
                    Some(id) => Dispatch::Resized {
                        id,
                        radius: applied,
                    },
                    None => Dispatch::Ignored,
                },
                Ok(None) => Dispatch::Ignored,
                Err(e) => reject(e),
            },
            Gesture::RadiusCommitted => match self.commit_selected_radius() {
                Some(ticket) => Dispatch::Queued(ticket),
                None => Dispatch::Ignored,
            },
            Gesture::RemoveRequested => match self.remove_selected() {
                Some(ticket) => Dispatch::Queued(ticket),
                None => Dispatch::Ignored,
            },
        }
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Create a geofence at `center` with the default radius and style.
    ///
    /// The overlay is drawn and the snapshot written immediately; the
    /// native registration is queued and does not block creation.
    ///
    /// # Errors
    ///
    /// - [`Error::Meta`] if `center` is not a valid coordinate
    /// - [`Error::DuplicateFence`] if a fence exists at `center` and the
    ///   duplicate policy is `Reject`
    /// - [`Error::FenceBusy`] if the fence at `center` is being removed
    /// - [`Error::Overlay`] if the map refused the overlay; nothing is kept
    pub fn create_geofence(&mut self, center: LatLng) -> Result<GeofenceView> {
        center.validate()?;
        let id = FenceId::from_center(center);

        let existing = self.position(&id);
        if let Some(index) = existing {
            if self.entries[index].native.is_removing() {
                return Err(Error::FenceBusy { id });
            }
            if self.duplicate_policy == DuplicatePolicy::Reject {
                tracing::warn!(id = %id, "Geofence already exists at this center");
                return Err(Error::DuplicateFence { id });
            }
        }

        let overlay = self.factory.create(
            &mut self.map,
            &id,
            center,
            self.default_radius,
            &self.default_style,
        )?;

        let mut entry = GeofenceEntry {
            id: id.clone(),
            center,
            radius: self.default_radius,
            style: self.default_style.clone(),
            overlay: Some(overlay),
            native: NativeStatus::Pending,
            generation: None,
        };
        let ticket = self.enqueue(&id, NativeOp::Register(entry.to_command()));
        entry.generation = Some(ticket);

        match existing {
            Some(index) => {
                // Last write wins, but the replaced overlay is taken down
                let mut replaced = std::mem::replace(&mut self.entries[index], entry);
                if let Some(overlay) = replaced.overlay.as_mut() {
                    overlay.remove();
                }
                tracing::info!(id = %id, "Replaced existing geofence");
                if self.selected.as_ref() == Some(&id) {
                    self.clear_selection();
                }
            }
            None => self.entries.push(entry),
        }

        tracing::info!(id = %id, radius = self.default_radius, %ticket, "Geofence created");
        self.persist();

        self.get(&id)
            .map(GeofenceEntry::view)
            .ok_or(Error::NotFound { id })
    }

    /// Select the fence `id` and show the edit panel.
    ///
    /// Returns the radius to show. An unknown id is a desync between the map
    /// and the collection; it is logged and ignored.
    pub fn select_geofence(&mut self, id: &FenceId) -> Option<f64> {
        let Some(entry) = self.get(id) else {
            tracing::warn!(id = %id, "Selected geofence is not in the live collection");
            return None;
        };
        if entry.native.is_removing() {
            tracing::debug!(id = %id, "Ignoring selection of geofence being removed");
            return None;
        }

        let radius = entry.overlay.as_ref().map_or(entry.radius, |o| o.radius());
        self.selected = Some(id.clone());
        self.panel.send_replace(EditPanel::shown(id.clone(), radius));
        tracing::debug!(id = %id, radius, "Geofence selected");
        Some(radius)
    }

    /// Clear the selection and hide the edit panel.
    pub fn clear_selection(&mut self) {
        if let Some(id) = self.selected.take() {
            tracing::debug!(id = %id, "Selection cleared");
        }
        self.panel.send_replace(EditPanel::hidden());
    }

    /// Resize the selected fence.
    ///
    /// The circle, the entry and the snapshot update immediately. The native
    /// engine is not told until [`commit_selected_radius`](Self::commit_selected_radius).
    ///
    /// Returns the applied radius after clamping, or `None` when nothing is
    /// selected.
    ///
    /// # Errors
    ///
    /// - [`Error::Meta`] for a zero, negative or non-finite radius
    /// - [`Error::NotFound`] if the selection points at a vanished entry
    /// - [`Error::FenceBusy`] if the selected fence is being removed
    pub fn resize_selected(&mut self, radius: f64) -> Result<Option<f64>> {
        let Some(index) = self.selected_position()? else {
            tracing::debug!("Resize without selection ignored");
            return Ok(None);
        };

        let applied = self.bounds.apply(radius)?;
        let entry = &mut self.entries[index];
        if entry.native.is_removing() {
            return Err(Error::FenceBusy {
                id: entry.id.clone(),
            });
        }

        if let Some(overlay) = entry.overlay.as_mut() {
            overlay.set_radius(applied);
        }
        entry.radius = applied;
        let id = entry.id.clone();

        if applied != radius {
            tracing::debug!(id = %id, requested = radius, applied, "Radius clamped");
        }
        self.panel.send_replace(EditPanel::shown(id, applied));
        self.persist();
        Ok(Some(applied))
    }

    /// Push the selected fence's final radius to the native engine.
    ///
    /// Called once when the radius gesture ends.
    pub fn commit_selected_radius(&mut self) -> Option<Ticket> {
        let index = match self.selected_position() {
            Ok(Some(index)) => index,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Radius commit ignored");
                return None;
            }
        };
        if self.entries[index].native.is_removing() {
            return None;
        }

        let command = self.entries[index].to_command();
        let id = command.id.clone();
        let ticket = self.enqueue(&id, NativeOp::Register(command));

        let entry = &mut self.entries[index];
        entry.native = NativeStatus::Pending;
        entry.generation = Some(ticket);
        tracing::debug!(id = %id, radius = entry.radius, %ticket, "Radius committed");
        Some(ticket)
    }

    /// Ask the native engine to stop monitoring the selected fence.
    ///
    /// The overlay, entry and record stay until deregistration succeeds, so a
    /// fence the engine still monitors never disappears from the UI.
    pub fn remove_selected(&mut self) -> Option<Ticket> {
        let index = match self.selected_position() {
            Ok(Some(index)) => index,
            Ok(None) => {
                tracing::debug!("Remove without selection ignored");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remove ignored");
                return None;
            }
        };
        if self.entries[index].native.is_removing() {
            tracing::debug!(id = %self.entries[index].id, "Removal already in flight");
            return None;
        }

        let id = self.entries[index].id.clone();
        let ticket = self.enqueue(&id, NativeOp::Deregister);

        let entry = &mut self.entries[index];
        let previous = std::mem::replace(&mut entry.native, NativeStatus::Pending);
        entry.native = NativeStatus::Removing {
            previous: Box::new(previous),
        };
        entry.generation = Some(ticket);
        tracing::info!(id = %id, %ticket, "Removal requested");
        Some(ticket)
    }

    /// Rebuild the collection from the persisted snapshot.
    ///
    /// Missing or empty storage yields an empty collection. A malformed
    /// snapshot is ignored with a [`Notice::MalformedSnapshot`]. Each record
    /// is redrawn with its persisted radius and style.
    ///
    /// Returns the number of live entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself cannot be read.
    pub fn reload_from_store(&mut self) -> Result<usize> {
        self.teardown();

        let records = match self.records.read_all() {
            Ok(records) => records,
            Err(fence_store::Error::MalformedSnapshot { message, .. }) => {
                tracing::warn!(%message, "Stored snapshot is malformed, starting empty");
                self.notices.push(Notice::MalformedSnapshot { message });
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut seen = HashSet::new();
        for record in records {
            if let Err(e) = record.validate() {
                tracing::warn!(id = %record.id, error = %e, "Skipping invalid stored geofence");
                self.notices.push(Notice::RecordSkipped {
                    id: record.id,
                    reason: e.to_string(),
                });
                continue;
            }
            if record.id != FenceId::from_center(record.center()) {
                tracing::warn!(id = %record.id, "Skipping stored geofence with a foreign id");
                self.notices.push(Notice::RecordSkipped {
                    id: record.id,
                    reason: "id does not match center".to_string(),
                });
                continue;
            }
            if !seen.insert(record.id.clone()) {
                tracing::warn!(id = %record.id, "Skipping duplicate stored geofence");
                self.notices.push(Notice::RecordSkipped {
                    id: record.id,
                    reason: "duplicate id".to_string(),
                });
                continue;
            }
            match self.restore(&record) {
                Ok(entry) => self.entries.push(entry),
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Could not redraw stored geofence");
                    self.notices.push(Notice::OverlayNotRestored {
                        id: record.id.clone(),
                        reason: e.to_string(),
                    });
                    self.unrestored.push(record);
                }
            }
        }

        tracing::info!(
            loaded = self.entries.len(),
            unrestored = self.unrestored.len(),
            "Geofences reloaded"
        );
        Ok(self.entries.len())
    }

    /// Retry drawing records held back at reload.
    ///
    /// Returns the number of records that were restored.
    pub fn restore_overlays(&mut self) -> usize {
        let pending = std::mem::take(&mut self.unrestored);
        let mut restored = 0;
        for record in pending {
            if self.position(&record.id).is_some() {
                continue;
            }
            match self.restore(&record) {
                Ok(entry) => {
                    self.entries.push(entry);
                    restored += 1;
                }
                Err(e) => {
                    tracing::debug!(id = %record.id, error = %e, "Overlay still not restorable");
                    self.unrestored.push(record);
                }
            }
        }
        restored
    }

    /// Queue a registration for every live entry.
    pub fn reregister_all(&mut self) -> Vec<Ticket> {
        let mut tickets = Vec::with_capacity(self.entries.len());
        for index in 0..self.entries.len() {
            if self.entries[index].native.is_removing() {
                continue;
            }
            let command = self.entries[index].to_command();
            let id = command.id.clone();
            let ticket = self.enqueue(&id, NativeOp::Register(command));
            let entry = &mut self.entries[index];
            entry.native = NativeStatus::Pending;
            entry.generation = Some(ticket);
            tickets.push(ticket);
        }
        tracing::debug!(count = tickets.len(), "Queued re-registration");
        tickets
    }

    /// Apply the result of a dispatched native request.
    ///
    /// An outcome older than the entry's latest request is stale and changes
    /// nothing, except that a settled registration updates the status a
    /// pending removal would roll back to.
    pub fn apply_native_outcome(&mut self, outcome: NativeOutcome) -> Resolution {
        let NativeOutcome {
            ticket,
            id,
            op,
            result,
        } = outcome;

        let Some(index) = self.position(&id) else {
            tracing::debug!(id = %id, %ticket, "Native outcome for unknown geofence");
            return Resolution {
                ticket,
                id,
                kind: ResolutionKind::Orphaned,
            };
        };

        let entry = &mut self.entries[index];
        if entry.generation.is_some_and(|latest| ticket < latest) {
            if let (NativeOp::Register(_), NativeStatus::Removing { previous }) =
                (&op, &mut entry.native)
            {
                **previous = match &result {
                    Ok(()) => NativeStatus::Registered,
                    Err(e) => NativeStatus::Failed {
                        reason: e.to_string(),
                    },
                };
            }
            tracing::debug!(id = %id, %ticket, "Stale native outcome ignored");
            return Resolution {
                ticket,
                id,
                kind: ResolutionKind::Stale,
            };
        }

        let kind = match (op, result) {
            (NativeOp::Register(_), Ok(())) => {
                entry.native = NativeStatus::Registered;
                tracing::debug!(id = %id, %ticket, "Geofence registered natively");
                ResolutionKind::Registered
            }
            (NativeOp::Register(_), Err(e)) => {
                entry.native = NativeStatus::Failed {
                    reason: e.to_string(),
                };
                tracing::warn!(id = %id, %ticket, error = %e, "Native registration failed");
                self.notices.push(Notice::NativeFailure {
                    id: id.clone(),
                    message: e.to_string(),
                });
                ResolutionKind::RegistrationFailed(e)
            }
            (NativeOp::Deregister, Ok(())) => {
                let mut removed = self.entries.remove(index);
                if let Some(overlay) = removed.overlay.as_mut() {
                    overlay.remove();
                }
                if self.selected.as_ref() == Some(&id) {
                    self.clear_selection();
                }
                tracing::info!(id = %id, %ticket, "Geofence removed");
                self.persist();
                ResolutionKind::Removed
            }
            (NativeOp::Deregister, Err(e)) => {
                let restored = match std::mem::replace(&mut entry.native, NativeStatus::Pending) {
                    NativeStatus::Removing { previous } => *previous,
                    other => other,
                };
                entry.native = restored;
                tracing::warn!(id = %id, %ticket, error = %e, "Native deregistration failed, geofence kept");
                self.notices.push(Notice::NativeFailure {
                    id: id.clone(),
                    message: e.to_string(),
                });
                ResolutionKind::RemovalFailed(e)
            }
        };

        Resolution { ticket, id, kind }
    }

    /// Compare the live collection with the persisted snapshot and the map.
    pub fn check(&self) -> ConsistencyReport {
        let stored = match self.records.read_all() {
            Ok(records) => records,
            Err(e) => return ConsistencyReport::broken(format!("Failed to read snapshot: {}", e)),
        };

        let mut drifted = Vec::new();
        let mut missing = Vec::new();

        for entry in &self.entries {
            if !entry.has_live_overlay() {
                missing.push(DriftItem::new(&entry.id, "Overlay not on the map"));
            } else if let Some(overlay) = entry.overlay.as_ref()
                && overlay.radius() != entry.radius
            {
                drifted.push(DriftItem::new(
                    &entry.id,
                    format!(
                        "Circle radius {} differs from entry radius {}",
                        overlay.radius(),
                        entry.radius
                    ),
                ));
            }

            match stored.iter().find(|r| r.id == entry.id) {
                None => missing.push(DriftItem::new(&entry.id, "Record not persisted")),
                Some(record) if record != &entry.to_record() => {
                    drifted.push(DriftItem::new(&entry.id, "Persisted record differs"));
                }
                Some(_) => {}
            }

            if let NativeStatus::Failed { reason } = &entry.native {
                drifted.push(DriftItem::new(
                    &entry.id,
                    format!("Not monitored natively: {}", reason),
                ));
            }
        }

        for record in &self.unrestored {
            missing.push(DriftItem::new(&record.id, "Overlay not recreated after reload"));
        }

        for record in &stored {
            let live = self.position(&record.id).is_some();
            let held = self.unrestored.iter().any(|r| r.id == record.id);
            if !live && !held {
                drifted.push(DriftItem::new(&record.id, "Persisted but not loaded"));
            }
        }

        let mut report = ConsistencyReport::healthy()
            .merge(ConsistencyReport::with_missing(missing))
            .merge(ConsistencyReport::with_drifted(drifted));
        if self.snapshot_dirty {
            report
                .messages
                .push("Last snapshot write failed; it will be retried".to_string());
        }
        report
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn position(&self, id: &FenceId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Index of the selected entry.
    ///
    /// A selection pointing at a vanished entry is cleared and reported.
    fn selected_position(&mut self) -> Result<Option<usize>> {
        let Some(id) = self.selected.clone() else {
            return Ok(None);
        };
        match self.position(&id) {
            Some(index) => Ok(Some(index)),
            None => {
                tracing::warn!(id = %id, "Selection points at a missing geofence");
                self.clear_selection();
                Err(Error::NotFound { id })
            }
        }
    }

    fn enqueue(&mut self, id: &FenceId, op: NativeOp) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket::from_value(self.next_ticket);
        self.outbox.push_back(NativeRequest {
            ticket,
            id: id.clone(),
            op,
        });
        ticket
    }

    fn restore(&mut self, record: &GeofenceRecord) -> Result<GeofenceEntry> {
        let center = record.center();
        let overlay =
            self.factory
                .create(&mut self.map, &record.id, center, record.radius, &record.style)?;
        Ok(GeofenceEntry {
            id: record.id.clone(),
            center,
            radius: record.radius,
            style: record.style.clone(),
            overlay: Some(overlay),
            native: NativeStatus::Unverified,
            generation: None,
        })
    }

    fn teardown(&mut self) {
        for entry in &mut self.entries {
            if let Some(overlay) = entry.overlay.as_mut() {
                overlay.remove();
            }
        }
        self.entries.clear();
        self.unrestored.clear();
        self.outbox.clear();
        self.clear_selection();
    }

    fn persist(&mut self) {
        let records = self.snapshot();
        match self.records.write_all(&records) {
            Ok(()) => {
                if self.snapshot_dirty {
                    tracing::info!(count = records.len(), "Snapshot write recovered");
                    self.notices.push(Notice::PersistenceRecovered);
                }
                self.snapshot_dirty = false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot write failed, will retry on next change");
                self.snapshot_dirty = true;
                self.notices.push(Notice::PersistenceFailure {
                    message: e.to_string(),
                });
            }
        }
    }
}

fn reject(error: Error) -> Dispatch {
    tracing::warn!(error = %error, "Gesture rejected");
    Dispatch::Rejected {
        reason: error.to_string(),
    }
}
