//! Marker + circle overlay pairs

use std::fmt;
use std::sync::Arc;

use fence_meta::{CircleStyle, FenceId, LatLng};

use crate::{CircleHandle, CircleOptions, MapSurface, MarkerHandle, MarkerOptions, Result};

/// Callback invoked with the fence id when its marker is tapped.
///
/// The factory never holds a reference to whoever consumes the taps; the
/// listener is the only link back.
pub type TapListener = Arc<dyn Fn(&FenceId) + Send + Sync>;

/// Creates the visual representation of geofences.
#[derive(Clone)]
pub struct OverlayFactory {
    on_tap: TapListener,
}

impl fmt::Debug for OverlayFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayFactory").finish_non_exhaustive()
    }
}

impl OverlayFactory {
    pub fn new(on_tap: TapListener) -> Self {
        Self { on_tap }
    }

    /// A factory whose markers ignore taps.
    pub fn detached() -> Self {
        Self::new(Arc::new(|_: &FenceId| {}))
    }

    /// Draw a marker and a circle for the fence `id`.
    ///
    /// If the circle cannot be added the marker is taken down again, so a
    /// failed call never leaves half an overlay on the map.
    pub fn create<M: MapSurface + ?Sized>(
        &self,
        map: &mut M,
        id: &FenceId,
        center: LatLng,
        radius: f64,
        style: &CircleStyle,
    ) -> Result<OverlayHandle> {
        let mut marker = map.add_marker_sync(MarkerOptions {
            position: center,
            title: Some(id.to_string()),
        })?;

        let circle = match map.add_circle_sync(CircleOptions {
            center,
            radius,
            style: style.clone(),
        }) {
            Ok(circle) => circle,
            Err(e) => {
                marker.remove();
                tracing::warn!(id = %id, error = %e, "Circle creation failed, marker rolled back");
                return Err(e);
            }
        };

        let listener = Arc::clone(&self.on_tap);
        let tapped = id.clone();
        marker.on_tap(Box::new(move || listener(&tapped)));

        tracing::debug!(id = %id, radius, "Overlay created");
        Ok(OverlayHandle {
            id: id.clone(),
            marker,
            circle,
            removed: false,
        })
    }
}

/// Live marker + circle pair owned by one geofence entry.
pub struct OverlayHandle {
    id: FenceId,
    marker: Box<dyn MarkerHandle>,
    circle: Box<dyn CircleHandle>,
    removed: bool,
}

impl fmt::Debug for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayHandle")
            .field("id", &self.id)
            .field("removed", &self.removed)
            .finish_non_exhaustive()
    }
}

impl OverlayHandle {
    pub fn id(&self) -> &FenceId {
        &self.id
    }

    pub fn position(&self) -> LatLng {
        self.marker.position()
    }

    pub fn radius(&self) -> f64 {
        self.circle.radius()
    }

    pub fn set_radius(&mut self, radius: f64) {
        if !self.removed {
            self.circle.set_radius(radius);
        }
    }

    pub fn style(&self) -> CircleStyle {
        self.circle.style()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Take both the circle and the marker off the map. Idempotent.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.circle.remove();
        self.marker.remove();
        self.removed = true;
        tracing::debug!(id = %self.id, "Overlay removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, HeadlessMap};
    use std::sync::Mutex;

    #[test]
    fn create_draws_marker_and_circle() {
        let mut map = HeadlessMap::new();
        let center = LatLng::new(10.0, 20.0);
        let id = FenceId::from_center(center);

        let handle = OverlayFactory::detached()
            .create(&mut map, &id, center, 250.0, &CircleStyle::default())
            .unwrap();

        assert_eq!(handle.radius(), 250.0);
        assert_eq!(handle.position(), center);
        assert_eq!(map.marker_count(), 1);
        assert_eq!(map.circle_count(), 1);
        assert_eq!(map.marker_titles(), vec![id.to_string()]);
    }

    #[test]
    fn marker_tap_reports_fence_id() {
        let taps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&taps);
        let factory = OverlayFactory::new(Arc::new(move |id: &FenceId| {
            sink.lock().unwrap().push(id.clone());
        }));

        let mut map = HeadlessMap::new();
        let center = LatLng::new(1.5, -2.5);
        let id = FenceId::from_center(center);
        let _handle = factory
            .create(&mut map, &id, center, 100.0, &CircleStyle::default())
            .unwrap();

        assert!(map.tap_marker(center));
        assert_eq!(taps.lock().unwrap().as_slice(), &[id]);
    }

    #[test]
    fn circle_failure_rolls_back_marker() {
        let mut map = HeadlessMap::new();
        map.fail_circles(true);
        let center = LatLng::new(10.0, 20.0);

        let result = OverlayFactory::detached().create(
            &mut map,
            &FenceId::from_center(center),
            center,
            250.0,
            &CircleStyle::default(),
        );

        assert!(result.is_err());
        assert_eq!(map.marker_count(), 0);
        assert_eq!(map.circle_count(), 0);
    }

    #[test]
    fn marker_failure_draws_nothing() {
        let mut map = HeadlessMap::new();
        map.fail_markers(true);
        let center = LatLng::new(10.0, 20.0);

        let result = OverlayFactory::detached().create(
            &mut map,
            &FenceId::from_center(center),
            center,
            250.0,
            &CircleStyle::default(),
        );

        assert!(matches!(result, Err(Error::MarkerFailed { .. })));
        assert_eq!(map.marker_count(), 0);
        assert_eq!(map.circle_count(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut map = HeadlessMap::new();
        let center = LatLng::new(10.0, 20.0);
        let mut handle = OverlayFactory::detached()
            .create(
                &mut map,
                &FenceId::from_center(center),
                center,
                250.0,
                &CircleStyle::default(),
            )
            .unwrap();

        handle.remove();
        handle.remove();

        assert!(handle.is_removed());
        assert_eq!(map.marker_count(), 0);
        assert_eq!(map.circle_count(), 0);
    }
}
