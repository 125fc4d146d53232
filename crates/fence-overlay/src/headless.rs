//! In-memory map engine
//!
//! Renders nothing. Keeps the scene graph of markers and circles so
//! overlays can be inspected, and lets the caller play gestures into the
//! event stream.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use fence_meta::{CircleStyle, LatLng};
use tokio::sync::mpsc;

use crate::{
    CameraConfig, CircleHandle, CircleOptions, Error, MapEngine, MapEvent, MapSurface,
    MarkerHandle, MarkerOptions, Result,
};

type Listener = Arc<dyn Fn() + Send + Sync>;

struct MarkerObject {
    position: LatLng,
    title: Option<String>,
    listeners: Vec<Listener>,
}

/// Plain view of a circle currently on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSnapshot {
    pub center: LatLng,
    pub radius: f64,
    pub style: CircleStyle,
}

#[derive(Default)]
struct Scene {
    next_object: u64,
    markers: BTreeMap<u64, MarkerObject>,
    circles: BTreeMap<u64, CircleSnapshot>,
    fail_markers: bool,
    fail_circles: bool,
}

impl Scene {
    fn allocate(&mut self) -> u64 {
        self.next_object += 1;
        self.next_object
    }
}

fn lock(scene: &Mutex<Scene>) -> MutexGuard<'_, Scene> {
    // A panic while holding the lock cannot leave the scene half-updated
    scene.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Headless map surface.
///
/// Clones share one scene, so a test can keep a clone to inspect what the
/// owner of the other clone has drawn.
#[derive(Clone)]
pub struct HeadlessMap {
    camera: Option<CameraConfig>,
    scene: Arc<Mutex<Scene>>,
    events: mpsc::UnboundedSender<MapEvent>,
    receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<MapEvent>>>>,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessMap {
    pub fn new() -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        Self {
            camera: None,
            scene: Arc::new(Mutex::new(Scene::default())),
            events,
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    pub fn camera(&self) -> Option<CameraConfig> {
        self.camera
    }

    /// Take the event stream. Only the first caller gets it.
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<MapEvent>> {
        self.receiver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Make every subsequent marker creation fail.
    pub fn fail_markers(&self, fail: bool) {
        lock(&self.scene).fail_markers = fail;
    }

    /// Make every subsequent circle creation fail.
    pub fn fail_circles(&self, fail: bool) {
        lock(&self.scene).fail_circles = fail;
    }

    pub fn marker_count(&self) -> usize {
        lock(&self.scene).markers.len()
    }

    pub fn circle_count(&self) -> usize {
        lock(&self.scene).circles.len()
    }

    pub fn markers(&self) -> Vec<LatLng> {
        lock(&self.scene).markers.values().map(|m| m.position).collect()
    }

    pub fn marker_titles(&self) -> Vec<String> {
        lock(&self.scene)
            .markers
            .values()
            .filter_map(|m| m.title.clone())
            .collect()
    }

    pub fn circles(&self) -> Vec<CircleSnapshot> {
        lock(&self.scene).circles.values().cloned().collect()
    }

    pub fn long_press(&self, position: LatLng) {
        self.emit(MapEvent::LongPress(position));
    }

    pub fn tap(&self, position: LatLng) {
        self.emit(MapEvent::Tap(position));
    }

    pub fn drag(&self) {
        self.emit(MapEvent::Drag);
    }

    /// Tap the first marker at `position`, running its listeners.
    ///
    /// Returns `false` when no marker sits there.
    pub fn tap_marker(&self, position: LatLng) -> bool {
        let listeners: Vec<Listener> = {
            let scene = lock(&self.scene);
            match scene.markers.values().find(|m| m.position == position) {
                Some(marker) => marker.listeners.clone(),
                None => return false,
            }
        };
        // Listeners run outside the lock so they may touch the map
        for listener in listeners {
            listener();
        }
        true
    }

    fn emit(&self, event: MapEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Map event dropped, no subscriber");
        }
    }
}

impl MapSurface for HeadlessMap {
    fn add_marker_sync(&mut self, options: MarkerOptions) -> Result<Box<dyn MarkerHandle>> {
        let mut scene = lock(&self.scene);
        if scene.fail_markers {
            return Err(Error::MarkerFailed {
                message: "headless map configured to reject markers".to_string(),
            });
        }
        let object = scene.allocate();
        scene.markers.insert(
            object,
            MarkerObject {
                position: options.position,
                title: options.title,
                listeners: Vec::new(),
            },
        );
        Ok(Box::new(HeadlessMarker {
            object,
            position: options.position,
            scene: Arc::clone(&self.scene),
        }))
    }

    fn add_circle_sync(&mut self, options: CircleOptions) -> Result<Box<dyn CircleHandle>> {
        let mut scene = lock(&self.scene);
        if scene.fail_circles {
            return Err(Error::CircleFailed {
                message: "headless map configured to reject circles".to_string(),
            });
        }
        let object = scene.allocate();
        scene.circles.insert(
            object,
            CircleSnapshot {
                center: options.center,
                radius: options.radius,
                style: options.style.clone(),
            },
        );
        Ok(Box::new(HeadlessCircle {
            object,
            radius: options.radius,
            style: options.style,
            scene: Arc::clone(&self.scene),
        }))
    }
}

struct HeadlessMarker {
    object: u64,
    position: LatLng,
    scene: Arc<Mutex<Scene>>,
}

impl MarkerHandle for HeadlessMarker {
    fn position(&self) -> LatLng {
        self.position
    }

    fn on_tap(&mut self, listener: Box<dyn Fn() + Send + Sync>) {
        if let Some(marker) = lock(&self.scene).markers.get_mut(&self.object) {
            marker.listeners.push(Arc::from(listener));
        }
    }

    fn remove(&mut self) {
        lock(&self.scene).markers.remove(&self.object);
    }
}

struct HeadlessCircle {
    object: u64,
    radius: f64,
    style: CircleStyle,
    scene: Arc<Mutex<Scene>>,
}

impl CircleHandle for HeadlessCircle {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        if let Some(circle) = lock(&self.scene).circles.get_mut(&self.object) {
            circle.radius = radius;
        }
    }

    fn style(&self) -> CircleStyle {
        self.style.clone()
    }

    fn remove(&mut self) {
        lock(&self.scene).circles.remove(&self.object);
    }
}

/// Engine producing [`HeadlessMap`]s.
#[derive(Debug, Default, Clone)]
pub struct HeadlessEngine;

impl MapEngine for HeadlessEngine {
    type Surface = HeadlessMap;

    fn create_map(&self, element_id: &str, camera: CameraConfig) -> Result<HeadlessMap> {
        if element_id.trim().is_empty() {
            return Err(Error::ElementNotFound {
                element_id: element_id.to_string(),
            });
        }
        let mut map = HeadlessMap::new();
        map.camera = Some(camera);
        map.emit(MapEvent::Ready);
        tracing::debug!(element_id, zoom = camera.zoom, "Headless map created");
        Ok(map)
    }
}
