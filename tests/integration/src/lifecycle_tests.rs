//! End-to-end geofence lifecycle
//!
//! Exercises the full stack: headless map engine -> session -> file store
//! and emulated native engine, all rooted in a temporary directory.

use fence_core::{Dispatch, Gesture, NativeStatus, PanelVisibility, Session, Settings};
use fence_meta::{CircleStyle, FenceId, LatLng};
use fence_native::{EmulatedGateway, Platform};
use fence_overlay::{HeadlessEngine, HeadlessMap, MapEngine};
use fence_store::FileKvStore;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

type AppSession = Session<HeadlessMap, FileKvStore, EmulatedGateway>;

async fn launch(dir: &TempDir) -> (AppSession, HeadlessMap) {
    let settings = Settings::default();
    let map = HeadlessEngine
        .create_map(&settings.map.element_id, settings.camera())
        .unwrap();
    let gateway =
        EmulatedGateway::new(Platform::Android, dir.path().join("native.json")).unwrap();
    let mut session = Session::new(
        &settings,
        map.clone(),
        FileKvStore::new(dir.path()),
        gateway,
    )
    .unwrap();
    session.start().await.unwrap();
    (session, map)
}

fn stored(dir: &TempDir) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.path().join("geofences.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn long_press_resize_remove_through_gestures() {
    let dir = TempDir::new().unwrap();
    let (mut session, map) = launch(&dir).await;
    let mut events = map.take_events().unwrap();
    assert_eq!(events.recv().await, Some(fence_overlay::MapEvent::Ready));

    // Long press at (10, 20)
    let center = LatLng::new(10.0, 20.0);
    map.long_press(center);
    let event = events.recv().await.unwrap();
    let Dispatch::Created(view) = session.dispatch(event.into()).await else {
        panic!("long press should create a geofence");
    };
    assert_eq!(view.id, FenceId::from_raw("10|20"));
    assert_eq!(view.radius, 250.0);
    assert_eq!(view.style, CircleStyle::default());

    let snapshot = stored(&dir);
    assert_eq!(snapshot[0]["id"], "10|20");
    assert_eq!(snapshot[0]["latitude"], 10.0);
    assert_eq!(snapshot[0]["longitude"], 20.0);
    assert_eq!(snapshot[0]["style"]["strokeColor"], "#3399ff");
    assert_eq!(session.gateway().regions().await.len(), 1);

    // Tap the marker, drag the slider, release
    assert!(map.tap_marker(center));
    session.pump().await;
    assert_eq!(session.sync().panel().visibility, PanelVisibility::Shown);
    for radius in [300.0, 420.0, 500.0] {
        session.dispatch(Gesture::RadiusChanged(radius)).await;
    }
    session.dispatch(Gesture::RadiusCommitted).await;

    assert_eq!(stored(&dir)[0]["radius"], 500.0);
    assert_eq!(session.gateway().regions().await[0].radius, 500.0);
    assert_eq!(map.circles()[0].radius, 500.0);

    // Remove
    session.dispatch(Gesture::RemoveRequested).await;

    assert!(session.sync().is_empty());
    assert_eq!(stored(&dir), serde_json::json!([]));
    assert!(session.gateway().regions().await.is_empty());
    assert_eq!(map.marker_count(), 0);
    assert_eq!(map.circle_count(), 0);
    assert_eq!(session.sync().panel().visibility, PanelVisibility::Hidden);
}

#[tokio::test]
async fn native_journal_uses_plugin_field_names() {
    let dir = TempDir::new().unwrap();
    let (mut session, _map) = launch(&dir).await;

    session
        .create_geofence(LatLng::new(-33.5, 151.25))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("native.json")).unwrap();
    let journal: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(journal[0]["id"], "-33.5|151.25");
    assert_eq!(journal[0]["latitud"], -33.5);
    assert_eq!(journal[0]["longitud"], 151.25);
    assert_eq!(journal[0]["radius"], 250.0);
}

#[tokio::test]
async fn denied_permission_keeps_geofence_on_map_and_in_storage() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::default();
    let map = HeadlessMap::new();
    let gateway = EmulatedGateway::new(Platform::Android, dir.path().join("native.json"))
        .unwrap()
        .with_permission(false);
    let mut session = Session::new(
        &settings,
        map.clone(),
        FileKvStore::new(dir.path()),
        gateway,
    )
    .unwrap();
    session.start().await.unwrap();

    let view = session.create_geofence(LatLng::new(1.0, 2.0)).await.unwrap();

    assert!(matches!(view.native, NativeStatus::Failed { .. }));
    assert_eq!(map.marker_count(), 1);
    assert_eq!(stored(&dir)[0]["id"], "1|2");
    assert!(!session.sync().check().is_healthy());
}
