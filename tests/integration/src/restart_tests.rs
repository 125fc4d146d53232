//! Restart scenarios: what a new app launch sees on disk.

use fence_core::{NativeStatus, Notice, Session, Settings};
use fence_meta::{CircleStyle, GeofenceRecord, LatLng};
use fence_native::{EmulatedGateway, Platform};
use fence_overlay::HeadlessMap;
use fence_store::{FileKvStore, RecordStore, SNAPSHOT_KEY};
use fence_test_utils::{TempStore, sample_records};
use pretty_assertions::assert_eq;

type AppSession = Session<HeadlessMap, FileKvStore, EmulatedGateway>;

fn session_over(disk: &TempStore, settings: &Settings, map: HeadlessMap) -> AppSession {
    let gateway =
        EmulatedGateway::new(Platform::Android, disk.root().join("native.json")).unwrap();
    Session::new(settings, map, disk.open(), gateway).unwrap()
}

#[tokio::test]
async fn geofences_survive_restart_with_radius_and_style() {
    let disk = TempStore::new();
    let mut records = sample_records(5);
    records[3].style = CircleStyle {
        fill_color: "#00ff0040".to_string(),
        stroke_color: "#00aa00".to_string(),
        stroke_width: 1.5,
    };
    RecordStore::new(disk.open()).write_all(&records).unwrap();

    let map = HeadlessMap::new();
    let mut session = session_over(&disk, &Settings::default(), map.clone());
    let report = session.start().await.unwrap();

    assert_eq!(report.loaded, 5);
    assert_eq!(report.registered, 5);
    assert_eq!(session.sync().snapshot(), records);
    assert_eq!(map.circle_count(), 5);
    assert_eq!(session.gateway().regions().await.len(), 5);
}

#[tokio::test]
async fn edits_from_one_launch_are_seen_by_the_next() {
    let disk = TempStore::new();
    let settings = Settings::default();

    let mut first = session_over(&disk, &settings, HeadlessMap::new());
    first.start().await.unwrap();
    let kept = first.create_geofence(LatLng::new(10.0, 20.0)).await.unwrap();
    let dropped = first.create_geofence(LatLng::new(11.0, 21.0)).await.unwrap();
    first.select_geofence(&kept.id);
    first.resize_selected(1234.0).unwrap();
    first.commit_selected_radius().await.unwrap();
    first.select_geofence(&dropped.id);
    first.remove_selected().await.unwrap();
    drop(first);

    let mut second = session_over(&disk, &settings, HeadlessMap::new());
    second.start().await.unwrap();

    assert_eq!(second.sync().len(), 1);
    let entry = second.sync().get(&kept.id).unwrap();
    assert_eq!(entry.radius(), 1234.0);
    assert_eq!(entry.native(), &NativeStatus::Registered);
    let regions = second.gateway().regions().await;
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].radius, 1234.0);
}

#[tokio::test]
async fn reload_without_reregistration_trusts_native_journal() {
    let disk = TempStore::new();
    let mut settings = Settings::default();

    let mut first = session_over(&disk, &settings, HeadlessMap::new());
    first.start().await.unwrap();
    first.create_geofence(LatLng::new(5.0, 6.0)).await.unwrap();
    drop(first);

    settings.native.reregister_on_reload = false;
    let mut second = session_over(&disk, &settings, HeadlessMap::new());
    let report = second.start().await.unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(report.registered, 0);
    assert_eq!(second.sync().entries()[0].native(), &NativeStatus::Unverified);
    assert_eq!(second.gateway().regions().await.len(), 1);
}

#[tokio::test]
async fn corrupt_snapshot_starts_empty_and_next_write_repairs_it() {
    let disk = TempStore::new();
    disk.write_raw(SNAPSHOT_KEY, "[{\"id\": ");

    let mut session = session_over(&disk, &Settings::default(), HeadlessMap::new());
    let report = session.start().await.unwrap();
    assert_eq!(report.loaded, 0);
    assert!(matches!(
        session.sync_mut().take_notices().as_slice(),
        [Notice::MalformedSnapshot { .. }]
    ));

    session.create_geofence(LatLng::new(1.0, 1.0)).await.unwrap();

    let records: Vec<GeofenceRecord> =
        serde_json::from_str(&disk.read_raw(SNAPSHOT_KEY).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn corrupt_native_journal_fails_startup() {
    let disk = TempStore::new();
    std::fs::write(disk.root().join("native.json"), "not json").unwrap();

    let mut session = session_over(&disk, &Settings::default(), HeadlessMap::new());

    assert!(session.start().await.is_err());
    assert!(!session.is_started());
}
