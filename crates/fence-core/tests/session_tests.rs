//! Session driver against a scripted native engine.

use fence_core::{
    Dispatch, Error, Gesture, NativeStatus, Notice, PanelVisibility, Session, Settings,
};
use fence_meta::LatLng;
use fence_native::Platform;
use fence_overlay::{HeadlessMap, MapEvent};
use fence_store::{MemoryKvStore, SNAPSHOT_KEY};
use fence_test_utils::{FakeGateway, GatewayCall, sample_records, snapshot_json};
use pretty_assertions::assert_eq;

type TestSession = Session<HeadlessMap, MemoryKvStore, FakeGateway>;

async fn started(store: MemoryKvStore) -> (TestSession, HeadlessMap, FakeGateway) {
    let map = HeadlessMap::new();
    let gateway = FakeGateway::new();
    let mut session =
        Session::new(&Settings::default(), map.clone(), store, gateway.clone()).unwrap();
    session.start().await.unwrap();
    (session, map, gateway)
}

#[tokio::test]
async fn start_initializes_reloads_and_reregisters() {
    let records = sample_records(3);
    let store = MemoryKvStore::with_entry(SNAPSHOT_KEY, snapshot_json(&records));
    let map = HeadlessMap::new();
    let gateway = FakeGateway::new();
    gateway.fail_register_for(&records[1].id);
    let mut session =
        Session::new(&Settings::default(), map.clone(), store, gateway.clone()).unwrap();

    let report = session.start().await.unwrap();

    assert_eq!(report.loaded, 3);
    assert_eq!(report.registered, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(gateway.calls()[0], GatewayCall::Init);
    assert_eq!(gateway.regions().len(), 2);
    assert!(matches!(
        session.sync().get(&records[1].id).unwrap().native(),
        NativeStatus::Failed { .. }
    ));
    assert_eq!(map.marker_count(), 3, "failed registration keeps the overlay");
}

#[tokio::test]
async fn start_without_reregistration_leaves_entries_unverified() {
    let records = sample_records(2);
    let store = MemoryKvStore::with_entry(SNAPSHOT_KEY, snapshot_json(&records));
    let mut settings = Settings::default();
    settings.native.reregister_on_reload = false;
    let gateway = FakeGateway::new();
    let mut session = Session::new(&settings, HeadlessMap::new(), store, gateway.clone()).unwrap();

    let report = session.start().await.unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(report.registered, 0);
    assert_eq!(gateway.calls(), vec![GatewayCall::Init]);
    assert!(
        session
            .sync()
            .entries()
            .iter()
            .all(|e| e.native() == &NativeStatus::Unverified)
    );
}

#[tokio::test]
async fn start_fails_on_platform_without_geofencing() {
    let mut settings = Settings::default();
    settings.native.platform = Platform::Web;
    let gateway = FakeGateway::on(Platform::Web);
    let mut session =
        Session::new(&settings, HeadlessMap::new(), MemoryKvStore::new(), gateway).unwrap();

    let result = session.start().await;

    assert!(matches!(result, Err(Error::Native(_))));
    assert!(!session.is_started());
}

#[tokio::test]
async fn start_fails_when_init_is_refused() {
    let gateway = FakeGateway::new();
    gateway.fail_init();
    let mut session = Session::new(
        &Settings::default(),
        HeadlessMap::new(),
        MemoryKvStore::new(),
        gateway,
    )
    .unwrap();

    assert!(session.start().await.is_err());
}

#[test]
fn settings_must_match_gateway_platform() {
    let result = Session::new(
        &Settings::default(),
        HeadlessMap::new(),
        MemoryKvStore::new(),
        FakeGateway::on(Platform::Ios),
    );
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[tokio::test]
async fn create_waits_for_registration() {
    let (mut session, _map, gateway) = started(MemoryKvStore::new()).await;

    let view = session.create_geofence(LatLng::new(10.0, 20.0)).await.unwrap();

    assert_eq!(view.native, NativeStatus::Registered);
    let region = gateway.region(&view.id).unwrap();
    assert_eq!(region.radius, 250.0);
}

#[tokio::test]
async fn create_survives_registration_failure() {
    let (mut session, map, gateway) = started(MemoryKvStore::new()).await;
    gateway.fail_next_register();

    let view = session.create_geofence(LatLng::new(10.0, 20.0)).await.unwrap();

    assert!(matches!(view.native, NativeStatus::Failed { .. }));
    assert_eq!(map.marker_count(), 1);
    assert_eq!(session.sync().store().read_all().unwrap().len(), 1);
    assert!(matches!(
        session.sync_mut().take_notices().as_slice(),
        [Notice::NativeFailure { .. }]
    ));
}

#[tokio::test]
async fn commit_pushes_final_radius_only() {
    let (mut session, _map, gateway) = started(MemoryKvStore::new()).await;
    let view = session.create_geofence(LatLng::new(1.0, 2.0)).await.unwrap();
    session.select_geofence(&view.id);

    for radius in [260.0, 300.0, 480.0] {
        session.resize_selected(radius).unwrap();
    }
    session.commit_selected_radius().await.unwrap();

    let registers: Vec<f64> = gateway
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            GatewayCall::Register(command) => Some(command.radius),
            _ => None,
        })
        .collect();
    assert_eq!(registers, vec![250.0, 480.0]);
    assert_eq!(gateway.region(&view.id).unwrap().radius, 480.0);
}

#[tokio::test]
async fn commit_failure_is_reported() {
    let (mut session, _map, gateway) = started(MemoryKvStore::new()).await;
    let view = session.create_geofence(LatLng::new(1.0, 2.0)).await.unwrap();
    session.select_geofence(&view.id);
    session.resize_selected(600.0).unwrap();
    gateway.fail_next_register();

    let result = session.commit_selected_radius().await;

    assert!(matches!(result, Err(Error::Native(_))));
    assert_eq!(session.sync().get(&view.id).unwrap().radius(), 600.0);
}

#[tokio::test]
async fn remove_selected_deregisters_then_drops_everything() {
    let (mut session, map, gateway) = started(MemoryKvStore::new()).await;
    let view = session.create_geofence(LatLng::new(1.0, 2.0)).await.unwrap();
    session.select_geofence(&view.id);

    let removed = session.remove_selected().await.unwrap();

    assert_eq!(removed, Some(view.id.clone()));
    assert!(!gateway.is_registered(&view.id));
    assert!(session.sync().is_empty());
    assert_eq!(map.marker_count(), 0);
    assert!(session.sync().store().read_all().unwrap().is_empty());
}

#[tokio::test]
async fn remove_failure_keeps_geofence() {
    let (mut session, map, gateway) = started(MemoryKvStore::new()).await;
    let view = session.create_geofence(LatLng::new(1.0, 2.0)).await.unwrap();
    session.select_geofence(&view.id);
    gateway.fail_deregister_for(&view.id);

    let result = session.remove_selected().await;

    assert!(matches!(result, Err(Error::Native(_))));
    assert!(gateway.is_registered(&view.id));
    assert_eq!(session.sync().len(), 1);
    assert_eq!(map.marker_count(), 1);
    assert_eq!(session.sync().store().read_all().unwrap().len(), 1);
}

#[tokio::test]
async fn flush_reports_which_requests_failed() {
    let (mut session, _map, gateway) = started(MemoryKvStore::new()).await;
    let ok = session.sync_mut().create_geofence(LatLng::new(1.0, 2.0)).unwrap();
    let refused = session.sync_mut().create_geofence(LatLng::new(3.0, 4.0)).unwrap();
    gateway.fail_register_for(&refused.id);

    let resolutions = session.flush().await;

    let failed: Vec<_> = resolutions
        .iter()
        .filter(|r| r.is_failure())
        .map(|r| r.id.clone())
        .collect();
    assert_eq!(resolutions.len(), 2);
    assert_eq!(failed, vec![refused.id]);
    assert!(gateway.is_registered(&ok.id));
}

#[tokio::test]
async fn remove_issued_before_registration_settles_runs_after_it() {
    let (mut session, _map, gateway) = started(MemoryKvStore::new()).await;
    let gestures = session.gestures();
    let center = LatLng::new(7.0, 8.0);

    // Queue the create and the removal before any native call is dispatched
    let view = session.sync_mut().create_geofence(center).unwrap();
    session.sync_mut().select_geofence(&view.id);
    session.sync_mut().remove_selected().unwrap();
    gestures.send(Gesture::Map(MapEvent::Drag)).unwrap();

    session.flush().await;
    session.pump().await;

    let calls = gateway.calls();
    assert_eq!(
        &calls[1..],
        &[
            GatewayCall::Register(fence_meta::FenceCommand::new(view.id.clone(), center, 250.0)),
            GatewayCall::Deregister(view.id.clone()),
        ]
    );
    assert!(gateway.regions().is_empty());
    assert!(session.sync().is_empty());
}

#[tokio::test]
async fn marker_tap_is_routed_back_as_selection() {
    let (mut session, map, _gateway) = started(MemoryKvStore::new()).await;
    let center = LatLng::new(4.0, 5.0);
    let view = session.create_geofence(center).await.unwrap();

    assert!(map.tap_marker(center));
    let dispatched = session.pump().await;

    assert_eq!(
        dispatched,
        vec![Dispatch::Selected {
            id: view.id.clone(),
            radius: 250.0
        }]
    );
    assert_eq!(session.sync().panel().visibility, PanelVisibility::Shown);
}

#[tokio::test]
async fn map_events_drive_the_full_flow() {
    let (mut session, map, gateway) = started(MemoryKvStore::new()).await;
    let mut events = map.take_events().unwrap();
    let center = LatLng::new(12.5, 13.5);

    map.long_press(center);
    let event = events.recv().await.unwrap();
    let Dispatch::Created(view) = session.dispatch(event.into()).await else {
        panic!("long press should create");
    };
    assert!(gateway.is_registered(&view.id));

    map.tap_marker(center);
    session.pump().await;
    session.dispatch(Gesture::RadiusChanged(999.0)).await;
    session.dispatch(Gesture::RadiusCommitted).await;
    assert_eq!(gateway.region(&view.id).unwrap().radius, 999.0);

    session.dispatch(Gesture::RemoveRequested).await;
    assert!(!gateway.is_registered(&view.id));
    assert!(session.sync().is_empty());
}

#[tokio::test]
async fn requests_are_held_until_start() {
    let map = HeadlessMap::new();
    let gateway = FakeGateway::new();
    let mut session = Session::new(
        &Settings::default(),
        map,
        MemoryKvStore::new(),
        gateway.clone(),
    )
    .unwrap();

    session.sync_mut().create_geofence(LatLng::new(1.0, 1.0)).unwrap();
    assert!(session.flush().await.is_empty());
    assert!(gateway.calls().is_empty());
    assert_eq!(session.sync().pending_requests(), 1);
}
