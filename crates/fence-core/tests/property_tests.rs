//! Property tests: after any sequence of gestures the persisted snapshot,
//! the live collection and the map agree.

use std::sync::Arc;

use fence_core::{GeofenceSync, NativeOutcome, Settings};
use fence_meta::{FenceId, LatLng};
use fence_overlay::{HeadlessMap, TapListener};
use fence_store::MemoryKvStore;
use proptest::prelude::*;

const CENTERS: [(f64, f64); 4] = [(10.0, 20.0), (-33.5, 151.25), (0.0, 0.0), (51.5, -0.125)];

#[derive(Debug, Clone)]
enum Op {
    Create(usize),
    Select(usize),
    Resize(f64),
    Commit,
    Remove,
    Clear,
    Settle { ok: bool },
    Reload,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..CENTERS.len()).prop_map(Op::Create),
        (0..CENTERS.len()).prop_map(Op::Select),
        (-50.0f64..200_000.0).prop_map(Op::Resize),
        Just(Op::Commit),
        Just(Op::Remove),
        Just(Op::Clear),
        any::<bool>().prop_map(|ok| Op::Settle { ok }),
        Just(Op::Reload),
    ]
}

fn center(index: usize) -> LatLng {
    let (lat, lng) = CENTERS[index];
    LatLng::new(lat, lng)
}

fn apply(sync: &mut GeofenceSync<HeadlessMap, MemoryKvStore>, op: Op) {
    match op {
        Op::Create(i) => {
            let _ = sync.create_geofence(center(i));
        }
        Op::Select(i) => {
            sync.select_geofence(&FenceId::from_center(center(i)));
        }
        Op::Resize(radius) => {
            let _ = sync.resize_selected(radius);
        }
        Op::Commit => {
            sync.commit_selected_radius();
        }
        Op::Remove => {
            sync.remove_selected();
        }
        Op::Clear => sync.clear_selection(),
        Op::Settle { ok } => {
            while let Some(request) = sync.next_request() {
                let result = if ok {
                    Ok(())
                } else {
                    Err(fence_native::Error::platform(&request.id, "refused"))
                };
                sync.apply_native_outcome(NativeOutcome::new(request, result));
            }
        }
        Op::Reload => {
            sync.reload_from_store().unwrap();
        }
    }
}

proptest! {
    #[test]
    fn snapshot_matches_live_collection(ops in prop::collection::vec(op(), 1..40)) {
        let map = HeadlessMap::new();
        let no_tap: TapListener = Arc::new(|_: &FenceId| {});
        let mut sync = GeofenceSync::new(
            &Settings::default(),
            map.clone(),
            MemoryKvStore::new(),
            no_tap,
        )
        .unwrap();

        for op in ops {
            apply(&mut sync, op);

            let stored = sync.store().read_all().unwrap();
            prop_assert_eq!(&stored, &sync.snapshot());
            prop_assert_eq!(map.marker_count(), sync.len());
            prop_assert_eq!(map.circle_count(), sync.len());

            let bounds = Settings::default().radius_bounds().unwrap();
            for record in &stored {
                prop_assert!(record.radius >= bounds.min && record.radius <= bounds.max);
            }
            if let Some(id) = sync.selected() {
                prop_assert!(sync.get(id).is_some());
                prop_assert!(sync.panel().is_shown());
            }
        }
    }
}
