use glam::Vec3;
use sketch_core::{
    restore_camera, save_camera, Camera, CameraState, KeyValueStore, MemoryStore, PersistError,
};

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() <= 0.005 + 1e-6
}

#[test]
fn camera_state_round_trips_to_two_decimals() {
    let mut cam = Camera::new(Vec3::new(1.23456, -2.71828, 9.87654), Vec3::new(0.111, 0.999, -0.5));
    cam.up = Vec3::new(0.0, 0.99999, 0.00123);
    cam.fov_degrees = 52.3456;
    cam.update_projection_matrix();

    let json = CameraState::capture(&cam).to_json().unwrap();
    let mut fresh = Camera::default();
    CameraState::from_json(&json).unwrap().apply(&mut fresh);

    assert!(close(fresh.position, cam.position));
    assert!(close(fresh.target, cam.target));
    assert!(close(fresh.up, cam.up));
    assert!((fresh.fov_degrees - cam.fov_degrees).abs() <= 0.005 + 1e-6);
    assert_eq!(fresh.position, Vec3::new(1.23, -2.72, 9.88));
    assert_eq!(fresh.fov_degrees, 52.35);
    assert_eq!(
        fresh.projection_matrix(),
        Camera::default().with_fov(52.35).projection_matrix()
    );
}

#[test]
fn payload_is_compact_json() {
    let cam = Camera::new(Vec3::new(0.0, 1.5, 5.0), Vec3::ZERO);
    let json = CameraState::capture(&cam).to_json().unwrap();
    assert_eq!(
        json,
        r#"{"position":[0.0,1.5,5.0],"target":[0.0,0.0,0.0],"up":[0.0,1.0,0.0],"fov":45.0}"#
    );
}

#[test]
fn unknown_fields_are_ignored() {
    let json = r#"{"position":[1,2,3],"target":[0,0,0],"up":[0,1,0],"fov":60,"zoom":2,"version":7}"#;
    let state = CameraState::from_json(json).unwrap();
    assert_eq!(state.fov, 60.0);
    assert_eq!(state.position, [1.0, 2.0, 3.0]);
}

#[test]
fn malformed_payload_leaves_camera_untouched() {
    let mut store = MemoryStore::new();
    store.set_item("cam", r#"{"position":[1,2],"fov":"wide"}"#).unwrap();
    let mut cam = Camera::default();
    let before = cam.clone();
    let err = restore_camera(&store, "cam", &mut cam);
    assert!(matches!(err, Err(PersistError::Json(_))));
    assert_eq!(cam, before);
}

#[test]
fn store_round_trip_and_missing_key() {
    let mut store = MemoryStore::new();
    let mut cam = Camera::new(Vec3::new(3.0, 2.0, 1.0), Vec3::new(0.0, 0.5, 0.0));
    let saved = save_camera(&mut store, "sketch.cam", &cam).unwrap();

    let mut other = Camera::default();
    assert_eq!(restore_camera(&store, "nope", &mut other).unwrap(), None);
    assert_eq!(other, Camera::default());

    assert_eq!(restore_camera(&store, "sketch.cam", &mut other).unwrap(), Some(saved));
    cam.update_projection_matrix();
    assert_eq!(other.position, cam.position);
    assert_eq!(other.target, cam.target);
}
