use glam::{Vec2, Vec3};
use sketch_core::{
    Camera, Plane, PointerAdapter, PointerRange, RayCastTarget, ViewportSize,
};

#[test]
fn smoothing_converges_once_decay_is_below_epsilon() {
    let eps = 1e-3_f32;
    for factor in [0.05_f32, 0.1, 0.3, 0.9] {
        let mut p = PointerAdapter::new(PointerRange::Signed, factor, 0.0);
        let target = Vec2::new(0.8, -0.6);
        p.set_target(target);
        // Smallest N with (1 - f)^N < eps.
        let n = (eps.ln() / (1.0 - factor).ln()).ceil() as usize;
        for _ in 0..n {
            p.step();
        }
        let err = (p.state().smoothed() - target).abs().max_element();
        assert!(err < eps, "factor {factor}: error {err} after {n} frames");
    }
}

#[test]
fn smoothing_is_monotone_toward_a_held_target() {
    let mut p = PointerAdapter::new(PointerRange::Signed, 0.2, 0.0);
    p.set_target(Vec2::ONE);
    let mut prev = f32::INFINITY;
    for _ in 0..50 {
        let gap = (Vec2::ONE - p.step()).length();
        assert!(gap < prev);
        prev = gap;
    }
}

#[test]
fn ray_cast_hits_the_proxy_plane_at_the_known_point() {
    let mut camera = Camera::new(Vec3::new(0.0, 4.0, 8.0), Vec3::ZERO);
    camera.set_aspect(16.0 / 9.0);
    let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO);
    let mut target = RayCastTarget::new(plane, Vec3::ZERO, 0.1);

    for p in [
        Vec3::new(1.5, 0.0, -2.0),
        Vec3::new(-3.0, 0.0, 1.0),
        Vec3::ZERO,
    ] {
        let ndc = camera.project(p);
        assert!(target.cast(&camera, Vec2::new(ndc.x, ndc.y)));
        assert!(
            (target.target() - p).length() < 1e-3,
            "expected {p}, got {}",
            target.target()
        );
    }
}

#[test]
fn ray_cast_miss_keeps_previous_target() {
    let camera = Camera::new(Vec3::new(0.0, 1.0, 8.0), Vec3::ZERO);
    let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO);
    let mut target = RayCastTarget::new(plane, Vec3::ZERO, 0.1);
    let hit = Vec3::new(1.0, 0.0, 1.0);
    let ndc = camera.project(hit);
    assert!(target.cast(&camera, Vec2::new(ndc.x, ndc.y)));
    // Top of the screen looks above the horizon.
    assert!(!target.cast(&camera, Vec2::new(0.0, 1.0)));
    assert!((target.target() - hit).length() < 1e-3);
}

#[test]
fn visible_position_follows_target_through_smoothing() {
    let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO);
    let mut target = RayCastTarget::new(plane, Vec3::ZERO, 0.5);
    let camera = Camera::new(Vec3::new(0.0, 4.0, 8.0), Vec3::ZERO);
    let ndc = camera.project(Vec3::new(2.0, 0.0, 0.0));
    target.cast(&camera, Vec2::new(ndc.x, ndc.y));
    assert_eq!(target.position(), Vec3::ZERO);
    let first = target.step();
    assert!((first.x - 1.0).abs() < 1e-3);
}

#[test]
fn adapter_normalizes_relative_to_the_container_origin() {
    let mut p = PointerAdapter::default();
    let vp = ViewportSize::measure(200.0, 100.0, 1.0, 0.0);
    p.set_origin(Vec2::new(100.0, 40.0));
    assert_eq!(p.on_move(Vec2::new(150.0, 65.0), &vp), Vec2::new(-0.5, 0.5));
    p.set_origin(Vec2::ZERO);
    assert_eq!(p.on_move(Vec2::new(150.0, 75.0), &vp), Vec2::new(0.5, -0.5));
}
