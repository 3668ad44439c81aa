// Host-side tests for front-end constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn bloom_defaults_fit_their_panel_ranges() {
    assert!(BLOOM_STRENGTH >= 0.0 && BLOOM_STRENGTH <= BLOOM_STRENGTH_MAX);
    // bright-pass threshold is bound with a 0..2 slider
    assert!(BLOOM_THRESHOLD >= 0.0 && BLOOM_THRESHOLD <= 2.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn particle_dispatch_covers_every_particle() {
    assert!(PARTICLE_COUNT > 0);
    assert!(PARTICLE_WORKGROUP_SIZE > 0);
    let groups = PARTICLE_COUNT.div_ceil(PARTICLE_WORKGROUP_SIZE);
    assert!(groups * PARTICLE_WORKGROUP_SIZE >= PARTICLE_COUNT);
    assert!((groups - 1) * PARTICLE_WORKGROUP_SIZE < PARTICLE_COUNT);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn particle_damping_is_a_fraction() {
    assert!(PARTICLE_DAMPING > 0.0 && PARTICLE_DAMPING <= 1.0);
    assert!(PARTICLE_SPAWN_RADIUS > 0.0);
    assert!(PARTICLE_SIZE_PX >= 1.0);
}

#[test]
fn colors_are_normalized() {
    for c in CLEAR_RGB {
        assert!((0.0..=1.0).contains(&c));
    }
    for c in WAVES_TINT.iter().chain(PARTICLE_COLOR.iter()) {
        assert!((0.0..=1.0).contains(c));
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn fov_range_is_usable() {
    assert!(FOV_MIN_DEG > 0.0);
    assert!(FOV_MIN_DEG < FOV_MAX_DEG);
    assert!(FOV_MAX_DEG < 180.0);
    // the default camera field of view sits inside the slider range
    let default_fov = sketch_core::constants::DEFAULT_FOV_DEG;
    assert!((FOV_MIN_DEG..=FOV_MAX_DEG).contains(&default_fov));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn panel_stacks_above_page_content() {
    assert!(PANEL_Z_INDEX >= 1000);
    assert!(PANEL_WIDTH_PX > 2 * PANEL_MARGIN_PX);
}
