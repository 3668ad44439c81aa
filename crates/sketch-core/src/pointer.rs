//! Pointer normalization and per-frame smoothing.

use crate::constants::{DEFAULT_SMOOTHING, SMOOTHING_MAX, SMOOTHING_MIN};
use crate::viewport::ViewportSize;
use glam::{Vec2, Vec3};

/// Output range of normalized pointer coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerRange {
    /// `[-1, 1]` on both axes, y up (normalized device coordinates).
    #[default]
    Signed,
    /// `[0, 1]` on both axes, y down (texture coordinates).
    Unit,
}

/// How pointer input drives the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Orbit controls own the camera.
    #[default]
    Orbit,
    /// Pointer offsets perturb a captured base camera frame.
    Wobble,
    /// Pointer rays move a target on a proxy plane.
    RayCast,
}

impl InteractionMode {
    /// Only orbit controls dolly on the wheel; other modes leave it to the page.
    #[inline]
    pub fn uses_wheel(self) -> bool {
        matches!(self, Self::Orbit)
    }
}

/// Raw pointer events in client (CSS pixel) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Move { client: Vec2 },
    Down { client: Vec2, button: i16 },
    Up { client: Vec2 },
    Wheel { delta_y: f32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub normalized_x: f32,
    pub normalized_y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub smoothed_x: f32,
    pub smoothed_y: f32,
    pub down: bool,
}

impl PointerState {
    #[inline]
    pub fn normalized(&self) -> Vec2 {
        Vec2::new(self.normalized_x, self.normalized_y)
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        Vec2::new(self.target_x, self.target_y)
    }

    #[inline]
    pub fn smoothed(&self) -> Vec2 {
        Vec2::new(self.smoothed_x, self.smoothed_y)
    }
}

/// Clamp a smoothing factor into `[SMOOTHING_MIN, SMOOTHING_MAX]`; non-finite
/// input falls back to the default.
#[inline]
pub fn clamp_smoothing(factor: f32) -> f32 {
    if factor.is_finite() {
        factor.clamp(SMOOTHING_MIN, SMOOTHING_MAX)
    } else {
        DEFAULT_SMOOTHING
    }
}

/// `current += (target - current) * factor`
#[inline]
pub fn smooth_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[inline]
pub fn smooth_toward_vec2(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

#[inline]
pub fn smooth_toward_vec3(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current + (target - current) * factor
}

/// Translates client-space pointer events into normalized scene inputs.
#[derive(Clone, Debug)]
pub struct PointerAdapter {
    state: PointerState,
    range: PointerRange,
    smoothing: f32,
    origin: Vec2,
    header_offset: f32,
}

impl PointerAdapter {
    pub fn new(range: PointerRange, smoothing: f32, header_offset: f32) -> Self {
        Self {
            state: PointerState::default(),
            range,
            smoothing: clamp_smoothing(smoothing),
            origin: Vec2::ZERO,
            header_offset: header_offset.max(0.0),
        }
    }

    /// Client-space top-left of the container.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    #[inline]
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    #[inline]
    pub fn range(&self) -> PointerRange {
        self.range
    }

    /// Map a client coordinate into the configured range. A zero-area
    /// viewport maps everything to the center.
    pub fn normalize(&self, client: Vec2, viewport: &ViewportSize) -> Vec2 {
        let local = client - self.origin - Vec2::new(0.0, self.header_offset);
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return match self.range {
                PointerRange::Signed => Vec2::ZERO,
                PointerRange::Unit => Vec2::splat(0.5),
            };
        }
        let u = (local.x / viewport.width).clamp(0.0, 1.0);
        let v = (local.y / viewport.height).clamp(0.0, 1.0);
        match self.range {
            PointerRange::Unit => Vec2::new(u, v),
            PointerRange::Signed => Vec2::new(u * 2.0 - 1.0, 1.0 - v * 2.0),
        }
    }

    /// Record a pointer position; the smoothing target follows it.
    pub fn on_move(&mut self, client: Vec2, viewport: &ViewportSize) -> Vec2 {
        let n = self.normalize(client, viewport);
        self.state.normalized_x = n.x;
        self.state.normalized_y = n.y;
        self.set_target(n);
        n
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.state.target_x = target.x;
        self.state.target_y = target.y;
    }

    pub fn set_down(&mut self, down: bool) {
        self.state.down = down;
    }

    /// One exponential smoothing step toward the target.
    pub fn step(&mut self) -> Vec2 {
        let s = smooth_toward_vec2(self.state.smoothed(), self.state.target(), self.smoothing);
        self.state.smoothed_x = s.x;
        self.state.smoothed_y = s.y;
        s
    }

    /// Snap the smoothed value onto the target. Only used on an explicit
    /// interaction-mode change.
    pub fn reset_smoothing(&mut self) {
        self.state.smoothed_x = self.state.target_x;
        self.state.smoothed_y = self.state.target_y;
    }

    #[inline]
    pub fn state(&self) -> &PointerState {
        &self.state
    }
}

impl Default for PointerAdapter {
    fn default() -> Self {
        Self::new(PointerRange::Signed, DEFAULT_SMOOTHING, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportSize {
        ViewportSize::measure(800.0, 600.0, 1.0, 0.0)
    }

    #[test]
    fn signed_range_is_y_up() {
        let p = PointerAdapter::new(PointerRange::Signed, 0.1, 0.0);
        let vp = viewport();
        assert_eq!(p.normalize(Vec2::new(0.0, 0.0), &vp), Vec2::new(-1.0, 1.0));
        assert_eq!(p.normalize(Vec2::new(400.0, 300.0), &vp), Vec2::ZERO);
        assert_eq!(p.normalize(Vec2::new(800.0, 600.0), &vp), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn unit_range_subtracts_origin_and_header() {
        let mut p = PointerAdapter::new(PointerRange::Unit, 0.1, 50.0);
        p.set_origin(Vec2::new(100.0, 10.0));
        let vp = ViewportSize::measure(800.0, 650.0, 1.0, 50.0);
        let n = p.normalize(Vec2::new(500.0, 360.0), &vp);
        assert_eq!(n, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn out_of_bounds_pointer_is_clamped() {
        let p = PointerAdapter::default();
        let n = p.normalize(Vec2::new(-50.0, 9000.0), &viewport());
        assert_eq!(n, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn smoothing_factor_is_clamped() {
        assert_eq!(clamp_smoothing(0.0), SMOOTHING_MIN);
        assert_eq!(clamp_smoothing(4.0), SMOOTHING_MAX);
        assert_eq!(clamp_smoothing(f32::NAN), DEFAULT_SMOOTHING);
        let p = PointerAdapter::new(PointerRange::Signed, -1.0, 0.0);
        assert_eq!(p.smoothing(), SMOOTHING_MIN);
    }

    #[test]
    fn only_orbit_consumes_the_wheel() {
        assert!(InteractionMode::Orbit.uses_wheel());
        assert!(!InteractionMode::Wobble.uses_wheel());
        assert!(!InteractionMode::RayCast.uses_wheel());
    }

    #[test]
    fn scalar_step_moves_by_the_factor() {
        assert_eq!(smooth_toward(0.0, 10.0, 0.25), 2.5);
        assert_eq!(smooth_toward(4.0, 4.0, 0.5), 4.0);
    }

    #[test]
    fn factor_one_reaches_target_in_one_step() {
        let mut p = PointerAdapter::new(PointerRange::Signed, 1.0, 0.0);
        p.set_target(Vec2::new(0.3, -0.7));
        assert_eq!(p.step(), Vec2::new(0.3, -0.7));
    }

    #[test]
    fn reset_snaps_smoothed_onto_target() {
        let mut p = PointerAdapter::new(PointerRange::Signed, 0.01, 0.0);
        p.set_target(Vec2::new(1.0, 1.0));
        p.step();
        assert_ne!(p.state().smoothed(), p.state().target());
        p.reset_smoothing();
        assert_eq!(p.state().smoothed(), Vec2::new(1.0, 1.0));
    }
}
