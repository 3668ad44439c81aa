//! Pointer-driven camera wobble around a captured base frame.

use crate::camera::{Camera, CameraFrame};
use crate::constants::{
    DEFAULT_SMOOTHING, WOBBLE_MAX_OFFSET, WOBBLE_ROTATE_AMPLITUDE_RAD,
    WOBBLE_TRANSLATE_AMPLITUDE,
};
use crate::pointer::{clamp_smoothing, smooth_toward_vec2};
use glam::{Quat, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WobbleMode {
    /// Offset the camera position in its own right/up plane while looking at
    /// the base focus point.
    #[default]
    Translate,
    /// Keep the position and yaw/pitch the view direction.
    Rotate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WobbleOptions {
    pub mode: WobbleMode,
    pub factor: f32,
    /// Per-axis bound applied to the smoothed offset.
    pub max_offset: Vec2,
    /// World units (translate) or radians (rotate) at full offset.
    pub amplitude: f32,
}

impl Default for WobbleOptions {
    fn default() -> Self {
        Self {
            mode: WobbleMode::Translate,
            factor: DEFAULT_SMOOTHING,
            max_offset: Vec2::splat(WOBBLE_MAX_OFFSET),
            amplitude: WOBBLE_TRANSLATE_AMPLITUDE,
        }
    }
}

impl WobbleOptions {
    pub fn rotate() -> Self {
        Self {
            mode: WobbleMode::Rotate,
            amplitude: WOBBLE_ROTATE_AMPLITUDE_RAD,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct WobbleCamera {
    options: WobbleOptions,
    base: Option<CameraFrame>,
    current: Vec2,
    target: Vec2,
}

impl WobbleCamera {
    pub fn new(options: WobbleOptions) -> Self {
        Self {
            options: WobbleOptions {
                factor: clamp_smoothing(options.factor),
                max_offset: options.max_offset.abs(),
                ..options
            },
            base: None,
            current: Vec2::ZERO,
            target: Vec2::ZERO,
        }
    }

    /// Capture the camera's current frame as the wobble base. Offsets restart
    /// at zero so the first applied pose equals the captured one.
    pub fn capture(&mut self, camera: &Camera) {
        self.base = Some(camera.frame());
        self.current = Vec2::ZERO;
        self.target = Vec2::ZERO;
    }

    /// Leave wobble mode; the camera stays wherever the last apply put it.
    pub fn release(&mut self) -> Option<CameraFrame> {
        self.base.take()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.base.is_some()
    }

    #[inline]
    pub fn base(&self) -> Option<&CameraFrame> {
        self.base.as_ref()
    }

    pub fn set_target(&mut self, offset: Vec2) {
        self.target = offset;
    }

    /// Smooth toward the target and return the clamped offset.
    pub fn step(&mut self) -> Vec2 {
        self.current = smooth_toward_vec2(self.current, self.target, self.options.factor);
        self.offset()
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.current
            .clamp(-self.options.max_offset, self.options.max_offset)
    }

    /// Write the perturbed pose into `camera`. No-op while released.
    pub fn apply(&self, camera: &mut Camera) {
        let Some(base) = self.base else {
            return;
        };
        let offset = self.offset();
        let amp = self.options.amplitude;
        match self.options.mode {
            WobbleMode::Translate => {
                let focus = base.position + base.forward * base.focus_distance;
                camera.position = base.position + base.right * (offset.x * amp) + base.up * (offset.y * amp);
                camera.target = focus;
                camera.up = base.up;
            }
            WobbleMode::Rotate => {
                let yaw = Quat::from_axis_angle(base.up, -offset.x * amp);
                let pitch = Quat::from_axis_angle(base.right, offset.y * amp);
                let q = yaw * pitch;
                let dir = q * base.forward;
                camera.position = base.position;
                camera.target = base.position + dir * base.focus_distance;
                camera.up = q * base.up;
            }
        }
    }

    /// `step` followed by `apply`.
    pub fn update(&mut self, camera: &mut Camera) -> Vec2 {
        let offset = self.step();
        self.apply(camera);
        offset
    }

    #[inline]
    pub fn options(&self) -> &WobbleOptions {
        &self.options
    }
}

impl Default for WobbleCamera {
    fn default() -> Self {
        Self::new(WobbleOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 1.0, 6.0), Vec3::ZERO)
    }

    #[test]
    fn capture_then_apply_at_rest_keeps_pose() {
        for options in [WobbleOptions::default(), WobbleOptions::rotate()] {
            let mut cam = camera();
            let before = cam.clone();
            let mut wobble = WobbleCamera::new(options);
            wobble.capture(&cam);
            wobble.update(&mut cam);
            assert!((cam.position - before.position).length() < 1e-5);
            assert!((cam.forward() - before.forward()).length() < 1e-5);
        }
    }

    #[test]
    fn offset_is_clamped_to_max() {
        let mut wobble = WobbleCamera::new(WobbleOptions {
            factor: 1.0,
            max_offset: Vec2::new(0.2, 0.3),
            ..WobbleOptions::default()
        });
        wobble.set_target(Vec2::new(5.0, -5.0));
        assert_eq!(wobble.step(), Vec2::new(0.2, -0.3));
    }

    #[test]
    fn translate_moves_along_captured_right_axis() {
        let mut cam = camera();
        let mut wobble = WobbleCamera::new(WobbleOptions {
            factor: 1.0,
            amplitude: 1.0,
            ..WobbleOptions::default()
        });
        wobble.capture(&cam);
        let right = wobble.base().map(|b| b.right).unwrap_or(Vec3::ZERO);
        wobble.set_target(Vec2::new(1.0, 0.0));
        wobble.update(&mut cam);
        assert!((cam.position - (Vec3::new(0.0, 1.0, 6.0) + right)).length() < 1e-5);
        assert!(cam.target.length() < 1e-4);
    }

    #[test]
    fn released_wobble_leaves_camera_alone() {
        let mut cam = camera();
        let mut wobble = WobbleCamera::default();
        wobble.capture(&cam);
        assert!(wobble.release().is_some());
        wobble.set_target(Vec2::ONE);
        let before = cam.clone();
        wobble.update(&mut cam);
        assert_eq!(cam, before);
        assert!(!wobble.is_active());
    }
}
