//! Perspective camera with a cached projection matrix.
//!
//! Mirrors the contract sketches expect from a scene camera: changing
//! `fov_degrees`, `aspect`, `near` or `far` has no effect on
//! [`Camera::projection_matrix`] until [`Camera::update_projection_matrix`]
//! runs. [`Camera::set_aspect`] does both.

use crate::constants::{DEFAULT_FAR, DEFAULT_FOV_DEG, DEFAULT_NEAR};
use crate::raycast::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4};

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

/// Orthonormal camera basis captured at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Distance from `position` to the look-at target.
    pub focus_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut cam = Self {
            position,
            target,
            up: Vec3::Y,
            fov_degrees: DEFAULT_FOV_DEG,
            aspect: 1.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self.update_projection_matrix();
        self
    }

    /// Recompute the cached projection from fov/aspect/near/far.
    pub fn update_projection_matrix(&mut self) {
        let fov = self.fov_degrees.clamp(1.0, 179.0).to_radians();
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        let near = self.near.max(1e-4);
        let far = self.far.max(near + 1e-3);
        self.projection = Mat4::perspective_rh(fov, aspect, near, far);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Capture the current basis. A degenerate up vector (parallel to the
    /// view direction) falls back to world X for `right`.
    pub fn frame(&self) -> CameraFrame {
        let forward = match self.forward() {
            f if f == Vec3::ZERO => Vec3::NEG_Z,
            f => f,
        };
        let right = match forward.cross(self.up).normalize_or_zero() {
            r if r == Vec3::ZERO => Vec3::X,
            r => r,
        };
        let up = right.cross(forward).normalize();
        CameraFrame {
            position: self.position,
            forward,
            right,
            up,
            focus_distance: (self.target - self.position).length().max(1e-3),
        }
    }

    /// World-space point to normalized device coordinates.
    pub fn project(&self, point: Vec3) -> Vec3 {
        let clip = self.view_projection() * point.extend(1.0);
        clip.truncate() / clip.w
    }

    /// World-space ray through a normalized device coordinate
    /// (`x` right, `y` up, both in `[-1, 1]`).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far: Vec3 = far.truncate() / far.w;
        Ray {
            origin: self.position,
            direction: (far - self.position).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_stale_until_updated() {
        let mut cam = Camera::default();
        let before = cam.projection_matrix();
        cam.fov_degrees = 75.0;
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection_matrix();
        assert_ne!(cam.projection_matrix(), before);
    }

    #[test]
    fn frame_is_orthonormal() {
        let cam = Camera::new(Vec3::new(3.0, 2.0, 5.0), Vec3::new(0.0, 0.5, 0.0));
        let f = cam.frame();
        assert!(f.forward.dot(f.right).abs() < 1e-5);
        assert!(f.forward.dot(f.up).abs() < 1e-5);
        assert!((f.right.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn frame_survives_up_parallel_to_forward() {
        let cam = Camera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO);
        let f = cam.frame();
        assert_eq!(f.right, Vec3::X);
        assert!(f.up.is_finite());
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }
}
