use crate::camera::Camera;
use crate::constants::{
    ORBIT_DAMPING, ORBIT_MAX_DISTANCE, ORBIT_MIN_DISTANCE, ORBIT_POLAR_EPS, ORBIT_ROTATE_SPEED,
    ORBIT_ZOOM_SPEED,
};
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitOptions {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// 0 disables damping; otherwise the fraction of pending motion applied per update.
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            rotate_speed: ORBIT_ROTATE_SPEED,
            zoom_speed: ORBIT_ZOOM_SPEED,
            damping: ORBIT_DAMPING,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
        }
    }
}

/// Spherical coordinates around the orbit target, y up.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius < 1e-6 {
            return Self {
                radius: 0.0,
                phi: PI / 2.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

/// Drag-to-rotate, wheel-to-dolly camera controls with optional damping.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    options: OrbitOptions,
    target: Vec3,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    zoom_scale: f32,
    dragging: bool,
    last_pointer: Vec2,
}

impl OrbitControls {
    pub fn new(camera: &Camera, options: OrbitOptions) -> Self {
        let mut controls = Self {
            options,
            target: camera.target,
            spherical: Spherical::from_offset(camera.position - camera.target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            zoom_scale: 1.0,
            dragging: false,
            last_pointer: Vec2::ZERO,
        };
        controls.sync_from_camera(camera);
        controls
    }

    /// Adopt the camera's current pose and drop any pending motion.
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        self.target = camera.target;
        self.spherical = Spherical::from_offset(camera.position - camera.target);
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.zoom_scale = 1.0;
    }

    pub fn pointer_down(&mut self, client: Vec2) {
        self.dragging = true;
        self.last_pointer = client;
    }

    pub fn pointer_move(&mut self, client: Vec2) {
        if !self.dragging {
            return;
        }
        let delta = client - self.last_pointer;
        self.last_pointer = client;
        self.delta_theta -= delta.x * self.options.rotate_speed;
        self.delta_phi -= delta.y * self.options.rotate_speed;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Positive `delta_y` (wheel down) dollies out.
    pub fn wheel(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        let scale = self.zoom_scale * (delta_y * self.options.zoom_speed).exp();
        if scale.is_finite() {
            self.zoom_scale = scale;
        }
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Apply pending motion to `camera`. Returns whether the pose changed.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let damping = self.options.damping;
        let share = if damping > 0.0 { damping.min(1.0) } else { 1.0 };

        let before = self.spherical;
        self.spherical.theta += self.delta_theta * share;
        self.spherical.phi = (self.spherical.phi + self.delta_phi * share)
            .clamp(ORBIT_POLAR_EPS, PI - ORBIT_POLAR_EPS);
        let zoom = self.zoom_scale.powf(share);
        self.spherical.radius = (self.spherical.radius * zoom)
            .clamp(self.options.min_distance, self.options.max_distance);

        if damping > 0.0 {
            self.delta_theta *= 1.0 - share;
            self.delta_phi *= 1.0 - share;
            self.zoom_scale = self.zoom_scale.powf(1.0 - share);
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.zoom_scale = 1.0;
        }
        if self.delta_theta.abs() < 1e-6 {
            self.delta_theta = 0.0;
        }
        if self.delta_phi.abs() < 1e-6 {
            self.delta_phi = 0.0;
        }
        if (self.zoom_scale - 1.0).abs() < 1e-6 {
            self.zoom_scale = 1.0;
        }

        let moved = before != self.spherical || camera.target != self.target;
        if moved {
            camera.position = self.target + self.spherical.to_offset();
            camera.target = self.target;
            camera.up = Vec3::Y;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_update_leaves_camera_alone() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut orbit = OrbitControls::new(&cam, OrbitOptions::default());
        assert!(!orbit.update(&mut cam));
        assert!((cam.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn drag_rotates_around_target_at_constant_distance() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut orbit = OrbitControls::new(
            &cam,
            OrbitOptions {
                damping: 0.0,
                ..OrbitOptions::default()
            },
        );
        orbit.pointer_down(Vec2::new(100.0, 100.0));
        orbit.pointer_move(Vec2::new(200.0, 100.0));
        assert!(orbit.update(&mut cam));
        assert!((cam.position.length() - 5.0).abs() < 1e-4);
        assert!(cam.position.x.abs() > 0.1);
    }

    #[test]
    fn wheel_respects_distance_bounds() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut orbit = OrbitControls::new(
            &cam,
            OrbitOptions {
                damping: 0.0,
                ..OrbitOptions::default()
            },
        );
        orbit.wheel(1.0e4);
        orbit.update(&mut cam);
        assert!((orbit.distance() - ORBIT_MAX_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn pointer_move_without_drag_is_ignored() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut orbit = OrbitControls::new(&cam, OrbitOptions::default());
        orbit.pointer_move(Vec2::new(500.0, 0.0));
        assert!(!orbit.update(&mut cam));
    }
}
