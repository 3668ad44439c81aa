use crate::camera::Camera;
use crate::pointer::{clamp_smoothing, smooth_toward_vec3};
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Plane `normal · p + constant = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: -normal.dot(point),
        }
    }

    /// Hit point in front of the ray origin, or `None` for parallel rays and
    /// hits behind the origin.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = -(ray.origin.dot(self.normal) + self.constant) / denom;
        (t >= 0.0).then(|| ray.at(t))
    }
}

/// Ray-cast interaction against an invisible proxy plane.
///
/// Pointer input moves `target`; `position` follows it through the per-frame
/// smoothing step, so input latency and motion smoothness stay decoupled.
#[derive(Clone, Debug)]
pub struct RayCastTarget {
    plane: Plane,
    target: Vec3,
    position: Vec3,
    factor: f32,
}

impl RayCastTarget {
    pub fn new(plane: Plane, initial: Vec3, factor: f32) -> Self {
        Self {
            plane,
            target: initial,
            position: initial,
            factor: clamp_smoothing(factor),
        }
    }

    /// Cast the pointer through `camera`. On a miss the previous target is
    /// kept. Returns whether the plane was hit.
    pub fn cast(&mut self, camera: &Camera, ndc: Vec2) -> bool {
        let ray = camera.ray_from_ndc(ndc);
        match self.plane.intersect(&ray) {
            Some(hit) if hit.is_finite() => {
                self.target = hit;
                true
            }
            _ => false,
        }
    }

    /// Move the followed position one smoothing step toward the target.
    pub fn step(&mut self) -> Vec3 {
        self.position = smooth_toward_vec3(self.position, self.target, self.factor);
        self.position
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_ray_misses() {
        let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::ZERO);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 1.0),
            direction: Vec3::X,
        };
        assert!(plane.intersect(&ray).is_none());
    }

    #[test]
    fn plane_behind_origin_misses() {
        let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::ZERO);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 1.0),
            direction: Vec3::Z,
        };
        assert!(plane.intersect(&ray).is_none());
    }
}
