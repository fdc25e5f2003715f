//! Sphere primitive for ray tracing.

use crate::hit::Intersection;
use prism_math::{Aabb, Interval, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        Vec2::new(phi / (2.0 * PI), theta / PI)
    }

    /// Intersect a ray with the sphere.
    ///
    /// Returns the nearest root in front of the origin, so a ray starting
    /// inside the sphere hits the far wall on its way out.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !Interval::POSITIVE.surrounds(root) {
            root = (h + sqrtd) / a;
            if !Interval::POSITIVE.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        let normal = (point - self.center) / self.radius;

        Some(Intersection {
            distance: root,
            point,
            normal,
            uv: Self::get_sphere_uv(normal),
        })
    }
}
