//! Infinite one-sided plane.

use crate::hit::Intersection;
use prism_math::{Interval, Ray, Vec2, Vec3};

/// An infinite plane through `point`, visible only from the side its
/// normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    /// Tangent frame for planar texture coordinates
    tangent: Vec3,
    bitangent: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let (tangent, bitangent) = normal.any_orthonormal_pair();
        Self {
            point,
            normal,
            tangent,
            bitangent,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let d_dot_n = ray.direction.dot(self.normal);
        if !(d_dot_n < 0.0) {
            return None;
        }

        let t = (self.point - ray.origin).dot(self.normal) / d_dot_n;
        if !Interval::POSITIVE.surrounds(t) {
            return None;
        }

        let point = ray.at(t);
        let offset = point - self.point;
        Some(Intersection {
            distance: t,
            point,
            normal: self.normal,
            uv: Vec2::new(offset.dot(self.tangent), offset.dot(self.bitangent)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Plane {
        Plane::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y)
    }

    #[test]
    fn test_plane_hit_from_front() {
        let ray = Ray::new(Vec3::ZERO, -Vec3::Y);
        let hit = floor().intersect(&ray).unwrap();

        assert!((hit.distance - 3.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_plane_is_one_sided() {
        let below = Ray::new(Vec3::new(0.0, -5.0, 0.0), Vec3::Y);
        assert!(floor().intersect(&below).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(floor().intersect(&ray).is_none());
    }

    #[test]
    fn test_uv_follows_the_plane() {
        let plane = floor();
        let a = plane.intersect(&Ray::new(Vec3::ZERO, -Vec3::Y)).unwrap();
        let b = plane
            .intersect(&Ray::new(Vec3::new(2.0, 0.0, 1.0), -Vec3::Y))
            .unwrap();

        assert!(a.uv.length() < 1e-5);
        assert!((b.uv.length() - 5.0_f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_normal_is_normalized() {
        let plane = Plane::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(plane.normal(), -Vec3::Z);
    }
}
