//! Capped cone primitive.
//!
//! The cone is canonical: apex at the origin, opening along +Y with
//! `x^2 + z^2 = y^2` for `0 <= y <= 1`, closed by a unit disk at `y = 1`.
//! Position, size and orientation come from the owning object's transform.

use crate::hit::Intersection;
use prism_math::{Aabb, Interval, Ray, Vec2, Vec3};
use std::f32::consts::PI;

const PARALLEL_EPSILON: f32 = 1e-8;

/// The canonical unit cone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cone;

impl Cone {
    pub fn new() -> Self {
        Self
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let side = self.intersect_side(ray);
        let cap = self.intersect_cap(ray);

        match (side, cap) {
            (Some(s), Some(c)) => Some(if c.distance < s.distance { c } else { s }),
            (s, c) => s.or(c),
        }
    }

    fn intersect_side(&self, ray: &Ray) -> Option<Intersection> {
        let (o, d) = (ray.origin, ray.direction);
        let a = d.x * d.x + d.z * d.z - d.y * d.y;
        let b = 2.0 * (o.x * d.x + o.z * d.z - o.y * d.y);
        let c = o.x * o.x + o.z * o.z - o.y * o.y;

        let mut roots = [f32::NAN; 2];
        if a.abs() < PARALLEL_EPSILON {
            // Ray parallel to the slant: a single crossing
            if b.abs() < PARALLEL_EPSILON {
                return None;
            }
            roots[0] = -c / b;
        } else {
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return None;
            }
            let sqrtd = discriminant.sqrt();
            let (t0, t1) = ((-b - sqrtd) / (2.0 * a), (-b + sqrtd) / (2.0 * a));
            roots = [t0.min(t1), t0.max(t1)];
        }

        roots
            .into_iter()
            .filter(|t| Interval::POSITIVE.surrounds(*t))
            .map(|t| (t, ray.at(t)))
            .find(|(_, p)| (0.0..=1.0).contains(&p.y))
            .map(|(t, point)| {
                let normal = Vec3::new(point.x, -point.y, point.z).normalize_or_zero();
                let normal = if normal == Vec3::ZERO { -Vec3::Y } else { normal };
                Intersection {
                    distance: t,
                    point,
                    normal,
                    uv: Vec2::new((point.z.atan2(point.x) + PI) / (2.0 * PI), point.y),
                }
            })
    }

    fn intersect_cap(&self, ray: &Ray) -> Option<Intersection> {
        if ray.direction.y.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (1.0 - ray.origin.y) / ray.direction.y;
        if !Interval::POSITIVE.surrounds(t) {
            return None;
        }

        let point = ray.at(t);
        if point.x * point.x + point.z * point.z > 1.0 {
            return None;
        }

        Some(Intersection {
            distance: t,
            point,
            normal: Vec3::Y,
            uv: Vec2::new(point.x * 0.5 + 0.5, point.z * 0.5 + 0.5),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_hit_from_outside() {
        // Horizontal ray at half height, cone radius 0.5 there
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.0), Vec3::X);
        let hit = Cone.intersect(&ray).unwrap();

        assert!((hit.distance - 4.5).abs() < 1e-4);
        assert!((hit.point.x + 0.5).abs() < 1e-4);
        // Slant normal points outward and down
        assert!(hit.normal.x < 0.0 && hit.normal.y < 0.0);
    }

    #[test]
    fn test_cap_hit_from_above() {
        let ray = Ray::new(Vec3::new(0.2, 5.0, 0.1), -Vec3::Y);
        let hit = Cone.intersect(&ray).unwrap();

        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_miss_above_the_cap() {
        let ray = Ray::new(Vec3::new(-5.0, 1.5, 0.0), Vec3::X);
        assert!(Cone.intersect(&ray).is_none());
    }

    #[test]
    fn test_lower_nappe_is_ignored() {
        // The mirrored cone below the apex is not part of the shape
        let ray = Ray::new(Vec3::new(-5.0, -0.5, 0.0), Vec3::X);
        assert!(Cone.intersect(&ray).is_none());
    }

    #[test]
    fn test_ray_from_inside_hits_wall() {
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::X);
        let hit = Cone.intersect(&ray).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bounding_box_contains_cap() {
        let bbox = Cone.bounding_box();
        assert_eq!(bbox.max.y, 1.0);
        assert_eq!(bbox.min.y, 0.0);
    }
}
