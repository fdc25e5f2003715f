//! Intersection results.

use prism_core::Material;
use prism_math::{Ray, Transform, Vec2, Vec3};

/// Geometry of a ray-primitive intersection, before a material is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Distance from the ray origin to `point`
    pub distance: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal (outward, not yet oriented against the ray)
    pub normal: Vec3,
    /// UV texture coordinates
    pub uv: Vec2,
}

impl Intersection {
    /// Carry a local-space intersection back to world space.
    ///
    /// The distance is recomputed from the world ray origin because a
    /// scaling transform does not preserve the local ray parameter.
    pub fn to_world(self, transform: &Transform, world_ray: &Ray) -> Self {
        let point = transform.point_to_world(self.point);
        Self {
            distance: (point - world_ray.origin).length(),
            point,
            normal: transform.normal_to_world(self.normal),
            uv: self.uv,
        }
    }

    /// Attach the material of the surface that was hit.
    pub fn with_material(self, material: &Material) -> Hit<'_> {
        Hit {
            distance: self.distance,
            point: self.point,
            normal: self.normal,
            uv: self.uv,
            material,
        }
    }
}

/// Record of a ray-surface intersection.
///
/// Borrows the material of the surface it came from, so it cannot outlive
/// the scene it was produced from.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// World-space distance from the ray origin
    pub distance: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal
    pub normal: Vec3,
    /// UV texture coordinates
    pub uv: Vec2,
    /// Material at the intersection point
    pub material: &'a Material,
}

/// Keep whichever of two optional hits is closer.
pub fn closer<'a>(best: Option<Hit<'a>>, candidate: Option<Hit<'a>>) -> Option<Hit<'a>> {
    match (best, candidate) {
        (Some(b), Some(c)) => Some(if c.distance < b.distance { c } else { b }),
        (b, c) => b.or(c),
    }
}
