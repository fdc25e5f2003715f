//! Triangle primitive for ray tracing.
//!
//! Uses a plane hit followed by a signed barycentric-area inside test.
//! The same areas weight the vertex normals, giving smooth shading.

use crate::hit::Intersection;
use prism_core::MeshTriangle;
use prism_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// A triangle primitive with per-vertex normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertices
    a: Vec3,
    b: Vec3,
    c: Vec3,
    /// Vertex normals
    na: Vec3,
    nb: Vec3,
    nc: Vec3,
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    /// Centroid, the BVH split key
    centroid: Vec3,
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a triangle with per-vertex normals (for smooth shading).
    pub fn new(a: Vec3, b: Vec3, c: Vec3, na: Vec3, nb: Vec3, nc: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();

        Self {
            a,
            b,
            c,
            na,
            nb,
            nc,
            normal,
            centroid: (a + b + c) / 3.0,
            bbox: Aabb::enclosing(&[a, b, c]),
        }
    }

    /// Create a flat-shaded triangle from three vertices.
    pub fn flat(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self::new(a, b, c, normal, normal, normal)
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn face_normal(&self) -> Vec3 {
        self.normal
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Intersect a ray with the triangle (both in the triangle's space).
    ///
    /// Back faces are culled: a ray travelling along the face normal never
    /// hits, so a thin surface cannot shadow itself from behind.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let d_dot_n = ray.direction.dot(self.normal);
        if !(d_dot_n < 0.0) {
            return None;
        }

        let t = (self.centroid - ray.origin).dot(self.normal) / d_dot_n;
        if !Interval::POSITIVE.surrounds(t) {
            return None;
        }
        let p = ray.at(t);

        // Twice the signed area of the sub-triangle opposite each vertex
        let area_a = signed_area(self.b - p, self.c - p, self.normal);
        let area_b = signed_area(self.c - p, self.a - p, self.normal);
        let area_c = signed_area(self.a - p, self.b - p, self.normal);
        if area_a < 0.0 || area_b < 0.0 || area_c < 0.0 {
            return None;
        }

        let total = area_a + area_b + area_c;
        let (wa, wb, wc) = if total > 0.0 {
            (area_a / total, area_b / total, area_c / total)
        } else {
            (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
        };

        let interpolated = wa * self.na + wb * self.nb + wc * self.nc;
        let normal = if interpolated.length_squared() > 0.0 {
            interpolated.normalize()
        } else {
            self.normal
        };

        Some(Intersection {
            distance: t,
            point: p,
            normal,
            uv: Vec2::new(wb, wc),
        })
    }
}

impl From<MeshTriangle> for Triangle {
    fn from(tri: MeshTriangle) -> Self {
        let [a, b, c] = tri.positions;
        let [na, nb, nc] = tri.normals;
        Self::new(a, b, c, na, nb, nc)
    }
}

#[inline]
fn signed_area(u: Vec3, v: Vec3, normal: Vec3) -> f32 {
    let cross = u.cross(v);
    let area = cross.length();
    if cross.dot(normal) < 0.0 {
        -area
    } else {
        area
    }
}
