// Local <-> world transforms for instanced geometry.
//
// A primitive or mesh stores its geometry in local space. Rays are carried
// into that space with the inverse matrix, and hit points and normals are
// carried back out with the forward matrix and the normal matrix.

use glam::{Mat3, Mat4, Vec3};

use crate::{Aabb, Ray};

/// A local-to-world transform with its cached inverse and normal matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    to_world: Mat4,
    to_local: Mat4,
    /// Inverse-transpose of the upper 3x3, for carrying normals to world space.
    normal_matrix: Mat3,
}

impl Transform {
    /// Create a transform from a local-to-world matrix.
    pub fn new(to_world: Mat4) -> Self {
        let to_local = to_world.inverse();
        let normal_matrix = Mat3::from_mat4(to_local).transpose();
        Self {
            to_world,
            to_local,
            normal_matrix,
        }
    }

    pub fn from_translation(offset: Vec3) -> Self {
        Self::new(Mat4::from_translation(offset))
    }

    pub fn from_scale_translation(scale: Vec3, offset: Vec3) -> Self {
        Self::new(Mat4::from_translation(offset) * Mat4::from_scale(scale))
    }

    pub fn matrix(&self) -> Mat4 {
        self.to_world
    }

    pub fn inverse_matrix(&self) -> Mat4 {
        self.to_local
    }

    /// Carry a world-space ray into local space.
    ///
    /// The local direction is renormalized, so local `t` is not a world
    /// distance under scaling. Callers recompute world distances from the
    /// world-space hit point.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        let origin = self.to_local.transform_point3(ray.origin);
        let direction = self.to_local.transform_vector3(ray.direction).normalize();
        Ray::new(origin, direction)
    }

    pub fn point_to_world(&self, point: Vec3) -> Vec3 {
        self.to_world.transform_point3(point)
    }

    pub fn normal_to_world(&self, normal: Vec3) -> Vec3 {
        (self.normal_matrix * normal).normalize()
    }

    /// World-space box around a local-space box (all 8 corners transformed).
    pub fn aabb_to_world(&self, aabb: &Aabb) -> Aabb {
        aabb.corners()
            .iter()
            .fold(Aabb::EMPTY, |acc, &corner| acc.grow(self.point_to_world(corner)))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
