use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// Alongside the direction the ray caches its component-wise inverse and
/// the sign of each inverse component. Box tests use the sign bits to pick
/// the near and far slab bound directly instead of comparing per axis.
///
/// An exactly zero direction component (either `0.0` or `-0.0`) has an
/// inverse of `+inf` and a sign bit of 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Expected to be unit length; the producer normalizes it.
    pub direction: Vec3,
    pub inv_direction: Vec3,
    /// 1 where the inverse direction is negative, 0 otherwise.
    pub sign: [usize; 3],
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let inv_direction = Vec3::new(
            inverse(direction.x),
            inverse(direction.y),
            inverse(direction.z),
        );
        let sign = [
            (inv_direction.x < 0.0) as usize,
            (inv_direction.y < 0.0) as usize,
            (inv_direction.z < 0.0) as usize,
        ];

        Self {
            origin,
            direction,
            inv_direction,
            sign,
        }
    }

    /// Create a ray with its direction normalized first.
    pub fn towards(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction.normalize())
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[inline]
fn inverse(component: f32) -> f32 {
    if component == 0.0 {
        f32::INFINITY
    } else {
        1.0 / component
    }
}
