use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as a `min`/`max` corner pair so a ray's sign bits can index the
/// near and far corner directly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create the tight AABB around a set of points.
    pub fn enclosing(points: &[Vec3]) -> Self {
        points
            .iter()
            .fold(Aabb::EMPTY, |acc, &p| acc.grow(p))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Extend the box to include a point.
    pub fn grow(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Corner selected by a sign bit: 0 is `min`, 1 is `max`.
    #[inline]
    pub fn bound(&self, sign: usize) -> Vec3 {
        if sign == 0 {
            self.min
        } else {
            self.max
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. Each axis narrows `[tmin, tmax]`, starting from `ray_t`;
    /// the ray's sign bits pick which corner gives the near bound. When a
    /// direction component is zero its inverse is `+inf`: an origin outside
    /// that slab produces an infinite bound that empties the interval, and an
    /// origin exactly on a slab face produces `NaN`, which the NaN-ignoring
    /// `f32::max`/`f32::min` drop.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> bool {
        let mut tmin = ray_t.min;
        let mut tmax = ray_t.max;

        for axis in 0..3 {
            let sign = ray.sign[axis];
            let origin = ray.origin[axis];
            let inv = ray.inv_direction[axis];

            let near = (self.bound(sign)[axis] - origin) * inv;
            let far = (self.bound(1 - sign)[axis] - origin) * inv;

            tmin = tmin.max(near);
            tmax = tmax.min(far);
            if tmin > tmax {
                return false;
            }
        }

        true
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Returns true if the box contains no point.
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// An empty AABB (contains nothing, identity for `surrounding`).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };
}
