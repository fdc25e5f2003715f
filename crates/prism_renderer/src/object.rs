//! Top-level intersectable objects.

use crate::cone::Cone;
use crate::hit::{Hit, Intersection};
use crate::plane::Plane;
use crate::sphere::Sphere;
use crate::triangle::Triangle;
use prism_core::Material;
use prism_math::{Aabb, Ray, Transform};

/// Closed set of analytic and polygonal primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Triangle(Triangle),
    Sphere(Sphere),
    Plane(Plane),
    Cone(Cone),
}

impl Shape {
    /// Intersect in the shape's own space.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Shape::Triangle(t) => t.intersect(ray),
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Plane(p) => p.intersect(ray),
            Shape::Cone(c) => c.intersect(ray),
        }
    }

    /// Local-space bounds. Planes are unbounded.
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Shape::Triangle(t) => Some(t.bounding_box()),
            Shape::Sphere(s) => Some(s.bounding_box()),
            Shape::Plane(_) => None,
            Shape::Cone(c) => Some(c.bounding_box()),
        }
    }
}

impl From<Triangle> for Shape {
    fn from(triangle: Triangle) -> Self {
        Shape::Triangle(triangle)
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<Plane> for Shape {
    fn from(plane: Plane) -> Self {
        Shape::Plane(plane)
    }
}

impl From<Cone> for Shape {
    fn from(cone: Cone) -> Self {
        Shape::Cone(cone)
    }
}

/// A shape with its material and an optional local-to-world transform.
#[derive(Debug, Clone)]
pub struct Object {
    pub shape: Shape,
    pub material: Material,
    pub transform: Option<Transform>,
}

impl Object {
    pub fn new(shape: impl Into<Shape>, material: Material) -> Self {
        Self {
            shape: shape.into(),
            material,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Intersect a world-space ray.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let hit = match &self.transform {
            Some(transform) => {
                let local = transform.ray_to_local(ray);
                self.shape
                    .intersect(&local)?
                    .to_world(transform, ray)
            }
            None => self.shape.intersect(ray)?,
        };
        Some(hit.with_material(&self.material))
    }

    /// World-space bounds, `None` for unbounded shapes.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let local = self.shape.bounding_box()?;
        Some(match &self.transform {
            Some(transform) => transform.aabb_to_world(&local),
            None => local,
        })
    }
}
