//! Math types shared by the prism crates.
//!
//! Re-exports glam and adds the ray tracing primitives that every other
//! crate builds on: [`Ray`], [`Aabb`], [`Interval`] and [`Transform`].

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Transform;
