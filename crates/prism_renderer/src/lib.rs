//! prism renderer: Whitted-style CPU ray tracing.
//!
//! Primitives and a median-split BVH answer nearest-hit queries, the
//! transport module shades rays recursively (Phong lighting, shadows,
//! mirrors, Fresnel-weighted refraction), and the scheduler renders row
//! bands in parallel on a rayon pool.

pub mod bvh;
pub mod camera;
pub mod cone;
pub mod hit;
pub mod object;
pub mod plane;
pub mod scene;
pub mod scheduler;
pub mod sphere;
pub mod transport;
pub mod triangle;

pub use bvh::{Bvh, BvhError, BvhNode, BvhOptions, NodeKind};
pub use camera::Camera;
pub use cone::Cone;
pub use hit::{Hit, Intersection};
pub use object::{Object, Shape};
pub use plane::Plane;
pub use scene::Scene;
pub use scheduler::{render, row_bands, RenderError, RenderOutput, RenderStats, RowBand, TraceFault};
pub use sphere::Sphere;
pub use transport::{ray_color, RenderConfig, ToneMapping, TraceStats};
pub use triangle::Triangle;

/// Re-export the shared math and scene types
pub use prism_core::{Color, Light, Material, Surface, Texture};
pub use prism_math::{Aabb, Interval, Ray, Transform, Vec3};
