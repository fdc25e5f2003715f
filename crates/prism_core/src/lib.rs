//! prism core - scene description types and file I/O.
//!
//! This crate provides:
//!
//! - **Scene types**: `Material`, `Surface`, `Texture`, `Light`
//! - **Meshes**: Wavefront OBJ loading into `Mesh` / `MeshTriangle`
//! - **Frames**: the `ImageBuffer` render target and its file writer
//!
//! # Example
//!
//! ```ignore
//! use prism_core::Mesh;
//!
//! let mesh = Mesh::load_obj("models/bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod frame;
pub mod mesh;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use frame::{ImageBuffer, ImageError, RowsMut};
pub use mesh::{Mesh, MeshError, MeshTriangle};
pub use scene::{Color, Light, Material, Surface};
pub use texture::Texture;
