//! Triangle mesh geometry and Wavefront OBJ loading.
//!
//! Meshes are loaded with `tobj` (triangulated, single index buffer) and
//! handed to the renderer as a flat list of [`MeshTriangle`]s.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use prism_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur while loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Could not open mesh file {}", .path.display())]
    UnreadableMeshFile {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Failed to parse mesh {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}

/// One triangle with its three positions and three vertex normals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTriangle {
    pub positions: [Vec3; 3],
    pub normals: [Vec3; 3],
}

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Object name from the `o` record, or the file stem
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, parallel to `positions` when present
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
    ) -> Self {
        let bounds = Aabb::enclosing(&positions);
        Self {
            name: name.into(),
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// A mesh with no geometry.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new(), None)
    }

    /// Load an OBJ file.
    ///
    /// Every object in the file is merged into one mesh.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(path, &load_options()).map_err(|source| {
            match source {
                tobj::LoadError::OpenFileFailed => MeshError::UnreadableMeshFile {
                    path: path.to_path_buf(),
                    source,
                },
                _ => MeshError::Parse {
                    path: path.to_path_buf(),
                    source,
                },
            }
        })?;

        let fallback = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mesh = Self::from_models(&models, fallback);

        log::info!(
            "Loaded mesh '{}' from {}: {} vertices, {} triangles, normals: {}",
            mesh.name,
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.has_normals()
        );
        Ok(mesh)
    }

    /// Load an OBJ file, degrading to an empty mesh if it cannot be read.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_obj(path) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::warn!("{}; continuing with an empty mesh", err);
                Self::empty(path.to_string_lossy())
            }
        }
    }

    /// Parse OBJ text from a reader. Material libraries are ignored.
    pub fn read_obj(reader: &mut impl BufRead, name: &str) -> Result<Self, MeshError> {
        let (models, _materials) =
            tobj::load_obj_buf(reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
                .map_err(|source| MeshError::Parse {
                    path: PathBuf::from(name),
                    source,
                })?;

        Ok(Self::from_models(&models, name.to_string()))
    }

    fn from_models(models: &[tobj::Model], fallback_name: String) -> Self {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();
        let mut all_have_normals = !models.is_empty();

        for model in models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;

            positions.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));
            if mesh.normals.len() == mesh.positions.len() {
                normals.extend(mesh.normals.chunks_exact(3).map(Vec3::from_slice));
            } else {
                all_have_normals = false;
            }
            indices.extend(mesh.indices.iter().map(|i| base + i));
        }

        let name = models
            .iter()
            .map(|m| m.name.as_str())
            .find(|n| !n.is_empty() && *n != "unnamed_object")
            .map(str::to_string)
            .unwrap_or(fallback_name);

        let normals = (all_have_normals && !normals.is_empty()).then_some(normals);
        Self::new(name, positions, indices, normals)
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Extract triangles with per-vertex normals.
    ///
    /// Without vertex normals every vertex gets the triangle's face normal
    /// (counter-clockwise winding), which shades the triangle flat.
    /// Triangles with out-of-range indices are skipped.
    pub fn triangles(&self) -> Vec<MeshTriangle> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];

            // Bounds check
            if i0 >= self.positions.len()
                || i1 >= self.positions.len()
                || i2 >= self.positions.len()
            {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    i0,
                    i1,
                    i2,
                    self.positions.len()
                );
                continue;
            }

            let positions = [self.positions[i0], self.positions[i1], self.positions[i2]];
            let normals = match &self.normals {
                Some(normals) => [normals[i0], normals[i1], normals[i2]],
                None => {
                    let face = (positions[1] - positions[0])
                        .cross(positions[2] - positions[0])
                        .normalize_or_zero();
                    [face; 3]
                }
            };

            triangles.push(MeshTriangle { positions, normals });
        }

        triangles
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}
