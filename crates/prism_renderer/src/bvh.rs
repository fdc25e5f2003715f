//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over triangles, stored in a flat arena. Each level splits
//! its triangles at the median centroid along one axis, cycling x, y, z by
//! depth. Triangles are kept in local space; an optional transform places
//! the whole tree in the world, which is how a mesh is instanced.

use crate::hit::{Hit, Intersection};
use crate::triangle::Triangle;
use prism_core::{Material, Mesh};
use prism_math::{Aabb, Interval, Ray, Transform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum primitives per leaf node before splitting.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    #[error("Cannot build a BVH over an empty primitive set")]
    EmptyPrimitiveSet,
}

/// Build policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhOptions {
    /// A node with at most this many triangles becomes a leaf
    pub max_leaf_size: usize,
}

impl Default for BvhOptions {
    fn default() -> Self {
        Self {
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
        }
    }
}

/// Whether a node splits further or holds triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Two children, addressed by arena index.
    Internal { left: usize, right: usize },
    /// A contiguous run of `count` triangles starting at `first`.
    Leaf { first: usize, count: usize },
}

/// One node of the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    /// Tight local-space bounds of everything beneath this node
    pub bbox: Aabb,
    /// Distance from the root in edges
    pub level: u32,
    pub kind: NodeKind,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// A BVH over one mesh's triangles, all sharing a material.
///
/// The root is node 0. The tree is read-only once built.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<Triangle>,
    material: Material,
    transform: Option<Transform>,
}

impl Bvh {
    /// Build an untransformed tree with the default policy.
    pub fn build(triangles: Vec<Triangle>, material: Material) -> Result<Self, BvhError> {
        Self::build_with(triangles, material, None, BvhOptions::default())
    }

    /// Build a tree whose triangles are placed in the world by `transform`.
    pub fn build_with(
        mut triangles: Vec<Triangle>,
        material: Material,
        transform: Option<Transform>,
        options: BvhOptions,
    ) -> Result<Self, BvhError> {
        if triangles.is_empty() {
            return Err(BvhError::EmptyPrimitiveSet);
        }

        let max_leaf_size = options.max_leaf_size.max(1);
        // A full binary tree over n leaves has 2n - 1 nodes
        let mut nodes = Vec::with_capacity(2 * triangles.len().div_ceil(max_leaf_size));
        build_recursive(&mut nodes, &mut triangles, 0, 0, max_leaf_size);

        let bvh = Self {
            nodes,
            triangles,
            material,
            transform,
        };

        log::debug!(
            "BVH: {} nodes, {} leaves, depth {}, max leaf size {}",
            bvh.boxes(),
            bvh.leaves(),
            bvh.depth(),
            max_leaf_size
        );
        Ok(bvh)
    }

    /// Build a tree over every triangle of a mesh.
    pub fn from_mesh(
        mesh: &Mesh,
        material: Material,
        transform: Option<Transform>,
        options: BvhOptions,
    ) -> Result<Self, BvhError> {
        let triangles: Vec<Triangle> = mesh.triangles().into_iter().map(Triangle::from).collect();
        let bvh = Self::build_with(triangles, material, transform, options)?;

        log::info!(
            "Built BVH for mesh '{}': {} triangles, {} nodes, depth {}",
            mesh.name,
            bvh.count(),
            bvh.boxes(),
            bvh.depth()
        );
        Ok(bvh)
    }

    /// Find the nearest hit along a world-space ray.
    pub fn trace_ray(&self, ray: &Ray) -> Option<Hit<'_>> {
        let local_ray = match &self.transform {
            Some(transform) => transform.ray_to_local(ray),
            None => *ray,
        };

        let mut best = None;
        self.traverse(0, &local_ray, &mut best);

        let hit = match &self.transform {
            Some(transform) => best?.to_world(transform, ray),
            None => best?,
        };
        Some(hit.with_material(&self.material))
    }

    /// Closest local hit beneath `index`, compared by local `t`.
    ///
    /// World distance along the ray is a fixed positive multiple of local
    /// `t`, so local ordering is world ordering.
    fn traverse(&self, index: usize, ray: &Ray, best: &mut Option<Intersection>) {
        let node = &self.nodes[index];
        let best_t = best.map_or(f32::INFINITY, |hit| hit.distance);
        if !node.bbox.intersect(ray, Interval::POSITIVE.clip_max(best_t)) {
            return;
        }

        match node.kind {
            NodeKind::Internal { left, right } => {
                self.traverse(left, ray, best);
                self.traverse(right, ray, best);
            }
            NodeKind::Leaf { first, count } => {
                for triangle in &self.triangles[first..first + count] {
                    if let Some(hit) = triangle.intersect(ray) {
                        if best.map_or(true, |b| hit.distance < b.distance) {
                            *best = Some(hit);
                        }
                    }
                }
            }
        }
    }

    /// Total node count.
    pub fn boxes(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf node count.
    pub fn leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Total primitive count.
    pub fn count(&self) -> usize {
        self.triangles.len()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// World-space bounds of the whole tree.
    pub fn world_bounds(&self) -> Aabb {
        let local = self.nodes[0].bbox;
        match &self.transform {
            Some(transform) => transform.aabb_to_world(&local),
            None => local,
        }
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Triangles in leaf order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }
}

/// Recursive median-split construction over `triangles`, which starts at
/// `first` in the final triangle array. Returns the new node's index.
fn build_recursive(
    nodes: &mut Vec<BvhNode>,
    triangles: &mut [Triangle],
    first: usize,
    level: u32,
    max_leaf_size: usize,
) -> usize {
    let count = triangles.len();

    if count <= max_leaf_size {
        let bbox = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, t| Aabb::surrounding(&acc, &t.bounding_box()));
        nodes.push(BvhNode {
            bbox,
            level,
            kind: NodeKind::Leaf { first, count },
        });
        return nodes.len() - 1;
    }

    let axis = (level % 3) as usize;
    triangles.sort_unstable_by(|a, b| a.centroid()[axis].total_cmp(&b.centroid()[axis]));

    // Reserve this node's slot so the parent precedes its children
    let index = nodes.len();
    nodes.push(BvhNode {
        bbox: Aabb::EMPTY,
        level,
        kind: NodeKind::Leaf { first, count: 0 },
    });

    // Left half takes the extra triangle when the count is odd
    let mid = count.div_ceil(2);
    let (left_half, right_half) = triangles.split_at_mut(mid);
    let left = build_recursive(nodes, left_half, first, level + 1, max_leaf_size);
    let right = build_recursive(nodes, right_half, first + mid, level + 1, max_leaf_size);

    nodes[index] = BvhNode {
        bbox: Aabb::surrounding(&nodes[left].bbox, &nodes[right].bbox),
        level,
        kind: NodeKind::Internal { left, right },
    };
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;
    use prism_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_triangles(rng: &mut StdRng, n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|_| {
                let center = Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let mut vertex = || {
                    center
                        + Vec3::new(
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-1.0..1.0),
                        )
                };
                Triangle::flat(vertex(), vertex(), vertex())
            })
            .collect()
    }

    fn random_ray(rng: &mut StdRng) -> Ray {
        let origin = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize_or_zero()
            * 30.0;
        let target = Vec3::new(
            rng.gen_range(-8.0..8.0),
            rng.gen_range(-8.0..8.0),
            rng.gen_range(-8.0..8.0),
        );
        Ray::towards(origin, target - origin)
    }

    fn check_invariants(bvh: &Bvh, max_leaf_size: usize) {
        let mut covered = 0;
        for node in bvh.nodes() {
            match node.kind {
                NodeKind::Leaf { first, count } => {
                    assert!(count >= 1 && count <= max_leaf_size);
                    covered += count;
                    for triangle in &bvh.triangles()[first..first + count] {
                        assert!(node.bbox.contains(&triangle.bounding_box()));
                    }
                }
                NodeKind::Internal { left, right } => {
                    let (l, r) = (&bvh.nodes()[left], &bvh.nodes()[right]);
                    assert_eq!(node.bbox, Aabb::surrounding(&l.bbox, &r.bbox));
                    assert_eq!(l.level, node.level + 1);
                    assert_eq!(r.level, node.level + 1);
                }
            }
        }
        // Every triangle is in exactly one leaf
        assert_eq!(covered, bvh.count());
    }

    #[test]
    fn test_empty_set_is_an_error() {
        let result = Bvh::build(Vec::new(), Material::default());
        assert_eq!(result.unwrap_err(), BvhError::EmptyPrimitiveSet);
    }

    #[test]
    fn test_empty_mesh_is_an_error() {
        let result = Bvh::from_mesh(
            &Mesh::empty("nothing"),
            Material::default(),
            None,
            BvhOptions::default(),
        );
        assert!(matches!(result, Err(BvhError::EmptyPrimitiveSet)));
    }

    #[test]
    fn test_single_triangle_is_a_leaf() {
        let tri = Triangle::flat(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(0.0, 1.0, 5.0), Vec3::new(1.0, -1.0, 5.0));
        let bvh = Bvh::build(vec![tri], Material::default()).unwrap();

        assert_eq!(bvh.boxes(), 1);
        assert_eq!(bvh.leaves(), 1);
        assert_eq!(bvh.depth(), 0);
        assert!(bvh.nodes()[0].is_leaf());

        let hit = bvh.trace_ray(&Ray::new(Vec3::ZERO, Vec3::Z)).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_median_split_sizes() {
        let mut rng = StdRng::seed_from_u64(7);
        let bvh = Bvh::build_with(
            random_triangles(&mut rng, 7),
            Material::default(),
            None,
            BvhOptions { max_leaf_size: 3 },
        )
        .unwrap();

        // 7 splits into 4 + 3, and 4 into 2 + 2
        match bvh.nodes()[0].kind {
            NodeKind::Internal { left, right } => {
                assert!(!bvh.nodes()[left].is_leaf());
                assert!(matches!(bvh.nodes()[right].kind, NodeKind::Leaf { count: 3, .. }));
            }
            NodeKind::Leaf { .. } => panic!("root of 7 triangles should split"),
        }
        assert_eq!(bvh.leaves(), 3);
        assert_eq!(bvh.boxes(), 5);
    }

    #[test]
    fn test_invariants_and_depth_bound() {
        let mut rng = StdRng::seed_from_u64(42);

        for &max_leaf_size in &[1, 2, 3, 5] {
            for n in [1, 2, 3, 4, 10, 33, 100, 257] {
                let bvh = Bvh::build_with(
                    random_triangles(&mut rng, n),
                    Material::default(),
                    None,
                    BvhOptions { max_leaf_size },
                )
                .unwrap();

                check_invariants(&bvh, max_leaf_size);
                assert_eq!(bvh.count(), n);

                let bound = (n as f64 / max_leaf_size as f64).log2().ceil().max(0.0) as u32 + 1;
                assert!(
                    bvh.depth() <= bound,
                    "depth {} exceeds {} for n={} leaf={}",
                    bvh.depth(),
                    bound,
                    n,
                    max_leaf_size
                );
            }
        }
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(1234);
        let triangles = random_triangles(&mut rng, 200);
        let bvh = Bvh::build(triangles.clone(), Material::default()).unwrap();

        let mut hits = 0;
        for _ in 0..500 {
            let ray = random_ray(&mut rng);
            let brute = triangles
                .iter()
                .filter_map(|t| t.intersect(&ray))
                .map(|h| h.distance)
                .min_by(f32::total_cmp);
            let fast = bvh.trace_ray(&ray).map(|h| h.distance);

            match (brute, fast) {
                (Some(b), Some(f)) => {
                    assert!((b - f).abs() < 1e-4, "brute {} vs bvh {}", b, f);
                    hits += 1;
                }
                (None, None) => {}
                other => panic!("brute force and BVH disagree: {:?}", other),
            }
        }
        assert!(hits > 0, "test rays should hit something");
    }

    #[test]
    fn test_transformed_tree_matches_transformed_objects() {
        let mut rng = StdRng::seed_from_u64(99);
        let triangles = random_triangles(&mut rng, 120);
        let transform = Transform::from_scale_translation(Vec3::new(0.5, 0.7, 0.6), Vec3::new(1.0, -2.0, 0.5));

        let bvh = Bvh::build_with(
            triangles.clone(),
            Material::default(),
            Some(transform),
            BvhOptions::default(),
        )
        .unwrap();
        let objects: Vec<Object> = triangles
            .iter()
            .map(|t| Object::new(*t, Material::default()).with_transform(transform))
            .collect();

        let mut hits = 0;
        for _ in 0..400 {
            let ray = random_ray(&mut rng);
            let brute = objects
                .iter()
                .filter_map(|o| o.intersect(&ray))
                .map(|h| h.distance)
                .min_by(f32::total_cmp);
            let fast = bvh.trace_ray(&ray);

            match (brute, fast) {
                (Some(b), Some(f)) => {
                    assert!((b - f.distance).abs() < 1e-3, "brute {} vs bvh {}", b, f.distance);
                    assert!((f.point - ray.at(f.distance)).length() < 1e-3);
                    hits += 1;
                }
                (None, None) => {}
                (b, f) => panic!("brute force and BVH disagree: {:?} vs {:?}", b, f.map(|h| h.distance)),
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let tri = Triangle::flat(Vec3::ZERO, Vec3::X, Vec3::Y);
        let bvh = Bvh::build_with(
            vec![tri],
            Material::default(),
            Some(Transform::from_translation(Vec3::new(0.0, 0.0, 10.0))),
            BvhOptions::default(),
        )
        .unwrap();

        let bounds = bvh.world_bounds();
        assert!((bounds.min - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert!((bounds.max - Vec3::new(1.0, 1.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn test_options_from_json() {
        let options: BvhOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, BvhOptions::default());

        let options: BvhOptions = serde_json::from_str(r#"{"max_leaf_size": 8}"#).unwrap();
        assert_eq!(options.max_leaf_size, 8);
    }
}
