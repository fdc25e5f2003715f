//! The read-only world a render traces against.

use crate::bvh::Bvh;
use crate::hit::{closer, Hit};
use crate::object::Object;
use prism_core::{Color, Light};
use prism_math::Ray;

/// Top-level objects, BVH-accelerated meshes, lights and ambient light.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub objects: Vec<Object>,
    pub meshes: Vec<Bvh>,
    pub lights: Vec<Light>,
    pub ambient: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn add_mesh(&mut self, bvh: Bvh) {
        self.meshes.push(bvh);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Closest hit over every object and every mesh.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        let objects = self
            .objects
            .iter()
            .fold(None, |best, object| closer(best, object.intersect(ray)));

        self.meshes
            .iter()
            .fold(objects, |best, bvh| closer(best, bvh.trace_ray(ray)))
    }

    /// True when something lies strictly closer than `max_distance`.
    pub fn occluded(&self, ray: &Ray, max_distance: f32) -> bool {
        self.objects
            .iter()
            .filter_map(|object| object.intersect(ray))
            .chain(self.meshes.iter().filter_map(|bvh| bvh.trace_ray(ray)))
            .any(|hit| hit.distance < max_distance)
    }

    /// Total triangles across all meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Bvh::count).sum()
    }
}
