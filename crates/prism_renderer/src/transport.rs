//! Whitted-style light transport.
//!
//! Implements recursive ray tracing with:
//! - Phong direct lighting with hard shadows
//! - Mirror reflection
//! - Refraction weighted by the Fresnel equations
//! - Exposure and gamma tone mapping

use crate::hit::Hit;
use crate::scene::Scene;
use prism_core::{Color, Surface};
use prism_math::{Ray, Vec3};
use serde::{Deserialize, Serialize};

/// Exposure and gamma applied once per pixel: `clamp(alpha * I^gamma, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMapping {
    pub alpha: f32,
    pub gamma: f32,
}

impl Default for ToneMapping {
    fn default() -> Self {
        Self {
            alpha: 12.0,
            gamma: 0.5,
        }
    }
}

impl ToneMapping {
    pub fn apply(&self, intensity: Color) -> Color {
        (self.alpha * intensity.powf(self.gamma)).clamp(Color::ZERO, Color::ONE)
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum number of reflection/refraction bounces
    pub max_depth: u32,
    /// Color of rays that escape the scene
    pub background: Color,
    /// Worker count, defaults to the available parallelism
    pub threads: Option<usize>,
    pub tone_mapping: ToneMapping,
    /// Shadow ray origin offset along the light direction
    pub shadow_bias: f32,
    /// Reflected/refracted ray origin offset along the new direction
    pub secondary_bias: f32,
    /// Floor for the inverse-square light falloff distance
    pub min_light_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            background: Color::ZERO,
            threads: None,
            tone_mapping: ToneMapping::default(),
            shadow_bias: 0.01,
            secondary_bias: 0.001,
            min_light_distance: 0.1,
        }
    }
}

/// Counters gathered while tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// `ray_color` invocations
    pub calls: u64,
    /// Shadow rays cast towards lights
    pub shadow_rays: u64,
    /// Deepest bounce reached, 0 for primary rays
    pub deepest: u32,
}

impl TraceStats {
    pub fn merge(&mut self, other: &TraceStats) {
        self.calls += other.calls;
        self.shadow_rays += other.shadow_rays;
        self.deepest = self.deepest.max(other.deepest);
    }

    /// Every ray cast, primary, secondary and shadow.
    pub fn rays(&self) -> u64 {
        self.calls + self.shadow_rays
    }
}

/// Compute the color seen by a ray.
///
/// `depth` is the number of bounces still allowed; callers start at
/// `config.max_depth`. At depth 0 only local shading is returned.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    stats: &mut TraceStats,
) -> Color {
    stats.calls += 1;
    stats.deepest = stats.deepest.max(config.max_depth.saturating_sub(depth));

    let Some(hit) = scene.nearest_hit(ray) else {
        return config.background;
    };

    // Arriving from behind the surface means the ray travels inside the medium
    let inside = hit.normal.dot(-ray.direction) < 0.0;
    let normal = if inside { -hit.normal } else { hit.normal };

    stats.shadow_rays += scene.lights.len() as u64;
    let local = local_shading(scene, &hit, normal, -ray.direction, config);
    if depth == 0 {
        return local;
    }

    let mut trace = |direction: Vec3| {
        let secondary = Ray::new(hit.point + direction * config.secondary_bias, direction);
        ray_color(&secondary, scene, depth - 1, config, stats)
    };

    match hit.material.surface {
        Surface::Diffuse => local,
        Surface::Reflective { reflection } => {
            let reflected = trace(reflect(ray.direction, normal));
            reflection * reflected + (1.0 - reflection) * local
        }
        Surface::Refractive { ior } => {
            let (n1, n2) = if inside { (ior, 1.0) } else { (1.0, ior) };
            let reflect_dir = reflect(ray.direction, normal);

            match refract(ray.direction, normal, n1 / n2) {
                Some(refract_dir) => {
                    let f = fresnel_factor(reflect_dir, refract_dir, normal, n1, n2);
                    let reflected = trace(reflect_dir);
                    let refracted = trace(refract_dir);
                    f * reflected + (1.0 - f) * refracted
                }
                // Total internal reflection
                None => trace(reflect_dir),
            }
        }
    }
}

/// Phong shading at a hit from every unoccluded light, plus ambient.
///
/// `normal` is already oriented against the incoming ray and `view` points
/// from the hit back towards the viewer. The result is clamped to [0, 1].
pub fn local_shading(
    scene: &Scene,
    hit: &Hit<'_>,
    normal: Vec3,
    view: Vec3,
    config: &RenderConfig,
) -> Color {
    let material = hit.material;
    let diffuse_color = material.diffuse_at(hit.uv);
    let mut color = Color::ZERO;

    for light in &scene.lights {
        let to_light = light.position - hit.point;
        let light_dir = to_light.normalize_or_zero();
        let r = to_light.length().max(config.min_light_distance);

        let shadow_ray = Ray::new(hit.point + light_dir * config.shadow_bias, light_dir);
        if scene.occluded(&shadow_ray, r) {
            continue;
        }

        let reflected = reflect(-light_dir, normal);
        let n_dot_l = normal.dot(light_dir).clamp(0.0, 1.0);
        let v_dot_r = view.dot(reflected).clamp(0.0, 1.0);

        let diffuse = diffuse_color * n_dot_l;
        let specular = material.specular * v_dot_r.powf(material.shininess);
        color += light.color * (diffuse + specular) / (r * r);
    }

    color += scene.ambient * material.ambient;
    color.clamp(Color::ZERO, Color::ONE)
}

/// Mirror `incident` about `normal`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// Bend `incident` through a boundary with relative index `eta = n1 / n2`.
///
/// `normal` must face against `incident`. Returns `None` on total internal
/// reflection.
pub fn refract(incident: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = normal.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * incident - (eta * cos_i + k.sqrt()) * normal)
}

/// Unpolarized Fresnel reflectance from the reflected and refracted directions.
pub fn fresnel_factor(reflect_dir: Vec3, refract_dir: Vec3, normal: Vec3, n1: f32, n2: f32) -> f32 {
    let cos1 = normal.dot(reflect_dir);
    let cos2 = (-normal).dot(refract_dir);

    let a = ((n1 * cos1 - n2 * cos2) / (n1 * cos1 + n2 * cos2)).powi(2);
    let b = ((n1 * cos2 - n2 * cos1) / (n1 * cos2 + n2 * cos1)).powi(2);

    0.5 * (a + b)
}
