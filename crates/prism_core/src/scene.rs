//! Material and light definitions.
//!
//! These are plain values: the renderer reads them, never mutates them,
//! and shares materials by reference across every primitive that uses them.

use prism_math::{Vec2, Vec3};

use crate::texture::Texture;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// How a surface continues light transport after local shading.
///
/// A surface is exactly one of these; a material cannot both mirror and
/// transmit.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Surface {
    /// Local Phong shading only.
    #[default]
    Diffuse,
    /// Blend of a mirror reflection and local shading.
    Reflective {
        /// Weight of the reflected color, in (0, 1].
        reflection: f32,
    },
    /// Transparent dielectric with Fresnel-weighted reflection and refraction.
    Refractive {
        /// Index of refraction of the medium inside the surface.
        ior: f32,
    },
}

/// A Phong material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Ambient reflectance, multiplied by the scene's ambient light
    pub ambient: Color,

    /// Diffuse reflectance (replaced by `texture` when one is set)
    pub diffuse: Color,

    /// Specular reflectance
    pub specular: Color,

    /// Specular exponent
    pub shininess: f32,

    /// Transport behavior past local shading
    pub surface: Surface,

    /// Procedural diffuse texture
    pub texture: Option<Texture>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::splat(0.05),
            diffuse: Color::splat(0.5), // Grey default
            specular: Color::ZERO,
            shininess: 1.0,
            surface: Surface::Diffuse,
            texture: None,
        }
    }
}

impl Material {
    /// Create a diffuse Phong material.
    pub fn new(ambient: Color, diffuse: Color, specular: Color, shininess: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
            ..Default::default()
        }
    }

    /// Resolve two independently specified coefficients into a surface.
    ///
    /// A positive `reflection` takes precedence: a material with both
    /// coefficients set only reflects. A positive `refraction` is the index
    /// of refraction. Anything else is diffuse.
    pub fn from_coefficients(base: Material, reflection: f32, refraction: f32) -> Self {
        let surface = if reflection > 0.0 {
            Surface::Reflective { reflection }
        } else if refraction > 0.0 {
            Surface::Refractive { ior: refraction }
        } else {
            Surface::Diffuse
        };
        Self { surface, ..base }
    }

    /// Turn this material into a mirror with the given reflection weight.
    pub fn reflective(self, reflection: f32) -> Self {
        Self {
            surface: Surface::Reflective { reflection },
            ..self
        }
    }

    /// Turn this material into a dielectric with the given index of refraction.
    pub fn refractive(self, ior: f32) -> Self {
        Self {
            surface: Surface::Refractive { ior },
            ..self
        }
    }

    pub fn with_texture(self, texture: Texture) -> Self {
        Self {
            texture: Some(texture),
            ..self
        }
    }

    /// Diffuse color at the given texture coordinates.
    pub fn diffuse_at(&self, uv: Vec2) -> Color {
        match &self.texture {
            Some(texture) => texture.sample(uv),
            None => self.diffuse,
        }
    }
}

/// A point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    /// Color scaled by intensity; attenuated by inverse-square distance.
    pub color: Color,
}

impl Light {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}
