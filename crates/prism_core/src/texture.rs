//! Procedural textures for materials.
//!
//! Textures map surface UV coordinates to a diffuse color. The set is
//! closed so materials stay `Clone + Send + Sync` without trait objects.

use std::f32::consts::TAU;

use prism_math::Vec2;

use crate::scene::Color;

/// A procedural UV texture.
#[derive(Clone, Debug, PartialEq)]
pub enum Texture {
    /// Alternating squares, `scale` squares per UV unit.
    Checkerboard { scale: f32, even: Color, odd: Color },

    /// Diagonal bands cycling through the hue wheel.
    Rainbow { scale: f32 },
}

impl Texture {
    /// Sample the texture at the given UV coordinates.
    pub fn sample(&self, uv: Vec2) -> Color {
        match self {
            Texture::Checkerboard { scale, even, odd } => {
                let cell = (uv.x * scale).floor() + (uv.y * scale).floor();
                if (cell as i64).rem_euclid(2) == 0 {
                    *even
                } else {
                    *odd
                }
            }
            Texture::Rainbow { scale } => {
                let t = (uv.x + uv.y) * scale;
                Color::new(
                    0.5 + 0.5 * (TAU * t).cos(),
                    0.5 + 0.5 * (TAU * (t - 1.0 / 3.0)).cos(),
                    0.5 + 0.5 * (TAU * (t - 2.0 / 3.0)).cos(),
                )
            }
        }
    }
}
