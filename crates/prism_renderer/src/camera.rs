//! Pinhole camera for primary ray generation.

use prism_math::{Ray, Vec3};

/// A pinhole camera looking down +Z with +Y up.
///
/// The horizontal field of view spans the image width; pixel size is the
/// same in both directions, so the vertical extent follows the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    /// Horizontal field of view in degrees
    fov: f32,
    origin: Vec3,

    // Cached from the above
    pixel_size: f32,
    left: f32,
    top: f32,
}

impl Camera {
    pub fn new(image_width: u32, image_height: u32, fov: f32) -> Self {
        let pixel_size = 2.0 * (0.5 * fov.to_radians()).tan() / image_width.max(1) as f32;
        Self {
            image_width,
            image_height,
            fov,
            origin: Vec3::ZERO,
            pixel_size,
            left: -pixel_size * image_width as f32 / 2.0,
            top: pixel_size * image_height as f32 / 2.0,
        }
    }

    /// Move the eye point; the view direction stays +Z.
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Primary ray through the center of pixel (x, y), row 0 at the top.
    pub fn ray_for_pixel(&self, x: u32, y: u32) -> Ray {
        let s = self.pixel_size;
        let direction = Vec3::new(
            self.left + x as f32 * s + s / 2.0,
            self.top - y as f32 * s - s / 2.0,
            1.0,
        );
        Ray::towards(self.origin, direction)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(512, 384, 90.0)
    }
}
