//! Render target and image file output.
//!
//! The renderer writes linear colors in [0, 1] through `set_pixel`. Parallel
//! writers take disjoint row views with [`ImageBuffer::split_rows_mut`].

use std::ops::Range;
use std::path::Path;

use thiserror::Error;

use crate::scene::Color;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] ::image::ImageError),
}

/// Image buffer for storing render output.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Split the buffer into disjoint mutable views over row ranges.
    ///
    /// Ranges must be ascending and non-overlapping; rows not covered by any
    /// range are left out.
    pub fn split_rows_mut(&mut self, ranges: &[Range<u32>]) -> Vec<RowsMut<'_>> {
        let width = self.width;
        let mut rest: &mut [Color] = &mut self.pixels;
        let mut consumed = 0;
        let mut views = Vec::with_capacity(ranges.len());

        for range in ranges {
            assert!(
                consumed <= range.start && range.start <= range.end && range.end <= self.height,
                "row range {:?} overlaps or leaves the image (height {})",
                range,
                self.height
            );

            let skip = ((range.start - consumed) * width) as usize;
            let len = ((range.end - range.start) * width) as usize;
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (pixels, tail) = tail.split_at_mut(len);
            rest = tail;
            consumed = range.end;

            views.push(RowsMut {
                first_row: range.start,
                width,
                pixels,
            });
        }

        views
    }

    /// Quantize to 8-bit RGB, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Write the image to disk, format chosen by the file extension.
    ///
    /// `.ppm` writes a binary pixmap.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        ::image::save_buffer(
            path,
            &self.to_rgb8(),
            self.width,
            self.height,
            ::image::ColorType::Rgb8,
        )?;

        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Mutable view over a contiguous block of full image rows.
///
/// Coordinates passed to `set_pixel` are image coordinates, not offsets
/// into the view.
pub struct RowsMut<'a> {
    first_row: u32,
    width: u32,
    pixels: &'a mut [Color],
}

impl RowsMut<'_> {
    /// Image rows covered by this view.
    pub fn rows(&self) -> Range<u32> {
        let height = self.pixels.len() as u32 / self.width.max(1);
        self.first_row..self.first_row + height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Set the pixel at image coordinates (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let local_y = y - self.first_row;
        self.pixels[(local_y * self.width + x) as usize] = color;
    }
}

/// Convert a [0, 1] color to 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
}
