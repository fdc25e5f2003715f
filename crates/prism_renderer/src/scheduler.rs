//! Row-band parallel rendering.
//!
//! The image is cut into contiguous bands of full rows, one per worker.
//! Each band is rendered independently on a rayon pool and writes straight
//! into its own disjoint slice of the output buffer.

use std::any::Any;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use crate::camera::Camera;
use crate::scene::Scene;
use crate::transport::{ray_color, RenderConfig, TraceStats};
use prism_core::{Color, ImageBuffer, RowsMut};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create the render thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single pixel could not be traced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceFault {
    #[error("traced color {0} is not finite")]
    NonFinite(Color),

    #[error("trace panicked: {0}")]
    Panicked(String),
}

/// A contiguous range of image rows rendered as one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    pub index: usize,
    pub start: u32,
    pub end: u32,
}

impl RowBand {
    pub fn rows(&self) -> Range<u32> {
        self.start..self.end
    }

    pub fn height(&self) -> u32 {
        self.end - self.start
    }
}

/// Split `height` rows into `count` bands of equal height.
///
/// The count is capped at the height so no band is empty; the last band
/// absorbs the remainder.
pub fn row_bands(height: u32, count: usize) -> Vec<RowBand> {
    if height == 0 {
        return Vec::new();
    }

    let count = count.clamp(1, height as usize) as u32;
    let per_band = height / count;

    (0..count)
        .map(|i| RowBand {
            index: i as usize,
            start: i * per_band,
            end: if i + 1 == count { height } else { (i + 1) * per_band },
        })
        .collect()
}

/// Counters for a whole render (or one band of it).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub pixels: u64,
    /// Pixels written black after a fault
    pub faults: u64,
    pub bands: usize,
    pub trace: TraceStats,
}

impl RenderStats {
    pub fn merge(&mut self, other: &RenderStats) {
        self.pixels += other.pixels;
        self.faults += other.faults;
        self.bands += other.bands;
        self.trace.merge(&other.trace);
    }
}

/// A finished render.
#[derive(Debug)]
pub struct RenderOutput {
    /// Tone-mapped colors in [0, 1]
    pub image: ImageBuffer,
    pub stats: RenderStats,
}

/// Worker count used when the config leaves it unset.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Render the whole image, blocking until every band has finished.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> Result<RenderOutput, RenderError> {
    let threads = config.threads.unwrap_or_else(default_threads).max(1);
    let bands = row_bands(camera.image_height, threads);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(bands.len().max(1))
        .thread_name(|i| format!("prism-band-{}", i))
        .build()?;

    log::info!(
        "Rendering {}x{} in {} bands, max depth {}",
        camera.image_width,
        camera.image_height,
        bands.len(),
        config.max_depth
    );

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    let ranges: Vec<Range<u32>> = bands.iter().map(RowBand::rows).collect();
    let jobs: Vec<(RowBand, RowsMut<'_>)> = bands.iter().copied().zip(image.split_rows_mut(&ranges)).collect();

    let band_stats: Vec<RenderStats> = pool.install(|| {
        jobs.into_par_iter()
            .map(|(band, mut rows)| render_band(&band, &mut rows, scene, camera, config))
            .collect()
    });

    let mut stats = RenderStats::default();
    for band in &band_stats {
        stats.merge(band);
    }

    if stats.faults > 0 {
        log::warn!("{} of {} pixels faulted and were written black", stats.faults, stats.pixels);
    }
    log::info!(
        "Rendered {} pixels: {} rays, deepest bounce {}",
        stats.pixels,
        stats.trace.rays(),
        stats.trace.deepest
    );

    Ok(RenderOutput { image, stats })
}

/// Render every pixel of one band into its row view.
///
/// A faulting pixel is logged, counted and written black; the rest of the
/// band carries on.
pub fn render_band(
    band: &RowBand,
    rows: &mut RowsMut<'_>,
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
) -> RenderStats {
    let mut stats = RenderStats {
        bands: 1,
        ..Default::default()
    };

    for y in band.rows() {
        for x in 0..rows.width() {
            let color = match trace_pixel(scene, camera, config, x, y, &mut stats.trace) {
                Ok(color) => config.tone_mapping.apply(color),
                Err(fault) => {
                    log::warn!("Pixel ({}, {}): {}; writing black", x, y, fault);
                    stats.faults += 1;
                    Color::ZERO
                }
            };
            rows.set_pixel(x, y, color);
            stats.pixels += 1;
        }
    }

    log::debug!("Band {} (rows {:?}) done", band.index, band.rows());
    stats
}

/// Trace the primary ray of pixel (x, y), before tone mapping.
pub fn trace_pixel(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    x: u32,
    y: u32,
    stats: &mut TraceStats,
) -> Result<Color, TraceFault> {
    let ray = camera.ray_for_pixel(x, y);
    let color = panic::catch_unwind(AssertUnwindSafe(|| {
        ray_color(&ray, scene, config.max_depth, config, stats)
    }))
    .map_err(|payload| TraceFault::Panicked(panic_message(payload.as_ref())))?;

    if !color.is_finite() {
        return Err(TraceFault::NonFinite(color));
    }
    Ok(color)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
