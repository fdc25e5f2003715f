//! prism: render the demo scene to an image file.

mod options;
mod scene;
mod settings;

use std::time::Instant;

use anyhow::{ensure, Context, Result};
use prism_renderer::Camera;

use crate::options::CliOptions;
use crate::settings::Settings;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = options::parse_args(std::env::args().collect())?;
    if options.help {
        println!("usage: {}", CliOptions::message());
        return Ok(());
    }

    let settings = Settings::resolve(&options)?;
    ensure!(
        settings.width > 0 && settings.height > 0,
        "Image size must be positive, got {}x{}",
        settings.width,
        settings.height
    );

    log::info!(
        "Starting prism: {}x{}, fov {} degrees",
        settings.width,
        settings.height,
        settings.fov
    );

    let scene = scene::build_scene(&settings);
    let camera = Camera::new(settings.width, settings.height, settings.fov);

    let start = Instant::now();
    let output = prism_renderer::render(&scene, &camera, &settings.render).context("Render failed")?;
    let seconds = start.elapsed().as_secs_f64().max(f64::EPSILON);

    let stats = &output.stats;
    println!("It took {:.3} seconds to render the image.", seconds);
    println!("I could render at {:.3} frames per second.", 1.0 / seconds);
    println!(
        "Traced {} rays ({:.2} Mrays/s) over {} bands, {} faulted pixels.",
        stats.trace.rays(),
        stats.trace.rays() as f64 / seconds / 1.0e6,
        stats.bands,
        stats.faults
    );

    output
        .image
        .save(&settings.output)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;

    Ok(())
}
