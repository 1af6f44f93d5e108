//! Shared helpers for the example binaries.
use std::path::Path;

use anyhow::Context;
use halftone::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second call in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Decodes an image file into a brightness field.
pub fn load_field(
    path: impl AsRef<Path>,
    adjustments: &PixelAdjustments,
) -> anyhow::Result<DensePixelField> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("opening {}", path.display()))?;
    let field = DensePixelField::from_image_with(&img, adjustments)?;
    info!(
        "Loaded {} ({}x{}).",
        path.display(),
        field.width(),
        field.height()
    );
    Ok(field)
}

/// Target rectangle matching a field's pixel size.
pub fn target_for(field: &DensePixelField) -> Rect {
    Rect::from_size(field.width() as f64, field.height() as f64)
}

/// A soft-lit sphere on a gradient backdrop, for runs without an input image.
pub fn synthetic_portrait_rgb(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    let (cx, cy) = (width as f64 * 0.45, height as f64 * 0.5);
    let r = width.min(height) as f64 * 0.35;
    for y in 0..height {
        for x in 0..width {
            let backdrop = 0.35 + 0.5 * (y as f64 / height as f64);
            let dx = (x as f64 - cx) / r;
            let dy = (y as f64 - cy) / r;
            let d2 = dx * dx + dy * dy;
            let v = if d2 <= 1.0 {
                // light from the upper left
                let nz = (1.0 - d2).sqrt();
                (0.15 + 0.85 * (-0.5 * dx - 0.5 * dy + 0.7 * nz).max(0.0)).min(1.0)
            } else {
                backdrop
            };
            let g = (v * 255.0).round() as u8;
            data.extend_from_slice(&[g, g, g]);
        }
    }
    data
}

pub fn save_canvas_png(canvas: &Canvas, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    canvas
        .to_gray_image()?
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}.", path.display());
    Ok(())
}

pub fn save_svg(doc: &SvgDocument, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, doc.to_svg_string())
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}.", path.display());
    Ok(())
}
