use glam::DVec2;
use halftone::prelude::*;
use halftone_examples::{init_tracing, save_svg};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stands in for a host document that reports colors under a point.
fn host_color_at(p: DVec2) -> Result<f64> {
    // a hole in the artwork where the host has nothing to report
    if p.distance(DVec2::new(0.7, 0.3)) < 0.1 {
        return Err(Error::SampleFailure(format!(
            "no artwork at ({:.2}, {:.2})",
            p.x, p.y
        )));
    }
    let stripes = (p.x * 6.0 * std::f64::consts::PI).sin() * 0.25;
    Ok((0.5 + stripes + 0.25 * p.y).clamp(0.0, 1.0))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let target = Rect::new(40.0, 20.0, 400.0, 250.0);
    let (cols, rows) = SparseGridField::capture_resolution(target.width(), target.height());
    let field = SparseGridField::capture(cols, rows, host_color_at)?;
    tracing::info!("Captured {}x{} samples.", field.cols(), field.rows());

    let config = HalftoneConfig::new(Pattern::Hexagon)
        .with_dot_size(9.0)
        .with_threshold(40.0)
        .with_noise(10.0);
    let options = EngineOptions::new(GridMode::fit_to(&field)).with_progress_interval(5);

    let mut svg = SvgDocument::new(target)?;
    let mut sink = FnSink::new(|event| match event {
        HalftoneEvent::Progress { percent } => tracing::info!("{percent}%"),
        HalftoneEvent::RenderFinished { result } => {
            tracing::info!(
                "Finished: {} shapes, {} skipped.",
                result.shapes_created,
                result.cells_skipped
            )
        }
        _ => {}
    });
    let mut rng = StdRng::seed_from_u64(99);
    render(
        &field,
        &target,
        &config,
        &options,
        &mut svg,
        &mut rng,
        Some(&mut sink),
    )?;

    save_svg(&svg, "sparse-grid-capture.svg")?;
    Ok(())
}
