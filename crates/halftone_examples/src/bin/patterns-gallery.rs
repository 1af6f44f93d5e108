use glam::DVec2;
use halftone::prelude::*;
use halftone_examples::{gallery_config, init_tracing, save_canvas_png};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let target = Rect::from_size(300.0, 300.0);
    let field = RadialGradientField::new(DVec2::new(0.5, 0.5));

    for pattern in Pattern::ALL {
        let config = gallery_config(pattern);
        let mut canvas = Canvas::for_target(&target)?;
        let mut rng = StdRng::seed_from_u64(1);
        let result = render(
            &field,
            &target,
            &config,
            &EngineOptions::default(),
            &mut canvas,
            &mut rng,
            None,
        )?;
        tracing::info!("{pattern}: {} dots", result.shapes_created);
        save_canvas_png(&canvas, format!("patterns-gallery-{pattern}.png"))?;
    }
    Ok(())
}
