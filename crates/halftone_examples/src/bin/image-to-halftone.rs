use halftone::prelude::*;
use halftone_examples::{
    init_tracing, load_field, portrait_config, save_canvas_png, save_svg, synthetic_portrait_rgb,
    target_for,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = portrait_config();
    let adjustments = PixelAdjustments::from_config(&config);

    let field = match std::env::args().nth(1) {
        Some(path) => load_field(path, &adjustments)?,
        None => {
            let (w, h) = (480, 320);
            DensePixelField::from_rgb8_with(w, h, &synthetic_portrait_rgb(w, h), &adjustments)?
        }
    };
    let target = target_for(&field);

    let engine = HalftoneEngine::try_new(config, EngineOptions::default())?;

    let mut dots = DotList::new();
    let mut rng = StdRng::seed_from_u64(7);
    let result = engine.render(&field, &target, &mut dots, &mut rng)?;
    tracing::info!(
        "{} dots over {}x{} cells.",
        result.shapes_created,
        result.layout.cols,
        result.layout.rows
    );

    // replay the same dots into both surfaces so PNG and SVG match exactly
    let mut canvas = Canvas::for_target(&target)?;
    canvas.set_palette(dots.palette());
    dots.replay(&mut canvas)?;
    save_canvas_png(&canvas, "image-to-halftone.png")?;

    let mut svg = SvgDocument::new(target)?;
    svg.set_palette(dots.palette());
    dots.replay(&mut svg)?;
    save_svg(&svg, "image-to-halftone.svg")?;

    Ok(())
}
