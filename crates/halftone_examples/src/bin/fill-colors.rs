use halftone::prelude::*;
use halftone_examples::{init_tracing, save_canvas_png};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let fills = [
        ("rgb-orange", Some(FillColor::Rgb { red: 240.0, green: 140.0, blue: 30.0 })),
        ("gray-30", Some(FillColor::Gray { gray: 30.0 })),
        (
            "cmyk-teal",
            Some(FillColor::Cmyk { cyan: 80.0, magenta: 10.0, yellow: 40.0, black: 20.0 }),
        ),
        ("none", None),
    ];

    let target = Rect::from_size(200.0, 120.0);
    let config = HalftoneConfig::new(Pattern::Square).with_angle(30.0);

    for (name, fill) in fills {
        let field = UniformField::from_fill(fill);
        let mut canvas = Canvas::for_target(&target)?;
        let mut rng = StdRng::seed_from_u64(0);
        let result = render(
            &field,
            &target,
            &config,
            &EngineOptions::default(),
            &mut canvas,
            &mut rng,
            None,
        )?;
        tracing::info!(
            "{name}: intensity {:.3}, {} dots",
            fill.map_or(NEUTRAL_GRAY, |f| f.intensity()),
            result.shapes_created
        );
        save_canvas_png(&canvas, format!("fill-colors-{name}.png"))?;
    }
    Ok(())
}
