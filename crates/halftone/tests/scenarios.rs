use glam::DVec2;
use halftone::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng() -> StdRng {
    StdRng::seed_from_u64(0x4A1F)
}

fn render_dots(
    field: &dyn BrightnessField,
    target: Rect,
    cfg: &HalftoneConfig,
    options: &EngineOptions,
) -> (RenderResult, DotList) {
    let mut dots = DotList::new();
    let result = render(field, &target, cfg, options, &mut dots, &mut rng(), None)
        .expect("render succeeds");
    (result, dots)
}

#[test]
fn uniform_gray_with_defaults_yields_single_cell() {
    let cfg = HalftoneConfig::default();
    let (result, dots) = render_dots(
        &UniformField::new(0.5),
        Rect::from_size(100.0, 100.0),
        &cfg,
        &EngineOptions::default(),
    );

    // pitch 10 * 15 = 150, ceil(100 / 150) = 1 per axis
    assert_eq!(result.layout.cols, 1);
    assert_eq!(result.layout.rows, 1);
    assert_eq!(result.shapes_created, 1);
    let dot = dots.dots()[0];
    assert_eq!(dot.pattern, Pattern::Circle);
    assert_eq!(dot.size, 5.0);
    assert_eq!(dot.center, DVec2::new(75.0, 75.0));
}

#[test]
fn black_field_draws_every_dot_at_full_size() {
    let cfg = HalftoneConfig::default()
        .with_threshold(128.0)
        .with_density(80.0);
    let (result, dots) = render_dots(
        &UniformField::new(0.0),
        Rect::from_size(450.0, 300.0),
        &cfg,
        &EngineOptions::default(),
    );

    assert_eq!(result.cells_visited, 6);
    assert_eq!(result.cells_skipped, 0);
    assert_eq!(result.shapes_created, 6);
    for dot in dots.dots() {
        assert!((dot.size - cfg.dot_size * cfg.density / 100.0).abs() < 1e-12);
    }
}

#[test]
fn white_field_is_skipped_by_threshold() {
    let (result, dots) = render_dots(
        &UniformField::new(1.0),
        Rect::from_size(300.0, 300.0),
        &HalftoneConfig::default(),
        &EngineOptions::default(),
    );
    assert_eq!(result.shapes_created, 0);
    assert_eq!(result.cells_skipped, result.cells_visited);
    assert!(dots.is_empty());
}

#[test]
fn rotated_hexagon_matches_closed_form() {
    let cfg = HalftoneConfig::new(Pattern::Hexagon)
        .with_angle(30.0)
        .with_dot_size(8.0)
        .with_spacing(2.0);
    let (_, dots) = render_dots(
        &UniformField::new(0.25),
        Rect::from_size(16.0, 16.0),
        &cfg,
        &EngineOptions::default(),
    );
    assert_eq!(dots.len(), 1);

    let dot = dots.dots()[0];
    let radius = dot.size / 2.0;
    let contours = dot.contours();
    let Contour::Polygon(vertices) = &contours[0] else {
        panic!("hexagon must be a polygon");
    };
    assert_eq!(vertices.len(), 6);
    for (k, v) in vertices.iter().enumerate() {
        let theta = (k as f64 * 60.0 + 30.0).to_radians();
        let expected = dot.center + radius * DVec2::new(theta.cos(), theta.sin());
        assert!(
            (v.x - expected.x).abs() < 1e-6 && (v.y - expected.y).abs() < 1e-6,
            "vertex {k}: {v:?} != {expected:?}"
        );
    }
}

#[test]
fn shape_cap_coarsens_huge_grids() {
    let cfg = HalftoneConfig::default()
        .with_dot_size(1.0)
        .with_spacing(1.0);
    let (result, dots) = render_dots(
        &UniformField::new(0.0),
        Rect::from_size(2000.0, 2000.0),
        &cfg,
        &EngineOptions::default(),
    );

    let layout = result.layout;
    assert!(layout.capped);
    assert!(layout.cell_count() <= DEFAULT_MAX_SHAPES);
    assert!(result.shapes_created <= DEFAULT_MAX_SHAPES);
    assert!(layout.spacing.x > layout.nominal_spacing.x);

    // dots keep their configured size while the pitch grows, so they shrink relative to it
    let nominal_ratio = cfg.dot_size / layout.nominal_spacing.x;
    for dot in dots.dots() {
        assert!(dot.size / layout.spacing.x < nominal_ratio);
    }
}

#[test]
fn custom_cap_is_respected() {
    let cfg = HalftoneConfig::default()
        .with_dot_size(1.0)
        .with_spacing(1.0);
    let options = EngineOptions::default().with_max_shapes(137);
    let (result, _) = render_dots(
        &UniformField::new(0.0),
        Rect::from_size(640.0, 480.0),
        &cfg,
        &options,
    );
    assert!(result.layout.cell_count() <= 137);
    assert!(result.shapes_created <= 137);
}

#[test]
fn rendering_is_idempotent_with_seeded_noise() {
    let field = FnField::new(|uv: DVec2| Ok(0.2 + 0.6 * uv.x * uv.y));
    let cfg = HalftoneConfig::new(Pattern::Square)
        .with_dot_size(4.0)
        .with_spacing(1.5)
        .with_noise(40.0)
        .with_angle(12.0);
    let target = Rect::from_size(120.0, 90.0);

    let (first, a) = render_dots(&field, target, &cfg, &EngineOptions::default());
    let (second, b) = render_dots(&field, target, &cfg, &EngineOptions::default());
    assert_eq!(first.shapes_created, second.shapes_created);
    assert_eq!(a.dots(), b.dots());
}

#[test]
fn half_unit_dots_are_excluded_and_anything_larger_is_kept() {
    let field = UniformField::new(0.5);
    let target = Rect::from_size(10.0, 10.0);

    let exact = HalftoneConfig::default()
        .with_dot_size(1.0)
        .with_spacing(10.0);
    let (result, _) = render_dots(&field, target, &exact, &EngineOptions::default());
    assert_eq!(result.shapes_created, 0);
    assert_eq!(result.cells_skipped, 1);

    let above = HalftoneConfig::default()
        .with_dot_size(1.000_000_02)
        .with_spacing(10.0);
    let (result, dots) = render_dots(&field, target, &above, &EngineOptions::default());
    assert_eq!(result.shapes_created, 1);
    assert!(dots.dots()[0].size > 0.5);
}

#[test]
fn invert_commutes_with_field_complement() {
    let shade = |uv: DVec2| 0.7 * uv.x + 0.3 * uv.y;
    let field = FnField::new(move |uv: DVec2| Ok(shade(uv)));
    let complement = FnField::new(move |uv: DVec2| Ok(1.0 - shade(uv)));

    for pattern in Pattern::ALL {
        let cfg = HalftoneConfig::new(pattern)
            .with_dot_size(6.0)
            .with_spacing(1.2)
            .with_angle(45.0);
        let target = Rect::from_size(200.0, 140.0);

        let (plain, a) = render_dots(&field, target, &cfg, &EngineOptions::default());
        let (inverted, b) = render_dots(
            &complement,
            target,
            &cfg.clone().with_invert(true),
            &EngineOptions::default(),
        );

        assert_eq!(plain.shapes_created, inverted.shapes_created);
        assert_eq!(a.dots(), b.dots());
        assert_ne!(a.palette(), b.palette());
    }
}

#[test]
fn progress_stream_is_monotonic_and_terminates_at_100() {
    let cfg = HalftoneConfig::default()
        .with_dot_size(2.0)
        .with_spacing(1.0);
    let mut seen = Vec::new();
    {
        let mut sink = ProgressSink::new(|p| seen.push(p));
        render(
            &RadialGradientField::default(),
            &Rect::from_size(100.0, 95.0),
            &cfg,
            &EngineOptions::default(),
            &mut DotList::new(),
            &mut rng(),
            Some(&mut sink),
        )
        .expect("render succeeds");
    }

    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    // 48 rows: 0, 10, 20, 30, 40 plus completion
    assert_eq!(seen.len(), 6);
}

#[test]
fn per_cell_failures_do_not_abort_the_render() {
    let field = FnField::new(|uv: DVec2| {
        if uv.y > 0.5 {
            Err(Error::SampleFailure("snapshot missing".into()))
        } else {
            Ok(0.1)
        }
    });
    let mut emitted = 0usize;
    let mut renderer = FnRenderer::new(|dot: &Dot| {
        if dot.center.x < 10.0 {
            return Err(Error::ShapeEmitFailure("layer locked".into()));
        }
        emitted += 1;
        Ok(())
    });
    let cfg = HalftoneConfig::default()
        .with_dot_size(4.0)
        .with_spacing(2.5);
    let mut sink = VecSink::new();
    let result = render(
        &field,
        &Rect::from_size(40.0, 40.0),
        &cfg,
        &EngineOptions::default(),
        &mut renderer,
        &mut rng(),
        Some(&mut sink),
    )
    .expect("recoverable failures keep the render alive");

    // 4x4 grid, lower two rows fail to sample, first column is rejected
    assert_eq!(result.cells_visited, 16);
    assert_eq!(result.sample_failures, 8);
    assert_eq!(result.emit_failures, 4);
    assert_eq!(result.shapes_created, 12);
    assert!(matches!(
        sink.as_slice().last(),
        Some(HalftoneEvent::RenderFinished { .. })
    ));
    drop(renderer);
    assert_eq!(emitted, 12);
}

#[test]
fn fatal_errors_surface_before_any_dot() {
    let field = UniformField::new(0.0);
    let mut dots = DotList::new();

    for target in [
        Rect::from_size(0.0, 10.0),
        Rect::from_size(10.0, -1.0),
        Rect::from_size(f64::NAN, 10.0),
    ] {
        let err = render(
            &field,
            &target,
            &HalftoneConfig::default(),
            &EngineOptions::default(),
            &mut dots,
            &mut rng(),
            None,
        )
        .expect_err("degenerate target");
        assert!(matches!(err, Error::InvalidGeometry(_)), "{err}");
    }

    for cfg in [
        HalftoneConfig::default().with_contrast(0.0),
        HalftoneConfig::default().with_gamma(-1.0),
        HalftoneConfig::default().with_dot_size(0.0),
        HalftoneConfig::default().with_spacing(-2.0),
    ] {
        let err = render(
            &field,
            &Rect::from_size(10.0, 10.0),
            &cfg,
            &EngineOptions::default(),
            &mut dots,
            &mut rng(),
            None,
        )
        .expect_err("invalid configuration");
        assert!(matches!(err, Error::InvalidConfig(_)), "{err}");
    }

    assert!("star".parse::<Pattern>().is_err());
    assert!(dots.is_empty());
}

#[test]
fn captured_sparse_grid_drives_fit_to_bounds_render() {
    let (cols, rows) = SparseGridField::capture_resolution(120.0, 60.0);
    assert_eq!((cols, rows), (12, 6));
    let grid = SparseGridField::capture(cols, rows, |uv| Ok(uv.x)).expect("capture");
    let options = EngineOptions::new(GridMode::fit_to(&grid));

    let (result, dots) = render_dots(
        &grid,
        Rect::new(10.0, 20.0, 120.0, 60.0),
        &HalftoneConfig::default(),
        &options,
    );
    assert_eq!(result.layout.cols, 12);
    assert_eq!(result.layout.rows, 6);
    assert_eq!(result.layout.spacing, DVec2::new(10.0, 10.0));
    // darker on the left, so sizes shrink left to right along a row
    let row: Vec<f64> = dots
        .dots()
        .iter()
        .filter(|d| d.center.y == 25.0)
        .map(|d| d.size)
        .collect();
    assert!(!row.is_empty());
    assert!(row.windows(2).all(|w| w[0] > w[1]));
    assert!(row[0] <= 9.0);
}

#[test]
fn dense_pixels_render_onto_canvas() {
    let (w, h) = (40usize, 20usize);
    let mut rgb = Vec::with_capacity(w * h * 3);
    for _y in 0..h {
        for x in 0..w {
            let v = if x < w / 2 { 0 } else { 255 };
            rgb.extend_from_slice(&[v, v, v]);
        }
    }
    let field = DensePixelField::from_rgb8(w, h, &rgb).expect("valid buffer");
    let cfg = HalftoneConfig::new(Pattern::Square)
        .with_dot_size(4.0)
        .with_spacing(1.25);
    let target = Rect::from_size(40.0, 20.0);
    let mut canvas = Canvas::for_target(&target).expect("canvas");
    let result = render(
        &field,
        &target,
        &cfg,
        &EngineOptions::default(),
        &mut canvas,
        &mut rng(),
        None,
    )
    .expect("render succeeds");

    // 8x4 grid, only the dark half gets ink
    assert_eq!(result.shapes_created, 16);
    assert_eq!(canvas.inked_pixels(), 16 * 16);
    assert_eq!(canvas.pixel(2, 2), Some(0));
    assert_eq!(canvas.pixel(30, 10), Some(255));
}

#[test]
fn svg_output_contains_one_element_per_bar() {
    let cfg = HalftoneConfig::new(Pattern::Cross)
        .with_dot_size(5.0)
        .with_spacing(2.0);
    let target = Rect::from_size(30.0, 20.0);
    let mut svg = SvgDocument::new(target).expect("svg");
    let result = render(
        &UniformField::new(0.0),
        &target,
        &cfg,
        &EngineOptions::default(),
        &mut svg,
        &mut rng(),
        None,
    )
    .expect("render succeeds");

    assert_eq!(result.shapes_created, 6);
    assert_eq!(svg.element_count(), 12);
    assert_eq!(svg.to_svg_string().matches("<path").count(), 12);
}
