//! High-level engine: walks the grid, samples, tone-maps and emits dots.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::DVec2;
use rand::Rng as RngCore;
use tracing::{info, warn};

use crate::config::HalftoneConfig;
use crate::error::{Error, Result};
use crate::events::{EventSink, HalftoneEvent, HalftoneEventKind};
use crate::field::{BrightnessField, NEUTRAL_GRAY};
use crate::grid::{GridLayout, GridMode, HalftoneGrid, Rect, DEFAULT_MAX_SHAPES};
use crate::render::{Palette, ShapeRenderer};
use crate::shape::Dot;
use crate::tone::ToneMapper;

/// Dots at or below this size are not emitted.
pub const MIN_DOT_SIZE: f64 = 0.5;
/// Rows between two progress events.
pub const DEFAULT_PROGRESS_INTERVAL_ROWS: usize = 10;

/// Shared flag for cooperative cancellation, checked before each row.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears the flag so the same handle can drive another render.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Options that control how a render walks its grid.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// How the grid spacing is determined.
    pub grid_mode: GridMode,
    /// Upper bound on grid cells.
    pub max_shapes: usize,
    /// Rows between progress events.
    pub progress_interval_rows: usize,
    /// Rotate dot positions about the target center by the configured angle.
    pub rotate_lattice: bool,
    /// Optional cancellation handle.
    pub cancel: Option<CancelFlag>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            grid_mode: GridMode::Pitch,
            max_shapes: DEFAULT_MAX_SHAPES,
            progress_interval_rows: DEFAULT_PROGRESS_INTERVAL_ROWS,
            rotate_lattice: false,
            cancel: None,
        }
    }
}

impl EngineOptions {
    pub fn new(grid_mode: GridMode) -> Self {
        Self {
            grid_mode,
            ..Default::default()
        }
    }

    pub fn with_grid_mode(mut self, grid_mode: GridMode) -> Self {
        self.grid_mode = grid_mode;
        self
    }

    pub fn with_max_shapes(mut self, max_shapes: usize) -> Self {
        self.max_shapes = max_shapes;
        self
    }

    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval_rows = rows;
        self
    }

    pub fn with_rotate_lattice(mut self, rotate_lattice: bool) -> Self {
        self.rotate_lattice = rotate_lattice;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validates the options, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_shapes == 0 {
            return Err(Error::InvalidConfig("max_shapes must be > 0".into()));
        }
        if self.progress_interval_rows == 0 {
            return Err(Error::InvalidConfig(
                "progress_interval_rows must be > 0".into(),
            ));
        }
        if let GridMode::FitToBounds { cols, rows } = self.grid_mode {
            if cols == 0 || rows == 0 {
                return Err(Error::InvalidGeometry(format!(
                    "fit-to-bounds grid must be non-empty, got {cols}x{rows}"
                )));
            }
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

/// Summary of one render.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Dots accepted by the renderer.
    pub shapes_created: usize,
    /// Grid cells processed.
    pub cells_visited: usize,
    /// Cells below the threshold or the minimum dot size.
    pub cells_skipped: usize,
    /// Cells whose sample failed and fell back to neutral gray.
    pub sample_failures: usize,
    /// Dots the renderer rejected.
    pub emit_failures: usize,
    /// Grid the render walked.
    pub layout: GridLayout,
}

impl RenderResult {
    fn new(layout: GridLayout) -> Self {
        Self {
            shapes_created: 0,
            cells_visited: 0,
            cells_skipped: 0,
            sample_failures: 0,
            emit_failures: 0,
            layout,
        }
    }

    /// Returns `true` if any cell needed recovery.
    pub fn had_failures(&self) -> bool {
        self.sample_failures > 0 || self.emit_failures > 0
    }
}

/// Reusable engine bound to one configuration.
#[derive(Debug, Clone)]
pub struct HalftoneEngine {
    /// Visual parameters applied to every render.
    pub config: HalftoneConfig,
    /// Grid and control options.
    pub options: EngineOptions,
}

impl HalftoneEngine {
    pub fn try_new(config: HalftoneConfig, options: EngineOptions) -> Result<Self> {
        config.validate()?;
        options.validate()?;
        Ok(Self { config, options })
    }

    pub fn new(config: HalftoneConfig, options: EngineOptions) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid halftone configuration");
        debug_assert!(options.validate().is_ok(), "invalid engine options");
        Self { config, options }
    }

    /// Renders `field` over `target` into `renderer`.
    pub fn render(
        &self,
        field: &dyn BrightnessField,
        target: &Rect,
        renderer: &mut dyn ShapeRenderer,
        rng: &mut impl RngCore,
    ) -> Result<RenderResult> {
        render(
            field,
            target,
            &self.config,
            &self.options,
            renderer,
            rng,
            None,
        )
    }

    pub fn render_with_events(
        &self,
        field: &dyn BrightnessField,
        target: &Rect,
        renderer: &mut dyn ShapeRenderer,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<RenderResult> {
        render(
            field,
            target,
            &self.config,
            &self.options,
            renderer,
            rng,
            Some(sink),
        )
    }
}

pub fn render(
    field: &dyn BrightnessField,
    target: &Rect,
    cfg: &HalftoneConfig,
    options: &EngineOptions,
    renderer: &mut dyn ShapeRenderer,
    rng: &mut dyn RngCore,
    sink: Option<&mut dyn EventSink>,
) -> Result<RenderResult> {
    if let Some(s) = sink {
        render_with_events(field, target, cfg, options, renderer, rng, s)
    } else {
        render_with_events(field, target, cfg, options, renderer, rng, &mut ())
    }
}

/// Renders and reports progress, recovered failures and the final summary to `sink`.
///
/// Fails before the first dot on an invalid configuration or target. Per-cell sample and
/// emit failures are logged, counted and skipped.
pub fn render_with_events(
    field: &dyn BrightnessField,
    target: &Rect,
    cfg: &HalftoneConfig,
    options: &EngineOptions,
    renderer: &mut dyn ShapeRenderer,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> Result<RenderResult> {
    cfg.validate()?;
    options.validate()?;
    target.validate()?;
    let tone = ToneMapper::from_config(cfg)?;

    let layout = HalftoneGrid::new(options.grid_mode)
        .with_max_shapes(options.max_shapes)
        .layout(target.width(), target.height(), cfg)?;

    info!(
        "Halftone render: {} | grid {}x{} | spacing {:.3}x{:.3}{}.",
        cfg.pattern,
        layout.cols,
        layout.rows,
        layout.spacing.x,
        layout.spacing.y,
        if layout.capped { " (capped)" } else { "" },
    );

    if sink.wants(HalftoneEventKind::RenderStarted) {
        sink.send(HalftoneEvent::RenderStarted { layout });
    }

    renderer.set_palette(Palette::for_invert(cfg.invert));

    let cutoff = cfg.threshold_cutoff();
    let angle = cfg.normalized_angle();
    let scale = DVec2::new(cfg.scale_x, cfg.scale_y);
    let density = cfg.density / 100.0;
    let base_size = match layout.mode {
        GridMode::Pitch => cfg.dot_size,
        // dot_size is a multiplier around 10 here; absolute spacing comes from the grid
        GridMode::FitToBounds { .. } => layout.max_cell_size() * cfg.dot_size / 10.0,
    };
    let lattice = options
        .rotate_lattice
        .then(|| DVec2::from_angle(angle.to_radians()));
    let pivot = target.center();

    let mut result = RenderResult::new(layout);

    for row in 0..layout.rows {
        if options.is_cancelled() {
            info!(
                "Halftone render cancelled at row {} after {} shapes.",
                row, result.shapes_created
            );
            return Err(Error::Cancelled {
                shapes_created: result.shapes_created,
            });
        }

        if row % options.progress_interval_rows == 0 && sink.wants(HalftoneEventKind::Progress)
        {
            sink.send(HalftoneEvent::Progress {
                percent: percent_of(row, layout.rows),
            });
        }

        for col in 0..layout.cols {
            result.cells_visited += 1;

            let uv = layout.normalized_center(target, col, row);
            let raw = match field.sample(uv) {
                Ok(v) if v.is_finite() => v,
                outcome => {
                    let message = match outcome {
                        Err(e) => e.to_string(),
                        Ok(v) => format!("non-finite sample {v}"),
                    };
                    warn!(
                        "Sample at cell ({}, {}) failed: {}; using neutral gray.",
                        col, row, message
                    );
                    result.sample_failures += 1;
                    if sink.wants(HalftoneEventKind::SampleFailed) {
                        sink.send(HalftoneEvent::SampleFailed {
                            col,
                            row,
                            uv,
                            message,
                        });
                    }
                    NEUTRAL_GRAY
                }
            };

            let t = tone.map(raw, rng);
            let coverage = if cfg.invert { t } else { 1.0 - t };
            if coverage < cutoff {
                result.cells_skipped += 1;
                continue;
            }

            let size = base_size * coverage * density;
            if size <= MIN_DOT_SIZE {
                result.cells_skipped += 1;
                continue;
            }

            let mut center = layout.cell_center(target, col, row);
            if let Some(rot) = lattice {
                center = pivot + rot.rotate(center - pivot);
            }
            let dot = Dot {
                pattern: cfg.pattern,
                center,
                size,
                scale,
                rotation: angle,
            };

            match renderer.emit(&dot) {
                Ok(()) => result.shapes_created += 1,
                Err(e) => {
                    warn!("Dot at cell ({}, {}) was not emitted: {}.", col, row, e);
                    result.emit_failures += 1;
                    if sink.wants(HalftoneEventKind::EmitFailed) {
                        sink.send(HalftoneEvent::EmitFailed {
                            col,
                            row,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    if sink.wants(HalftoneEventKind::Progress) {
        sink.send(HalftoneEvent::Progress { percent: 100 });
    }

    info!(
        "Halftone render finished: {} shapes, {} skipped, {} sample failures, {} emit failures.",
        result.shapes_created, result.cells_skipped, result.sample_failures, result.emit_failures,
    );

    if sink.wants(HalftoneEventKind::RenderFinished) {
        sink.send(HalftoneEvent::RenderFinished {
            result: result.clone(),
        });
    }

    Ok(result)
}

#[inline]
fn percent_of(row: usize, rows: usize) -> u8 {
    ((row as f64 / rows as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
