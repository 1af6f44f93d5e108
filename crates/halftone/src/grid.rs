//! Placement grid over a target rectangle.
//!
//! Two spacing modes are supported:
//! - [`GridMode::Pitch`]: pitch is `dot_size * spacing`, counts are `ceil(extent / pitch)`.
//! - [`GridMode::FitToBounds`]: counts come from outside (usually a pre-sampled brightness
//!   grid) and the spacing per axis is `extent / count`.
//!
//! Both modes honour a shape cap: when `cols * rows` exceeds it, the grid is coarsened until
//! it fits.
use glam::DVec2;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::HalftoneConfig;
use crate::error::{Error, Result};
use crate::field::BrightnessField;

/// Default cap on grid cells per render.
pub const DEFAULT_MAX_SHAPES: usize = 5000;

/// Axis-aligned target rectangle in caller coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Top-left corner.
    pub origin: DVec2,
    /// Width and height.
    pub size: DVec2,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: DVec2::new(x, y),
            size: DVec2::new(width, height),
        }
    }

    /// Builds a rectangle from any `mint`-compatible corner and extent.
    pub fn from_corner(
        origin: impl Into<mint::Point2<f64>>,
        size: impl Into<mint::Vector2<f64>>,
    ) -> Self {
        let origin: mint::Point2<f64> = origin.into();
        let size: mint::Vector2<f64> = size.into();
        Self {
            origin: DVec2::new(origin.x, origin.y),
            size: DVec2::new(size.x, size.y),
        }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size * 0.5
    }

    /// Fails with [`Error::InvalidGeometry`] unless both dimensions are finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.origin.is_finite() {
            return Err(Error::InvalidGeometry("target origin must be finite".into()));
        }
        if !(self.size.x.is_finite() && self.size.x > 0.0)
            || !(self.size.y.is_finite() && self.size.y > 0.0)
        {
            return Err(Error::InvalidGeometry(format!(
                "target size must be > 0 in both components, got {}x{}",
                self.size.x, self.size.y
            )));
        }
        Ok(())
    }
}

/// How the grid spacing is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GridMode {
    /// Spacing is `dot_size * spacing`.
    #[default]
    Pitch,
    /// Cell counts are fixed; spacing stretches to fill the target.
    FitToBounds { cols: usize, rows: usize },
}

impl GridMode {
    /// Fit-to-bounds using the field's native resolution, or pitch mode if it has none.
    pub fn fit_to(field: &dyn BrightnessField) -> Self {
        match field.grid_shape() {
            Some((cols, rows)) => GridMode::FitToBounds { cols, rows },
            None => GridMode::Pitch,
        }
    }

    pub fn is_fit_to_bounds(&self) -> bool {
        matches!(self, GridMode::FitToBounds { .. })
    }
}

/// Resolved grid for one render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub mode: GridMode,
    pub cols: usize,
    pub rows: usize,
    /// Center-to-center distance per axis after capping.
    pub spacing: DVec2,
    /// Spacing before the shape cap was applied.
    pub nominal_spacing: DVec2,
    /// Whether the shape cap coarsened the grid.
    pub capped: bool,
}

impl GridLayout {
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Cell center in target coordinates, offset by half a cell.
    #[inline]
    pub fn cell_center(&self, target: &Rect, col: usize, row: usize) -> DVec2 {
        target.origin + self.cell_offset(col, row)
    }

    /// Cell center mapped into the unit square, clamped to it.
    #[inline]
    pub fn normalized_center(&self, target: &Rect, col: usize, row: usize) -> DVec2 {
        (self.cell_offset(col, row) / target.size).clamp(DVec2::ZERO, DVec2::ONE)
    }

    /// Largest dot that fits a fit-to-bounds cell.
    pub fn max_cell_size(&self) -> f64 {
        0.9 * self.spacing.min_element()
    }

    #[inline]
    fn cell_offset(&self, col: usize, row: usize) -> DVec2 {
        DVec2::new(
            (col as f64 + 0.5) * self.spacing.x,
            (row as f64 + 0.5) * self.spacing.y,
        )
    }
}

/// Grid layout calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalftoneGrid {
    pub mode: GridMode,
    pub max_shapes: usize,
}

impl Default for HalftoneGrid {
    fn default() -> Self {
        Self {
            mode: GridMode::Pitch,
            max_shapes: DEFAULT_MAX_SHAPES,
        }
    }
}

impl HalftoneGrid {
    pub fn new(mode: GridMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_max_shapes(mut self, max_shapes: usize) -> Self {
        self.max_shapes = max_shapes;
        self
    }

    /// Computes columns, rows and spacing for a `width x height` target.
    pub fn layout(&self, width: f64, height: f64, cfg: &HalftoneConfig) -> Result<GridLayout> {
        Rect::from_size(width, height).validate()?;
        if self.max_shapes == 0 {
            return Err(Error::InvalidConfig("max_shapes must be > 0".into()));
        }

        match self.mode {
            GridMode::Pitch => self.pitch_layout(width, height, cfg),
            GridMode::FitToBounds { cols, rows } => self.fit_layout(width, height, cols, rows),
        }
    }

    fn pitch_layout(&self, width: f64, height: f64, cfg: &HalftoneConfig) -> Result<GridLayout> {
        let pitch = cfg.dot_size * cfg.spacing;
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "pitch (dot_size * spacing) must be finite and > 0, got {pitch}"
            )));
        }

        let mut spacing = pitch;
        let mut cols = ceil_count(width, spacing);
        let mut rows = ceil_count(height, spacing);
        let capped = exceeds(cols, rows, self.max_shapes);

        if capped {
            let factor = (self.max_shapes as f64 / (cols as f64 * rows as f64)).sqrt();
            spacing /= factor;
            cols = ceil_count(width, spacing);
            rows = ceil_count(height, spacing);

            // Rounding up can leave a few cells over the cap; widen the pitch just enough to
            // drop one column or one row at a time.
            while exceeds(cols, rows, self.max_shapes) {
                let drop_col = if cols > 1 {
                    width / (cols - 1) as f64
                } else {
                    f64::INFINITY
                };
                let drop_row = if rows > 1 {
                    height / (rows - 1) as f64
                } else {
                    f64::INFINITY
                };
                spacing = drop_col.min(drop_row) * (1.0 + 1e-9);
                cols = ceil_count(width, spacing);
                rows = ceil_count(height, spacing);
            }

            debug!(
                "Shape cap {} reached: pitch {:.3} -> {:.3}, grid {}x{}.",
                self.max_shapes, pitch, spacing, cols, rows
            );
        }

        if cols == 0 || rows == 0 {
            return Err(Error::InvalidGeometry(format!(
                "grid resolved to {cols}x{rows} cells"
            )));
        }

        Ok(GridLayout {
            mode: self.mode,
            cols,
            rows,
            spacing: DVec2::splat(spacing),
            nominal_spacing: DVec2::splat(pitch),
            capped,
        })
    }

    fn fit_layout(&self, width: f64, height: f64, cols: usize, rows: usize) -> Result<GridLayout> {
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidGeometry(format!(
                "fit-to-bounds grid must be non-empty, got {cols}x{rows}"
            )));
        }
        let nominal_spacing = DVec2::new(width / cols as f64, height / rows as f64);

        let (mut c, mut r) = (cols, rows);
        let capped = exceeds(c, r, self.max_shapes);
        if capped {
            let factor = (self.max_shapes as f64 / (c as f64 * r as f64)).sqrt();
            c = ((c as f64 * factor).floor() as usize).max(1);
            r = ((r as f64 * factor).floor() as usize).max(1);
            if exceeds(c, r, self.max_shapes) {
                if c >= r {
                    c = (self.max_shapes / r).max(1);
                } else {
                    r = (self.max_shapes / c).max(1);
                }
            }
            debug!(
                "Shape cap {} reached: grid {}x{} -> {}x{}.",
                self.max_shapes, cols, rows, c, r
            );
        }

        Ok(GridLayout {
            mode: self.mode,
            cols: c,
            rows: r,
            spacing: DVec2::new(width / c as f64, height / r as f64),
            nominal_spacing,
            capped,
        })
    }
}

#[inline]
fn ceil_count(extent: f64, spacing: f64) -> usize {
    let n = (extent / spacing).ceil();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

#[inline]
fn exceeds(cols: usize, rows: usize, max: usize) -> bool {
    cols.checked_mul(rows).is_none_or(|n| n > max)
}
