//! Coarse brightness grid with bilinear interpolation.
//!
//! Used when brightness comes from a slow external renderer (a document snapshot, a host
//! application) that can only afford a few thousand samples. Grid points sit on the corners
//! of the unit square: point `(gx, gy)` represents `(gx / (cols - 1), gy / (rows - 1))`.
use glam::DVec2;
use tracing::warn;

use crate::error::{Error, Result};
use crate::field::{clamp_uv, BrightnessField, NEUTRAL_GRAY};

/// Upper bound on grid points per axis when capturing from a host.
pub const MAX_CAPTURE_RESOLUTION: usize = 50;
/// Source units covered by one captured grid point.
pub const CAPTURE_UNITS_PER_SAMPLE: f64 = 10.0;

/// Pre-sampled `cols x rows` brightness values, row-major.
#[derive(Clone, Debug, Default)]
pub struct SparseGridField {
    cols: usize,
    rows: usize,
    data: Vec<f32>,
}

impl SparseGridField {
    /// Creates a grid from row-major values. Values are clamped to [0, 1]; non-finite values
    /// read as neutral gray.
    pub fn new(cols: usize, rows: usize, data: Vec<f32>) -> Result<Self> {
        if cols == 0 || rows == 0 {
            if data.is_empty() {
                return Ok(Self::empty());
            }
            return Err(Error::InvalidGeometry(format!(
                "grid {cols}x{rows} cannot hold {} values",
                data.len()
            )));
        }
        if cols.checked_mul(rows) != Some(data.len()) {
            return Err(Error::InvalidGeometry(format!(
                "grid {cols}x{rows} expects {} values, got {}",
                cols.saturating_mul(rows),
                data.len()
            )));
        }
        let data = data
            .into_iter()
            .map(|v| {
                if v.is_finite() {
                    v.clamp(0.0, 1.0)
                } else {
                    NEUTRAL_GRAY as f32
                }
            })
            .collect();
        Ok(Self { cols, rows, data })
    }

    /// A grid without data; every sample returns [`NEUTRAL_GRAY`].
    pub fn empty() -> Self {
        Self {
            cols: 0,
            rows: 0,
            data: Vec::new(),
        }
    }

    /// Grid resolution for a source of the given extent: one point per
    /// [`CAPTURE_UNITS_PER_SAMPLE`] units, at least 1 and at most [`MAX_CAPTURE_RESOLUTION`].
    pub fn capture_resolution(width: f64, height: f64) -> (usize, usize) {
        let axis = |extent: f64| -> usize {
            if !extent.is_finite() || extent <= 0.0 {
                return 1;
            }
            ((extent / CAPTURE_UNITS_PER_SAMPLE).ceil() as usize).clamp(1, MAX_CAPTURE_RESOLUTION)
        };
        (axis(width), axis(height))
    }

    /// Captures a grid by calling `sample` at each grid point's normalized position.
    ///
    /// A failing or non-finite sample is logged and stores neutral gray for that point instead
    /// of aborting the capture.
    pub fn capture<F>(cols: usize, rows: usize, mut sample: F) -> Result<Self>
    where
        F: FnMut(DVec2) -> Result<f64>,
    {
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidGeometry(format!(
                "capture grid must be non-empty, got {cols}x{rows}"
            )));
        }
        let rel = |i: usize, n: usize| -> f64 {
            if n > 1 {
                i as f64 / (n - 1) as f64
            } else {
                0.0
            }
        };
        let mut data = Vec::with_capacity(cols * rows);
        for gy in 0..rows {
            for gx in 0..cols {
                let v = match sample(DVec2::new(rel(gx, cols), rel(gy, rows))) {
                    Ok(v) if v.is_finite() => v,
                    Ok(v) => {
                        warn!(
                            "Capture at grid point ({}, {}) returned {}; using neutral gray.",
                            gx, gy, v
                        );
                        NEUTRAL_GRAY
                    }
                    Err(e) => {
                        warn!(
                            "Capture at grid point ({}, {}) failed: {}; using neutral gray.",
                            gx, gy, e
                        );
                        NEUTRAL_GRAY
                    }
                };
                data.push(v as f32);
            }
        }
        Self::new(cols, rows, data)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn at(&self, gx: usize, gy: usize) -> f64 {
        self.data[gy * self.cols + gx] as f64
    }
}

impl BrightnessField for SparseGridField {
    fn sample(&self, uv: DVec2) -> Result<f64> {
        if self.data.is_empty() {
            return Ok(NEUTRAL_GRAY);
        }
        let uv = clamp_uv(uv);

        // Continuous coordinates over grid indices [0..cols-1], [0..rows-1]
        let gx = uv.x * (self.cols - 1) as f64;
        let gy = uv.y * (self.rows - 1) as f64;

        let x0 = (gx.floor() as usize).min(self.cols - 1);
        let y0 = (gy.floor() as usize).min(self.rows - 1);
        let x1 = (x0 + 1).min(self.cols - 1);
        let y1 = (y0 + 1).min(self.rows - 1);

        let fx = (gx - x0 as f64).clamp(0.0, 1.0);
        let fy = (gy - y0 as f64).clamp(0.0, 1.0);

        let v0 = self.at(x0, y0) * (1.0 - fx) + self.at(x1, y0) * fx;
        let v1 = self.at(x0, y1) * (1.0 - fx) + self.at(x1, y1) * fx;
        Ok(v0 * (1.0 - fy) + v1 * fy)
    }

    fn grid_shape(&self) -> Option<(usize, usize)> {
        if self.data.is_empty() {
            None
        } else {
            Some((self.cols, self.rows))
        }
    }
}
