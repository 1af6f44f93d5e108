//! 8-bit grayscale raster surface.
//!
//! Outlines are filled by scanline at pixel centers: a pixel is inked when its center lies
//! inside the contour. Ellipses are flattened to polygons first.
use glam::DVec2;

use crate::error::{Error, Result};
use crate::grid::Rect;
use crate::render::{bounds_of, pixel_span, Palette, ShapeRenderer};
use crate::shape::{Contour, Dot};

/// Maximum distance between a flattened ellipse chord and the true curve, in pixels.
pub const DEFAULT_FLATTEN_TOLERANCE: f64 = 0.1;

/// Grayscale raster with one byte per pixel, row-major.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Target-space position of the top-left pixel corner.
    origin: DVec2,
    pixels: Vec<u8>,
    palette: Palette,
    tolerance: f64,
    touched: bool,
    crossings: Vec<f64>,
}

impl Canvas {
    /// Creates a canvas filled with the default paper tone.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        let palette = Palette::default();
        Ok(Self {
            width,
            height,
            origin: DVec2::ZERO,
            pixels: vec![palette.paper; width as usize * height as usize],
            palette,
            tolerance: DEFAULT_FLATTEN_TOLERANCE,
            touched: false,
            crossings: Vec::new(),
        })
    }

    /// Canvas covering `target` at one pixel per unit.
    pub fn for_target(target: &Rect) -> Result<Self> {
        target.validate()?;
        let w = target.width().ceil();
        let h = target.height().ceil();
        if w > u32::MAX as f64 || h > u32::MAX as f64 {
            return Err(Error::InvalidGeometry(format!(
                "target {w}x{h} is too large for a canvas"
            )));
        }
        Ok(Self::new(w as u32, h as u32)?.with_origin(target.origin))
    }

    pub fn with_origin(mut self, origin: DVec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_flatten_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Number of pixels carrying the ink tone.
    pub fn inked_pixels(&self) -> usize {
        if self.palette.ink == self.palette.paper {
            return 0;
        }
        self.pixels.iter().filter(|&&p| p == self.palette.ink).count()
    }

    /// Repaints every pixel with the paper tone.
    pub fn clear(&mut self) {
        self.pixels.fill(self.palette.paper);
        self.touched = false;
    }

    /// Fills a closed polygon given in target coordinates.
    pub fn fill_polygon(&mut self, points: &[DVec2]) -> Result<()> {
        if points.len() < 3 {
            return Ok(());
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::ShapeEmitFailure(
                "polygon has non-finite vertices".into(),
            ));
        }
        let local: Vec<DVec2> = points.iter().map(|&p| p - self.origin).collect();
        let (lo, hi) = bounds_of(&local);
        let Some((y0, y1)) = pixel_span(lo.y, hi.y, self.height) else {
            return Ok(());
        };

        let n = local.len();
        let ink = self.palette.ink;
        for py in y0..y1 {
            let yc = py as f64 + 0.5;
            self.crossings.clear();
            for i in 0..n {
                let a = local[i];
                let b = local[(i + 1) % n];
                // half-open so shared vertices are counted once
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    let t = (yc - a.y) / (b.y - a.y);
                    self.crossings.push(a.x + t * (b.x - a.x));
                }
            }
            self.crossings.sort_by(f64::total_cmp);
            let row = py as usize * self.width as usize;
            for pair in self.crossings.chunks_exact(2) {
                if let Some((x0, x1)) = pixel_span(pair[0], pair[1], self.width) {
                    self.pixels[row + x0 as usize..row + x1 as usize].fill(ink);
                }
            }
        }
        self.touched = true;
        Ok(())
    }

    /// Fills one contour.
    pub fn fill_contour(&mut self, contour: &Contour) -> Result<()> {
        if !contour.is_finite() {
            return Err(Error::ShapeEmitFailure(
                "contour has non-finite geometry".into(),
            ));
        }
        self.fill_polygon(&contour.flatten(self.tolerance))
    }

    /// Converts the canvas into an `image` grayscale buffer.
    #[cfg(feature = "image")]
    pub fn to_gray_image(&self) -> Result<image::GrayImage> {
        image::GrayImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(
            || Error::Other(format!("pixel buffer does not match {}x{}", self.width, self.height)),
        )
    }
}

impl ShapeRenderer for Canvas {
    /// Switches tones; a canvas nothing was drawn on yet is repainted with the new paper.
    fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        if !self.touched {
            self.pixels.fill(palette.paper);
        }
    }

    fn emit(&mut self, dot: &Dot) -> Result<()> {
        if !dot.is_finite() {
            return Err(Error::ShapeEmitFailure(format!(
                "non-finite dot at ({}, {})",
                dot.center.x, dot.center.y
            )));
        }
        for contour in dot.contours() {
            self.fill_contour(&contour)?;
        }
        Ok(())
    }
}
