//! Brightness sources sampled by the halftone engine.
//!
//! A [`BrightnessField`] answers "what is the tone at normalized position (u, v)" with a
//! value in [0, 1], where 0 is black and 1 is white. Coordinates outside the unit square are
//! clamped to the nearest edge by every implementation in this module.
//!
//! - [`DensePixelField`]: per-pixel luminance from a decoded raster.
//! - [`SparseGridField`]: bilinear interpolation over a coarse pre-sampled grid.
//! - [`UniformField`]: a single tone, e.g. the fill of a vector shape.
//! - [`RadialGradientField`]: procedural fallback when no artwork data exists.
//! - [`FnField`]: adapter for closures.
use std::sync::Arc;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod dense;
pub mod sparse;

pub use dense::{DensePixelField, PixelAdjustments};
pub use sparse::SparseGridField;

/// Tone returned when a source has nothing to offer.
pub const NEUTRAL_GRAY: f64 = 0.5;

/// Read-only source of brightness values over the unit square.
///
/// Implementations must be safe to query concurrently; they are never mutated during a render.
pub trait BrightnessField: Send + Sync {
    /// Samples the brightness at normalized coordinates.
    ///
    /// Errors are treated as recoverable by the engine: the cell falls back to
    /// [`NEUTRAL_GRAY`].
    fn sample(&self, uv: DVec2) -> Result<f64>;

    /// Native `(cols, rows)` resolution when the source dictates the grid shape.
    fn grid_shape(&self) -> Option<(usize, usize)> {
        None
    }
}

impl<F: BrightnessField + ?Sized> BrightnessField for &F {
    fn sample(&self, uv: DVec2) -> Result<f64> {
        (**self).sample(uv)
    }

    fn grid_shape(&self) -> Option<(usize, usize)> {
        (**self).grid_shape()
    }
}

impl<F: BrightnessField + ?Sized> BrightnessField for Box<F> {
    fn sample(&self, uv: DVec2) -> Result<f64> {
        (**self).sample(uv)
    }

    fn grid_shape(&self) -> Option<(usize, usize)> {
        (**self).grid_shape()
    }
}

impl<F: BrightnessField + ?Sized> BrightnessField for Arc<F> {
    fn sample(&self, uv: DVec2) -> Result<f64> {
        (**self).sample(uv)
    }

    fn grid_shape(&self) -> Option<(usize, usize)> {
        (**self).grid_shape()
    }
}

/// Standard luminance of an 8-bit RGB triple, normalized to [0, 1].
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

#[inline]
pub(crate) fn clamp_uv(uv: DVec2) -> DVec2 {
    let u = if uv.x.is_nan() { 0.0 } else { uv.x.clamp(0.0, 1.0) };
    let v = if uv.y.is_nan() { 0.0 } else { uv.y.clamp(0.0, 1.0) };
    DVec2::new(u, v)
}

/// Fill color of a vector shape, as reported by a host document.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillColor {
    /// Components in 0..=255.
    Rgb { red: f64, green: f64, blue: f64 },
    /// Gray level in percent, 100 is white.
    Gray { gray: f64 },
    /// Components in percent.
    Cmyk {
        cyan: f64,
        magenta: f64,
        yellow: f64,
        black: f64,
    },
}

impl FillColor {
    /// Converts the color to a brightness in [0, 1].
    pub fn intensity(&self) -> f64 {
        let v = match *self {
            FillColor::Rgb { red, green, blue } => {
                (0.299 * red + 0.587 * green + 0.114 * blue) / 255.0
            }
            FillColor::Gray { gray } => gray / 100.0,
            FillColor::Cmyk {
                cyan,
                magenta,
                yellow,
                black,
            } => {
                let (c, m, y, k) = (cyan / 100.0, magenta / 100.0, yellow / 100.0, black / 100.0);
                1.0 - ((c * 0.299 + m * 0.587 + y * 0.114) * (1.0 - k) + k).min(1.0)
            }
        };
        if v.is_finite() {
            v.clamp(0.0, 1.0)
        } else {
            NEUTRAL_GRAY
        }
    }
}

/// Field with the same brightness everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformField {
    pub value: f64,
}

impl UniformField {
    pub fn new(value: f64) -> Self {
        let value = if value.is_nan() {
            NEUTRAL_GRAY
        } else {
            value.clamp(0.0, 1.0)
        };
        Self { value }
    }

    /// Brightness of a filled shape; shapes without a fill read as neutral gray.
    pub fn from_fill(fill: Option<FillColor>) -> Self {
        Self::new(fill.map_or(NEUTRAL_GRAY, |f| f.intensity()))
    }
}

impl Default for UniformField {
    fn default() -> Self {
        Self::new(NEUTRAL_GRAY)
    }
}

impl BrightnessField for UniformField {
    fn sample(&self, _uv: DVec2) -> Result<f64> {
        Ok(self.value)
    }
}

/// Distance from the center to a corner of the unit square, rounded as the fallback uses it.
const RADIAL_FALLOFF: f64 = 0.707;

/// Bright at `center`, fading towards the corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGradientField {
    pub center: DVec2,
}

impl RadialGradientField {
    pub fn new(center: DVec2) -> Self {
        Self { center }
    }
}

impl Default for RadialGradientField {
    fn default() -> Self {
        Self::new(DVec2::splat(0.5))
    }
}

impl BrightnessField for RadialGradientField {
    fn sample(&self, uv: DVec2) -> Result<f64> {
        let d = clamp_uv(uv).distance(self.center);
        Ok((1.0 - d / RADIAL_FALLOFF).clamp(0.0, 1.0))
    }
}

/// Field backed by a closure over normalized coordinates.
pub struct FnField<F>
where
    F: Fn(DVec2) -> Result<f64> + Send + Sync,
{
    f: F,
}

impl<F> FnField<F>
where
    F: Fn(DVec2) -> Result<f64> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> BrightnessField for FnField<F>
where
    F: Fn(DVec2) -> Result<f64> + Send + Sync,
{
    #[inline]
    fn sample(&self, uv: DVec2) -> Result<f64> {
        (self.f)(clamp_uv(uv))
    }
}
