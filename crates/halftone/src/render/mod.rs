//! Output surfaces for emitted dots.
//!
//! The engine hands every dot to a [`ShapeRenderer`]. The fill tone is chosen once per batch
//! through [`ShapeRenderer::set_palette`], never per dot.
use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shape::Dot;

pub mod canvas;
pub mod svg;

pub use canvas::Canvas;
pub use svg::SvgDocument;

/// Ink and paper tones for a batch of dots, as 8-bit gray levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Palette {
    pub ink: u8,
    pub paper: u8,
}

impl Palette {
    /// Black ink on white paper.
    pub const BLACK_ON_WHITE: Self = Self {
        ink: 0,
        paper: 255,
    };
    /// White ink on black paper.
    pub const WHITE_ON_BLACK: Self = Self {
        ink: 255,
        paper: 0,
    };

    /// Palette matching the `invert` flag of a render.
    pub fn for_invert(invert: bool) -> Self {
        if invert {
            Self::WHITE_ON_BLACK
        } else {
            Self::BLACK_ON_WHITE
        }
    }

    /// Ink as a `#rrggbb` color.
    pub fn ink_hex(&self) -> String {
        gray_hex(self.ink)
    }

    /// Paper as a `#rrggbb` color.
    pub fn paper_hex(&self) -> String {
        gray_hex(self.paper)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::BLACK_ON_WHITE
    }
}

fn gray_hex(level: u8) -> String {
    format!("#{level:02x}{level:02x}{level:02x}")
}

/// Receives the dots of a render.
///
/// Errors returned from [`ShapeRenderer::emit`] are recoverable: the engine skips the dot and
/// continues with the next cell.
pub trait ShapeRenderer {
    /// Sets the tones used for the following dots.
    fn set_palette(&mut self, _palette: Palette) {}

    fn emit(&mut self, dot: &Dot) -> Result<()>;
}

impl<R: ShapeRenderer + ?Sized> ShapeRenderer for &mut R {
    fn set_palette(&mut self, palette: Palette) {
        (**self).set_palette(palette);
    }

    fn emit(&mut self, dot: &Dot) -> Result<()> {
        (**self).emit(dot)
    }
}

impl<R: ShapeRenderer + ?Sized> ShapeRenderer for Box<R> {
    fn set_palette(&mut self, palette: Palette) {
        (**self).set_palette(palette);
    }

    fn emit(&mut self, dot: &Dot) -> Result<()> {
        (**self).emit(dot)
    }
}

/// Discards every dot.
impl ShapeRenderer for () {
    #[inline]
    fn emit(&mut self, _dot: &Dot) -> Result<()> {
        Ok(())
    }
}

/// Records emitted dots in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DotList {
    dots: Vec<Dot>,
    palette: Palette,
}

impl DotList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            dots: Vec::with_capacity(cap),
            palette: Palette::default(),
        }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn into_inner(self) -> Vec<Dot> {
        self.dots
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Dot centers as `mint` points.
    pub fn centers(&self) -> Vec<mint::Point2<f64>> {
        self.dots.iter().map(|d| d.center.into()).collect()
    }

    /// Sum of dot sizes, a cheap proxy for ink usage.
    pub fn total_size(&self) -> f64 {
        self.dots.iter().map(|d| d.size).sum()
    }

    /// Replays the recorded dots into another renderer.
    pub fn replay(&self, target: &mut dyn ShapeRenderer) -> Result<()> {
        target.set_palette(self.palette);
        for dot in &self.dots {
            target.emit(dot)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.dots.clear();
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }
}

impl ShapeRenderer for DotList {
    fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    #[inline]
    fn emit(&mut self, dot: &Dot) -> Result<()> {
        self.dots.push(*dot);
        Ok(())
    }
}

/// Renderer backed by a closure.
pub struct FnRenderer<F>
where
    F: FnMut(&Dot) -> Result<()>,
{
    f: F,
}

impl<F> FnRenderer<F>
where
    F: FnMut(&Dot) -> Result<()>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ShapeRenderer for FnRenderer<F>
where
    F: FnMut(&Dot) -> Result<()>,
{
    #[inline]
    fn emit(&mut self, dot: &Dot) -> Result<()> {
        (self.f)(dot)
    }
}

/// Half-open index range of pixels whose centers fall inside `[lo, hi)`, clipped to `len`.
#[inline]
pub(crate) fn pixel_span(lo: f64, hi: f64, len: u32) -> Option<(u32, u32)> {
    let start = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().min(len as f64);
    if start < end {
        Some((start as u32, end as u32))
    } else {
        None
    }
}

/// Bounding box of a point set as `(min, max)`.
pub(crate) fn bounds_of(points: &[DVec2]) -> (DVec2, DVec2) {
    points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(lo, hi), &p| (lo.min(p), hi.max(p)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pattern;
    use crate::error::Error;

    #[test]
    fn palette_follows_invert_flag() {
        assert_eq!(Palette::for_invert(false), Palette::BLACK_ON_WHITE);
        assert_eq!(Palette::for_invert(true).ink, 255);
        assert_eq!(Palette::BLACK_ON_WHITE.ink_hex(), "#000000");
        assert_eq!(Palette::BLACK_ON_WHITE.paper_hex(), "#ffffff");
    }

    #[test]
    fn dot_list_records_in_order_and_replays() {
        let mut list = DotList::new();
        list.set_palette(Palette::WHITE_ON_BLACK);
        list.emit(&Dot::new(Pattern::Circle, DVec2::new(1.0, 2.0), 3.0))
            .unwrap();
        list.emit(&Dot::new(Pattern::Square, DVec2::new(4.0, 5.0), 1.0))
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.total_size(), 4.0);
        assert_eq!(list.centers()[1], mint::Point2 { x: 4.0, y: 5.0 });

        let mut copy = DotList::new();
        list.replay(&mut copy).unwrap();
        assert_eq!(copy, list);
    }

    #[test]
    fn fn_renderer_forwards_errors() {
        let mut renderer =
            FnRenderer::new(|_dot: &Dot| Err(Error::ShapeEmitFailure("rejected".into())));
        let dot = Dot::new(Pattern::Circle, DVec2::ZERO, 1.0);
        assert!(matches!(
            renderer.emit(&dot),
            Err(Error::ShapeEmitFailure(_))
        ));
    }

    #[test]
    fn pixel_span_selects_covered_centers() {
        assert_eq!(pixel_span(0.0, 1.0, 10), Some((0, 1)));
        assert_eq!(pixel_span(0.6, 1.4, 10), None);
        assert_eq!(pixel_span(-5.0, 2.5, 10), Some((0, 2)));
        assert_eq!(pixel_span(8.2, 40.0, 10), Some((8, 10)));
    }
}
