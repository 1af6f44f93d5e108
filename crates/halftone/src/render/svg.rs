//! SVG output surface.
use glam::DVec2;
use svg::node::element::path::Data;
use svg::node::element::{Ellipse, Path, Rectangle};
use svg::{Document, Node};

use crate::error::{Error, Result};
use crate::grid::Rect;
use crate::render::{Palette, ShapeRenderer};
use crate::shape::{Contour, Dot};

/// Accumulates dots as SVG elements over a fixed view box.
#[derive(Debug)]
pub struct SvgDocument {
    view: Rect,
    palette: Palette,
    document: Document,
    elements: usize,
}

impl SvgDocument {
    pub fn new(view: Rect) -> Result<Self> {
        view.validate()?;
        let palette = Palette::default();
        Ok(Self {
            view,
            palette,
            document: Self::blank(&view, palette),
            elements: 0,
        })
    }

    fn blank(view: &Rect, palette: Palette) -> Document {
        let background = Rectangle::new()
            .set("x", view.origin.x)
            .set("y", view.origin.y)
            .set("width", view.width())
            .set("height", view.height())
            .set("fill", palette.paper_hex());
        Document::new()
            .set(
                "viewBox",
                (view.origin.x, view.origin.y, view.width(), view.height()),
            )
            .set("width", view.width())
            .set("height", view.height())
            .add(background)
    }

    pub fn view(&self) -> Rect {
        self.view
    }

    /// Number of shape elements added so far; a cross counts twice.
    pub fn element_count(&self) -> usize {
        self.elements
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Serializes the document.
    pub fn to_svg_string(&self) -> String {
        self.document.to_string()
    }

    fn push(&mut self, contour: &Contour) {
        let fill = self.palette.ink_hex();
        match contour {
            Contour::Ellipse {
                center,
                radii,
                rotation,
            } => {
                let mut el = Ellipse::new()
                    .set("cx", center.x)
                    .set("cy", center.y)
                    .set("rx", radii.x.abs())
                    .set("ry", radii.y.abs())
                    .set("fill", fill);
                if *rotation != 0.0 {
                    el = el.set(
                        "transform",
                        format!(
                            "rotate({} {} {})",
                            rotation.to_degrees(),
                            center.x,
                            center.y
                        ),
                    );
                }
                self.document.append(el);
            }
            Contour::Polygon(points) => self.document.append(
                Path::new()
                    .set("fill", fill)
                    .set("d", polygon_data(points)),
            ),
        }
        self.elements += 1;
    }
}

fn polygon_data(points: &[DVec2]) -> Data {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Data::new();
    };
    let mut data = Data::new().move_to((first.x as f32, first.y as f32));
    for p in iter {
        data = data.line_to((p.x as f32, p.y as f32));
    }
    data.close()
}

impl ShapeRenderer for SvgDocument {
    /// Changing the palette before the first dot also repaints the background.
    fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        if self.elements == 0 {
            self.document = Self::blank(&self.view, palette);
        }
    }

    fn emit(&mut self, dot: &Dot) -> Result<()> {
        let contours = dot.contours();
        if !dot.is_finite() || contours.iter().any(|c| !c.is_finite()) {
            return Err(Error::ShapeEmitFailure(format!(
                "non-finite dot at ({}, {})",
                dot.center.x, dot.center.y
            )));
        }
        for contour in &contours {
            self.push(contour);
        }
        Ok(())
    }
}
