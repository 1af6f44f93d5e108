//! Dot outlines for each [`Pattern`].
//!
//! Every pattern is a unit outline scaled by half the dot size, then by the non-uniform
//! `(scale_x, scale_y)`, then rotated about its own center, then translated to the cell
//! center. The cross is two overlapping bars rather than a merged outline; fill-only
//! surfaces render the overlap identically.
use std::f64::consts::{FRAC_PI_3, TAU};

use glam::DVec2;

use crate::config::Pattern;

/// Thickness of line and cross bars relative to the dot size.
pub const BAR_THICKNESS: f64 = 0.4;

/// One halftone shape, fully resolved in target coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub pattern: Pattern,
    pub center: DVec2,
    /// Diameter before non-uniform scaling.
    pub size: f64,
    pub scale: DVec2,
    /// Rotation in degrees about `center`.
    pub rotation: f64,
}

/// Closed outline ready to be filled.
#[derive(Clone, Debug, PartialEq)]
pub enum Contour {
    Ellipse {
        center: DVec2,
        radii: DVec2,
        /// Radians.
        rotation: f64,
    },
    Polygon(Vec<DVec2>),
}

impl Dot {
    pub fn new(pattern: Pattern, center: DVec2, size: f64) -> Self {
        Self {
            pattern,
            center,
            size,
            scale: DVec2::ONE,
            rotation: 0.0,
        }
    }

    pub fn with_scale(mut self, scale: DVec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Returns `true` if every coordinate of the dot is finite.
    pub fn is_finite(&self) -> bool {
        self.center.is_finite()
            && self.size.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
    }

    /// Maps a point of the unit outline into target coordinates.
    #[inline]
    pub fn transform(&self, unit: DVec2) -> DVec2 {
        let local = unit * (self.size * 0.5) * self.scale;
        self.center + DVec2::from_angle(self.rotation.to_radians()).rotate(local)
    }

    /// Outline of the dot as one or more closed contours.
    pub fn contours(&self) -> Vec<Contour> {
        match self.pattern {
            Pattern::Circle => vec![Contour::Ellipse {
                center: self.center,
                radii: self.scale * (self.size * 0.5),
                rotation: self.rotation.to_radians(),
            }],
            Pattern::Square => vec![self.polygon(&rect_corners(1.0, 1.0))],
            Pattern::Diamond => vec![self.polygon(&[
                DVec2::new(0.0, -1.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.0, 1.0),
                DVec2::new(-1.0, 0.0),
            ])],
            Pattern::Line => vec![self.polygon(&rect_corners(1.0, BAR_THICKNESS))],
            Pattern::Cross => vec![
                self.polygon(&rect_corners(BAR_THICKNESS, 1.0)),
                self.polygon(&rect_corners(1.0, BAR_THICKNESS)),
            ],
            Pattern::Hexagon => {
                let unit: Vec<DVec2> = (0..6)
                    .map(|i| DVec2::from_angle(i as f64 * FRAC_PI_3))
                    .collect();
                vec![self.polygon(&unit)]
            }
        }
    }

    fn polygon(&self, unit: &[DVec2]) -> Contour {
        Contour::Polygon(unit.iter().map(|&p| self.transform(p)).collect())
    }
}

/// Corners of a centered rectangle with the given unit half-extents.
fn rect_corners(half_w: f64, half_h: f64) -> [DVec2; 4] {
    [
        DVec2::new(-half_w, -half_h),
        DVec2::new(half_w, -half_h),
        DVec2::new(half_w, half_h),
        DVec2::new(-half_w, half_h),
    ]
}

impl Contour {
    /// Vertices of the contour; ellipses are approximated so no chord strays more than
    /// `tolerance` from the true curve.
    pub fn flatten(&self, tolerance: f64) -> Vec<DVec2> {
        match self {
            Contour::Polygon(points) => points.clone(),
            Contour::Ellipse {
                center,
                radii,
                rotation,
            } => {
                let r = radii.abs().max_element();
                let tol = if tolerance.is_finite() && tolerance > 0.0 {
                    tolerance
                } else {
                    0.25
                };
                let segments = if r <= tol {
                    8
                } else {
                    let step = 2.0 * (1.0 - tol / r).acos();
                    ((TAU / step).ceil() as usize).clamp(8, 512)
                };
                let rot = DVec2::from_angle(*rotation);
                (0..segments)
                    .map(|i| {
                        let t = TAU * i as f64 / segments as f64;
                        *center + rot.rotate(DVec2::new(radii.x * t.cos(), radii.y * t.sin()))
                    })
                    .collect()
            }
        }
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        match self {
            Contour::Polygon(points) => points.iter().fold(
                (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
                |(lo, hi), &p| (lo.min(p), hi.max(p)),
            ),
            Contour::Ellipse {
                center,
                radii,
                rotation,
            } => {
                let (s, c) = rotation.sin_cos();
                let ext = DVec2::new(
                    ((radii.x * c).powi(2) + (radii.y * s).powi(2)).sqrt(),
                    ((radii.x * s).powi(2) + (radii.y * c).powi(2)).sqrt(),
                );
                (*center - ext, *center + ext)
            }
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Contour::Polygon(points) => points.iter().all(|p| p.is_finite()),
            Contour::Ellipse {
                center,
                radii,
                rotation,
            } => center.is_finite() && radii.is_finite() && rotation.is_finite(),
        }
    }
}
