#![forbid(unsafe_code)]
//! halftone: Halftone dot-pattern rendering over pluggable brightness fields.
//!
//! Modules:
//! - tone: contrast/brightness/gamma/noise mapping of raw samples
//! - field: brightness sources (dense pixels, sparse grids, uniform fills, gradients)
//! - grid: placement grid with pitch and fit-to-bounds modes and a shape cap
//! - shape: per-pattern dot outlines
//! - render: output surfaces (dot lists, grayscale canvas, SVG)
//! - engine: the per-cell render loop, options, cancellation
//! - events: progress and failure events
//!
//! For examples and docs, see README and docs.rs.
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod field;
pub mod grid;
pub mod render;
pub mod shape;
pub mod tone;

/// Convenient re-exports for common types. Import with `use halftone::prelude::*;`.
pub mod prelude {
    pub use crate::config::{HalftoneConfig, Pattern};
    pub use crate::engine::{
        render, render_with_events, CancelFlag, EngineOptions, HalftoneEngine, RenderResult,
    };
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        EventSink, FnSink, HalftoneEvent, HalftoneEventKind, ProgressSink, VecSink,
    };
    pub use crate::field::{
        luminance, BrightnessField, DensePixelField, FillColor, FnField, PixelAdjustments,
        RadialGradientField, SparseGridField, UniformField, NEUTRAL_GRAY,
    };
    pub use crate::grid::{GridLayout, GridMode, HalftoneGrid, Rect, DEFAULT_MAX_SHAPES};
    pub use crate::render::{Canvas, DotList, FnRenderer, Palette, ShapeRenderer, SvgDocument};
    pub use crate::shape::{Contour, Dot};
    pub use crate::tone::ToneMapper;
}
