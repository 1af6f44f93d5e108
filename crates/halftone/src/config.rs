//! Visual parameters for a single halftone render.
//!
//! [`HalftoneConfig`] is immutable for the duration of a render. Construct it with
//! [`HalftoneConfig::default`] and the `with_*` builders, then call
//! [`HalftoneConfig::validate`] (the engine does this for you).
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default base dot diameter.
pub const DEFAULT_DOT_SIZE: f64 = 10.0;
/// Default spacing multiplier applied to the dot size in pitch mode.
pub const DEFAULT_SPACING: f64 = 15.0;
/// Default density in percent.
pub const DEFAULT_DENSITY: f64 = 100.0;
/// Default threshold on the 0..=255 scale.
pub const DEFAULT_THRESHOLD: f64 = 128.0;

/// Shape drawn for each halftone cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Pattern {
    #[default]
    Circle,
    Square,
    Diamond,
    Line,
    Cross,
    Hexagon,
}

impl Pattern {
    /// Every known pattern, in declaration order.
    pub const ALL: [Pattern; 6] = [
        Pattern::Circle,
        Pattern::Square,
        Pattern::Diamond,
        Pattern::Line,
        Pattern::Cross,
        Pattern::Hexagon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Circle => "circle",
            Pattern::Square => "square",
            Pattern::Diamond => "diamond",
            Pattern::Line => "line",
            Pattern::Cross => "cross",
            Pattern::Hexagon => "hexagon",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Pattern::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown pattern '{s}'")))
    }
}

/// Visual parameters of a halftone render.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HalftoneConfig {
    /// Shape drawn per cell.
    pub pattern: Pattern,
    /// Base dot diameter. In fit-to-bounds mode this is a 0..20 multiplier where 10 is neutral.
    pub dot_size: f64,
    /// Pitch multiplier on `dot_size` in pitch mode.
    pub spacing: f64,
    /// Dot size percentage.
    pub density: f64,
    /// Rotation in degrees. Any real value; normalized modulo 360.
    pub angle: f64,
    /// Horizontal shape scale.
    pub scale_x: f64,
    /// Vertical shape scale.
    pub scale_y: f64,
    /// Exponent-domain contrast; values above 1 brighten midtones.
    pub contrast: f64,
    /// Additive brightness in percent.
    pub brightness: f64,
    /// Power-law exponent.
    pub gamma: f64,
    /// Threshold on the 0..=255 scale.
    pub threshold: f64,
    /// Pre-blur radius in source pixels, applied by pixel-backed fields.
    pub blur: f64,
    /// Noise amplitude in percent (0..=100).
    pub noise: f64,
    /// Swap ink and paper.
    pub invert: bool,
}

impl Default for HalftoneConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::Circle,
            dot_size: DEFAULT_DOT_SIZE,
            spacing: DEFAULT_SPACING,
            density: DEFAULT_DENSITY,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            contrast: 1.0,
            brightness: 0.0,
            gamma: 1.0,
            threshold: DEFAULT_THRESHOLD,
            blur: 0.0,
            noise: 0.0,
            invert: false,
        }
    }
}

impl HalftoneConfig {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            ..Default::default()
        }
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_dot_size(mut self, dot_size: f64) -> Self {
        self.dot_size = dot_size;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the non-uniform shape scale.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Rotation normalized into `[0, 360)`.
    pub fn normalized_angle(&self) -> f64 {
        let a = self.angle.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if a >= 360.0 {
            0.0
        } else {
            a
        }
    }

    /// Coverage below which a cell is skipped: half the normalized threshold.
    pub fn threshold_cutoff(&self) -> f64 {
        self.threshold / 255.0 / 2.0
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        positive("dot_size", self.dot_size)?;
        positive("spacing", self.spacing)?;
        positive("contrast", self.contrast)?;
        positive("gamma", self.gamma)?;
        positive("scale_x", self.scale_x)?;
        positive("scale_y", self.scale_y)?;

        if !self.density.is_finite() || self.density < 0.0 {
            return Err(Error::InvalidConfig("density must be >= 0".into()));
        }
        if !self.angle.is_finite() {
            return Err(Error::InvalidConfig("angle must be finite".into()));
        }
        if !self.brightness.is_finite() {
            return Err(Error::InvalidConfig("brightness must be finite".into()));
        }
        if !(0.0..=255.0).contains(&self.threshold) {
            return Err(Error::InvalidConfig(
                "threshold must be within 0..=255".into(),
            ));
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(Error::InvalidConfig("blur must be >= 0".into()));
        }
        if !(0.0..=100.0).contains(&self.noise) {
            return Err(Error::InvalidConfig("noise must be within 0..=100".into()));
        }

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{name} must be > 0")))
    }
}
