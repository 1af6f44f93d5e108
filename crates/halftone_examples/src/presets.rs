//! Render configurations shared by the example binaries.
use halftone::prelude::*;

/// Circles at 45° for photographs: pitch 12, mild contrast and gamma lift, light blur.
pub fn portrait_config() -> HalftoneConfig {
    HalftoneConfig::new(Pattern::Circle)
        .with_dot_size(8.0)
        .with_spacing(1.5)
        .with_angle(45.0)
        .with_contrast(1.2)
        .with_gamma(1.2)
        .with_blur(1.0)
}

/// Gallery settings for one pattern, sized for a 300x300 tile.
pub fn gallery_config(pattern: Pattern) -> HalftoneConfig {
    HalftoneConfig::new(pattern)
        .with_dot_size(14.0)
        .with_spacing(1.2)
        .with_angle(15.0)
        .with_scale(1.2, 0.8)
}
