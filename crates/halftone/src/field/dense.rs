//! Per-pixel brightness field backed by a decoded raster.
//!
//! Pixels are reduced to a single luminance plane at construction time. Optional
//! [`PixelAdjustments`] run once over the whole buffer (linear contrast and brightness on the
//! RGB channels, then a separable Gaussian blur on the luminance plane), never per sample.
use glam::DVec2;
use tracing::debug;

use crate::config::HalftoneConfig;
use crate::error::{Error, Result};
use crate::field::{clamp_uv, luminance, BrightnessField};

/// Pre-filters applied to a raster before it is sampled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelAdjustments {
    /// Linear contrast in percent around mid-gray; 100 leaves pixels unchanged.
    pub contrast: f64,
    /// Added to every RGB channel, in 0..=255 units.
    pub brightness: f64,
    /// Gaussian blur standard deviation in pixels; 0 disables blurring.
    pub blur: f64,
}

impl Default for PixelAdjustments {
    fn default() -> Self {
        Self {
            contrast: 100.0,
            brightness: 0.0,
            blur: 0.0,
        }
    }
}

impl PixelAdjustments {
    /// Adjustments implied by a render configuration: only the blur radius applies at the
    /// pixel level, tone changes happen in the tone mapper.
    pub fn from_config(cfg: &HalftoneConfig) -> Self {
        Self {
            blur: cfg.blur,
            ..Default::default()
        }
    }

    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    fn has_color_adjustment(&self) -> bool {
        self.contrast != 100.0 || self.brightness != 0.0
    }

    /// Applies contrast then brightness to one channel value.
    #[inline]
    pub fn adjust_channel(&self, c: u8) -> u8 {
        let v = (c as f64 - 128.0) * (self.contrast / 100.0) + 128.0 + self.brightness;
        v.clamp(0.0, 255.0).round() as u8
    }

    fn validate(&self) -> Result<()> {
        if !self.contrast.is_finite() || self.contrast < 0.0 {
            return Err(Error::InvalidConfig("pixel contrast must be >= 0".into()));
        }
        if !self.brightness.is_finite() {
            return Err(Error::InvalidConfig("pixel brightness must be finite".into()));
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(Error::InvalidConfig("blur must be >= 0".into()));
        }
        Ok(())
    }
}

/// Luminance plane sampled with nearest-pixel lookup.
#[derive(Clone, Debug)]
pub struct DensePixelField {
    width: usize,
    height: usize,
    luma: Vec<f32>,
}

impl DensePixelField {
    /// Builds a field from an 8-bit grayscale buffer.
    pub fn from_luma8(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        check_len(width, height, 1, data.len())?;
        let luma = data.iter().map(|&v| v as f32 / 255.0).collect();
        Ok(Self {
            width,
            height,
            luma,
        })
    }

    /// Builds a field from an 8-bit RGB buffer.
    pub fn from_rgb8(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        Self::from_rgb8_with(width, height, data, &PixelAdjustments::default())
    }

    pub fn from_rgb8_with(
        width: usize,
        height: usize,
        data: &[u8],
        adjustments: &PixelAdjustments,
    ) -> Result<Self> {
        check_len(width, height, 3, data.len())?;
        adjustments.validate()?;
        let luma = data
            .chunks_exact(3)
            .map(|px| adjusted_luminance(px[0], px[1], px[2], adjustments))
            .collect();
        Ok(Self {
            width,
            height,
            luma,
        }
        .blurred(adjustments.blur))
    }

    /// Builds a field from an 8-bit RGBA buffer. Translucent pixels are composited over white.
    pub fn from_rgba8(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        Self::from_rgba8_with(width, height, data, &PixelAdjustments::default())
    }

    pub fn from_rgba8_with(
        width: usize,
        height: usize,
        data: &[u8],
        adjustments: &PixelAdjustments,
    ) -> Result<Self> {
        check_len(width, height, 4, data.len())?;
        adjustments.validate()?;
        let luma = data
            .chunks_exact(4)
            .map(|px| {
                let a = px[3] as u32;
                let over_white = |c: u8| -> u8 {
                    if a == 255 {
                        c
                    } else {
                        ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
                    }
                };
                adjusted_luminance(
                    over_white(px[0]),
                    over_white(px[1]),
                    over_white(px[2]),
                    adjustments,
                )
            })
            .collect();
        Ok(Self {
            width,
            height,
            luma,
        }
        .blurred(adjustments.blur))
    }

    /// Builds a field from a decoded image.
    #[cfg(feature = "image")]
    pub fn from_image(img: &image::DynamicImage) -> Result<Self> {
        Self::from_image_with(img, &PixelAdjustments::default())
    }

    #[cfg(feature = "image")]
    pub fn from_image_with(
        img: &image::DynamicImage,
        adjustments: &PixelAdjustments,
    ) -> Result<Self> {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        Self::from_rgba8_with(w as usize, h as usize, rgba.as_raw(), adjustments)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Luminance at pixel `(x, y)`, clamped to the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> f64 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.luma[y * self.width + x] as f64
    }

    /// Returns the field after a Gaussian blur with standard deviation `sigma` in pixels.
    pub fn blurred(mut self, sigma: f64) -> Self {
        if sigma.is_finite() && sigma > 0.0 {
            debug!(
                "Blurring {}x{} luminance plane, sigma {:.2}.",
                self.width, self.height, sigma
            );
            gaussian_blur(&mut self.luma, self.width, self.height, sigma);
        }
        self
    }
}

impl BrightnessField for DensePixelField {
    fn sample(&self, uv: DVec2) -> Result<f64> {
        let uv = clamp_uv(uv);
        let x = ((uv.x * self.width as f64) as usize).min(self.width - 1);
        let y = ((uv.y * self.height as f64) as usize).min(self.height - 1);
        Ok(self.luma[y * self.width + x] as f64)
    }
}

fn check_len(width: usize, height: usize, channels: usize, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidGeometry(format!(
            "pixel buffer must be non-empty, got {width}x{height}"
        )));
    }
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| Error::InvalidGeometry("pixel buffer dimensions overflow".into()))?;
    if expected != len {
        return Err(Error::InvalidGeometry(format!(
            "expected {expected} bytes for {width}x{height}x{channels}, got {len}"
        )));
    }
    Ok(())
}

#[inline]
fn adjusted_luminance(r: u8, g: u8, b: u8, adjustments: &PixelAdjustments) -> f32 {
    if adjustments.has_color_adjustment() {
        luminance(
            adjustments.adjust_channel(r),
            adjustments.adjust_channel(g),
            adjustments.adjust_channel(b),
        ) as f32
    } else {
        luminance(r, g, b) as f32
    }
}

/// Kernel taps never extend past `max_radius`; further taps would only repeat clamped edges.
fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f32> {
    let radius = ((3.0 * sigma).ceil().max(1.0) as usize).min(max_radius.max(1));
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel.into_iter().map(|k| k as f32).collect()
}

/// Separable Gaussian blur with clamped edges: a horizontal pass then a vertical pass.
fn gaussian_blur(data: &mut [f32], width: usize, height: usize, sigma: f64) {
    let kernel = gaussian_kernel(sigma, width.max(height));
    let radius = (kernel.len() / 2) as isize;
    let mut tmp = vec![0.0f32; data.len()];

    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, w) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, width as isize - 1) as usize;
                acc += w * data[row + sx];
            }
            tmp[row + x] = acc;
        }
    }

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, w) in kernel.iter().enumerate() {
                let sy =
                    (y as isize + k as isize - radius).clamp(0, height as isize - 1) as usize;
                acc += w * tmp[sy * width + x];
            }
            data[y * width + x] = acc.clamp(0.0, 1.0);
        }
    }
}
