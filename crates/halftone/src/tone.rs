//! Tone mapping of raw brightness samples.
//!
//! The pipeline order is fixed: contrast, brightness, gamma, noise, clamp. Reordering the
//! steps changes the rendered output.
use rand::Rng as RngCore;

use crate::config::HalftoneConfig;
use crate::error::{Error, Result};

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u32() as f64) / ((u32::MAX as f64) + 1.0)
}

/// Contrast/brightness/gamma/noise transform applied to each sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneMapper {
    contrast: f64,
    brightness: f64,
    gamma: f64,
    noise: f64,
}

impl ToneMapper {
    /// Creates a mapper from explicit parameters.
    ///
    /// `brightness` and `noise` are percentages. Fails with [`Error::InvalidConfig`] when
    /// `contrast` or `gamma` is not strictly positive.
    pub fn new(contrast: f64, brightness: f64, gamma: f64, noise: f64) -> Result<Self> {
        if !(contrast.is_finite() && contrast > 0.0) {
            return Err(Error::InvalidConfig("contrast must be > 0".into()));
        }
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(Error::InvalidConfig("gamma must be > 0".into()));
        }
        Ok(Self {
            contrast,
            brightness: if brightness.is_finite() { brightness } else { 0.0 },
            gamma,
            noise: noise.clamp(0.0, 100.0),
        })
    }

    pub fn from_config(cfg: &HalftoneConfig) -> Result<Self> {
        Self::new(cfg.contrast, cfg.brightness, cfg.gamma, cfg.noise)
    }

    /// Returns `true` when mapping consumes randomness.
    pub fn is_noisy(&self) -> bool {
        self.noise > 0.0
    }

    /// Maps a raw sample to a tone in [0, 1].
    ///
    /// The generator is only consulted when noise is enabled, so noise-free renders do not
    /// advance it.
    pub fn map(&self, raw: f64, rng: &mut dyn RngCore) -> f64 {
        let mut v = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };

        v = v.powf(1.0 / self.contrast);
        v += self.brightness / 100.0;
        v = v.clamp(0.0, 1.0).powf(self.gamma);

        if self.noise > 0.0 {
            v += (rand01(rng) - 0.5) * self.noise / 100.0;
        }

        if v.is_nan() {
            return 0.0;
        }
        v.clamp(0.0, 1.0)
    }
}

impl Default for ToneMapper {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            brightness: 0.0,
            gamma: 1.0,
            noise: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn identity_mapping_with_defaults() {
        let tm = ToneMapper::default();
        let mut rng = StdRng::seed_from_u64(1);
        for v in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert!(approx(tm.map(v, &mut rng), v));
        }
    }

    #[test]
    fn contrast_is_an_inverse_exponent() {
        let tm = ToneMapper::new(2.0, 0.0, 1.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(approx(tm.map(0.25, &mut rng), 0.5));
    }

    #[test]
    fn brightness_applies_before_gamma() {
        // (0.5 + 0.1)^2, not 0.5^2 + 0.1
        let tm = ToneMapper::new(1.0, 10.0, 2.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(approx(tm.map(0.5, &mut rng), 0.36));
    }

    #[test]
    fn gamma_clamps_its_input() {
        let tm = ToneMapper::new(1.0, 80.0, 2.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(approx(tm.map(0.5, &mut rng), 1.0));
    }

    #[test]
    fn rejects_non_positive_contrast_and_gamma() {
        assert!(matches!(
            ToneMapper::new(0.0, 0.0, 1.0, 0.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ToneMapper::new(1.0, 0.0, -1.0, 0.0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn output_stays_in_unit_range_for_adversarial_inputs() {
        let mut rng = StdRng::seed_from_u64(99);
        let mappers = [
            ToneMapper::new(1.0, 1000.0, 0.001, 100.0).unwrap(),
            ToneMapper::new(0.001, -1000.0, 1000.0, 100.0).unwrap(),
            ToneMapper::new(1000.0, 0.0, 0.001, 100.0).unwrap(),
        ];
        for tm in mappers {
            for raw in [-5.0, 0.0, 0.3, 1.0, 7.0, f64::NAN, f64::INFINITY] {
                for _ in 0..32 {
                    let v = tm.map(raw, &mut rng);
                    assert!((0.0..=1.0).contains(&v), "{raw} mapped to {v}");
                }
            }
        }
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let tm = ToneMapper::new(1.0, 0.0, 1.0, 50.0).unwrap();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let xs: Vec<f64> = (0..16).map(|_| tm.map(0.5, &mut a)).collect();
        let ys: Vec<f64> = (0..16).map(|_| tm.map(0.5, &mut b)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().any(|v| !approx(*v, 0.5)));
        assert!(xs.iter().all(|v| (v - 0.5).abs() <= 0.25 + 1e-12));
    }

    #[test]
    fn from_config_reads_tone_parameters() {
        let cfg = HalftoneConfig::default()
            .with_contrast(2.0)
            .with_noise(0.0);
        let tm = ToneMapper::from_config(&cfg).unwrap();
        assert!(!tm.is_noisy());
        let mut rng = StdRng::seed_from_u64(3);
        assert!(approx(tm.map(0.09, &mut rng), 0.3));
    }
}
