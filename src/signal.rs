//! Signal smoothing and standardization.
//!
//! [`SignalProcessor::preprocess`] removes per-bin pixel noise with a 1-D
//! Gaussian filter and rescales the result to zero mean and unit variance, so
//! two charts are compared by shape rather than by absolute pixel counts.
//!
//! A signal whose smoothed standard deviation is below
//! [`DEGENERATE_STD_EPSILON`] carries no usable trend and normalizes to all
//! zeros.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::stats::{mean, population_std_dev};

/// Standard deviation below which a signal is treated as flat.
pub const DEGENERATE_STD_EPSILON: f64 = 1e-6;

/// Gaussian kernels are truncated at this many standard deviations.
const TRUNCATE_SIGMAS: f64 = 4.0;

/// An ordered sequence of samples.
///
/// Used both for raw column-bin counts and for normalized, unit-free values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(Vec<f64>);

impl Signal {
    /// Wrap a vector of samples.
    #[must_use]
    pub fn new(samples: Vec<f64>) -> Self {
        Self(samples)
    }

    /// All-zero signal of the given length.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Whether every sample is exactly zero.
    #[must_use]
    pub fn is_flat_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl Deref for Signal {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Signal {
    fn from(samples: Vec<f64>) -> Self {
        Self(samples)
    }
}

impl FromIterator<f64> for Signal {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Smooths and standardizes raw signals.
#[derive(Debug, Clone)]
pub struct SignalProcessor {
    sigma: f64,
}

impl SignalProcessor {
    /// Create a processor from a configuration.
    #[must_use]
    pub fn new(config: &TrendConfig) -> Self {
        Self {
            sigma: config.sigma,
        }
    }

    /// Smooth then z-score a signal.
    ///
    /// The output always has the same length as the input.
    #[must_use]
    pub fn preprocess(&self, signal: &Signal) -> Signal {
        let smoothed = gaussian_smooth(signal, self.sigma);
        standardize(&smoothed)
    }
}

/// Z-score standardization with a flat-signal fallback.
#[must_use]
pub fn standardize(values: &[f64]) -> Signal {
    let m = mean(values);
    let std = population_std_dev(values);

    if std < DEGENERATE_STD_EPSILON {
        return Signal::zeros(values.len());
    }

    values.iter().map(|v| (v - m) / std).collect()
}

/// Normalized Gaussian kernel with radius `round(4 * sigma)`.
#[must_use]
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (TRUNCATE_SIGMAS * sigma + 0.5) as i64;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-(x * x) as f64 / denom).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// 1-D Gaussian filter with mirrored edges.
///
/// Samples beyond either end are read back through a half-sample symmetric
/// reflection (`d c b a | a b c d | d c b a`), repeated as often as needed when
/// the kernel is wider than the signal.
#[must_use]
pub fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i64;

    (0..n as i64)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * values[reflect_index(i + k as i64 - radius, n)])
                .sum()
        })
        .collect()
}

fn reflect_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let period = 2 * len;
    let m = index.rem_euclid(period);
    (if m < len { m } else { period - 1 - m }) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(sigma: f64) -> SignalProcessor {
        SignalProcessor::new(&TrendConfig::builder().sigma(sigma).build().unwrap())
    }

    fn ramp_with_bump(len: usize) -> Signal {
        (0..len)
            .map(|i| {
                let x = i as f64;
                3.0 * x + 40.0 * (x / 7.0).sin()
            })
            .collect()
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(0, 4), 0);
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(-5, 4), 3);
        assert_eq!(reflect_index(-9, 4), 0);
        assert_eq!(reflect_index(3, 1), 0);
    }

    #[test]
    fn test_kernel_shape() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 17);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((k[0] - k[16]).abs() < 1e-15);
        assert!(k[8] > k[7]);

        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn test_smoothing_preserves_constant() {
        let smoothed = gaussian_smooth(&[5.0; 10], 2.0);
        assert_eq!(smoothed.len(), 10);
        assert!(smoothed.iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_smoothing_kernel_wider_than_signal() {
        let smoothed = gaussian_smooth(&[1.0, 2.0, 3.0], 5.0);
        assert_eq!(smoothed.len(), 3);
        assert!(smoothed.iter().all(|v| v.is_finite()));
        // Mirror symmetry of the input is kept
        assert!((smoothed[0] - (4.0 - smoothed[2])).abs() < 1e-12);
    }

    #[test]
    fn test_smoothing_spreads_impulse() {
        let mut values = vec![0.0; 21];
        values[10] = 1.0;
        let smoothed = gaussian_smooth(&values, 2.0);
        assert!(smoothed[10] < 1.0);
        assert!(smoothed[9] > 0.0 && smoothed[11] > 0.0);
        assert!((smoothed[9] - smoothed[11]).abs() < 1e-15);
        assert!((smoothed.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let values = [1.0, -4.0, 2.5];
        assert_eq!(gaussian_smooth(&values, 0.0), values.to_vec());
    }

    #[test]
    fn test_preprocess_mean_zero_unit_std() {
        let out = processor(2.0).preprocess(&ramp_with_bump(100));
        assert_eq!(out.len(), 100);
        assert!(mean(&out).abs() < 1e-9);
        assert!((population_std_dev(&out) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_preprocess_constant_is_zero() {
        let out = processor(2.0).preprocess(&Signal::new(vec![4800.0; 100]));
        assert_eq!(out, Signal::zeros(100));
        assert!(out.is_flat_zero());
    }

    #[test]
    fn test_preprocess_scale_and_offset_invariant() {
        let base = ramp_with_bump(60);
        let shifted: Signal = base.iter().map(|v| 2.5 * v - 300.0).collect();

        let p = processor(2.0);
        let a = p.preprocess(&base);
        let b = p.preprocess(&shifted);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_preprocess_empty_and_single() {
        let p = processor(2.0);
        assert!(p.preprocess(&Signal::default()).is_empty());
        assert_eq!(p.preprocess(&Signal::new(vec![7.0])), Signal::zeros(1));
    }

    #[test]
    fn test_signal_serializes_as_array() {
        let json = serde_json::to_string(&Signal::new(vec![1.0, -0.5])).unwrap();
        assert_eq!(json, "[1.0,-0.5]");
    }
}
