//! Recency-weighted cosine similarity.
//!
//! Later samples of a trend count for more than earlier ones: with the default
//! [`WeightScheme::Linear`] the weights ramp from 0.5 at the first sample to 1.5
//! at the last. Sequences of different length are compared over their common
//! prefix.
//!
//! | Score | Meaning |
//! |-------|---------|
//! | 1.0 | Same shape |
//! | 0.0 | Unrelated, or one side carries no signal |
//! | -1.0 | Mirror image |
//!
//! Rounding can push a score marginally past either bound.

use crate::config::{TrendConfig, WeightScheme};

/// First linear weight.
const LINEAR_WEIGHT_START: f64 = 0.5;

/// Last linear weight.
const LINEAR_WEIGHT_END: f64 = 1.5;

/// Scores pairs of normalized signals.
#[derive(Debug, Clone)]
pub struct WeightedSimilarity {
    scheme: WeightScheme,
    exponent: f64,
}

impl WeightedSimilarity {
    /// Create a scorer from a configuration.
    #[must_use]
    pub fn new(config: &TrendConfig) -> Self {
        Self {
            scheme: config.weighting,
            exponent: config.weight_exponent,
        }
    }

    /// Per-sample weights for a sequence of length `len`.
    #[must_use]
    pub fn weights(&self, len: usize) -> Vec<f64> {
        match self.scheme {
            WeightScheme::Linear => linspace(LINEAR_WEIGHT_START, LINEAR_WEIGHT_END, len),
            WeightScheme::Exponential => linspace(0.0, 1.0, len)
                .into_iter()
                .map(|t| (self.exponent * t).exp())
                .collect(),
        }
    }

    /// Weighted cosine similarity of `reference` and `candidate`.
    ///
    /// Only the first `min(len)` samples of each are used. Returns exactly
    /// `0.0` when either weighted norm is zero.
    #[must_use]
    pub fn compute(&self, reference: &[f64], candidate: &[f64]) -> f64 {
        let len = reference.len().min(candidate.len());
        let reference = &reference[..len];
        let candidate = &candidate[..len];
        let weights = self.weights(len);

        let mut dot = 0.0;
        let mut norm_ref_sq = 0.0;
        let mut norm_cand_sq = 0.0;
        for ((w, r), c) in weights.iter().zip(reference).zip(candidate) {
            dot += w * (r * c);
            norm_ref_sq += w * (r * r);
            norm_cand_sq += w * (c * c);
        }

        if norm_ref_sq == 0.0 || norm_cand_sq == 0.0 {
            return 0.0;
        }

        // One sqrt of the product: identical inputs give sqrt(x * x) == x, so exactly 1.0.
        dot / (norm_ref_sq * norm_cand_sq).sqrt()
    }
}

/// `len` evenly spaced values from `start` to `end` inclusive.
///
/// A single value is `start`; zero values is empty.
#[must_use]
pub fn linspace(start: f64, end: f64, len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (len - 1) as f64;
            (0..len)
                .map(|i| if i == len - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
