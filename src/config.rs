//! Configuration shared by every pipeline stage.
//!
//! A [`TrendConfig`] is built once per run and handed to each component by
//! reference. Nothing mutates it afterwards, so one value can be shared by any
//! number of threads.
//!
//! ## Example
//!
//! ```rust
//! use chart_trend::config::{TrendConfig, WeightScheme};
//!
//! let config = TrendConfig::builder()
//!     .samples(64)
//!     .sigma(1.5)
//!     .weighting(WeightScheme::Linear)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.samples, 64);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive bounds in 8-bit HSV space.
///
/// Hue is stored in half-degrees (`0..=180`), saturation and value in
/// `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Lower bound `[h, s, v]`.
    pub lower: [u8; 3],
    /// Upper bound `[h, s, v]`.
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Create a range from lower and upper `[h, s, v]` bounds.
    #[must_use]
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Whether an HSV triple lies inside the range on every channel.
    #[must_use]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        hsv.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }
}

/// Green: rising segments.
pub const DEFAULT_POSITIVE: HsvRange = HsvRange::new([35, 43, 46], [90, 255, 255]);

/// Orange through red at the low end of the hue circle.
pub const DEFAULT_NEGATIVE_PRIMARY: HsvRange = HsvRange::new([0, 43, 46], [25, 255, 255]);

/// Deep red at the high end of the hue circle.
pub const DEFAULT_NEGATIVE_WRAPAROUND: HsvRange = HsvRange::new([160, 43, 46], [180, 255, 255]);

/// How per-sample weights grow across a compared sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightScheme {
    /// Linear ramp from 0.5 to 1.5.
    #[default]
    Linear,
    /// `exp(weight_exponent * t)` for `t` spread evenly over `[0, 1]`.
    Exponential,
}

/// Parameters for extraction, normalization, and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Width every image is resized to before masking.
    pub resize_width: u32,
    /// Height every image is resized to before masking.
    pub resize_height: u32,
    /// Number of column bins (signal length).
    pub samples: usize,
    /// Color class counted positively.
    pub positive: HsvRange,
    /// First color range counted negatively.
    pub negative_primary: HsvRange,
    /// Second negative range, covering hue wraparound.
    pub negative_wraparound: HsvRange,
    /// Gaussian smoothing standard deviation, in samples.
    pub sigma: f64,
    /// Recency weighting used by the similarity score.
    pub weighting: WeightScheme,
    /// Growth rate for [`WeightScheme::Exponential`]; ignored by `Linear`.
    pub weight_exponent: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            resize_width: 800,
            resize_height: 600,
            samples: 100,
            positive: DEFAULT_POSITIVE,
            negative_primary: DEFAULT_NEGATIVE_PRIMARY,
            negative_wraparound: DEFAULT_NEGATIVE_WRAPAROUND,
            sigma: 2.0,
            weighting: WeightScheme::Linear,
            weight_exponent: 1.0,
        }
    }
}

impl TrendConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TrendConfigBuilder {
        TrendConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.resize_width == 0 || self.resize_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "resize target must be non-zero, got {}x{}",
                self.resize_width, self.resize_height
            )));
        }
        if self.samples == 0 {
            return Err(Error::InvalidConfig("samples must be at least 1".to_string()));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sigma must be finite and non-negative, got {}",
                self.sigma
            )));
        }
        if !self.weight_exponent.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "weight_exponent must be finite, got {}",
                self.weight_exponent
            )));
        }
        Ok(())
    }
}

/// Builder for [`TrendConfig`].
///
/// Color ranges keep their defaults; set them through a JSON config file.
#[derive(Debug, Default)]
pub struct TrendConfigBuilder {
    resize: Option<(u32, u32)>,
    samples: Option<usize>,
    sigma: Option<f64>,
    weighting: Option<WeightScheme>,
    weight_exponent: Option<f64>,
}

impl TrendConfigBuilder {
    /// Set the resize target.
    #[must_use]
    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.resize = Some((width, height));
        self
    }

    /// Set the number of column bins.
    #[must_use]
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Set the smoothing strength.
    #[must_use]
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Set the weighting scheme.
    #[must_use]
    pub fn weighting(mut self, weighting: WeightScheme) -> Self {
        self.weighting = Some(weighting);
        self
    }

    /// Set the exponent used by exponential weighting.
    #[must_use]
    pub fn weight_exponent(mut self, exponent: f64) -> Self {
        self.weight_exponent = Some(exponent);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<TrendConfig> {
        let defaults = TrendConfig::default();
        let (resize_width, resize_height) = self
            .resize
            .unwrap_or((defaults.resize_width, defaults.resize_height));

        let config = TrendConfig {
            resize_width,
            resize_height,
            samples: self.samples.unwrap_or(defaults.samples),
            positive: defaults.positive,
            negative_primary: defaults.negative_primary,
            negative_wraparound: defaults.negative_wraparound,
            sigma: self.sigma.unwrap_or(defaults.sigma),
            weighting: self.weighting.unwrap_or(defaults.weighting),
            weight_exponent: self.weight_exponent.unwrap_or(defaults.weight_exponent),
        };
        config.validate()?;
        Ok(config)
    }
}
