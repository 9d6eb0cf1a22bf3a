//! Color-trend extraction from chart images.
//!
//! [`ColorTrendExtractor`] turns encoded image bytes into a fixed-length
//! [`Signal`]. The image is resized to a fixed resolution, converted to HSV,
//! and split into vertical column bins. Each bin contributes one sample: the
//! number of positive-class pixels minus the number of negative-class pixels.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chart_trend::{ColorTrendExtractor, TrendConfig};
//!
//! let extractor = ColorTrendExtractor::new(&TrendConfig::default())?;
//! let bytes = std::fs::read("case_01/main.png")?;
//! let signal = extractor.extract("case_01/main.png", &bytes)?;
//! assert_eq!(signal.len(), 100);
//! ```

pub mod hsv;

use std::ops::Range;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::config::{HsvRange, TrendConfig};
use crate::error::{Error, Result};
use crate::signal::Signal;

pub use hsv::rgb_to_hsv;

/// Decode an in-memory image into a pixel matrix.
///
/// Works purely on bytes so the file system path encoding never matters.
pub fn decode_image(source_id: &str, bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes).map_err(|e| Error::ImageDecode {
        source_id: source_id.to_string(),
        reason: e.to_string(),
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(Error::ImageDecode {
            source_id: source_id.to_string(),
            reason: "image has no pixels".to_string(),
        });
    }

    Ok(image)
}

/// Column ranges for `samples` bins over `width` columns.
///
/// Bin `i` covers `floor(i * width / samples)..floor((i + 1) * width / samples)`.
/// When `width` is not a multiple of `samples` the bins differ in width by one
/// column; that is left as is.
#[must_use]
pub fn column_bins(width: usize, samples: usize) -> Vec<Range<usize>> {
    (0..samples)
        .map(|i| (i * width / samples)..((i + 1) * width / samples))
        .collect()
}

/// Positive and negative class masks for one image.
#[derive(Debug, Clone)]
pub struct ColorMasks {
    width: usize,
    height: usize,
    positive: Vec<bool>,
    negative: Vec<bool>,
}

impl ColorMasks {
    /// Classify every pixel of an RGB image.
    #[must_use]
    pub fn classify(image: &RgbImage, positive: &HsvRange, negative: &[HsvRange; 2]) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut pos = Vec::with_capacity(width * height);
        let mut neg = Vec::with_capacity(width * height);

        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            let hsv = rgb_to_hsv(r, g, b);
            pos.push(positive.contains(hsv));
            neg.push(negative.iter().any(|range| range.contains(hsv)));
        }

        Self {
            width,
            height,
            positive: pos,
            negative: neg,
        }
    }

    /// Positive minus negative pixel count for every image column.
    #[must_use]
    pub fn column_net_counts(&self) -> Vec<i64> {
        let mut net = vec![0i64; self.width];
        for row in 0..self.height {
            let start = row * self.width;
            let pos_row = &self.positive[start..start + self.width];
            let neg_row = &self.negative[start..start + self.width];
            for (x, (&p, &n)) in pos_row.iter().zip(neg_row).enumerate() {
                net[x] += i64::from(p) - i64::from(n);
            }
        }
        net
    }

    /// Net count per column bin.
    #[must_use]
    pub fn integrate(&self, samples: usize) -> Signal {
        let net = self.column_net_counts();
        column_bins(self.width, samples)
            .into_iter()
            .map(|bin| net[bin].iter().sum::<i64>() as f64)
            .collect()
    }
}

/// Reduces chart images to color-balance signals.
#[derive(Debug, Clone)]
pub struct ColorTrendExtractor {
    width: u32,
    height: u32,
    samples: usize,
    positive: HsvRange,
    negative: [HsvRange; 2],
}

impl ColorTrendExtractor {
    /// Validate `config` and create an extractor from it.
    pub fn new(config: &TrendConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            width: config.resize_width,
            height: config.resize_height,
            samples: config.samples,
            positive: config.positive,
            negative: [config.negative_primary, config.negative_wraparound],
        })
    }

    /// Decode `bytes` and extract the raw signal.
    ///
    /// `source_id` is only used to label errors and logs.
    pub fn extract(&self, source_id: &str, bytes: &[u8]) -> Result<Signal> {
        let image = decode_image(source_id, bytes)?;
        debug!(
            source = source_id,
            width = image.width(),
            height = image.height(),
            "decoded image"
        );
        Ok(self.extract_image(&image))
    }

    /// Read a file into memory and extract its raw signal.
    ///
    /// Read failures are reported as decode failures against the absolute path.
    pub fn extract_path(&self, path: &Path) -> Result<Signal> {
        let source_id = std::path::absolute(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        let bytes = std::fs::read(path).map_err(|e| Error::ImageDecode {
            source_id: source_id.clone(),
            reason: e.to_string(),
        })?;
        self.extract(&source_id, &bytes)
    }

    /// Extract the raw signal from an already decoded image.
    #[must_use]
    pub fn extract_image(&self, image: &DynamicImage) -> Signal {
        self.masks(image).integrate(self.samples)
    }

    /// Resize and classify an image.
    #[must_use]
    pub fn masks(&self, image: &DynamicImage) -> ColorMasks {
        let rgb = image.to_rgb8();
        let resized = if rgb.dimensions() == (self.width, self.height) {
            rgb
        } else {
            image::imageops::resize(&rgb, self.width, self.height, FilterType::Triangle)
        };
        ColorMasks::classify(&resized, &self.positive, &self.negative)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb};

    use super::*;

    const GREEN: Rgb<u8> = Rgb([0, 200, 0]);
    const ORANGE: Rgb<u8> = Rgb([255, 120, 0]);
    const DEEP_RED: Rgb<u8> = Rgb([200, 0, 40]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn small_config() -> TrendConfig {
        TrendConfig::builder().resize(80, 60).samples(10).build().unwrap()
    }

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_column_bins_even() {
        let bins = column_bins(800, 100);
        assert_eq!(bins.len(), 100);
        assert!(bins.iter().all(|b| b.len() == 8));
        assert_eq!(bins[99], 792..800);
    }

    #[test]
    fn test_column_bins_uneven_truncation() {
        let bins = column_bins(10, 3);
        assert_eq!(bins, vec![0..3, 3..6, 6..10]);

        // More bins than columns leaves some bins empty
        let bins = column_bins(3, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.len()).sum::<usize>(), 3);
    }

    #[test]
    fn test_decode_garbage_fails_with_source() {
        let err = decode_image("broken.png", b"definitely not an image").unwrap_err();
        match err {
            Error::ImageDecode { source_id, .. } => assert_eq!(source_id, "broken.png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_half_green_half_orange() {
        let image = RgbImage::from_fn(80, 60, |x, _| if x < 40 { GREEN } else { ORANGE });
        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        let signal = extractor.extract("split.png", &encode_png(&image)).unwrap();

        assert_eq!(signal.len(), 10);
        for &v in &signal[..5] {
            assert_eq!(v, 8.0 * 60.0);
        }
        for &v in &signal[5..] {
            assert_eq!(v, -8.0 * 60.0);
        }
    }

    #[test]
    fn test_wraparound_red_counts_negative() {
        let image = RgbImage::from_pixel(80, 60, DEEP_RED);
        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        let signal = extractor.extract_image(&DynamicImage::ImageRgb8(image));
        assert!(signal.iter().all(|&v| v == -480.0));
    }

    #[test]
    fn test_background_is_neutral() {
        let mut image = RgbImage::from_pixel(80, 60, WHITE);
        // One green bar 10 pixels tall in the first bin
        for x in 0..8 {
            for y in 20..30 {
                image.put_pixel(x, y, GREEN);
            }
        }
        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        let signal = extractor.extract_image(&DynamicImage::ImageRgb8(image));
        assert_eq!(signal[0], 80.0);
        assert!(signal[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_length_independent_of_resolution() {
        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        for (w, h) in [(17, 9), (80, 60), (333, 127), (1024, 768)] {
            let image = RgbImage::from_fn(w, h, |x, _| if x < w / 2 { GREEN } else { ORANGE });
            let signal = extractor.extract("any", &encode_png(&image)).unwrap();
            assert_eq!(signal.len(), 10, "{w}x{h}");
            assert!(signal[0] > 0.0);
            assert!(signal[9] < 0.0);
        }
    }

    #[test]
    fn test_extract_is_deterministic() {
        let image = RgbImage::from_fn(123, 77, |x, y| {
            Rgb([(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8])
        });
        let bytes = encode_png(&image);
        let extractor = ColorTrendExtractor::new(&TrendConfig::default()).unwrap();

        let a = extractor.extract("a", &bytes).unwrap();
        let b = extractor.extract("a", &bytes).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("图表_main.png");
        let image = RgbImage::from_pixel(80, 60, GREEN);
        image.save(&path).unwrap();

        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        let signal = extractor.extract_path(&path).unwrap();
        assert!(signal.iter().all(|&v| v == 480.0));
    }

    #[test]
    fn test_extract_path_missing_file() {
        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        let err = extractor
            .extract_path(Path::new("does/not/exist.png"))
            .unwrap_err();
        match err {
            Error::ImageDecode { source_id, .. } => assert!(source_id.ends_with("exist.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let zero_width = TrendConfig {
            resize_width: 0,
            ..TrendConfig::default()
        };
        assert!(matches!(ColorTrendExtractor::new(&zero_width), Err(Error::InvalidConfig(_))));

        let no_samples = TrendConfig {
            samples: 0,
            ..TrendConfig::default()
        };
        assert!(matches!(ColorTrendExtractor::new(&no_samples), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_masks_dimensions() {
        let image = RgbImage::from_pixel(30, 20, GREEN);
        let extractor = ColorTrendExtractor::new(&small_config()).unwrap();
        let masks = extractor.masks(&DynamicImage::ImageRgb8(image));
        assert_eq!((masks.width, masks.height), (80, 60));
        assert_eq!(masks.positive.len(), 80 * 60);
        assert!(masks.positive.iter().all(|&p| p));
        assert!(!masks.negative.iter().any(|&n| n));
    }
}
