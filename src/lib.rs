//! # chart-trend
//!
//! Grades whether a candidate chart image follows the same trend as a
//! reference chart.
//!
//! Each image is reduced to a one-dimensional signal by counting
//! positive-colored (green) minus negative-colored (orange/red) pixels in
//! vertical column bins. Signals are smoothed and standardized, then compared
//! with a recency-weighted cosine similarity.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chart_trend::{TrendConfig, TrendPipeline, Verdict, DEFAULT_PASS_THRESHOLD};
//!
//! let pipeline = TrendPipeline::new(TrendConfig::default())?;
//!
//! let reference = pipeline.analyze_bytes("main.png", &std::fs::read("main.png")?)?;
//! let candidate = pipeline.analyze_bytes("sub.png", &std::fs::read("sub.png")?)?;
//!
//! let score = pipeline.score(&reference, &candidate);
//! let verdict = Verdict::from_score(score, DEFAULT_PASS_THRESHOLD);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Shared, read-only configuration
//! - [`error`]: Error types for the library
//! - [`extract`]: Color-trend extraction from image bytes
//! - [`signal`]: Gaussian smoothing and z-score normalization
//! - [`similarity`]: Weighted cosine similarity
//! - [`stats`]: Descriptive statistics
//! - [`dataset`]: Discovery of reference/candidate cases on disk
//! - [`eval`]: Grading pipeline and run reports
//! - [`chart`]: SVG charts of compared signals

pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod extract;
pub mod signal;
pub mod similarity;
pub mod stats;

// Re-export commonly used types
pub use config::{HsvRange, TrendConfig, WeightScheme};
pub use dataset::{CaseData, discover_cases};
pub use error::{Error, Result};
pub use eval::{
    CandidateFailure, CaseReport, ComparisonResult, DEFAULT_PASS_THRESHOLD, RunReport,
    TrendPipeline, Verdict,
};
pub use extract::ColorTrendExtractor;
pub use signal::{Signal, SignalProcessor};
pub use similarity::WeightedSimilarity;
pub use stats::Summary;
