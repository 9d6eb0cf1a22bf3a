//! Grading pipeline.
//!
//! [`TrendPipeline`] chains extraction, normalization, and scoring, and grades
//! whole cases. A candidate that fails to decode is recorded and skipped; it
//! never affects the reference or the other candidates of its case.
//!
//! Every stage only reads the shared configuration, so cases and candidates
//! are processed in parallel with rayon. Results keep input order.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::TrendConfig;
use crate::dataset::{CaseData, file_name};
use crate::error::Result;
use crate::eval::report::{CandidateFailure, CaseReport, ComparisonResult, RunReport, Verdict};
use crate::extract::ColorTrendExtractor;
use crate::signal::{Signal, SignalProcessor};
use crate::similarity::WeightedSimilarity;

/// Extraction, normalization, and scoring with one configuration.
///
/// # Example
///
/// ```rust,ignore
/// use chart_trend::{TrendConfig, TrendPipeline, DEFAULT_PASS_THRESHOLD};
/// use chart_trend::dataset::discover_cases;
///
/// let pipeline = TrendPipeline::new(TrendConfig::default())?;
/// let cases = discover_cases("./dataset")?;
/// let report = pipeline.run("run_01", &cases, DEFAULT_PASS_THRESHOLD);
/// println!("{} of {} passed", report.pass_count(), report.total_comparisons());
/// ```
#[derive(Debug, Clone)]
pub struct TrendPipeline {
    config: TrendConfig,
    extractor: ColorTrendExtractor,
    processor: SignalProcessor,
    matcher: WeightedSimilarity,
}

impl TrendPipeline {
    /// Validate `config` and build every stage from it.
    pub fn new(config: TrendConfig) -> Result<Self> {
        Ok(Self {
            extractor: ColorTrendExtractor::new(&config)?,
            processor: SignalProcessor::new(&config),
            matcher: WeightedSimilarity::new(&config),
            config,
        })
    }

    /// Extraction stage.
    #[must_use]
    pub fn extractor(&self) -> &ColorTrendExtractor {
        &self.extractor
    }

    /// Normalized signal for encoded image bytes.
    pub fn analyze_bytes(&self, source_id: &str, bytes: &[u8]) -> Result<Signal> {
        let raw = self.extractor.extract(source_id, bytes)?;
        Ok(self.processor.preprocess(&raw))
    }

    /// Normalized signal for an image file.
    pub fn analyze_path(&self, path: &Path) -> Result<Signal> {
        let raw = self.extractor.extract_path(path)?;
        Ok(self.processor.preprocess(&raw))
    }

    /// Similarity of two normalized signals.
    #[must_use]
    pub fn score(&self, reference: &Signal, candidate: &Signal) -> f64 {
        self.matcher.compute(reference, candidate)
    }

    /// Similarity of two image files.
    pub fn compare_paths(&self, reference: &Path, candidate: &Path) -> Result<f64> {
        let reference = self.analyze_path(reference)?;
        let candidate = self.analyze_path(candidate)?;
        Ok(self.score(&reference, &candidate))
    }

    /// Grade every candidate of a case against its reference.
    #[must_use]
    pub fn evaluate_case(&self, case: &CaseData, threshold: f64) -> CaseReport {
        let mut report = CaseReport::new(&case.case_name, &case.main_path);

        let reference = match self.analyze_path(&case.main_path) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(case = %case.case_name, error = %e, "reference failed, skipping case");
                report.reference_error = Some(e.to_string());
                return report;
            }
        };
        if reference.is_flat_zero() {
            warn!(case = %case.case_name, "reference carries no trend, every candidate scores 0");
        }

        let outcomes: Vec<std::result::Result<ComparisonResult, CandidateFailure>> = case
            .sub_paths
            .par_iter()
            .map(|path| {
                let candidate = file_name(path).to_string();
                match self.analyze_path(path) {
                    Ok(signal) => {
                        let score = self.score(&reference, &signal);
                        let verdict = Verdict::from_score(score, threshold);
                        debug!(case = %case.case_name, %candidate, score, %verdict, "scored");
                        Ok(ComparisonResult {
                            candidate,
                            path: path.clone(),
                            score,
                            verdict,
                            signal,
                        })
                    }
                    Err(e) => {
                        warn!(case = %case.case_name, %candidate, error = %e, "candidate skipped");
                        Err(CandidateFailure {
                            candidate,
                            path: path.clone(),
                            reason: e.to_string(),
                        })
                    }
                }
            })
            .collect();

        for outcome in outcomes {
            match outcome {
                Ok(result) => report.comparisons.push(result),
                Err(failure) => report.failures.push(failure),
            }
        }
        report.reference_signal = Some(reference);
        report
    }

    /// Grade many cases in parallel, keeping their order.
    #[must_use]
    pub fn evaluate_cases(&self, cases: &[CaseData], threshold: f64) -> Vec<CaseReport> {
        cases
            .par_iter()
            .map(|case| self.evaluate_case(case, threshold))
            .collect()
    }

    /// Grade a dataset into a run report.
    #[must_use]
    pub fn run(&self, name: &str, cases: &[CaseData], threshold: f64) -> RunReport {
        let mut report = RunReport::new(name, threshold, self.config.clone());
        report.cases = self.evaluate_cases(cases, threshold);

        info!(
            run = name,
            cases = report.cases.len(),
            comparisons = report.total_comparisons(),
            passed = report.pass_count(),
            failures = report.failure_count(),
            "run complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::Error;
    use crate::eval::report::DEFAULT_PASS_THRESHOLD;

    const GREEN: Rgb<u8> = Rgb([30, 180, 60]);
    const ORANGE: Rgb<u8> = Rgb([240, 110, 20]);
    const BACKGROUND: Rgb<u8> = Rgb([250, 250, 250]);

    fn pipeline() -> TrendPipeline {
        let config = TrendConfig::builder().resize(200, 100).samples(50).build().unwrap();
        TrendPipeline::new(config).unwrap()
    }

    /// Candlestick-like chart: a column per bar, colored by the sign of `f`.
    fn chart(f: impl Fn(f64) -> f64) -> RgbImage {
        RgbImage::from_fn(200, 100, |x, y| {
            let value = f(f64::from(x) / 200.0);
            let height = (value.abs() * 100.0).min(100.0) as u32;
            if y >= 100 - height {
                if value >= 0.0 { GREEN } else { ORANGE }
            } else {
                BACKGROUND
            }
        })
    }

    fn png(image: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn write_case(root: &Path, name: &str, main: &RgbImage, subs: &[(&str, Vec<u8>)]) -> CaseData {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        let main_path = dir.join("main.png");
        fs::write(&main_path, png(main)).unwrap();
        let mut sub_paths: Vec<PathBuf> = subs
            .iter()
            .map(|(file, bytes)| {
                let path = dir.join(file);
                fs::write(&path, bytes).unwrap();
                path
            })
            .collect();
        sub_paths.sort();
        CaseData::new(name, main_path, sub_paths)
    }

    #[test]
    fn test_identical_images_score_one() {
        let p = pipeline();
        let bytes = png(&chart(|t| (t * 9.0).sin()));

        let a = p.analyze_bytes("a", &bytes).unwrap();
        let b = p.analyze_bytes("b", &bytes).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert_eq!(p.score(&a, &b), 1.0);
    }

    #[test]
    fn test_solid_positive_vs_solid_negative_scores_zero() {
        let p = pipeline();
        let green = png(&RgbImage::from_pixel(200, 100, GREEN));
        let orange = png(&RgbImage::from_pixel(200, 100, ORANGE));

        let raw_green = p.extractor().extract("green", &green).unwrap();
        let raw_orange = p.extractor().extract("orange", &orange).unwrap();
        assert!(raw_green.iter().all(|&v| v == 400.0));
        assert!(raw_orange.iter().all(|&v| v == -400.0));

        let processor = SignalProcessor::new(&TrendConfig::default());
        let a = processor.preprocess(&raw_green);
        let b = processor.preprocess(&raw_orange);
        assert!(a.is_flat_zero());
        assert!(b.is_flat_zero());
        assert_eq!(p.score(&a, &b), 0.0);
    }

    #[test]
    fn test_corrupt_candidate_leaves_reference_intact() {
        let p = pipeline();
        let reference_bytes = png(&chart(|t| (t * 7.0).cos()));

        let err = p.analyze_bytes("broken.png", b"\x89PNG\r\n\x1a\nnot really").unwrap_err();
        assert!(matches!(err, Error::ImageDecode { .. }));

        let reference = p.analyze_bytes("main.png", &reference_bytes).unwrap();
        assert_eq!(reference.len(), 50);
        assert!(!reference.is_flat_zero());
    }

    #[test]
    fn test_similar_trend_beats_opposite_trend() {
        let p = pipeline();
        let reference = p.analyze_bytes("ref", &png(&chart(|t| (t * 6.0).sin()))).unwrap();
        let similar = p
            .analyze_bytes("similar", &png(&chart(|t| 0.8 * (t * 6.0).sin())))
            .unwrap();
        let opposite = p
            .analyze_bytes("opposite", &png(&chart(|t| -(t * 6.0).sin())))
            .unwrap();

        let good = p.score(&reference, &similar);
        let bad = p.score(&reference, &opposite);
        assert!(good > DEFAULT_PASS_THRESHOLD, "similar scored {good}");
        assert!(bad < 0.0, "opposite scored {bad}");
    }

    #[test]
    fn test_evaluate_case_records_failures() {
        let root = tempfile::tempdir().unwrap();
        let wave = |t: f64| (t * 6.0).sin();
        let case = write_case(
            root.path(),
            "case_01",
            &chart(wave),
            &[
                ("a_same.png", png(&chart(wave))),
                ("b_broken.png", b"garbage".to_vec()),
                ("c_flipped.png", png(&chart(|t| -wave(t)))),
            ],
        );

        let report = pipeline().evaluate_case(&case, DEFAULT_PASS_THRESHOLD);
        assert!(!report.is_failed());
        assert!(report.reference_signal.is_some());

        assert_eq!(report.comparisons.len(), 2);
        assert_eq!(report.comparisons[0].candidate, "a_same.png");
        assert_eq!(report.comparisons[0].verdict, Verdict::Pass);
        assert_eq!(report.comparisons[0].score, 1.0);
        assert_eq!(report.comparisons[1].candidate, "c_flipped.png");
        assert_eq!(report.comparisons[1].verdict, Verdict::Fail);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].candidate, "b_broken.png");
        assert!(report.failures[0].reason.contains("b_broken.png"));
    }

    #[test]
    fn test_broken_reference_fails_case_only() {
        let root = tempfile::tempdir().unwrap();
        let good = write_case(
            root.path(),
            "good",
            &chart(|t| t - 0.5),
            &[("sub.png", png(&chart(|t| t - 0.5)))],
        );
        let bad_dir = root.path().join("bad");
        fs::create_dir_all(&bad_dir).unwrap();
        fs::write(bad_dir.join("main.png"), b"nope").unwrap();
        let bad = CaseData::new("bad", bad_dir.join("main.png"), vec![good.sub_paths[0].clone()]);

        let report = pipeline().run("run_test", &[bad, good], DEFAULT_PASS_THRESHOLD);
        assert_eq!(report.cases.len(), 2);
        assert!(report.cases[0].is_failed());
        assert!(report.cases[0].comparisons.is_empty());
        assert_eq!(report.cases[1].comparisons.len(), 1);
        assert_eq!(report.pass_count(), 1);
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_compare_paths() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a.png");
        let b = root.path().join("b.png");
        chart(|t| (t * 4.0).sin()).save(&a).unwrap();
        chart(|t| (t * 4.0).sin()).save(&b).unwrap();

        let score = pipeline().compare_paths(&a, &b).unwrap();
        assert_eq!(score, 1.0);

        let missing = root.path().join("missing.png");
        assert!(pipeline().compare_paths(&a, &missing).is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = TrendConfig {
            samples: 0,
            ..TrendConfig::default()
        };
        assert!(matches!(TrendPipeline::new(config), Err(Error::InvalidConfig(_))));
    }
}
