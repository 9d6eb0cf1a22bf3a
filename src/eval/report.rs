//! Report types for grading runs.
//!
//! This module defines the pass/fail decision and the data structures that are
//! serialized to JSON or CSV at the end of a run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::error::Result;
use crate::signal::Signal;
use crate::stats::Summary;

/// Score a candidate must exceed to pass.
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.8;

/// Pass/fail decision for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Score strictly above the threshold.
    Pass,
    /// Score at or below the threshold.
    Fail,
}

impl Verdict {
    /// Decide a verdict for `score`.
    #[must_use]
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score > threshold { Self::Pass } else { Self::Fail }
    }

    /// Whether the candidate passed.
    #[must_use]
    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }

    /// Short code used in CSV output and chart titles.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One candidate scored against its case reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Candidate file name.
    pub candidate: String,

    /// Candidate image path.
    pub path: PathBuf,

    /// Weighted similarity to the reference.
    pub score: f64,

    /// Decision at the run threshold.
    pub verdict: Verdict,

    /// Normalized candidate signal.
    pub signal: Signal,
}

/// A candidate that could not be scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFailure {
    /// Candidate file name.
    pub candidate: String,

    /// Candidate image path.
    pub path: PathBuf,

    /// Why the candidate was skipped.
    pub reason: String,
}

/// Results for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case name.
    pub case_name: String,

    /// Reference image path.
    pub reference_path: PathBuf,

    /// Normalized reference signal, if the reference could be processed.
    pub reference_signal: Option<Signal>,

    /// Why the reference could not be processed.
    pub reference_error: Option<String>,

    /// Scored candidates, in candidate path order.
    pub comparisons: Vec<ComparisonResult>,

    /// Candidates that were skipped.
    #[serde(default)]
    pub failures: Vec<CandidateFailure>,
}

impl CaseReport {
    /// Create an empty report for a case.
    #[must_use]
    pub fn new(case_name: impl Into<String>, reference_path: impl Into<PathBuf>) -> Self {
        Self {
            case_name: case_name.into(),
            reference_path: reference_path.into(),
            reference_signal: None,
            reference_error: None,
            comparisons: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether the reference itself failed, so nothing was compared.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.reference_error.is_some()
    }

    /// Number of passing candidates.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.comparisons.iter().filter(|c| c.verdict.is_pass()).count()
    }

    /// Highest-scoring candidate.
    #[must_use]
    pub fn best(&self) -> Option<&ComparisonResult> {
        self.comparisons.iter().max_by(|a, b| {
            a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Report for a whole grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run name or identifier.
    pub name: String,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Pass threshold used for verdicts.
    pub threshold: f64,

    /// Configuration used for this run.
    pub config: TrendConfig,

    /// Per-case results.
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    /// Create a new, empty run report.
    #[must_use]
    pub fn new(name: impl Into<String>, threshold: f64, config: TrendConfig) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now(),
            threshold,
            config,
            cases: Vec::new(),
        }
    }

    /// Total number of scored comparisons.
    #[must_use]
    pub fn total_comparisons(&self) -> usize {
        self.cases.iter().map(|c| c.comparisons.len()).sum()
    }

    /// Number of passing comparisons.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.cases.iter().map(CaseReport::pass_count).sum()
    }

    /// Number of images that could not be processed (references and candidates).
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.cases
            .iter()
            .map(|c| c.failures.len() + usize::from(c.is_failed()))
            .sum()
    }

    /// Every score in case order.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.cases
            .iter()
            .flat_map(|c| c.comparisons.iter().map(|r| r.score))
            .collect()
    }

    /// Descriptive statistics over all scores.
    #[must_use]
    pub fn score_summary(&self) -> Option<Summary> {
        Summary::compute(&self.scores())
    }

    /// Write the full report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Write one CSV row per comparison or failure.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record(["case", "candidate", "score", "verdict", "error"])?;

        for case in &self.cases {
            if let Some(reason) = &case.reference_error {
                let reference = crate::dataset::file_name(&case.reference_path);
                wtr.write_record([case.case_name.as_str(), reference, "", "", reason.as_str()])?;
            }
            for result in &case.comparisons {
                let score = format!("{:.4}", result.score);
                wtr.write_record([
                    case.case_name.as_str(),
                    result.candidate.as_str(),
                    score.as_str(),
                    result.verdict.code(),
                    "",
                ])?;
            }
            for failure in &case.failures {
                wtr.write_record([
                    case.case_name.as_str(),
                    failure.candidate.as_str(),
                    "",
                    "",
                    failure.reason.as_str(),
                ])?;
            }
        }

        wtr.flush()?;
        Ok(())
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
