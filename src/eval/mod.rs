//! Grading runs and their reports.
//!
//! - [`pipeline::TrendPipeline`]: extraction, normalization, and scoring chained together
//! - [`report`]: pass/fail verdicts and run reports

pub mod pipeline;
pub mod report;

pub use pipeline::TrendPipeline;
pub use report::{
    CandidateFailure, CaseReport, ComparisonResult, DEFAULT_PASS_THRESHOLD, RunReport, Verdict,
};
