//! Single comparison command.

use std::path::Path;

use anyhow::{Context, Result};
use chart_trend::{TrendPipeline, Verdict};

use super::load_config;

pub fn run(reference: &Path, candidate: &Path, threshold: f64, config: Option<&Path>) -> Result<()> {
    let pipeline = TrendPipeline::new(load_config(config)?).context("Invalid configuration")?;

    let score = pipeline.compare_paths(reference, candidate).with_context(|| {
        format!("Failed to compare {} with {}", reference.display(), candidate.display())
    })?;
    let verdict = Verdict::from_score(score, threshold);

    println!("Reference: {}", reference.display());
    println!("Candidate: {}", candidate.display());
    println!("Score:     {:.4}", score);
    println!("Verdict:   {} (threshold {})", verdict, threshold);

    Ok(())
}
