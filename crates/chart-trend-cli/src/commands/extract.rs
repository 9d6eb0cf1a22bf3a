//! Signal extraction command.

use std::path::Path;

use anyhow::{Context, Result};
use chart_trend::TrendPipeline;

use super::load_config;

pub fn run(image: &Path, raw: bool, config: Option<&Path>) -> Result<()> {
    let pipeline = TrendPipeline::new(load_config(config)?).context("Invalid configuration")?;

    let signal = if raw {
        pipeline.extractor().extract_path(image)
    } else {
        pipeline.analyze_path(image)
    }
    .with_context(|| format!("Failed to extract signal from {}", image.display()))?;

    println!("{}", serde_json::to_string_pretty(&signal)?);
    Ok(())
}
