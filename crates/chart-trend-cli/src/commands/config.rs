//! Default configuration command.

use std::path::Path;

use anyhow::{Context, Result};
use chart_trend::TrendConfig;

pub fn run(output: Option<&Path>) -> Result<()> {
    let config = TrendConfig::default();

    match output {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Configuration written to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}
