//! CLI command implementations.

pub mod compare;
pub mod config;
pub mod extract;
pub mod run;
pub mod scan;

use std::path::Path;

use anyhow::{Context, Result};
use chart_trend::TrendConfig;

/// Load a configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<TrendConfig> {
    match path {
        Some(path) => TrendConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(TrendConfig::default()),
    }
}
