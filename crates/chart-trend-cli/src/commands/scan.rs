//! Dataset scan command.

use std::path::Path;

use anyhow::{Context, Result};
use chart_trend::dataset::{discover_cases, file_name};

pub fn run(path: &Path, verbose: bool) -> Result<()> {
    let cases = discover_cases(path)
        .with_context(|| format!("Failed to scan dataset {}", path.display()))?;

    println!("Cases: {}", cases.len());
    println!("{:-<60}", "");

    for case in &cases {
        println!(
            "{:<30} main: {:<20} candidates: {}",
            case.case_name,
            file_name(&case.main_path),
            case.candidate_count()
        );
        if verbose {
            for sub in &case.sub_paths {
                println!("    {}", file_name(sub));
            }
        }
    }

    let candidates: usize = cases.iter().map(|c| c.candidate_count()).sum();
    println!("{:-<60}", "");
    println!("Total candidates: {}", candidates);

    Ok(())
}
