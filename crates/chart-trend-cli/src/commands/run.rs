//! Dataset grading command.

use std::path::Path;

use anyhow::{Context, Result};
use chart_trend::chart::write_run_charts;
use chart_trend::{RunReport, TrendPipeline, discover_cases};
use tracing::{info, warn};

use super::load_config;

pub fn run(
    dataset: &Path,
    output: &Path,
    threshold: f64,
    config: Option<&Path>,
    charts: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let pipeline = TrendPipeline::new(config).context("Invalid configuration")?;

    let cases = discover_cases(dataset)
        .with_context(|| format!("Failed to scan dataset {}", dataset.display()))?;
    if cases.is_empty() {
        warn!(dataset = %dataset.display(), "no usable cases found");
        return Ok(());
    }

    let run_name = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output.join(&run_name);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create {}", run_dir.display()))?;

    info!(run = %run_name, cases = cases.len(), dataset = %dataset.display(), "grading started");
    let report = pipeline.run(&run_name, &cases, threshold);

    print_cases(&report);

    let json_path = run_dir.join("report.json");
    report
        .write_json(&json_path)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    let csv_path = run_dir.join("report.csv");
    report
        .write_csv(&csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    if charts {
        let written = write_run_charts(&report, &run_dir)
            .with_context(|| format!("Failed to write charts to {}", run_dir.display()))?;
        info!(charts = written, dir = %run_dir.display(), "charts written");
    }

    print_summary(&report);
    println!("Results saved to: {}", run_dir.display());

    Ok(())
}

fn print_cases(report: &RunReport) {
    for case in &report.cases {
        println!();
        println!("Case: {}", case.case_name);

        if let Some(reason) = &case.reference_error {
            println!("  [skipped] reference failed: {}", reason);
            continue;
        }

        for result in &case.comparisons {
            println!("  --> {}: score {:.4} ({})", result.candidate, result.score, result.verdict);
        }
        for failure in &case.failures {
            println!("  --> {}: skipped ({})", failure.candidate, failure.reason);
        }
        if let Some(best) = case.best() {
            println!("  best: {} ({:.4})", best.candidate, best.score);
        }
    }
}

fn print_summary(report: &RunReport) {
    println!();
    println!("Summary:");
    println!("{:-<60}", "");
    println!("  Cases:       {}", report.cases.len());
    println!("  Comparisons: {}", report.total_comparisons());
    println!("  Passed:      {} (threshold {})", report.pass_count(), report.threshold);
    println!("  Failed:      {}", report.total_comparisons() - report.pass_count());
    println!("  Unreadable:  {}", report.failure_count());

    if let Some(summary) = report.score_summary() {
        println!("  Score mean {:.4}, median {:.4}", summary.mean, summary.median);
        println!("  Score min {:.4}, max {:.4}", summary.min, summary.max);
    }
}
