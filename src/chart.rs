//! SVG line charts of normalized signals.
//!
//! Used to eyeball a grading decision: the reference signal is drawn solid,
//! the candidate dashed, in green when it passed and red when it failed.
//! All charts support light and dark mode via CSS media queries.

use std::fmt::Write as _;
use std::path::Path;

use crate::dataset::file_stem;
use crate::error::{Error, Result};
use crate::eval::report::{RunReport, Verdict};
use crate::signal::Signal;

/// A line series plotted against sample index.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    /// Series identifier (used in legend).
    pub name: String,
    /// CSS color for the series.
    pub color: String,
    /// Draw the line dashed.
    pub dashed: bool,
    /// Y values; X is the sample index.
    pub values: Vec<f64>,
}

/// Chart configuration.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Trend".to_string(),
            x_label: "Sample →".to_string(),
            y_label: "Normalized value".to_string(),
            width: 1000,
            height: 400,
        }
    }
}

impl ChartConfig {
    /// Creates a new chart configuration with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Standard color palette.
pub mod colors {
    /// Reference signal.
    pub const REFERENCE: &str = "#1a1a1a";
    /// Passing candidate.
    pub const PASS: &str = "#27ae60";
    /// Failing candidate.
    pub const FAIL: &str = "#e74c3c";
}

/// Chart of a reference signal overlaid with one candidate.
///
/// Returns an empty string when both signals are empty.
#[must_use]
pub fn render_comparison_svg(
    case_name: &str,
    candidate_name: &str,
    reference: &Signal,
    candidate: &Signal,
    score: f64,
    verdict: Verdict,
) -> String {
    let series = [
        ChartSeries {
            name: "Main (ref)".to_string(),
            color: colors::REFERENCE.to_string(),
            dashed: false,
            values: reference.to_vec(),
        },
        ChartSeries {
            name: format!("Sub: {candidate_name}"),
            color: if verdict.is_pass() { colors::PASS } else { colors::FAIL }.to_string(),
            dashed: true,
            values: candidate.to_vec(),
        },
    ];

    let config = ChartConfig::new(format!(
        "Case: {case_name} | Score: {score:.3} [{}]",
        verdict.code()
    ));
    generate_svg(&series, &config)
}

/// File name for a comparison chart: `<case>_VS_<candidate stem>.svg`.
#[must_use]
pub fn chart_file_name(case_name: &str, candidate_stem: &str) -> String {
    format!("{case_name}_VS_{candidate_stem}.svg")
}

/// Write one comparison chart per scored candidate into `dir`.
///
/// Returns the number of charts written.
pub fn write_run_charts(report: &RunReport, dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir)?;

    let mut written = 0;
    for case in &report.cases {
        if case.comparisons.is_empty() {
            continue;
        }
        let reference = case.reference_signal.as_ref().ok_or_else(|| {
            Error::Report(format!("case {} has comparisons but no reference signal", case.case_name))
        })?;

        for result in &case.comparisons {
            let svg = render_comparison_svg(
                &case.case_name,
                &result.candidate,
                reference,
                &result.signal,
                result.score,
                result.verdict,
            );
            let path = dir.join(chart_file_name(&case.case_name, file_stem(&result.path)));
            std::fs::write(path, svg)?;
            written += 1;
        }
    }
    Ok(written)
}

/// Generates an SVG chart from the given series.
///
/// # Example
///
/// ```rust
/// use chart_trend::chart::{generate_svg, ChartConfig, ChartSeries};
///
/// let series = vec![ChartSeries {
///     name: "Main".to_string(),
///     color: "#1a1a1a".to_string(),
///     dashed: false,
///     values: vec![-1.0, 0.0, 1.0],
/// }];
///
/// let svg = generate_svg(&series, &ChartConfig::new("Trend"));
/// assert!(svg.starts_with("<svg"));
/// ```
#[must_use]
pub fn generate_svg(series: &[ChartSeries], config: &ChartConfig) -> String {
    let mut svg = String::with_capacity(8192);

    let non_empty: Vec<_> = series.iter().filter(|s| !s.values.is_empty()).collect();
    if non_empty.is_empty() {
        return String::new();
    }

    let max_len = non_empty.iter().map(|s| s.values.len()).max().unwrap_or(1);
    let min_x = 0.0;
    let max_x = (max_len.max(2) - 1) as f64;
    let all_y: Vec<f64> = non_empty.iter().flat_map(|s| s.values.iter().copied()).collect();
    let (min_y, max_y) = bounds_with_padding(&all_y, 0.05);

    let width = config.width;
    let height = config.height;
    let margin_top = 50;
    let margin_right = 200;
    let margin_bottom = 60;
    let margin_left = 70;
    let plot_width = width.saturating_sub(margin_left + margin_right).max(1);
    let plot_height = height.saturating_sub(margin_top + margin_bottom).max(1);

    let scale_x = |v: f64| -> f64 {
        f64::from(margin_left) + (v - min_x) / (max_x - min_x) * f64::from(plot_width)
    };
    let scale_y = |v: f64| -> f64 {
        f64::from(margin_top) + (1.0 - (v - min_y) / (max_y - min_y)) * f64::from(plot_height)
    };

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        width, height
    );

    svg.push_str(
        r#"<style>
  :root {
    --bg-color: #ffffff;
    --text-color: #1a1a1a;
    --grid-color: #e0e0e0;
    --axis-color: #333333;
    --legend-bg: #ffffff;
    --legend-border: #cccccc;
  }
  @media (prefers-color-scheme: dark) {
    :root {
      --bg-color: #1a1a1a;
      --text-color: #e0e0e0;
      --grid-color: #404040;
      --axis-color: #b0b0b0;
      --legend-bg: #2a2a2a;
      --legend-border: #505050;
    }
  }
  .background { fill: var(--bg-color); }
  .title { font: bold 16px system-ui, sans-serif; fill: var(--text-color); }
  .axis-label { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .tick-label { font: 11px system-ui, sans-serif; fill: var(--text-color); }
  .legend { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .grid { stroke: var(--grid-color); stroke-width: 1; }
  .axis { stroke: var(--axis-color); stroke-width: 1.5; }
  .legend-bg { fill: var(--legend-bg); stroke: var(--legend-border); }
</style>
"#,
    );

    let _ = writeln!(
        svg,
        r#"<rect class="background" width="{}" height="{}"/>"#,
        width, height
    );

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" class="title">{}</text>"#,
        f64::from(width) / 2.0,
        escape_text(&config.title)
    );

    // Grid lines and tick labels
    for i in 0..=5 {
        let frac = f64::from(i) / 5.0;
        let x_val = min_x + frac * (max_x - min_x);
        let y_val = min_y + frac * (max_y - min_y);
        let x = scale_x(x_val);
        let y = scale_y(y_val);

        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{}" x2="{:.2}" y2="{}" class="grid"/>"#,
            x,
            margin_top,
            x,
            height - margin_bottom
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{:.2}" x2="{}" y2="{:.2}" class="grid"/>"#,
            margin_left,
            y,
            width - margin_right,
            y
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" class="tick-label">{:.0}</text>"#,
            x,
            height - margin_bottom + 20,
            x_val
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" class="tick-label">{:.2}</text>"#,
            margin_left - 10,
            y + 4.0,
            y_val
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        margin_left,
        height - margin_bottom,
        width - margin_right,
        height - margin_bottom
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        margin_left,
        margin_top,
        margin_left,
        height - margin_bottom
    );

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" class="axis-label">{}</text>"#,
        f64::from(margin_left + plot_width / 2),
        height - 15,
        escape_text(&config.x_label)
    );
    let _ = writeln!(
        svg,
        r#"<text x="20" y="{}" text-anchor="middle" class="axis-label" transform="rotate(-90 20 {})">{}</text>"#,
        f64::from(height) / 2.0,
        f64::from(height) / 2.0,
        escape_text(&config.y_label)
    );

    for s in &non_empty {
        let mut path = String::new();
        for (i, v) in s.values.iter().enumerate() {
            let prefix = if i == 0 { "M" } else { " L" };
            let _ = write!(path, "{} {:.2},{:.2}", prefix, scale_x(i as f64), scale_y(*v));
        }
        let dash = if s.dashed { r#" stroke-dasharray="6 4""# } else { "" };
        let _ = writeln!(
            svg,
            r#"<path d="{}" stroke="{}" stroke-width="2"{} fill="none"/>"#,
            path, s.color, dash
        );
    }

    // Legend
    let legend_x = width - margin_right + 15;
    let legend_y = margin_top + 20;
    let legend_height = 20 + non_empty.len() as u32 * 25;

    let _ = writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="175" height="{}" rx="4" class="legend-bg"/>"#,
        legend_x,
        legend_y - 15,
        legend_height
    );

    for (i, s) in non_empty.iter().enumerate() {
        let y_offset = legend_y + i as u32 * 25;
        let dash = if s.dashed { r#" stroke-dasharray="6 4""# } else { "" };
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2"{}/>"#,
            legend_x + 8,
            y_offset + 5,
            legend_x + 28,
            y_offset + 5,
            s.color,
            dash
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" class="legend">{}</text>"#,
            legend_x + 34,
            y_offset + 9,
            escape_text(&s.name)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Calculates min/max bounds with padding.
///
/// A flat series gets a unit band around its value so it stays drawable.
fn bounds_with_padding(values: &[f64], padding: f64) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return (min - 1.0, max + 1.0);
    }
    (min - range * padding, max + range * padding)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
