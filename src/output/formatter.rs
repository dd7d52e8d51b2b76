use std::collections::BTreeMap;
use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::benchmark::{AggregateStats, ComparisonPoint};
use crate::scoring::{AreaScore, CalculationResult, MetricValue};

const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;
/// Columns used by everything on an area line except the bar itself
const AREA_LINE_OVERHEAD: usize = 30;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Bar width for the current terminal, clamped to a readable range
pub fn bar_width() -> usize {
    bar_width_for(get_terminal_width())
}

fn bar_width_for(term_width: Option<usize>) -> usize {
    match term_width {
        Some(width) => width
            .saturating_sub(AREA_LINE_OVERHEAD)
            .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH),
        None => MAX_BAR_WIDTH / 2,
    }
}

/// Horizontal bar for a percentage, e.g. "#####-----"
fn render_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

/// Trim trailing ".0" from whole numbers (16.0 -> "16", 7.5 -> "7.5")
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:.0}", points)
    } else {
        format!("{:.1}", points)
    }
}

fn format_area_line(area: &str, score: &AreaScore, width: usize, use_colors: bool) -> String {
    let bar = render_bar(score.percent as f64, width);
    let points = format!("{:>5}/{}", format_points(score.raw), format_points(score.max));
    let percent = format!("{:>3}%", score.percent);

    if use_colors {
        format!("  {:<4} {}  {}  {}", area.cyan(), bar.green(), points, percent.bold())
    } else {
        format!("  {:<4} {}  {}  {}", area, bar, points, percent)
    }
}

fn format_metric(value: &MetricValue) -> String {
    match value {
        MetricValue::Derived { value, label: Some(label) } => {
            format!("{} ({})", format_points(*value), label)
        }
        MetricValue::Derived { value, label: None } => format_points(*value),
        MetricValue::Direct(Some(value)) => format_points(*value),
        MetricValue::Direct(None) => "n/a".to_string(),
    }
}

/// Format a calculation result as a multi-line report
pub fn format_result(result: &CalculationResult, width: usize, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let level = if result.level.is_empty() {
        "(no level)".to_string()
    } else {
        result.level.clone()
    };
    let version = result
        .version
        .as_deref()
        .map(|v| format!("  [{}]", v))
        .unwrap_or_default();

    if use_colors {
        lines.push(format!("Level: {}{}", level.bold().yellow(), version.dimmed()));
    } else {
        lines.push(format!("Level: {}{}", level, version));
    }
    lines.push(format!(
        "Total: {} points ({}%)",
        format_points(result.total_score),
        result.total_percent
    ));

    if !result.area_scores.is_empty() {
        lines.push(String::new());
        for (area, score) in &result.area_scores {
            lines.push(format_area_line(area, score, width, use_colors));
        }
    }

    if result.brake_applied {
        let key = result.brake_explanation_key.as_deref().unwrap_or("brake");
        let note = format!("Level capped by area brake ({})", key);
        lines.push(String::new());
        if use_colors {
            lines.push(note.red().to_string());
        } else {
            lines.push(note);
        }
    }

    if let Some(metrics) = result.secondary_metrics.as_ref().filter(|m| !m.is_empty()) {
        lines.push(String::new());
        lines.push("Secondary metrics:".to_string());
        for (name, value) in metrics {
            lines.push(format!("  {}: {}", name, format_metric(value)));
        }
    }

    lines.join("\n")
}

/// Format a market comparison, one block per benchmarked question
pub fn format_comparison(
    comparison: &BTreeMap<String, Vec<ComparisonPoint>>,
    use_colors: bool,
) -> String {
    if comparison.is_empty() {
        return "No benchmarked questions.".to_string();
    }

    comparison
        .iter()
        .map(|(question_id, points)| {
            let mut lines = vec![if use_colors {
                question_id.bold().to_string()
            } else {
                question_id.clone()
            }];
            for point in points {
                let marker = if point.user_value { "*" } else { " " };
                let market = point
                    .market_percent
                    .map(|p| format!("{:>3}%", format_points(p)))
                    .unwrap_or_else(|| " n/a".to_string());
                let line = format!(
                    "  {} {:<20} market {}  internal {:>3}%",
                    marker, point.label, market, point.internal_percent
                );
                if use_colors && point.user_value {
                    lines.push(line.green().to_string());
                } else {
                    lines.push(line);
                }
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format aggregate statistics
pub fn format_aggregates(stats: &AggregateStats, width: usize, use_colors: bool) -> String {
    if stats.count == 0 {
        return "No submissions yet.".to_string();
    }

    let mut lines = vec![
        format!("Submissions: {}", stats.count),
        format!("Average score: {}%", stats.avg_total_score),
    ];

    if !stats.avg_area_scores.is_empty() {
        lines.push(String::new());
        lines.push("Average by area:".to_string());
        for (area, percent) in &stats.avg_area_scores {
            let bar = render_bar(*percent as f64, width);
            if use_colors {
                lines.push(format!("  {:<4} {}  {:>3}%", area.cyan(), bar.green(), percent));
            } else {
                lines.push(format!("  {:<4} {}  {:>3}%", area, bar, percent));
            }
        }
    }

    if !stats.level_distribution.is_empty() {
        lines.push(String::new());
        lines.push("Levels:".to_string());
        for (level, count) in &stats.level_distribution {
            lines.push(format!("  {:<16} {}", level, count));
        }
    }

    for (question_id, counts) in &stats.question_distributions {
        lines.push(String::new());
        lines.push(format!("{}:", question_id));
        for (value, count) in counts {
            lines.push(format!("  {:<16} {}", value, count));
        }
    }

    lines.join("\n")
}

/// Pretty-printed JSON for any serializable output
pub fn format_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerSet;
    use crate::scoring::AreaScores;

    fn sample_result() -> CalculationResult {
        let mut area_scores = AreaScores::new();
        area_scores.insert("B", AreaScore { raw: 7.5, max: 20.0, percent: 38 });
        area_scores.insert("A", AreaScore { raw: 16.0, max: 20.0, percent: 80 });
        CalculationResult {
            total_score: 23.5,
            total_percent: 59,
            level: "Explorer".to_string(),
            area_scores,
            brake_applied: false,
            brake_explanation_key: None,
            answers: AnswerSet::new(),
            version: Some("v3".to_string()),
            secondary_metrics: None,
        }
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(16.0), "16");
        assert_eq!(format_points(7.5), "7.5");
        assert_eq!(format_points(0.0), "0");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(50.0, 10), "#####-----");
        assert_eq!(render_bar(0.0, 4), "----");
        assert_eq!(render_bar(100.0, 4), "####");
        assert_eq!(render_bar(150.0, 4), "####");
    }

    #[test]
    fn test_bar_width_for() {
        assert_eq!(bar_width_for(None), 20);
        assert_eq!(bar_width_for(Some(20)), MIN_BAR_WIDTH);
        assert_eq!(bar_width_for(Some(60)), 30);
        assert_eq!(bar_width_for(Some(200)), MAX_BAR_WIDTH);
    }

    #[test]
    fn test_format_result_plain() {
        let output = format_result(&sample_result(), 10, false);
        assert!(output.starts_with("Level: Explorer  [v3]"));
        assert!(output.contains("Total: 23.5 points (59%)"));
        assert!(output.contains("  A    ########--     16/20   80%"));
        assert!(output.contains("7.5/20"));
        assert!(output.find("  B ").unwrap() < output.find("  A ").unwrap());
        assert!(!output.contains("capped"));
        assert!(!output.contains("Secondary metrics"));
    }

    #[test]
    fn test_format_result_brake_and_metrics() {
        let mut result = sample_result();
        result.brake_applied = true;
        result.brake_explanation_key = Some("brake.safety".to_string());
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "enablement_index".to_string(),
            MetricValue::Derived { value: 4.0, label: Some("high".to_string()) },
        );
        metrics.insert("org_support".to_string(), MetricValue::Direct(None));
        result.secondary_metrics = Some(metrics);

        let output = format_result(&result, 10, false);
        assert!(output.contains("Level capped by area brake (brake.safety)"));
        assert!(output.contains("  enablement_index: 4 (high)"));
        assert!(output.contains("  org_support: n/a"));
    }

    #[test]
    fn test_format_result_empty_level() {
        let mut result = sample_result();
        result.level = String::new();
        result.version = None;
        let output = format_result(&result, 10, false);
        assert!(output.starts_with("Level: (no level)\n"));
    }

    #[test]
    fn test_format_comparison() {
        let mut comparison = BTreeMap::new();
        comparison.insert(
            "QA2".to_string(),
            vec![
                ComparisonPoint {
                    label: "daily".to_string(),
                    user_value: true,
                    market_percent: Some(28.0),
                    internal_percent: 50,
                },
                ComparisonPoint {
                    label: "never".to_string(),
                    user_value: false,
                    market_percent: None,
                    internal_percent: 0,
                },
            ],
        );

        let output = format_comparison(&comparison, false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "QA2");
        assert!(lines[1].starts_with("  * daily"));
        assert!(lines[1].contains("market  28%"));
        assert!(lines[1].contains("internal  50%"));
        assert!(lines[2].starts_with("    never"));
        assert!(lines[2].contains("market  n/a"));
    }

    #[test]
    fn test_format_comparison_empty() {
        assert_eq!(format_comparison(&BTreeMap::new(), false), "No benchmarked questions.");
    }

    #[test]
    fn test_format_aggregates() {
        let mut stats = AggregateStats {
            count: 3,
            avg_total_score: 47,
            ..Default::default()
        };
        stats.avg_area_scores.insert("A".to_string(), 50);
        stats.level_distribution.insert("Explorer".to_string(), 2);
        stats.level_distribution.insert("Observer".to_string(), 1);
        stats
            .question_distributions
            .entry("Q1_2".to_string())
            .or_default()
            .insert("ops".to_string(), 3);

        let output = format_aggregates(&stats, 10, false);
        assert!(output.contains("Submissions: 3"));
        assert!(output.contains("Average score: 47%"));
        assert!(output.contains("  A    #####-----   50%"));
        assert!(output.contains("  Explorer         2"));
        assert!(output.contains("Q1_2:"));
        assert!(output.contains("  ops              3"));
    }

    #[test]
    fn test_format_aggregates_empty() {
        let stats = AggregateStats::default();
        assert_eq!(format_aggregates(&stats, 10, false), "No submissions yet.");
    }

    #[test]
    fn test_format_json_camel_case() {
        let json = format_json(&sample_result()).unwrap();
        assert!(json.contains("\"totalPercent\": 59"));
        assert!(json.contains("\"areaScores\""));
    }
}
