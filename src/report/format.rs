//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and scoring code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::{IndicatorCount, IndicatorFailure};
use crate::domain::{Category, Frequency, MalformedRange, ThresholdRule};
use crate::report::{IndicatorSummary, TREND_WINDOW, composite_score};

/// Run header lines.
#[derive(Debug, Clone)]
pub struct SummaryContext<'a> {
    pub title: &'a str,
    pub window: String,
}

/// Format the full run summary (counts + latest verdicts + problems).
pub fn format_run_summary(
    ctx: &SummaryContext<'_>,
    summaries: &[IndicatorSummary],
    counts: &[IndicatorCount],
    failures: &[IndicatorFailure],
    malformed: &[MalformedRange],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== econ - {} ===\n", ctx.title));
    out.push_str(&format!("Window: {}\n", ctx.window));
    let total_rows: usize = summaries.iter().map(|s| s.rows).sum();
    out.push_str(&format!("Indicators: {} | rows={}\n", summaries.len(), total_rows));
    match composite_score(summaries) {
        Some(score) => out.push_str(&format!("Composite score: {score:.2} / 2\n")),
        None => out.push_str("Composite score: n/a\n"),
    }

    out.push('\n');
    out.push_str(&format_latest_table(summaries));

    let skipped: Vec<&IndicatorCount> = counts.iter().filter(|c| c.missing > 0 || c.rejected > 0).collect();
    if !skipped.is_empty() {
        out.push_str("\nSkipped provider rows:\n");
        for c in skipped {
            out.push_str(&format!("- {}: missing={} rejected={}\n", c.indicator, c.missing, c.rejected));
        }
    }

    if !failures.is_empty() {
        out.push_str("\nFailed indicators:\n");
        for f in failures {
            out.push_str(&format!("- {}: {}\n", f.indicator, f.message));
        }
    }

    if !malformed.is_empty() {
        out.push_str("\nMalformed threshold ranges (ignored):\n");
        for m in malformed {
            out.push_str(&format!("- {m}\n"));
        }
    }

    out
}

/// One line per indicator: latest value, verdict, and trend.
pub fn format_latest_table(summaries: &[IndicatorSummary]) -> String {
    let mut out = String::new();
    let trend_header = format!("trend({TREND_WINDOW})");
    out.push_str(
        format!(
            "{:<32} {:<9} {:<10} {:>12} {:>12} {:<8} {:>5}\n",
            "indicator", "freq", "date", "value", trend_header, "category", "score"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<32} {:-<9} {:-<10} {:-<12} {:-<12} {:-<8} {:-<5}\n", "", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for s in summaries {
        out.push_str(
            format!(
                "{:<32} {:<9} {:<10} {:>12} {:>12} {:<8} {:>5}\n",
                truncate(&s.indicator, 32),
                s.frequency.map(Frequency::as_str).unwrap_or("-"),
                s.latest.date,
                fmt_value(s.latest.value),
                s.trend.map(fmt_value).unwrap_or_else(|| "-".to_string()),
                s.category().map(Category::as_str).unwrap_or("-"),
                s.latest.score.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format parsed threshold rules, grouped in construction order.
pub fn format_rules(rules: &[&ThresholdRule], malformed: &[&MalformedRange]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<32} {:<8} {:>5} {}\n", "indicator", "category", "score", "interval").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<32} {:-<8} {:-<5} {:-<20}\n", "", "", "", "").trim_end());
    out.push('\n');

    for r in rules {
        out.push_str(&format!(
            "{:<32} {:<8} {:>5} {}\n",
            truncate(&r.indicator, 32),
            r.category,
            r.score,
            r.interval
        ));
    }

    if !malformed.is_empty() {
        out.push_str("\nMalformed ranges:\n");
        for m in malformed {
            out.push_str(&format!("- {m}\n"));
        }
    }

    out
}

fn fmt_value(v: f64) -> String {
    format!("{v:.3}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Interval, ScoredObservation};
    use chrono::NaiveDate;

    fn summary(indicator: &str, value: f64, category: Option<Category>) -> IndicatorSummary {
        let latest = ScoredObservation {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            value,
            indicator: indicator.to_string(),
            source: "FRED".to_string(),
            unit: "Percent".to_string(),
            category,
            score: category.map(Category::score),
        };
        IndicatorSummary {
            indicator: indicator.to_string(),
            unit: "Percent".to_string(),
            frequency: Some(Frequency::Monthly),
            rows: 4,
            latest,
            trend: Some(value),
        }
    }

    #[test]
    fn truncates_long_names_with_a_marker() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd.");
    }

    #[test]
    fn latest_table_marks_unscored_rows() {
        let table = format_latest_table(&[
            summary("unemployment_monthly_rate_us", 3.9, Some(Category::Good)),
            summary("omx_smi", 915.25, None),
        ]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("unemployment_monthly_rate_us"));
        assert!(lines[0].contains("freq"));
        assert!(lines[2].contains("monthly"));
        assert!(lines[2].contains("3.900"));
        assert!(lines[2].ends_with('2'));
        assert!(lines[3].contains("915.250"));
        assert!(lines[3].ends_with('-'));
    }

    #[test]
    fn run_summary_lists_failures_and_malformed_ranges() {
        let ctx = SummaryContext {
            title: "Economic Indicators",
            window: "2019-01-01 .. 2024-06-15".to_string(),
        };
        let failures = vec![IndicatorFailure {
            indicator: "inflation_monthly_euro".to_string(),
            message: "Eurostat prc_hicp_mmor: timeout".to_string(),
        }];
        let malformed = vec![MalformedRange {
            indicator: "x".to_string(),
            category: Category::Bad,
            alternative: "high".to_string(),
        }];
        let text = format_run_summary(
            &ctx,
            &[summary("a", 1.0, Some(Category::Normal))],
            &[],
            &failures,
            &malformed,
        );

        assert!(text.contains("Composite score: 1.00 / 2"));
        assert!(text.contains("- inflation_monthly_euro: Eurostat prc_hicp_mmor: timeout"));
        assert!(text.contains("x / bad: unrecognized range 'high'"));
    }

    #[test]
    fn rules_table_shows_interval_notation() {
        let rule = ThresholdRule {
            indicator: "u".to_string(),
            category: Category::Bad,
            interval: Interval::above(6.0),
            score: 0,
        };
        let text = format_rules(&[&rule], &[]);
        assert!(text.lines().nth(2).unwrap().ends_with("(6, +inf)"));
    }
}
