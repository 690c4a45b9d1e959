//! Shared run pipeline used by the `run` command and the integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> normalize -> label -> derive -> merge -> rename -> score
//!
//! A failure is local to the indicator it happened in; the run carries on with the
//! rest and reports what was lost in [`RunOutput::failures`].
//!
//! Fetched history before the window start still feeds derivations (the rate in force
//! on the first month, the first month's change) but is not emitted.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::data::{FetchWindow, SeriesSource, StockSheet};
use crate::domain::{
    Catalog, Derivation, IndicatorSpec, LabeledObservation, MalformedRange, Observation, Origin, STOCK_INDEX,
    ScoredObservation,
};
use crate::error::AppError;
use crate::io::{NormalizedSeries, normalize_raw};
use crate::score::score_dataset;
use crate::series::{monthly_change, resample_monthly};
use crate::thresholds::RuleSet;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub window: FetchWindow,
    /// Last month the resampler fills up to.
    pub today: NaiveDate,
    pub stock: Option<StockSheet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFailure {
    pub indicator: String,
    pub message: String,
}

/// Per-indicator bookkeeping, keyed by slug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorCount {
    pub indicator: String,
    pub rows: usize,
    pub missing: usize,
    pub rejected: usize,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub scored: Vec<ScoredObservation>,
    pub failures: Vec<IndicatorFailure>,
    pub malformed: Vec<MalformedRange>,
    pub counts: Vec<IndicatorCount>,
}

impl RunOutput {
    pub fn is_empty(&self) -> bool {
        self.scored.is_empty()
    }
}

/// Resolve the last month the resampler fills: `today`, capped at the window end.
///
/// An inverted window is a configuration error.
pub fn resolve_today(from: NaiveDate, to: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    match to {
        Some(to) if to < from => Err(AppError::new(2, format!("--to {to} is before --from {from}."))),
        Some(to) => Ok(to.min(today)),
        None => Ok(today),
    }
}

/// The error a run with nothing to report exits with, if it is empty.
///
/// Exit code 4 when every indicator failed, 3 when the providers simply had no rows.
pub fn empty_run_error(output: &RunOutput, from: NaiveDate, today: NaiveDate) -> Option<AppError> {
    if !output.is_empty() {
        return None;
    }
    if output.failures.is_empty() {
        return Some(AppError::new(3, format!("No observations between {from} and {today}.")));
    }
    let detail: Vec<String> = output
        .failures
        .iter()
        .map(|f| format!("{}: {}", f.indicator, f.message))
        .collect();
    Some(AppError::new(4, format!("Every indicator failed:\n{}", detail.join("\n"))))
}

/// Execute the full pipeline against `source`.
pub fn run_pipeline(
    source: &dyn SeriesSource,
    catalog: &Catalog,
    rules: &RuleSet,
    options: &RunOptions,
) -> RunOutput {
    let window = options.window;

    // 1) Fetch and normalize every provider series concurrently.
    let fetched: Vec<(&IndicatorSpec, _)> = catalog.fetched().collect();
    info!(indicators = fetched.len(), from = %window.from, "fetching indicators");
    let results: HashMap<&str, Result<NormalizedSeries, String>> = fetched
        .par_iter()
        .map(|(spec, provider)| {
            let result = source
                .fetch(provider, &window)
                .map(|raw| normalize_raw(spec.slug, &raw, None, window.to))
                .map_err(|e| format!("{}: {}", provider.describe(), e.message()));
            (spec.name, result)
        })
        .collect();

    let mut rows: Vec<LabeledObservation> = Vec::new();
    let mut failures = Vec::new();
    let mut counts = Vec::new();

    // 2) Label fetched series and build derived ones, in catalog order.
    for spec in catalog.specs() {
        let outcome = match spec.origin {
            Origin::Fetched(_) => match results.get(spec.name) {
                Some(Ok(series)) => Ok(label_series(spec, series, window.from)),
                Some(Err(message)) => Err(message.clone()),
                None => Err("not fetched".to_string()),
            },
            Origin::Derived { base, derivation } => {
                derive(spec, base, derivation, &results, options.today, window.from)
            }
            Origin::Imported => continue,
        };

        match outcome {
            Ok((labeled, count)) => {
                if labeled.is_empty() {
                    warn!(indicator = spec.slug, "indicator produced no rows");
                }
                rows.extend(labeled);
                counts.push(count);
            }
            Err(message) => {
                warn!(indicator = spec.slug, %message, "indicator failed");
                failures.push(IndicatorFailure {
                    indicator: spec.slug.to_string(),
                    message,
                });
            }
        }
    }

    // 3) Offline stock index data.
    if let Some(sheet) = &options.stock {
        let series = normalize_raw(STOCK_INDEX.slug, &sheet.close_observations(), None, window.to);
        let (labeled, mut count) = label_series(&STOCK_INDEX, &series, window.from);
        count.rejected += sheet.row_errors.len();
        rows.extend(labeled);
        counts.push(count);
    }

    // 4) Rename to slugs and score.
    let merged = catalog.rename(rows);
    let scored = score_dataset(merged, &rules.rules);
    info!(
        rows = scored.len(),
        failures = failures.len(),
        "run complete"
    );

    RunOutput {
        scored,
        failures,
        malformed: rules.malformed.clone(),
        counts,
    }
}

/// Label the part of `series` on or after `from`.
fn label_series(
    spec: &IndicatorSpec,
    series: &NormalizedSeries,
    from: NaiveDate,
) -> (Vec<LabeledObservation>, IndicatorCount) {
    let labeled: Vec<_> = series
        .observations
        .iter()
        .filter(|obs| obs.date >= from)
        .map(|obs| spec.label(obs.date, obs.value))
        .collect();
    let count = IndicatorCount {
        indicator: spec.slug.to_string(),
        rows: labeled.len(),
        missing: series.missing,
        rejected: series.row_errors.len(),
    };
    (labeled, count)
}

fn derive(
    spec: &IndicatorSpec,
    base: &str,
    derivation: Derivation,
    results: &HashMap<&str, Result<NormalizedSeries, String>>,
    today: NaiveDate,
    from: NaiveDate,
) -> Result<(Vec<LabeledObservation>, IndicatorCount), String> {
    let base_series = match results.get(base) {
        Some(Ok(series)) => series,
        _ => return Err(format!("base indicator '{base}' is unavailable")),
    };

    let labeled: Vec<LabeledObservation> = match derivation {
        Derivation::MonthlyResample => {
            let observations: &[Observation] = &base_series.observations;
            resample_monthly(observations, Some(from), today)
                .into_iter()
                .map(|point| spec.label(point.month_start, point.value))
                .collect()
        }
        Derivation::MonthlyChange => monthly_change(&base_rows(spec, base, base_series), base)
            .map_err(|e| e.to_string())?
            .into_iter()
            .filter(|row| row.date >= from)
            .map(|row| spec.label(row.date, row.value))
            .collect(),
    };

    let count = IndicatorCount {
        indicator: spec.slug.to_string(),
        rows: labeled.len(),
        ..IndicatorCount::default()
    };
    Ok((labeled, count))
}

/// The base series as rows named after `base`, whatever its catalog position.
fn base_rows(spec: &IndicatorSpec, base: &str, series: &NormalizedSeries) -> Vec<LabeledObservation> {
    series
        .observations
        .iter()
        .map(|obs| LabeledObservation {
            indicator: base.to_string(),
            ..spec.label(obs.date, obs.value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn output(rows: usize, failures: &[&str]) -> RunOutput {
        let row = ScoredObservation {
            date: date(2024, 1, 1),
            value: 3.7,
            indicator: "unemployment_monthly_rate_us".to_string(),
            source: "FRED".to_string(),
            unit: "Percent".to_string(),
            category: None,
            score: None,
        };
        RunOutput {
            scored: vec![row; rows],
            failures: failures
                .iter()
                .map(|indicator| IndicatorFailure {
                    indicator: indicator.to_string(),
                    message: "HTTP 503".to_string(),
                })
                .collect(),
            malformed: Vec::new(),
            counts: Vec::new(),
        }
    }

    #[test]
    fn window_end_before_today_caps_today() {
        let today = resolve_today(date(2020, 1, 1), Some(date(2023, 6, 30)), date(2024, 4, 20)).unwrap();
        assert_eq!(today, date(2023, 6, 30));
    }

    #[test]
    fn window_end_after_today_keeps_today() {
        let today = resolve_today(date(2020, 1, 1), Some(date(2030, 1, 1)), date(2024, 4, 20)).unwrap();
        assert_eq!(today, date(2024, 4, 20));
        assert_eq!(resolve_today(date(2020, 1, 1), None, date(2024, 4, 20)).unwrap(), date(2024, 4, 20));
    }

    #[test]
    fn inverted_window_is_a_configuration_error() {
        let err = resolve_today(date(2024, 1, 1), Some(date(2023, 12, 31)), date(2024, 4, 20)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("2023-12-31"));
    }

    #[test]
    fn empty_run_with_failures_exits_four() {
        let err = empty_run_error(
            &output(0, &["interest_rate_monthly_us", "inflation_monthly_euro"]),
            date(2024, 1, 1),
            date(2024, 4, 20),
        )
        .unwrap();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("interest_rate_monthly_us: HTTP 503"));
        assert!(err.message().contains("inflation_monthly_euro"));
    }

    #[test]
    fn empty_run_without_failures_exits_three() {
        let err = empty_run_error(&output(0, &[]), date(2024, 1, 1), date(2024, 4, 20)).unwrap();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn partial_failure_is_not_an_error() {
        assert!(empty_run_error(&output(2, &["interest_rate_monthly_us"]), date(2024, 1, 1), date(2024, 4, 20)).is_none());
    }
}
