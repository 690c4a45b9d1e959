//! Irregular point-in-time series → one value per calendar month.
//!
//! Built for policy rates, which only have an observation when the rate changes: the
//! value for a month is the latest change on or before the first of that month
//! ([`AsOfAnchor::MonthStart`]). [`AsOfAnchor::MonthEnd`] instead takes the rate in
//! force at the close of the month, still labeled with the month's first day.

use chrono::{Datelike, Duration, Months, NaiveDate};
use tracing::warn;

use crate::domain::{MonthlyAlignedPoint, Observation};

/// Which day of a month the as-of join looks back from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsOfAnchor {
    #[default]
    MonthStart,
    MonthEnd,
}

/// Resample `series` onto month starts from `start_date` (or the first observation's
/// month) through `today`'s month, inclusive.
///
/// Each month takes the latest observation dated on or before its first day. Months
/// before the first such observation are back-filled with the nearest following
/// resolved value. Non-finite values are ignored.
pub fn resample_monthly(
    series: &[Observation],
    start_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<MonthlyAlignedPoint> {
    resample_monthly_anchored(series, start_date, today, AsOfAnchor::MonthStart)
}

/// [`resample_monthly`] with an explicit as-of anchor.
pub fn resample_monthly_anchored(
    series: &[Observation],
    start_date: Option<NaiveDate>,
    today: NaiveDate,
    anchor: AsOfAnchor,
) -> Vec<MonthlyAlignedPoint> {
    let mut sorted: Vec<&Observation> = series.iter().filter(|o| o.value.is_finite()).collect();
    sorted.sort_by_key(|o| o.date);

    let Some(earliest) = sorted.first() else {
        return Vec::new();
    };

    let first_month = month_start(start_date.unwrap_or(earliest.date));
    let last_month = month_start(today);
    let months = month_starts(first_month, last_month);

    // Backward as-of join. `latest` only ever moves forward, so once a month resolves
    // every later month does too; gaps can only be leading.
    let mut resolved: Vec<Option<(f64, NaiveDate)>> = Vec::with_capacity(months.len());
    let mut cursor = 0;
    let mut latest = None;
    for month in &months {
        let cutoff = match anchor {
            AsOfAnchor::MonthStart => *month,
            AsOfAnchor::MonthEnd => month_end(*month),
        };
        while cursor < sorted.len() && sorted[cursor].date <= cutoff {
            latest = Some((sorted[cursor].value, sorted[cursor].date));
            cursor += 1;
        }
        resolved.push(latest);
    }

    let Some(first_resolved) = resolved.iter().flatten().next().copied() else {
        if !months.is_empty() {
            warn!(
                series = earliest.series_id.as_str(),
                last_month = %last_month,
                "no observation on or before the last month; nothing to resample"
            );
        }
        return Vec::new();
    };

    months
        .into_iter()
        .zip(resolved)
        .map(|(month_start, slot)| {
            let (value, source_date) = slot.unwrap_or(first_resolved);
            MonthlyAlignedPoint {
                month_start,
                value,
                source_date,
            }
        })
        .collect()
}

/// First day of `date`'s month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn month_end(month_start: NaiveDate) -> NaiveDate {
    match month_start.checked_add_months(Months::new(1)) {
        Some(next) => next - Duration::days(1),
        None => NaiveDate::MAX,
    }
}

fn month_starts(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut month = first;
    while month <= last {
        out.push(month);
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    out
}
