//! Reporting utilities: per-indicator summaries and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Catalog, Category, Frequency, ScoredObservation};
use crate::series::rolling_mean;

/// Window of the trend column in the run summary.
pub const TREND_WINDOW: usize = 3;

/// Latest state of one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSummary {
    pub indicator: String,
    pub unit: String,
    /// Native frequency from the catalog; `None` for indicators it does not know.
    pub frequency: Option<Frequency>,
    pub rows: usize,
    pub latest: ScoredObservation,
    /// Mean of the last [`TREND_WINDOW`] values, when there are that many.
    pub trend: Option<f64>,
}

impl IndicatorSummary {
    pub fn category(&self) -> Option<Category> {
        self.latest.category
    }
}

/// Summarize scored rows per indicator, in order of first appearance.
pub fn summarize(rows: &[ScoredObservation], catalog: &Catalog, trend_window: usize) -> Vec<IndicatorSummary> {
    let mut order: Vec<&str> = Vec::new();
    for row in rows {
        if !order.contains(&row.indicator.as_str()) {
            order.push(&row.indicator);
        }
    }

    order
        .into_iter()
        .filter_map(|indicator| {
            let mut series: Vec<&ScoredObservation> = rows.iter().filter(|r| r.indicator == indicator).collect();
            series.sort_by_key(|r| r.date);
            let latest = (*series.last()?).clone();

            let values: Vec<f64> = series.iter().map(|r| r.value).collect();
            let trend = rolling_mean(&values, trend_window).last().copied().flatten();

            Some(IndicatorSummary {
                indicator: indicator.to_string(),
                unit: latest.unit.clone(),
                frequency: catalog.by_slug(indicator).map(|spec| spec.frequency),
                rows: series.len(),
                latest,
                trend,
            })
        })
        .collect()
}

/// Mean score over indicators whose latest value was scored.
pub fn composite_score(summaries: &[IndicatorSummary]) -> Option<f64> {
    let scores: Vec<f64> = summaries
        .iter()
        .filter_map(|s| s.latest.score)
        .map(f64::from)
        .collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn scored(indicator: &str, month: u32, value: f64, score: Option<u8>) -> ScoredObservation {
        ScoredObservation {
            date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            value,
            indicator: indicator.to_string(),
            source: "FRED".to_string(),
            unit: "Percent".to_string(),
            category: score.map(|s| match s {
                0 => Category::Bad,
                1 => Category::Normal,
                _ => Category::Good,
            }),
            score,
        }
    }

    #[test]
    fn summaries_take_the_latest_row_and_a_trailing_trend() {
        let rows = vec![
            scored("a", 3, 3.0, Some(2)),
            scored("b", 1, 9.0, None),
            scored("a", 1, 1.0, Some(1)),
            scored("a", 2, 2.0, Some(1)),
        ];
        let summaries = summarize(&rows, &Catalog::standard(), TREND_WINDOW);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].indicator, "a");
        assert_eq!(summaries[0].rows, 3);
        assert_eq!(summaries[0].latest.value, 3.0);
        assert_eq!(summaries[0].category(), Some(Category::Good));
        assert!((summaries[0].trend.unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(summaries[1].trend, None);
        assert_eq!(summaries[0].frequency, None);
    }

    #[test]
    fn summaries_carry_the_catalog_frequency() {
        let rows = vec![
            scored("interest_rate_change_day_euro", 1, 4.5, Some(1)),
            scored("inflation_monthly_us", 1, 0.3, Some(1)),
        ];
        let summaries = summarize(&rows, &Catalog::standard(), TREND_WINDOW);
        assert_eq!(summaries[0].frequency, Some(Frequency::Daily));
        assert_eq!(summaries[1].frequency, Some(Frequency::Monthly));
    }

    #[test]
    fn composite_ignores_unscored_indicators() {
        let rows = vec![scored("a", 1, 1.0, Some(2)), scored("b", 1, 1.0, Some(1)), scored("c", 1, 1.0, None)];
        let summaries = summarize(&rows, &Catalog::standard(), TREND_WINDOW);
        assert_eq!(composite_score(&summaries), Some(1.5));
        assert_eq!(composite_score(&[]), None);
    }
}
