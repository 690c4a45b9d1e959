//! Month-over-month percentage change.

use crate::domain::LabeledObservation;
use crate::error::EngineError;

/// Appended to the base indicator's name on derived rows.
pub const CHANGE_SUFFIX: &str = " (Monthly rate of change)";

/// Derived rows are always a percentage delta, whatever the base unit was.
pub const CHANGE_UNIT: &str = "Percent";

/// Percentage change between consecutive observations of `indicator_name`.
///
/// Rows of other indicators are ignored. The first observation has no predecessor
/// and is dropped, so the output is one row shorter than the series. A zero
/// predecessor fails the whole series rather than emitting an infinite change.
pub fn monthly_change(
    rows: &[LabeledObservation],
    indicator_name: &str,
) -> Result<Vec<LabeledObservation>, EngineError> {
    let mut series: Vec<&LabeledObservation> =
        rows.iter().filter(|row| row.indicator == indicator_name).collect();
    series.sort_by_key(|row| row.date);

    let derived_name = format!("{indicator_name}{CHANGE_SUFFIX}");

    series
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev.value == 0.0 {
                return Err(EngineError::DivisionByZero {
                    indicator: indicator_name.to_string(),
                    date: curr.date,
                });
            }

            let change = (curr.value - prev.value) / prev.value * 100.0;
            if !change.is_finite() {
                return Err(EngineError::NonFiniteChange {
                    indicator: indicator_name.to_string(),
                    date: curr.date,
                });
            }

            Ok(LabeledObservation {
                date: curr.date,
                value: change,
                indicator: derived_name.clone(),
                source: curr.source.clone(),
                unit: CHANGE_UNIT.to_string(),
            })
        })
        .collect()
}
