//! Shared domain types.
//!
//! Everything here is plain data: the transforms in `series`, `thresholds` and `score`
//! take these by reference and return new values; nothing is mutated in place.

use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Threshold quality category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bad,
    Normal,
    Good,
}

impl Category {
    /// Order in which a threshold row's columns are expanded into rules.
    ///
    /// Rule order drives first-match-wins scoring, so this is fixed here rather than
    /// taken from the position of columns in the input file.
    pub const TABLE_ORDER: [Category; 3] = [Category::Bad, Category::Normal, Category::Good];

    pub fn score(self) -> u8 {
        match self {
            Category::Bad => 0,
            Category::Normal => 1,
            Category::Good => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Bad => "bad",
            Category::Normal => "normal",
            Category::Good => "good",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Native sampling frequency of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A provider row before normalization: the period as the provider spells it and the
/// raw value, `None` when the provider omitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub period: String,
    pub value: Option<String>,
}

impl RawObservation {
    pub fn new(period: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self {
            period: period.into(),
            value: value.map(Into::into),
        }
    }
}

/// One normalized point of a single series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub series_id: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// One row of the merged dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledObservation {
    pub date: NaiveDate,
    pub value: f64,
    pub indicator: String,
    pub source: String,
    pub unit: String,
}

/// Output of the monthly resampler.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAlignedPoint {
    pub month_start: NaiveDate,
    pub value: f64,
    /// Date of the raw observation this month's value came from.
    pub source_date: NaiveDate,
}

/// A numeric interval; `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub inclusive_min: bool,
    pub inclusive_max: bool,
}

impl Interval {
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            inclusive_min: true,
            inclusive_max: true,
        }
    }

    /// `(-inf, max]`
    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
            inclusive_min: false,
            inclusive_max: true,
        }
    }

    /// `(min, +inf)`
    pub fn above(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
            inclusive_min: false,
            inclusive_max: false,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let above_min = match self.min {
            None => true,
            Some(min) if self.inclusive_min => value >= min,
            Some(min) => value > min,
        };
        let below_max = match self.max {
            None => true,
            Some(max) if self.inclusive_max => value <= max,
            Some(max) => value < max,
        };
        above_min && below_max
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min.is_some() && self.inclusive_min { '[' } else { '(' };
        let close = if self.max.is_some() && self.inclusive_max { ']' } else { ')' };
        let min = self.min.map(|v| v.to_string()).unwrap_or_else(|| "-inf".to_string());
        let max = self.max.map(|v| v.to_string()).unwrap_or_else(|| "+inf".to_string());
        write!(f, "{open}{min}, {max}{close}")
    }
}

/// An interval produced by the range parser, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeInterval {
    pub indicator: String,
    pub category: Category,
    pub interval: Interval,
}

/// A range alternative that matched none of the known syntaxes.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRange {
    pub indicator: String,
    pub category: Category,
    pub alternative: String,
}

impl fmt::Display for MalformedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}: unrecognized range '{}'",
            self.indicator, self.category, self.alternative
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    pub indicator: String,
    pub category: Category,
    pub interval: Interval,
    pub score: u8,
}

impl ThresholdRule {
    pub fn contains(&self, value: f64) -> bool {
        self.interval.contains(value)
    }
}

/// Scorer output for a matched value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub category: Category,
    pub score: u8,
}

/// A merged-dataset row plus its verdict; `category`/`score` are `None` when no rule
/// covered the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredObservation {
    pub date: NaiveDate,
    pub value: f64,
    pub indicator: String,
    pub source: String,
    pub unit: String,
    pub category: Option<Category>,
    pub score: Option<u8>,
}

impl ScoredObservation {
    pub fn new(row: LabeledObservation, verdict: Option<Verdict>) -> Self {
        Self {
            date: row.date,
            value: row.value,
            indicator: row.indicator,
            source: row.source,
            unit: row.unit,
            category: verdict.map(|v| v.category),
            score: verdict.map(|v| v.score),
        }
    }
}
