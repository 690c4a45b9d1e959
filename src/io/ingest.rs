//! Raw observation normalization and CSV ingest.
//!
//! Providers hand back `(period, value)` pairs in their own conventions. This module
//! turns them into clean, date-sorted [`Observation`]s:
//!
//! - **Missing markers** (`.`, `:`, empty, `NaN`, `null`, `NA`) are dropped, never read
//!   as zero
//! - **Row-level validation**: unreadable rows are skipped but reported
//! - **Deterministic**: duplicate dates keep the last value seen

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{LabeledObservation, Observation, RawObservation};
use crate::error::{AppError, EngineError};

const MISSING_MARKERS: [&str; 7] = [".", ":", "", "nan", "null", "na", "n/a"];

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// One series after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    pub observations: Vec<Observation>,
    /// Rows the provider marked as missing.
    pub missing: usize,
    pub row_errors: Vec<RowError>,
}

/// Normalize raw provider rows for `series_id`, keeping dates in `[from, to]`.
pub fn normalize_raw(
    series_id: &str,
    raw: &[RawObservation],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> NormalizedSeries {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut out = NormalizedSeries::default();

    for (idx, row) in raw.iter().enumerate() {
        let value = match parse_raw_value(&row.period, row.value.as_deref()) {
            Ok(Some(v)) => v,
            Ok(None) => {
                out.missing += 1;
                continue;
            }
            Err(e) => {
                out.row_errors.push(RowError {
                    line: idx + 1,
                    id: Some(row.period.clone()),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let date = match parse_period(&row.period) {
            Ok(d) => d,
            Err(e) => {
                out.row_errors.push(RowError {
                    line: idx + 1,
                    id: Some(row.period.clone()),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }

        if by_date.insert(date, value).is_some() {
            warn!(series = series_id, %date, "duplicate period; keeping the later row");
        }
    }

    out.observations = by_date
        .into_iter()
        .map(|(date, value)| Observation {
            series_id: series_id.to_string(),
            date,
            value,
        })
        .collect();

    if !out.row_errors.is_empty() {
        warn!(
            series = series_id,
            rejected = out.row_errors.len(),
            "provider rows could not be read"
        );
    }

    out
}

/// Parse a provider value. `Ok(None)` means the provider marked it missing.
pub fn parse_raw_value(period: &str, raw: Option<&str>) -> Result<Option<f64>, EngineError> {
    let Some(raw) = raw else { return Ok(None) };
    let trimmed = raw.trim();
    if MISSING_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(EngineError::InvalidValue {
            period: period.to_string(),
            raw: raw.to_string(),
        }),
    }
}

/// Parse a provider period into the date it starts on.
///
/// Accepted: `YYYY-MM-DD`, `YYYY-MM-DD HH.MM.SS` (sheet exports), `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM` and `YYYYMmm` (monthly periods → first of month).
pub fn parse_period(raw: &str) -> Result<NaiveDate, EngineError> {
    let s = raw.trim();

    const DATE_FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H.%M.%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    if let Some((year, month)) = s.split_once('-').or_else(|| s.split_once('M')) {
        if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
            if let Some(d) = NaiveDate::from_ymd_opt(year, month, 1) {
                return Ok(d);
            }
        }
    }

    Err(EngineError::InvalidPeriod(raw.to_string()))
}

/// A labeled dataset read from CSV (`date,value,indicator,source,unit`).
#[derive(Debug, Clone)]
pub struct IngestedDataset {
    pub rows: Vec<LabeledObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub missing: usize,
}

pub fn load_labeled_dataset(path: &Path) -> Result<IngestedDataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let dataset = read_labeled_dataset(file)?;
    info!(
        path = %path.display(),
        rows = dataset.rows.len(),
        rejected = dataset.row_errors.len(),
        "loaded labeled dataset"
    );
    Ok(dataset)
}

pub fn read_labeled_dataset<R: Read>(reader: R) -> Result<IngestedDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in ["date", "value", "indicator"] {
        if !header_map.contains_key(column) {
            return Err(AppError::new(2, format!("Missing required column: `{column}`")));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut missing = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, after the header.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_labeled_row(&record, &header_map) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => missing += 1,
            Err(message) => row_errors.push(RowError {
                line,
                id: get_optional(&record, &header_map, "indicator").map(str::to_string),
                message,
            }),
        }
    }

    Ok(IngestedDataset {
        rows,
        row_errors,
        rows_read,
        missing,
    })
}

fn parse_labeled_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<Option<LabeledObservation>, String> {
    let indicator = get_required(record, header_map, "indicator")?;
    let period = get_required(record, header_map, "date")?;
    let date = parse_period(period).map_err(|e| e.to_string())?;

    let value = match parse_raw_value(period, get_optional(record, header_map, "value")) {
        Ok(Some(v)) => v,
        Ok(None) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    Ok(Some(LabeledObservation {
        date,
        value,
        indicator: indicator.to_string(),
        source: get_optional(record, header_map, "source").unwrap_or("").to_string(),
        unit: get_optional(record, header_map, "unit").unwrap_or("").to_string(),
    }))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}
