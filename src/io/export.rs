//! Export the scored dataset.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts; the
//! JSON export is an array of the same records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ScoredObservation;
use crate::error::AppError;

pub const CSV_HEADER: [&str; 7] = ["date", "value", "indicator", "source", "unit", "category", "score"];

/// Write scored rows to a CSV file. Unmatched rows leave `category`/`score` empty.
pub fn write_scored_csv(path: &Path, rows: &[ScoredObservation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_scored_csv_to(file, rows)
}

pub fn write_scored_csv_to<W: Write>(writer: W, rows: &[ScoredObservation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        let date = r.date.to_string();
        let value = r.value.to_string();
        let category = r.category.map(|c| c.as_str()).unwrap_or("");
        let score = r.score.map(|s| s.to_string()).unwrap_or_default();
        writer
            .write_record([
                date.as_str(),
                value.as_str(),
                r.indicator.as_str(),
                r.source.as_str(),
                r.unit.as_str(),
                category,
                score.as_str(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write scored rows as a JSON array of records.
pub fn write_scored_json(path: &Path, rows: &[ScoredObservation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, rows)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}
