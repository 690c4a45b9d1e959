//! Stock index history exported from a Google Finance spreadsheet.
//!
//! Columns: `ticker,date,open,high,low,close,volume`. Dates look like
//! `2024-01-02 16.00.00` and prices may use a decimal comma (quoted in the CSV).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::RawObservation;
use crate::error::AppError;
use crate::io::{RowError, parse_period};

#[derive(Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Default)]
pub struct StockSheet {
    /// Ticker from the first data row.
    pub ticker: Option<String>,
    pub quotes: Vec<StockQuote>,
    pub row_errors: Vec<RowError>,
}

impl StockSheet {
    /// Closing prices as raw observations, ready for normalization.
    pub fn close_observations(&self) -> Vec<RawObservation> {
        self.quotes
            .iter()
            .map(|q| RawObservation::new(q.date.to_string(), Some(q.close.to_string())))
            .collect()
    }
}

pub fn load_stock_sheet(path: &Path) -> Result<StockSheet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open stock sheet '{}': {e}", path.display())))?;
    let sheet = read_stock_sheet(file)?;
    info!(
        path = %path.display(),
        ticker = sheet.ticker.as_deref().unwrap_or("?"),
        quotes = sheet.quotes.len(),
        "loaded stock sheet"
    );
    Ok(sheet)
}

pub fn read_stock_sheet<R: Read>(reader: R) -> Result<StockSheet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sheet = StockSheet::default();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Stock sheet line {line}: {e}")))?;
        if record.len() < 6 {
            sheet.row_errors.push(RowError {
                line,
                id: None,
                message: format!("expected at least 6 columns, found {}", record.len()),
            });
            continue;
        }

        if sheet.ticker.is_none() {
            sheet.ticker = Some(record[0].to_string()).filter(|t| !t.is_empty());
        }

        match parse_quote(&record) {
            Ok(quote) => sheet.quotes.push(quote),
            Err(message) => sheet.row_errors.push(RowError {
                line,
                id: Some(record[1].to_string()),
                message,
            }),
        }
    }

    Ok(sheet)
}

fn parse_quote(record: &csv::StringRecord) -> Result<StockQuote, String> {
    let date = parse_period(&record[1]).map_err(|e| e.to_string())?;
    Ok(StockQuote {
        date,
        open: parse_price(&record[2])?,
        high: parse_price(&record[3])?,
        low: parse_price(&record[4])?,
        close: parse_price(&record[5])?,
        // Unreadable volume counts as zero.
        volume: record.get(6).and_then(|v| v.parse().ok()).unwrap_or(0),
    })
}

fn parse_price(raw: &str) -> Result<f64, String> {
    let normalized = raw.replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid price '{raw}'"))
}
