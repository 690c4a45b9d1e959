//! Eurostat dissemination API (JSON-stat 2.0).
//!
//! Values live in one flat array indexed in row-major order over the `id`/`size`
//! dimensions. The request filters every non-time dimension down to a single category,
//! so only the time dimension varies.

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::RawObservation;
use crate::error::AppError;

const BASE_URL: &str = "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data";
const TIME_DIMENSION: &str = "time";

pub struct EurostatClient {
    client: Client,
}

impl EurostatClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn fetch_dataset(
        &self,
        dataset: &str,
        filters: &[(&str, &str)],
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, AppError> {
        let url = format!("{BASE_URL}/{dataset}");
        let since = from.format("%Y-%m").to_string();
        let mut req = self
            .client
            .get(&url)
            .query(&[("format", "JSON"), ("lang", "EN"), ("sinceTimePeriod", since.as_str())])
            .query(filters);
        if let Some(to) = to {
            req = req.query(&[("untilTimePeriod", to.format("%Y-%m").to_string())]);
        }

        debug!(dataset, "requesting Eurostat dataset");
        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("Eurostat request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Eurostat request for {dataset} failed with status {}.", resp.status()),
            ));
        }

        let body: JsonStat = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse Eurostat response: {e}")))?;
        body.into_raw(dataset)
    }
}

#[derive(Debug, Deserialize)]
struct JsonStat {
    #[serde(default)]
    id: Vec<String>,
    #[serde(default)]
    size: Vec<usize>,
    dimension: HashMap<String, Dimension>,
    #[serde(default)]
    value: HashMap<String, Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    category: DimensionCategory,
}

#[derive(Debug, Deserialize)]
struct DimensionCategory {
    index: HashMap<String, usize>,
}

impl JsonStat {
    fn into_raw(self, dataset: &str) -> Result<Vec<RawObservation>, AppError> {
        let time = self
            .dimension
            .get(TIME_DIMENSION)
            .ok_or_else(|| AppError::new(4, format!("Eurostat {dataset}: response has no time dimension.")))?;

        self.check_single_series(dataset)?;

        let mut periods: Vec<(&String, usize)> = time.category.index.iter().map(|(p, i)| (p, *i)).collect();
        periods.sort_by_key(|(_, i)| *i);

        Ok(periods
            .into_iter()
            .map(|(period, pos)| {
                let value = self
                    .value
                    .get(&pos.to_string())
                    .copied()
                    .flatten()
                    .map(|v| v.to_string());
                RawObservation::new(period.clone(), value)
            })
            .collect())
    }

    /// With every other dimension at one category, value positions equal time positions.
    fn check_single_series(&self, dataset: &str) -> Result<(), AppError> {
        if self.id.len() != self.size.len() {
            return Err(AppError::new(4, format!("Eurostat {dataset}: `id` and `size` disagree.")));
        }
        for (name, size) in self.id.iter().zip(&self.size) {
            if name != TIME_DIMENSION && *size != 1 {
                return Err(AppError::new(
                    4,
                    format!("Eurostat {dataset}: dimension `{name}` has {size} categories; filter it to one."),
                ));
            }
        }
        Ok(())
    }
}

/// Decode a Eurostat JSON-stat body.
pub fn decode_dataset(dataset: &str, body: &str) -> Result<Vec<RawObservation>, AppError> {
    let stat: JsonStat = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse Eurostat response: {e}")))?;
    stat.into_raw(dataset)
}
