//! ECB Data Portal (SDMX-JSON).

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::RawObservation;
use crate::error::AppError;

const BASE_URL: &str = "https://data-api.ecb.europa.eu/service/data";

pub struct EcbClient {
    client: Client,
}

impl EcbClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn fetch_series(
        &self,
        dataflow: &str,
        series_key: &str,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, AppError> {
        let url = format!("{BASE_URL}/{dataflow}/{series_key}");
        let start = from.to_string();
        let mut req = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("format", "jsondata"), ("startPeriod", start.as_str())]);
        if let Some(to) = to {
            req = req.query(&[("endPeriod", to.to_string())]);
        }

        debug!(dataflow, series_key, "requesting ECB series");
        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("ECB request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("ECB request for {dataflow}/{series_key} failed with status {}.", resp.status()),
            ));
        }

        let body: SdmxMessage = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse ECB response: {e}")))?;
        body.into_raw(series_key)
    }
}

#[derive(Debug, Deserialize)]
struct SdmxMessage {
    #[serde(rename = "dataSets")]
    data_sets: Vec<DataSet>,
    structure: Structure,
}

#[derive(Debug, Deserialize)]
struct DataSet {
    #[serde(default)]
    series: HashMap<String, SdmxSeries>,
}

#[derive(Debug, Deserialize)]
struct SdmxSeries {
    #[serde(default)]
    observations: HashMap<String, Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Structure {
    dimensions: Dimensions,
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    observation: Vec<ObservationDimension>,
}

#[derive(Debug, Deserialize)]
struct ObservationDimension {
    values: Vec<DimensionValue>,
}

#[derive(Debug, Deserialize)]
struct DimensionValue {
    id: String,
}

impl SdmxMessage {
    fn into_raw(self, series_key: &str) -> Result<Vec<RawObservation>, AppError> {
        let periods = &self
            .structure
            .dimensions
            .observation
            .first()
            .ok_or_else(|| AppError::new(4, format!("ECB {series_key}: response has no observation dimension.")))?
            .values;

        let Some(data_set) = self.data_sets.first() else {
            return Ok(Vec::new());
        };
        if data_set.series.len() > 1 {
            warn!(series_key, count = data_set.series.len(), "ECB returned several series; using the first");
        }
        let Some(series) = data_set
            .series
            .iter()
            .min_by_key(|(key, _)| key_position(key))
            .map(|(_, s)| s)
        else {
            return Ok(Vec::new());
        };

        let mut observations = Vec::with_capacity(series.observations.len());
        for (key, values) in &series.observations {
            let idx: usize = key
                .parse()
                .map_err(|_| AppError::new(4, format!("ECB {series_key}: bad observation index '{key}'.")))?;
            let period = periods
                .get(idx)
                .ok_or_else(|| AppError::new(4, format!("ECB {series_key}: observation index {idx} out of range.")))?;
            let value = values.first().and_then(serde_json::Value::as_f64).map(|v| v.to_string());
            observations.push((idx, RawObservation::new(period.id.clone(), value)));
        }
        observations.sort_by_key(|(idx, _)| *idx);

        Ok(observations.into_iter().map(|(_, obs)| obs).collect())
    }
}

/// Series keys are `"0:0:2:0"` dimension positions; the first series has the lowest
/// position, compared dimension by dimension.
fn key_position(key: &str) -> Vec<u64> {
    key.split(':').map(|part| part.parse().unwrap_or(u64::MAX)).collect()
}

/// Decode an ECB SDMX-JSON body.
pub fn decode_series(series_key: &str, body: &str) -> Result<Vec<RawObservation>, AppError> {
    let msg: SdmxMessage =
        serde_json::from_str(body).map_err(|e| AppError::new(4, format!("Failed to parse ECB response: {e}")))?;
    msg.into_raw(series_key)
}
