//! FRED API integration.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::RawObservation;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 10000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Monthly observations of `series_id` in `[from, to]`, as FRED spells them.
    pub fn fetch_series(
        &self,
        series_id: &str,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, AppError> {
        let limit = OBS_LIMIT.to_string();
        let start = from.to_string();
        let mut req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("frequency", "m"),
            ("sort_order", "asc"),
            ("limit", limit.as_str()),
            ("observation_start", start.as_str()),
        ]);

        if let Some(date) = to {
            req = req.query(&[("observation_end", date.to_string())]);
        }

        debug!(series = series_id, %from, "requesting FRED observations");
        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request for {series_id} failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;

        Ok(body.into_raw())
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

impl ObservationsResponse {
    fn into_raw(self) -> Vec<RawObservation> {
        self.observations
            .into_iter()
            .map(|obs| RawObservation::new(obs.date, Some(obs.value)))
            .collect()
    }
}

/// Decode a FRED `series/observations` JSON body.
pub fn decode_observations(body: &str) -> Result<Vec<RawObservation>, AppError> {
    let resp: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;
    Ok(resp.into_raw())
}
