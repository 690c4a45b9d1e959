//! Run configuration from the environment (and an optional `.env` file).
//!
//! | variable          | default                           |
//! |-------------------|-----------------------------------|
//! | `FRED_API_KEY`    | none (required for FRED fetches)  |
//! | `ECON_FROM_DATE`  | `2019-01-01`                      |
//! | `ECON_TO_DATE`    | none (open-ended, i.e. today)     |
//! | `ECON_THRESHOLDS` | `config/economic_thresholds.csv`  |
//! | `ECON_LOG`        | `info`                            |
//!
//! CLI flags override these values in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub const DEFAULT_FROM_DATE: &str = "2019-01-01";
pub const DEFAULT_THRESHOLDS: &str = "config/economic_thresholds.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window: DateWindowConfig,
    pub thresholds_path: PathBuf,
    pub fred_api_key: Option<String>,
    pub telemetry: TelemetryConfig,
}

/// Requested observation window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindowConfig {
    pub from_date: NaiveDate,
    pub to_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { key: &'static str, value: String },
    #[error("ECON_TO_DATE ({to}) is before ECON_FROM_DATE ({from})")]
    InvertedWindow { from: NaiveDate, to: NaiveDate },
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let from_raw = non_empty("ECON_FROM_DATE").unwrap_or_else(|| DEFAULT_FROM_DATE.to_string());
        let from_date = parse_config_date("ECON_FROM_DATE", &from_raw)?;
        let to_date = non_empty("ECON_TO_DATE")
            .map(|raw| parse_config_date("ECON_TO_DATE", &raw))
            .transpose()?;

        if let Some(to) = to_date {
            if to < from_date {
                return Err(ConfigError::InvertedWindow { from: from_date, to });
            }
        }

        let thresholds_path =
            PathBuf::from(non_empty("ECON_THRESHOLDS").unwrap_or_else(|| DEFAULT_THRESHOLDS.to_string()));
        let log_level = non_empty("ECON_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            window: DateWindowConfig { from_date, to_date },
            thresholds_path,
            fred_api_key: non_empty("FRED_API_KEY").map(|v| v.trim().to_string()),
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_config_date(key: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        key,
        value: raw.to_string(),
    })
}
