//! Error types.
//!
//! - [`EngineError`]: failures of the pure normalization/scoring core. These are always
//!   local to one indicator's series.
//! - [`AppError`]: what the `econ` binary reports, carrying a process exit code.
//!
//! Exit codes: 2 = configuration/input, 3 = nothing to report, 4 = provider/runtime.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{indicator}: previous value is zero on {date}, change rate is undefined")]
    DivisionByZero { indicator: String, date: NaiveDate },

    #[error("{indicator}: change rate on {date} is not finite")]
    NonFiniteChange { indicator: String, date: NaiveDate },

    #[error("unrecognized period '{0}'")]
    InvalidPeriod(String),

    #[error("invalid value '{raw}' for period {period}")]
    InvalidValue { period: String, raw: String },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<EngineError> for AppError {
    fn from(value: EngineError) -> Self {
        Self::new(4, value.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::new(2, format!("configuration error: {value}"))
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::new(2, value.to_string())
    }
}
