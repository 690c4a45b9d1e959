//! `econ-pulse` library crate.
//!
//! The binary (`econ`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the normalization and scoring engine is reusable without the provider clients
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod score;
pub mod series;
pub mod telemetry;
pub mod thresholds;
