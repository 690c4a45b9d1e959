//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations at each stage (`RawObservation`, `Observation`, `LabeledObservation`,
//!   `MonthlyAlignedPoint`, `ScoredObservation`)
//! - threshold rules and intervals (`Category`, `Interval`, `ThresholdRule`)
//! - the indicator catalog (`Catalog`, `IndicatorSpec`, `Provider`)

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
