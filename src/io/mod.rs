//! Input/output helpers.
//!
//! - raw observation normalization and labeled CSV ingest (`ingest`)
//! - scored dataset exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
