//! Command-line parsing for the economic indicator scorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetching/scoring code. Flags left unset fall back to the
//! environment configuration (see `config`).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Category;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "econ", version, about = "Economic indicator normalization and threshold scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every catalog indicator, derive monthly series, score and report.
    Run(RunArgs),
    /// Score an already-labeled dataset CSV (`date,value,indicator,source,unit`).
    Score(ScoreArgs),
    /// Print the parsed threshold rules and any malformed ranges.
    Rules(RulesArgs),
}

/// Output options shared by `run` and `score`.
#[derive(Debug, Args, Clone, Default)]
pub struct OutputArgs {
    /// Threshold table CSV (overrides `ECON_THRESHOLDS`).
    #[arg(long, value_name = "CSV")]
    pub thresholds: Option<PathBuf>,

    /// Export scored rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export scored rows to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// First date to fetch (overrides `ECON_FROM_DATE`).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last date to fetch (overrides `ECON_TO_DATE`).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Reference date for monthly resampling (defaults to the system date).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Google Finance sheet export with the stock index history.
    #[arg(long = "stock-csv", value_name = "CSV")]
    pub stock_csv: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Labeled dataset CSV.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RulesArgs {
    /// Threshold table CSV (overrides `ECON_THRESHOLDS`).
    #[arg(long, value_name = "CSV")]
    pub thresholds: Option<PathBuf>,

    /// Only show rules for this indicator slug.
    #[arg(long)]
    pub indicator: Option<String>,

    /// Only show rules of this category.
    #[arg(long, value_enum)]
    pub category: Option<Category>,
}
