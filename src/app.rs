//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads the environment configuration
//! - installs logging
//! - fetches, derives and scores indicators (or scores an offline dataset)
//! - prints reports
//! - writes optional exports
//!
//! The system clock is read here and nowhere else; the pipeline takes `today` as input.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, OutputArgs, RulesArgs, RunArgs, ScoreArgs};
use crate::config::AppConfig;
use crate::data::{FetchWindow, HttpSources, load_stock_sheet};
use crate::domain::{Catalog, ScoredObservation};
use crate::error::AppError;
use crate::io::{load_labeled_dataset, write_scored_csv, write_scored_json};
use crate::report::{SummaryContext, TREND_WINDOW, format_rules, format_run_summary, summarize};
use crate::score::score_dataset;
use crate::thresholds::{RuleSet, build_rules, load_threshold_table};

pub mod pipeline;

use pipeline::{RunOptions, empty_run_error, resolve_today, run_pipeline};

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    // `econ` and `econ --from 2020-01-01` should behave like `econ run ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = AppConfig::load()?;
    crate::telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Run(args) => handle_run(args, &config),
        Command::Score(args) => handle_score(args, &config),
        Command::Rules(args) => handle_rules(args, &config),
    }
}

fn handle_run(args: RunArgs, config: &AppConfig) -> Result<(), AppError> {
    let from = args.from.unwrap_or(config.window.from_date);
    let to = args.to.or(config.window.to_date);
    let today = resolve_today(from, to, args.today.unwrap_or_else(|| Local::now().date_naive()))?;

    let rules = load_rules(&thresholds_path(&args.output, config))?;
    let stock = args.stock_csv.as_deref().map(load_stock_sheet).transpose()?;
    let source = HttpSources::new(config.fred_api_key.clone())?;

    let options = RunOptions {
        window: FetchWindow { from, to },
        today,
        stock,
    };
    let catalog = Catalog::standard();
    let output = run_pipeline(&source, &catalog, &rules, &options);

    if let Some(err) = empty_run_error(&output, from, today) {
        return Err(err);
    }

    let ctx = SummaryContext {
        title: "Economic Indicators",
        window: format!("{from} .. {}", to.unwrap_or(today)),
    };
    println!(
        "{}",
        format_run_summary(
            &ctx,
            &summarize(&output.scored, &catalog, TREND_WINDOW),
            &output.counts,
            &output.failures,
            &output.malformed,
        )
    );

    write_exports(&args.output, &output.scored)
}

fn handle_score(args: ScoreArgs, config: &AppConfig) -> Result<(), AppError> {
    let rules = load_rules(&thresholds_path(&args.output, config))?;
    let dataset = load_labeled_dataset(&args.input)?;

    for err in &dataset.row_errors {
        warn!(
            line = err.line,
            id = err.id.as_deref().unwrap_or(""),
            message = %err.message,
            "skipped dataset row"
        );
    }
    if dataset.rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable rows in '{}'.", args.input.display()),
        ));
    }

    let first = dataset.rows.iter().map(|r| r.date).min();
    let last = dataset.rows.iter().map(|r| r.date).max();
    let scored = score_dataset(dataset.rows, &rules.rules);

    let ctx = SummaryContext {
        title: "Offline Scoring",
        window: format!("{} .. {}", fmt_date(first), fmt_date(last)),
    };
    println!(
        "{}",
        format_run_summary(&ctx, &summarize(&scored, &Catalog::standard(), TREND_WINDOW), &[], &[], &rules.malformed)
    );
    if !dataset.row_errors.is_empty() {
        println!("Rejected rows: {} of {}", dataset.row_errors.len(), dataset.rows_read);
    }

    write_exports(&args.output, &scored)
}

fn handle_rules(args: RulesArgs, config: &AppConfig) -> Result<(), AppError> {
    let path = args.thresholds.clone().unwrap_or_else(|| config.thresholds_path.clone());
    let rules = load_rules(&path)?;

    let selected: Vec<_> = rules
        .rules
        .iter()
        .filter(|r| args.indicator.as_deref().is_none_or(|i| r.indicator == i))
        .filter(|r| args.category.is_none_or(|c| r.category == c))
        .collect();
    let malformed: Vec<_> = rules
        .malformed
        .iter()
        .filter(|m| args.indicator.as_deref().is_none_or(|i| m.indicator == i))
        .filter(|m| args.category.is_none_or(|c| m.category == c))
        .collect();

    if selected.is_empty() && malformed.is_empty() {
        return Err(AppError::new(3, "No rules match the given filters."));
    }

    println!("{}", format_rules(&selected, &malformed));
    Ok(())
}

fn load_rules(path: &Path) -> Result<RuleSet, AppError> {
    let table = load_threshold_table(path)?;
    let rules = build_rules(&table);
    info!(
        rows = table.len(),
        rules = rules.len(),
        malformed = rules.malformed.len(),
        "built threshold rules"
    );
    Ok(rules)
}

fn thresholds_path(output: &OutputArgs, config: &AppConfig) -> PathBuf {
    output
        .thresholds
        .clone()
        .unwrap_or_else(|| config.thresholds_path.clone())
}

fn write_exports(output: &OutputArgs, rows: &[ScoredObservation]) -> Result<(), AppError> {
    if let Some(path) = &output.export {
        write_scored_csv(path, rows)?;
        info!(path = %path.display(), rows = rows.len(), "wrote CSV export");
    }
    if let Some(path) = &output.export_json {
        write_scored_json(path, rows)?;
        info!(path = %path.display(), rows = rows.len(), "wrote JSON export");
    }
    Ok(())
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string())
}

/// Rewrite argv so `econ` defaults to `econ run`.
///
/// Rules:
/// - `econ`                        -> `econ run`
/// - `econ --from 2020-01-01 ...`  -> `econ run --from 2020-01-01 ...`
/// - `econ --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "score" | "rules");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
