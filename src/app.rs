//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves configuration
//! - runs the update cycle
//! - prints and saves the report
//! - publishes to the presentation binding on request

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use log::{error, info};

use crate::cli::{Command, CommonArgs};
use crate::data::StubMarketFetcher;
use crate::domain::UpdaterConfig;
use crate::error::AppError;
use crate::io::presentation::{patcher_for, publish};
use crate::io::store::PricingStore;

pub mod pipeline;

/// Entry point for the `roi` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(&config_from_args(&args)?),
        Command::Report(args) => handle_report(&config_from_args(&args)?),
        Command::Publish(args) => handle_publish(&config_from_args(&args)?),
    }
}

/// Environment config with command-line overrides on top.
pub fn config_from_args(args: &CommonArgs) -> Result<UpdaterConfig, AppError> {
    let mut config = UpdaterConfig::from_env()?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut UpdaterConfig, args: &CommonArgs) {
    if let Some(path) = &args.data_file {
        config.data_file = path.clone();
    }
    if let Some(dir) = &args.report_dir {
        config.report_dir = dir.clone();
    }
    if let Some(source) = args.source {
        config.cycle_source = source;
    }
    if let Some(path) = &args.presentation {
        config.presentation_file = Some(path.clone());
    }
    if args.sequential {
        config.parallel_fetch = false;
    }
}

/// Full update: cycle, then report.
///
/// The cycle has already written its rows by the time the report is saved,
/// so a report that cannot be saved is logged and the run still succeeds.
pub fn handle_run(config: &UpdaterConfig) -> Result<(), AppError> {
    let store = PricingStore::new(config.data_file.clone());
    let fetcher = StubMarketFetcher::new(config.sources.clone());

    pipeline::run_cycle(config, &fetcher, &store, Local::now().date_naive());
    if let Err(err) = print_and_save_report(config) {
        error!("Failed to save report: {err}");
    }
    Ok(())
}

pub fn handle_report(config: &UpdaterConfig) -> Result<(), AppError> {
    print_and_save_report(config)?;
    Ok(())
}

fn print_and_save_report(config: &UpdaterConfig) -> Result<PathBuf, AppError> {
    let store = PricingStore::new(config.data_file.clone());
    let now = Local::now();

    let report = crate::report::generate_report(&store, now, config.report_window_days);
    println!("{report}");
    crate::report::write_report(&config.report_dir, now.date_naive(), &report)
}

pub fn handle_publish(config: &UpdaterConfig) -> Result<(), AppError> {
    let store = PricingStore::new(config.data_file.clone());
    let patcher = patcher_for(config);

    let data = publish(&store, patcher.as_ref(), Local::now())?;
    info!("Publish finished with {} validated entries", data.entry_count());
    Ok(())
}

/// Rewrite argv so bare `roi` (or `roi --flags`) means `roi run`.
///
/// Rules:
/// - `roi`                     -> `roi run`
/// - `roi --data-file x.csv`   -> `roi run --data-file x.csv`
/// - `roi --help/--version/-h` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }

    argv
}
