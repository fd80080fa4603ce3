//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves settings (defaults, `.env`, environment, flags)
//! - installs logging
//! - loads or fetches the catalog snapshot
//! - prints reports or launches the dashboard

use chrono::Utc;
use clap::Parser;
use tracing::info;

use crate::cli::{Command, DebrisArgs, GlobalArgs, SearchArgs, SummaryArgs};
use crate::config::Settings;
use crate::domain::Category;
use crate::error::AppError;
use crate::io::cache::SnapshotCache;
use crate::logging::{self, LogTarget};

pub mod pipeline;

use pipeline::CensusRun;

/// Entry point for the `orbit` binary.
pub fn run() -> Result<(), AppError> {
    // We want `orbit` and `orbit --provider mirror` to behave like `orbit tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let mut settings = Settings::from_env()?;
    settings.apply_overrides(&cli.global.overrides())?;

    let _log_guard = match cli.command {
        Command::Tui => logging::init(LogTarget::File(&settings.data_dir)),
        _ => logging::init(LogTarget::Stderr),
    };

    match cli.command {
        Command::Fetch => handle_fetch(&settings),
        Command::Summary(args) => handle_summary(&settings, &cli.global, &args),
        Command::Search(args) => handle_search(&settings, &cli.global, &args),
        Command::Debris(args) => handle_debris(&settings, &cli.global, &args),
        Command::Tui => crate::tui::run(settings, cli.global.refresh),
    }
}

fn load(settings: &Settings, global: &GlobalArgs) -> Result<CensusRun, AppError> {
    let cache = SnapshotCache::new(&settings.data_dir);
    pipeline::load_run(&cache, global.refresh, settings.cache_ttl, || {
        crate::data::source_for(settings)
    })
}

fn handle_fetch(settings: &Settings) -> Result<(), AppError> {
    let cache = SnapshotCache::new(&settings.data_dir);
    let source = crate::data::source_for(settings)?;
    let raw = pipeline::refresh(&cache, source.as_ref())?;
    let run = pipeline::build_run(&raw)?;

    println!(
        "Done. Active: {} | Debris: {}",
        run.active.records.len(),
        run.debris.records.len()
    );
    println!("Files saved to {}", cache.dir().display());
    Ok(())
}

fn handle_summary(settings: &Settings, global: &GlobalArgs, args: &SummaryArgs) -> Result<(), AppError> {
    let run = load(settings, global)?;
    let now = Utc::now();

    println!("{}", crate::report::format_run_summary(&run, now, settings.cache_ttl));
    if !args.no_plot {
        println!("{}", crate::plot::render_bar_chart(&run.census, args.width));
    }

    if let Some(path) = &args.json {
        crate::io::export::write_census_json(path, &run.census, &run.stamp, now)?;
        info!(path = %path.display(), "census JSON written");
    }
    if let Some(path) = &args.csv {
        crate::io::export::write_census_csv(path, &run.census)?;
        info!(path = %path.display(), "census CSV written");
    }

    Ok(())
}

fn handle_search(settings: &Settings, global: &GlobalArgs, args: &SearchArgs) -> Result<(), AppError> {
    if args.query.trim().is_empty() {
        return Err(AppError::config("Search query must not be empty."));
    }
    let run = load(settings, global)?;
    let report = crate::report::target_report(&run, &args.query);
    print!("{}", crate::report::format_search(report.as_ref(), &args.query, args.limit));
    Ok(())
}

fn handle_debris(settings: &Settings, global: &GlobalArgs, args: &DebrisArgs) -> Result<(), AppError> {
    let run = load(settings, global)?;
    print!(
        "{}",
        crate::report::format_debris_inventory(run.records(Category::Debris), args.top)
    );
    Ok(())
}

/// Rewrite argv so `orbit` defaults to `orbit tui`.
///
/// Rules:
/// - `orbit`                          -> `orbit tui`
/// - `orbit --provider mirror ...`    -> `orbit tui --provider mirror ...`
/// - `orbit --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fetch" | "summary" | "search" | "debris" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
