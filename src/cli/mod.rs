//! Command-line parsing for the orbit census.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/census code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;
use crate::domain::{Provider, RefreshPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "orbit", version, about = "Space debris census (LEO/MEO/GEO) from Space-Track or CelesTrak")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Directory holding the cached snapshot (overrides ORBIT_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Catalog provider (overrides ORBIT_PROVIDER).
    #[arg(long, global = true, value_enum)]
    pub provider: Option<Provider>,

    /// When to fetch instead of reading the cache.
    #[arg(long, global = true, value_enum, default_value_t = RefreshPolicy::Auto)]
    pub refresh: RefreshPolicy,

    /// Cache time-to-live in seconds (overrides ORBIT_CACHE_TTL_SECS).
    #[arg(long, global = true, value_name = "SECS")]
    pub ttl_secs: Option<i64>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            data_dir: self.data_dir.clone(),
            provider: self.provider,
            ttl_secs: self.ttl_secs,
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the catalog from the provider and write the cache.
    Fetch,
    /// Print KPIs, the regime × category table and a bar chart; optionally export.
    Summary(SummaryArgs),
    /// Find an active satellite by name and report on its orbit regime.
    Search(SearchArgs),
    /// List the debris inventory.
    Debris(DebrisArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same underlying pipeline as `orbit summary`, but renders
    /// results in a terminal UI using Ratatui.
    Tui,
}

#[derive(Debug, Clone, Args)]
pub struct SummaryArgs {
    /// Export the census to JSON.
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Export the dense regime × category grid to CSV.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Disable the bar chart.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Name fragment, e.g. STARLINK, ISS, NOAA.
    pub query: String,

    /// How many further matches to list.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Clone, Args)]
pub struct DebrisArgs {
    /// Number of rows to show.
    #[arg(long, default_value_t = 100)]
    pub top: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["orbit", "summary", "--provider", "mirror", "--refresh", "never"]);
        assert_eq!(cli.global.provider, Some(Provider::Mirror));
        assert_eq!(cli.global.refresh, RefreshPolicy::Never);
        assert!(matches!(cli.command, Command::Summary(_)));
    }

    #[test]
    fn search_takes_positional_query() {
        let cli = Cli::parse_from(["orbit", "search", "starlink", "--limit", "3"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "starlink");
                assert_eq!(args.limit, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
