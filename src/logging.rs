//! Tracing subscriber setup.
//!
//! CLI commands log to stderr. The TUI owns the terminal, so it logs to a
//! file in the data directory instead.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "orbit.log";
const DEFAULT_FILTER: &str = "orbit_census=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes file output on drop and must be held for the
/// lifetime of the program. Initializing twice is a no-op.
pub fn init(target: LogTarget<'_>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
        LogTarget::File(dir) => {
            if std::fs::create_dir_all(dir).is_err() {
                return None;
            }
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .try_init();
            Some(guard)
        }
    }
}
