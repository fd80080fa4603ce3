//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the census code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use chrono::{DateTime, TimeDelta, Utc};

use crate::app::pipeline::CensusRun;
use crate::census::AggregationResult;
use crate::domain::{CatalogRecord, Category, OrbitRegime};
use crate::report::search::SearchReport;

/// Full run summary: caption, KPIs, regime table and exclusion audit.
pub fn format_run_summary(run: &CensusRun, now: DateTime<Utc>, ttl: TimeDelta) -> String {
    let mut out = String::new();
    let census = &run.census;

    out.push_str("=== orbit - Space Debris Census ===\n");
    out.push_str(&format!(
        "Source: {} | Data last updated: {}{}\n",
        run.stamp.provider.display_name(),
        run.stamp.caption(),
        if run.is_stale(now, ttl) { " (stale)" } else { "" },
    ));
    out.push('\n');

    out.push_str(&format_kpis(census));
    out.push('\n');
    out.push_str(&format_regime_table(census));

    let excluded = census.excluded;
    if excluded.total() > 0 {
        out.push_str(&format!(
            "\nExcluded (no mean motion): {} active, {} debris | input rows: {}\n",
            excluded.active,
            excluded.debris,
            census.input_count(),
        ));
    }
    let row_errors = run.row_error_count();
    if row_errors > 0 {
        out.push_str(&format!("Skipped unreadable CSV rows: {row_errors}\n"));
    }

    out
}

/// The three headline metrics.
pub fn format_kpis(census: &AggregationResult) -> String {
    format!(
        "Objects in orbit: {}\nActive satellites: {}\nDebris: {} ({} of total)\n",
        census.total_objects,
        census.total_active,
        census.total_debris,
        fmt_percent(census.debris_fraction()),
    )
}

/// Regime × category counts in canonical order, with row and column totals.
pub fn format_regime_table(census: &AggregationResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:<20} {:>10} {:>10} {:>10}\n",
        "orbit", "altitude", "active", "debris", "total"
    ));
    out.push_str(&format!(
        "{:-<6} {:-<20} {:-<10} {:-<10} {:-<10}\n",
        "", "", "", "", ""
    ));

    for regime in OrbitRegime::ALL {
        out.push_str(&format!(
            "{:<6} {:<20} {:>10} {:>10} {:>10}\n",
            regime.label(),
            regime.altitude_band(),
            census.count(regime, Category::Active),
            census.count(regime, Category::Debris),
            census.regime_total(regime),
        ));
    }

    out.push_str(&format!(
        "{:<6} {:<20} {:>10} {:>10} {:>10}\n",
        "all", "", census.total_active, census.total_debris, census.total_objects
    ));
    out
}

/// Search result block for the CLI.
pub fn format_search(report: Option<&SearchReport<'_>>, query: &str, limit: usize) -> String {
    let Some(report) = report else {
        return format!("No active object matches '{}'.\n", query.trim());
    };

    let t = report.target;
    let mut out = String::new();
    out.push_str(&format!("Report for: {}\n", t.display_name()));
    out.push_str(&format!(
        "Catalog ID: {} | Epoch: {}\n",
        t.catalog_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
        t.epoch.as_deref().unwrap_or("-"),
    ));

    match (report.regime, report.debris_in_regime) {
        (Some(regime), Some(debris)) => out.push_str(&format!(
            "Orbit: {} ({}) | mean motion {:.4} rev/day | debris in {}: {}\n",
            regime.label(),
            regime.altitude_band(),
            t.mean_motion.unwrap_or(f64::NAN),
            regime.label(),
            debris,
        )),
        _ => out.push_str("Orbit: unknown (no mean motion)\n"),
    }

    if !report.other_matches.is_empty() {
        out.push_str(&format!("\nOther matches ({}):\n", report.other_matches.len()));
        for r in report.other_matches.iter().take(limit) {
            out.push_str(&format!("  {:<32} {}\n", truncate(r.display_name(), 32), fmt_id(r)));
        }
        let hidden = report.other_matches.len().saturating_sub(limit);
        if hidden > 0 {
            out.push_str(&format!("  ... and {hidden} more\n"));
        }
    }

    out
}

/// Debris inventory: the first `top` rows (name + catalog id).
pub fn format_debris_inventory(records: &[CatalogRecord], top: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Debris inventory (first {} of {}):\n", top.min(records.len()), records.len()));
    out.push_str(format!("{:<32} {:>12}\n", "OBJECT_NAME", "NORAD_CAT_ID").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<32} {:-<12}\n", "", "").trim_end());
    out.push('\n');

    for r in records.iter().take(top) {
        out.push_str(
            format!("{:<32} {:>12}\n", truncate(r.display_name(), 32), fmt_id(r)).trim_end(),
        );
        out.push('\n');
    }
    out
}

pub fn fmt_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) if f.is_finite() => format!("{:.1}%", f * 100.0),
        _ => "n/a".to_string(),
    }
}

fn fmt_id(r: &CatalogRecord) -> String {
    r.catalog_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
