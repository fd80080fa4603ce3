//! Shared "census pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cache check -> (fetch -> write cache) -> read cache -> ingest -> aggregate
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use crate::census::{AggregationResult, aggregate};
use crate::data::{CatalogSource, ProviderSchema, RawCatalog};
use crate::domain::{CatalogRecord, Category, RefreshPolicy};
use crate::error::AppError;
use crate::io::cache::{CacheStamp, SnapshotCache};
use crate::io::ingest::{IngestedCatalog, parse_catalog_csv};

/// All computed outputs for one loaded snapshot.
#[derive(Debug, Clone)]
pub struct CensusRun {
    pub stamp: CacheStamp,
    pub active: IngestedCatalog,
    pub debris: IngestedCatalog,
    pub census: AggregationResult,
}

impl CensusRun {
    pub fn records(&self, category: Category) -> &[CatalogRecord] {
        match category {
            Category::Active => &self.active.records,
            Category::Debris => &self.debris.records,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.stamp.is_stale(now, ttl)
    }

    pub fn row_error_count(&self) -> usize {
        self.active.row_errors.len() + self.debris.row_errors.len()
    }
}

/// Ingest both datasets with the provider's schema and run the census.
pub fn build_run(raw: &RawCatalog) -> Result<CensusRun, AppError> {
    let schema = ProviderSchema::for_provider(raw.provider);
    let active = parse_catalog_csv(&raw.active_csv, Category::Active, schema)?;
    let debris = parse_catalog_csv(&raw.debris_csv, Category::Debris, schema)?;

    for (category, ingested) in [(Category::Active, &active), (Category::Debris, &debris)] {
        for err in &ingested.row_errors {
            warn!(%category, line = err.line, message = %err.message, "skipped CSV row");
        }
        if !ingested.has_mean_motion && !ingested.records.is_empty() {
            warn!(
                %category,
                rows = ingested.records.len(),
                "provider CSV has no mean-motion column; rows cannot be classified"
            );
        }
    }

    let all: Vec<CatalogRecord> = active
        .records
        .iter()
        .chain(&debris.records)
        .cloned()
        .collect();
    let census = aggregate(&all);

    info!(
        objects = census.total_objects,
        active = census.total_active,
        debris = census.total_debris,
        excluded = census.excluded.total(),
        "census computed"
    );

    Ok(CensusRun {
        stamp: CacheStamp {
            provider: raw.provider,
            fetched_at: raw.fetched_at,
        },
        active,
        debris,
        census,
    })
}

/// Fetch from `source` and write the result to the cache.
pub fn refresh(cache: &SnapshotCache, source: &dyn CatalogSource) -> Result<RawCatalog, AppError> {
    info!(provider = source.provider().display_name(), "fetching catalog");
    let raw = source.fetch()?;
    cache.write_snapshot(&raw)?;
    Ok(raw)
}

/// Make sure a snapshot is available according to `policy`, fetching when needed.
///
/// `make_source` is only called when a fetch is actually required, so reading
/// a fresh cache never needs credentials. Under `Auto`, a failed fetch falls
/// back to an existing (stale) cache.
pub fn ensure_snapshot(
    cache: &SnapshotCache,
    policy: RefreshPolicy,
    ttl: TimeDelta,
    now: DateTime<Utc>,
    make_source: impl FnOnce() -> Result<Box<dyn CatalogSource>, AppError>,
) -> Result<RawCatalog, AppError> {
    match policy {
        RefreshPolicy::Never => cache.read_snapshot(),
        RefreshPolicy::Always => refresh(cache, make_source()?.as_ref()),
        RefreshPolicy::Auto => {
            let stamp = if cache.exists() { cache.read_stamp()? } else { None };
            let fresh = cache.exists() && stamp.is_some_and(|s| !s.is_stale(now, ttl));
            if fresh {
                return cache.read_snapshot();
            }

            let fetched = make_source().and_then(|source| refresh(cache, source.as_ref()));
            match fetched {
                Ok(raw) => Ok(raw),
                Err(err) if cache.exists() => {
                    warn!(error = %err, "refresh failed, using stale cache");
                    cache.read_snapshot()
                }
                Err(err) => Err(err),
            }
        }
    }
}

/// Convenience: ensure a snapshot and build the run from it.
pub fn load_run(
    cache: &SnapshotCache,
    policy: RefreshPolicy,
    ttl: TimeDelta,
    make_source: impl FnOnce() -> Result<Box<dyn CatalogSource>, AppError>,
) -> Result<CensusRun, AppError> {
    let raw = ensure_snapshot(cache, policy, ttl, Utc::now(), make_source)?;
    build_run(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrbitRegime, Provider};
    use chrono::TimeZone;

    fn raw(provider: Provider, active: &str, debris: &str) -> RawCatalog {
        RawCatalog {
            provider,
            fetched_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            active_csv: active.to_string(),
            debris_csv: debris.to_string(),
        }
    }

    #[test]
    fn builds_census_from_space_track_bodies() {
        let run = build_run(&raw(
            Provider::SpaceTrack,
            "OBJECT_NAME,NORAD_CAT_ID,MEAN_MOTION\nA,1,15.0\nB,2,3.0\nC,3,1.0\n",
            "OBJECT_NAME,NORAD_CAT_ID,MEAN_MOTION\nD,4,12.0\nE,5,0.5\n",
        ))
        .unwrap();

        assert_eq!(run.census.total_objects, 5);
        assert_eq!(run.census.count(OrbitRegime::Leo, Category::Debris), 1);
        assert_eq!(run.records(Category::Debris).len(), 2);
        assert!((run.census.debris_fraction().unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn mirror_schema_without_mean_motion_is_fully_excluded() {
        let run = build_run(&raw(
            Provider::Mirror,
            "name,catalog_number\nISS,25544\n",
            "name,catalog_number\nDEB,1\nDEB,2\n",
        ))
        .unwrap();

        assert_eq!(run.census.total_objects, 0);
        assert_eq!(run.census.excluded.active, 1);
        assert_eq!(run.census.excluded.debris, 2);
        assert_eq!(run.census.debris_fraction(), None);
    }
}
