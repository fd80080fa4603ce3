//! Export census results to JSON/CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets, notebooks or
//! downstream chart tooling.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::census::AggregationResult;
use crate::domain::{Category, OrbitRegime, Provider};
use crate::error::AppError;
use crate::io::cache::CacheStamp;

#[derive(Debug, Serialize)]
struct CensusFile {
    generated_at: DateTime<Utc>,
    provider: Provider,
    fetched_at: DateTime<Utc>,
    totals: Totals,
    /// `null` when nothing could be classified.
    debris_fraction: Option<f64>,
    excluded: Excluded,
    buckets: Vec<BucketRow>,
    regimes: Vec<RegimeRow>,
}

#[derive(Debug, Serialize)]
struct Totals {
    objects: usize,
    active: usize,
    debris: usize,
}

#[derive(Debug, Serialize)]
struct Excluded {
    active: usize,
    debris: usize,
}

#[derive(Debug, Serialize)]
struct BucketRow {
    regime: OrbitRegime,
    category: Category,
    count: usize,
}

#[derive(Debug, Serialize)]
struct RegimeRow {
    regime: OrbitRegime,
    count: usize,
}

/// Write the census as pretty JSON. Buckets are sparse, like the in-memory map.
pub fn write_census_json(
    path: &Path,
    result: &AggregationResult,
    stamp: &CacheStamp,
    generated_at: DateTime<Utc>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create census JSON '{}': {e}", path.display())))?;

    let census = CensusFile {
        generated_at,
        provider: stamp.provider,
        fetched_at: stamp.fetched_at,
        totals: Totals {
            objects: result.total_objects,
            active: result.total_active,
            debris: result.total_debris,
        },
        debris_fraction: result.debris_fraction(),
        excluded: Excluded {
            active: result.excluded.active,
            debris: result.excluded.debris,
        },
        buckets: result
            .by_regime_and_category
            .iter()
            .map(|(&(regime, category), &count)| BucketRow { regime, category, count })
            .collect(),
        regimes: result
            .by_regime
            .iter()
            .map(|(&regime, &count)| RegimeRow { regime, count })
            .collect(),
    };

    serde_json::to_writer_pretty(file, &census)
        .map_err(|e| AppError::runtime(format!("Failed to write census JSON: {e}")))?;

    Ok(())
}

/// Write the dense regime × category grid as CSV.
pub fn write_census_csv(path: &Path, result: &AggregationResult) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create census CSV '{}': {e}", path.display())))?;

    writeln!(file, "regime,category,count")
        .map_err(|e| AppError::runtime(format!("Failed to write census CSV header: {e}")))?;

    for (regime, category, count) in result.dense_grid() {
        writeln!(file, "{},{},{count}", regime.label(), category.tag())
            .map_err(|e| AppError::runtime(format!("Failed to write census CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::aggregate;
    use crate::domain::CatalogRecord;
    use chrono::TimeZone;

    fn result() -> AggregationResult {
        aggregate(&[
            CatalogRecord::new(Category::Active).with_mean_motion(15.0),
            CatalogRecord::new(Category::Debris).with_mean_motion(0.9),
            CatalogRecord::new(Category::Debris),
        ])
    }

    #[test]
    fn csv_export_is_dense() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("census.csv");
        write_census_csv(&path, &result()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "LEO,active,1");
        assert_eq!(lines[4], "MEO,debris,0");
        assert_eq!(lines[6], "GEO,debris,1");
    }

    #[test]
    fn json_export_carries_totals_and_exclusions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("census.json");
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let stamp = CacheStamp {
            provider: Provider::SpaceTrack,
            fetched_at: t,
        };
        write_census_json(&path, &result(), &stamp, t).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["provider"], "spacetrack");
        assert_eq!(value["totals"]["objects"], 2);
        assert_eq!(value["excluded"]["debris"], 1);
        assert_eq!(value["debris_fraction"], 0.5);
        assert_eq!(value["buckets"][0]["regime"], "LEO");
        assert_eq!(value["buckets"][0]["category"], "active");
        assert_eq!(value["buckets"].as_array().unwrap().len(), 2);
    }
}
