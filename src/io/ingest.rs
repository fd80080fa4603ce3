//! CSV ingest and normalization.
//!
//! This module is responsible for turning a provider CSV body into
//! `CatalogRecord`s using the provider's `ProviderSchema`.
//!
//! Design goals:
//! - **Schema mapping at the boundary**: nothing downstream knows provider column names
//! - **Row-level validation** (skip unreadable rows, but report what happened)
//! - **Lenient fields**: a missing or garbled value becomes `None`, never a dropped row
//! - **Separation of concerns**: no classification logic here

use std::collections::HashMap;

use csv::StringRecord;

use crate::data::schema::ProviderSchema;
use crate::domain::{CatalogRecord, Category};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output for one dataset (active or debris).
#[derive(Debug, Clone, Default)]
pub struct IngestedCatalog {
    pub records: Vec<CatalogRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// False when the provider CSV carries no mean-motion column at all, in
    /// which case every record will be excluded from the census.
    pub has_mean_motion: bool,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Default)]
struct Columns {
    name: Option<usize>,
    catalog_id: Option<usize>,
    mean_motion: Option<usize>,
    epoch: Option<usize>,
}

impl Columns {
    fn resolve(header_map: &HashMap<String, usize>, schema: &ProviderSchema) -> Self {
        let find = |aliases: &[&str]| aliases.iter().find_map(|a| header_map.get(*a).copied());
        Self {
            name: find(schema.name),
            catalog_id: find(schema.catalog_id),
            mean_motion: find(schema.mean_motion),
            epoch: find(schema.epoch),
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.catalog_id.is_none() && self.mean_motion.is_none() && self.epoch.is_none()
    }
}

/// Parse a provider CSV body into records tagged with `category`.
///
/// An empty body (what an empty query result looks like) yields no records.
pub fn parse_catalog_csv(
    text: &str,
    category: Category,
    schema: &ProviderSchema,
) -> Result<IngestedCatalog, AppError> {
    if text.trim().is_empty() {
        return Ok(IngestedCatalog::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read {category} CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let columns = Columns::resolve(&header_map, schema);
    if columns.is_empty() {
        let expected: Vec<&str> = schema.all_aliases().collect();
        return Err(AppError::config(format!(
            "{category} CSV has none of the expected columns ({}).",
            expected.join(", ")
        )));
    }

    let mut out = IngestedCatalog {
        has_mean_motion: columns.mean_motion.is_some(),
        ..IngestedCatalog::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        out.rows_read += 1;

        match result {
            Ok(record) => out.records.push(parse_row(&record, &columns, category)),
            Err(e) => out.row_errors.push(RowError {
                line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }

    Ok(out)
}

fn parse_row(record: &StringRecord, columns: &Columns, category: Category) -> CatalogRecord {
    CatalogRecord {
        name: get_optional(record, columns.name).map(str::to_string),
        catalog_id: get_optional(record, columns.catalog_id).and_then(parse_catalog_id),
        mean_motion: parse_opt_f64(get_optional(record, columns.mean_motion)),
        epoch: get_optional(record, columns.epoch).map(str::to_string),
        category,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Some exports prefix the first header with a UTF-8 BOM; without stripping
    // it the first column would never match.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_optional(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_catalog_id(s: &str) -> Option<u64> {
    // Some exports render integer columns as floats ("25544.0").
    s.parse::<u64>()
        .ok()
        .or_else(|| s.strip_suffix(".0").and_then(|t| t.parse::<u64>().ok()))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{MIRROR_SCHEMA, SPACE_TRACK_SCHEMA};

    const SPACE_TRACK_CSV: &str = "\u{feff}CCSDS_OMM_VERS,OBJECT_NAME,OBJECT_ID,EPOCH,MEAN_MOTION,NORAD_CAT_ID\n\
2.0,ISS (ZARYA),1998-067A,2025-01-01T12:00:00.000000,15.50103472,25544\n\
2.0,NOAA 19,2009-005A,2025-01-01T08:00:00.000000,14.12501234,33591\n\
2.0,GALAXY 30,2020-056A,2025-01-01T02:00:00.000000,,46114\n";

    #[test]
    fn parses_space_track_rows() {
        let ingested = parse_catalog_csv(SPACE_TRACK_CSV, Category::Active, &SPACE_TRACK_SCHEMA).unwrap();
        assert_eq!(ingested.rows_read, 3);
        assert!(ingested.row_errors.is_empty());
        assert!(ingested.has_mean_motion);

        let iss = &ingested.records[0];
        assert_eq!(iss.name.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(iss.catalog_id, Some(25544));
        assert_eq!(iss.mean_motion, Some(15.50103472));
        assert_eq!(iss.epoch.as_deref(), Some("2025-01-01T12:00:00.000000"));
        assert_eq!(iss.category, Category::Active);

        assert_eq!(ingested.records[2].mean_motion, None);
    }

    #[test]
    fn mirror_layout_without_mean_motion_keeps_rows() {
        let csv = "name,catalog_number\nFENGYUN 1C DEB,29740\nCOSMOS 2251 DEB,33759\n";
        let ingested = parse_catalog_csv(csv, Category::Debris, &MIRROR_SCHEMA).unwrap();
        assert!(!ingested.has_mean_motion);
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.records[1].catalog_id, Some(33759));
        assert!(ingested.records.iter().all(|r| r.mean_motion.is_none()));
    }

    #[test]
    fn empty_body_yields_no_records() {
        let ingested = parse_catalog_csv("", Category::Debris, &SPACE_TRACK_SCHEMA).unwrap();
        assert!(ingested.records.is_empty());
        assert_eq!(ingested.rows_read, 0);

        let header_only = "OBJECT_NAME,NORAD_CAT_ID,MEAN_MOTION\n";
        let ingested = parse_catalog_csv(header_only, Category::Debris, &SPACE_TRACK_SCHEMA).unwrap();
        assert!(ingested.records.is_empty());
    }

    #[test]
    fn unrecognized_schema_is_rejected() {
        let err = parse_catalog_csv("foo,bar\n1,2\n", Category::Active, &SPACE_TRACK_SCHEMA).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("object_name"));
    }

    #[test]
    fn garbled_values_become_none() {
        let csv = "OBJECT_NAME,NORAD_CAT_ID,MEAN_MOTION\n,abc,fast\nX,42.0,NaN\n";
        let ingested = parse_catalog_csv(csv, Category::Active, &SPACE_TRACK_SCHEMA).unwrap();
        assert_eq!(ingested.records[0], CatalogRecord::new(Category::Active));
        assert_eq!(ingested.records[1].catalog_id, Some(42));
        assert_eq!(ingested.records[1].mean_motion, None);
    }
}
