//! Flat-file snapshot cache.
//!
//! Layout under the data directory:
//!
//! - `active_satellites.csv`, `debris.csv`: raw provider CSV bodies
//! - `last_updated.txt`: human-readable fetch time (`%Y-%m-%d %H:%M UTC`)
//! - `snapshot.json`: manifest with provider and exact fetch time
//!
//! Staleness is an explicit check on the stored stamp; nothing here caches
//! in memory or reads the clock on its own.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::RawCatalog;
use crate::domain::Provider;
use crate::error::AppError;

pub const ACTIVE_FILE: &str = "active_satellites.csv";
pub const DEBRIS_FILE: &str = "debris.csv";
pub const LAST_UPDATED_FILE: &str = "last_updated.txt";
pub const MANIFEST_FILE: &str = "snapshot.json";

const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// When (and from where) the cached snapshot was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStamp {
    pub provider: Provider,
    pub fetched_at: DateTime<Utc>,
}

impl CacheStamp {
    /// True once more than `ttl` has passed since the fetch. A stamp from the
    /// future (clock skew) is never stale.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.fetched_at) > ttl
    }

    pub fn caption(&self) -> String {
        self.fetched_at.format(LAST_UPDATED_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    provider: Provider,
    fetched_at: DateTime<Utc>,
    active_rows: usize,
    debris_rows: usize,
}

/// Handle on a cache directory.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn exists(&self) -> bool {
        self.path(ACTIVE_FILE).is_file() && self.path(DEBRIS_FILE).is_file()
    }

    /// Persist a freshly fetched catalog and return its stamp.
    pub fn write_snapshot(&self, raw: &RawCatalog) -> Result<CacheStamp, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::runtime(format!("Failed to create data dir '{}': {e}", self.dir.display()))
        })?;

        write_file(&self.path(ACTIVE_FILE), &raw.active_csv)?;
        write_file(&self.path(DEBRIS_FILE), &raw.debris_csv)?;

        let stamp = CacheStamp {
            provider: raw.provider,
            fetched_at: raw.fetched_at,
        };
        write_file(&self.path(LAST_UPDATED_FILE), &stamp.caption())?;

        let manifest = Manifest {
            provider: raw.provider,
            fetched_at: raw.fetched_at,
            active_rows: count_records(&raw.active_csv),
            debris_rows: count_records(&raw.debris_csv),
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| AppError::runtime(format!("Failed to encode snapshot manifest: {e}")))?;
        write_file(&self.path(MANIFEST_FILE), &json)?;

        info!(
            dir = %self.dir.display(),
            provider = raw.provider.display_name(),
            active_rows = manifest.active_rows,
            debris_rows = manifest.debris_rows,
            "snapshot written"
        );
        Ok(stamp)
    }

    /// Read the cached CSV bodies. Missing files mean "fetch first".
    pub fn read_snapshot(&self) -> Result<RawCatalog, AppError> {
        if !self.exists() {
            return Err(AppError::no_data(format!(
                "Data files not found in '{}'. Run `orbit fetch` first.",
                self.dir.display()
            )));
        }

        let active_csv = read_file(&self.path(ACTIVE_FILE))?;
        let debris_csv = read_file(&self.path(DEBRIS_FILE))?;

        let stamp = self.read_stamp()?.unwrap_or_else(|| {
            warn!(dir = %self.dir.display(), "no snapshot timestamp found, treating cache as stale");
            CacheStamp {
                provider: Provider::SpaceTrack,
                fetched_at: DateTime::<Utc>::UNIX_EPOCH,
            }
        });

        debug!(dir = %self.dir.display(), "snapshot read");
        Ok(RawCatalog {
            provider: stamp.provider,
            fetched_at: stamp.fetched_at,
            active_csv,
            debris_csv,
        })
    }

    /// Manifest first, then the plain `last_updated.txt` caption.
    pub fn read_stamp(&self) -> Result<Option<CacheStamp>, AppError> {
        let manifest_path = self.path(MANIFEST_FILE);
        if manifest_path.is_file() {
            let text = read_file(&manifest_path)?;
            match serde_json::from_str::<Manifest>(&text) {
                Ok(m) => {
                    return Ok(Some(CacheStamp {
                        provider: m.provider,
                        fetched_at: m.fetched_at,
                    }));
                }
                Err(e) => warn!(error = %e, "ignoring unreadable snapshot manifest"),
            }
        }

        let caption_path = self.path(LAST_UPDATED_FILE);
        if caption_path.is_file() {
            let text = read_file(&caption_path)?;
            if let Some(fetched_at) = parse_caption(&text) {
                return Ok(Some(CacheStamp {
                    provider: Provider::SpaceTrack,
                    fetched_at,
                }));
            }
            warn!(caption = %text.trim(), "ignoring unreadable last-updated caption");
        }

        Ok(None)
    }
}

fn parse_caption(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), LAST_UPDATED_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Data records (not physical lines) in a CSV body with a header row.
fn count_records(body: &str) -> usize {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes())
        .records()
        .filter(|r| r.as_ref().map_or(true, |rec| rec.iter().any(|f| !f.trim().is_empty())))
        .count()
}

fn write_file(path: &Path, contents: &str) -> Result<(), AppError> {
    fs::write(path, contents)
        .map_err(|e| AppError::runtime(format!("Failed to write '{}': {e}", path.display())))
}

fn read_file(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path)
        .map_err(|e| AppError::runtime(format!("Failed to read '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap()
    }

    fn sample_raw() -> RawCatalog {
        RawCatalog {
            provider: Provider::Mirror,
            fetched_at: at(10, 30),
            active_csv: "OBJECT_NAME,MEAN_MOTION\nISS,15.5\nGPS,2.0\n".to_string(),
            debris_csv: "OBJECT_NAME,MEAN_MOTION\nDEB,14.1\n".to_string(),
        }
    }

    #[test]
    fn stamp_goes_stale_after_ttl() {
        let stamp = CacheStamp {
            provider: Provider::SpaceTrack,
            fetched_at: at(10, 0),
        };
        let ttl = TimeDelta::hours(1);
        assert!(!stamp.is_stale(at(10, 59), ttl));
        assert!(!stamp.is_stale(at(11, 0), ttl));
        assert!(stamp.is_stale(at(11, 1), ttl));
        assert!(!stamp.is_stale(at(9, 0), ttl));
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(tmp.path().join("data"));
        assert!(!cache.exists());

        let stamp = cache.write_snapshot(&sample_raw()).unwrap();
        assert_eq!(stamp.fetched_at, at(10, 30));

        let raw = cache.read_snapshot().unwrap();
        assert_eq!(raw, sample_raw());

        let caption = fs::read_to_string(tmp.path().join("data").join(LAST_UPDATED_FILE)).unwrap();
        assert_eq!(caption, "2025-03-01 10:30 UTC");
    }

    #[test]
    fn missing_cache_is_a_no_data_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SnapshotCache::new(tmp.path()).read_snapshot().unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("orbit fetch"));
    }

    #[test]
    fn falls_back_to_caption_without_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(ACTIVE_FILE), "OBJECT_NAME\n").unwrap();
        fs::write(tmp.path().join(DEBRIS_FILE), "OBJECT_NAME\n").unwrap();
        fs::write(tmp.path().join(LAST_UPDATED_FILE), "2025-03-01 08:15 UTC\n").unwrap();

        let stamp = SnapshotCache::new(tmp.path()).read_stamp().unwrap().unwrap();
        assert_eq!(stamp.provider, Provider::SpaceTrack);
        assert_eq!(stamp.fetched_at, at(8, 15));
    }

    #[test]
    fn counts_records_without_header() {
        assert_eq!(count_records("A,B\n1,2\n3,4\n\n"), 2);
        assert_eq!(count_records(""), 0);
        assert_eq!(count_records("A,B\n"), 0);
    }

    #[test]
    fn quoted_newlines_count_as_one_row() {
        let body = "OBJECT_NAME,NORAD_CAT_ID\n\"ODD\nNAME\",1\nISS,25544\n";
        assert_eq!(count_records(body), 2);
    }
}
