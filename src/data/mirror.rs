//! CelesTrak public mirror (no credentials).

use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::Settings;
use crate::data::retry::{RetryPolicy, with_retries};
use crate::data::{CatalogSource, RawCatalog, build_http_client, get_text};
use crate::domain::Provider;
use crate::error::AppError;

pub const BASE_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

pub const ACTIVE_GROUP: &str = "active";

/// The mirror has no catch-all debris group; these are the tracked breakup clouds.
pub const DEBRIS_GROUPS: [&str; 4] = [
    "fengyun-1c-debris",
    "cosmos-2251-debris",
    "iridium-33-debris",
    "cosmos-1408-debris",
];

pub struct CelestrakClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CelestrakClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self {
            client: build_http_client(false)?,
            base_url: BASE_URL.to_string(),
            retry: settings.retry,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch_group(&self, group: &str) -> Result<String, AppError> {
        info!(%group, "downloading mirror group");
        with_retries(&self.retry, &format!("mirror group {group}"), |_| {
            get_text(
                &self.client,
                &self.base_url,
                &[("GROUP", group), ("FORMAT", "csv")],
                QUERY_TIMEOUT,
            )
        })
    }
}

impl CatalogSource for CelestrakClient {
    fn provider(&self) -> Provider {
        Provider::Mirror
    }

    fn fetch(&self) -> Result<RawCatalog, AppError> {
        let active_csv = self.fetch_group(ACTIVE_GROUP)?;

        let mut debris_bodies = Vec::with_capacity(DEBRIS_GROUPS.len());
        for group in DEBRIS_GROUPS {
            debris_bodies.push(self.fetch_group(group)?);
        }

        Ok(RawCatalog {
            provider: Provider::Mirror,
            fetched_at: Utc::now(),
            active_csv,
            debris_csv: merge_csv_bodies(&debris_bodies),
        })
    }
}

/// Concatenate CSV bodies that share a header, keeping the header once.
///
/// Blank bodies are skipped. A body whose header differs from the first one
/// (other columns, or a plain-text notice instead of CSV) is dropped with a
/// warning.
pub fn merge_csv_bodies(bodies: &[String]) -> String {
    let mut out = String::new();
    let mut first_header: Option<&str> = None;

    for (index, body) in bodies.iter().enumerate() {
        let mut lines = body.lines().filter(|l| !l.trim().is_empty());
        let Some(header) = lines.next() else { continue };

        match first_header {
            None => {
                out.push_str(header);
                out.push('\n');
                first_header = Some(header);
            }
            Some(expected) if expected.trim() != header.trim() => {
                warn!(body = index, header = %header.trim(), "skipping body with a different CSV header");
                continue;
            }
            Some(_) => {}
        }

        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}
