//! Catalog acquisition.
//!
//! A `CatalogSource` returns the raw CSV bodies for active objects and debris.
//! Parsing and schema normalization happen later (`io::ingest`), so a cached
//! snapshot and a live fetch go through exactly the same path.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::config::Settings;
use crate::domain::Provider;
use crate::error::AppError;

pub mod mirror;
pub mod retry;
pub mod schema;
pub mod spacetrack;

#[cfg(test)]
mod stub_server;

pub use mirror::CelestrakClient;
pub use retry::{Failure, RetryPolicy};
pub use schema::ProviderSchema;
pub use spacetrack::SpaceTrackClient;

/// Raw provider output, exactly as it will be written to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCatalog {
    pub provider: Provider,
    pub fetched_at: DateTime<Utc>,
    pub active_csv: String,
    pub debris_csv: String,
}

/// Anything that can produce a fresh catalog.
pub trait CatalogSource {
    fn provider(&self) -> Provider;
    fn fetch(&self) -> Result<RawCatalog, AppError>;
}

/// Build the source selected in `settings`.
pub fn source_for(settings: &Settings) -> Result<Box<dyn CatalogSource>, AppError> {
    Ok(match settings.provider {
        Provider::SpaceTrack => Box::new(SpaceTrackClient::from_settings(settings)?),
        Provider::Mirror => Box::new(CelestrakClient::from_settings(settings)?),
    })
}

pub(crate) fn build_http_client(cookies: bool) -> Result<Client, AppError> {
    Client::builder()
        .cookie_store(cookies)
        .user_agent(concat!("orbit-census/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))
}

/// GET a text body, mapping errors onto retry outcomes.
pub(crate) fn get_text(client: &Client, url: &str, query: &[(&str, &str)], timeout: Duration) -> Result<String, Failure> {
    let resp = client
        .get(url)
        .query(query)
        .timeout(timeout)
        .send()
        .map_err(|e| Failure::Transient(format!("request to {url} failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(failure_for_status(status, url));
    }

    resp.text()
        .map_err(|e| Failure::Transient(format!("failed to read body from {url}: {e}")))
}

/// 429 and 5xx are worth another attempt; auth failures are configuration
/// problems; anything else is a hard runtime error.
pub(crate) fn failure_for_status(status: StatusCode, url: &str) -> Failure {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Failure::Transient(format!("{url} returned {status}"));
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Failure::Fatal(AppError::config(format!(
            "{url} rejected the request ({status}); check credentials."
        )));
    }
    Failure::Fatal(AppError::runtime(format!("{url} returned {status}")))
}
