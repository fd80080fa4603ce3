//! Space-Track GP queries (authenticated session).

use std::thread;
use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::{Credentials, Settings};
use crate::data::retry::{Failure, RetryPolicy, with_retries};
use crate::data::{CatalogSource, RawCatalog, build_http_client, get_text};
use crate::domain::Provider;
use crate::error::AppError;

pub const BASE_URL: &str = "https://www.space-track.org";

const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);
const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

const OBJECT_TYPE_PAYLOAD: &str = "PAYLOAD";
const OBJECT_TYPE_DEBRIS: &str = "DEBRIS";

pub struct SpaceTrackClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
    rate_limit_pause: Duration,
}

impl SpaceTrackClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let credentials = settings.require_credentials()?.clone();
        Ok(Self {
            client: build_http_client(true)?,
            base_url: BASE_URL.to_string(),
            credentials,
            retry: settings.retry,
            rate_limit_pause: settings.rate_limit_pause,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn login(&self) -> Result<(), AppError> {
        let url = format!("{}/ajaxauth/login", self.base_url);
        info!(identity = %self.credentials.identity, "logging in to Space-Track");

        with_retries(&self.retry, "Space-Track login", |_| {
            let resp = self
                .client
                .post(&url)
                .form(&[
                    ("identity", self.credentials.identity.as_str()),
                    ("password", self.credentials.password.as_str()),
                ])
                .timeout(LOGIN_TIMEOUT)
                .send()
                .map_err(|e| Failure::Transient(format!("login request failed: {e}")))?;

            // Non-2xx login answers are never retried.
            let status = resp.status();
            if !status.is_success() {
                return Err(Failure::Fatal(AppError::config(format!(
                    "Space-Track login rejected ({status}): check SPACETRACK_USER / SPACETRACK_PASS."
                ))));
            }
            let body = resp
                .text()
                .map_err(|e| Failure::Transient(format!("failed to read login response: {e}")))?;
            if login_rejected(&body) {
                return Err(Failure::Fatal(AppError::config(
                    "Space-Track login failed: check SPACETRACK_USER / SPACETRACK_PASS.",
                )));
            }
            Ok(())
        })
    }

    fn query(&self, object_type: &str) -> Result<String, AppError> {
        let url = gp_query_url(&self.base_url, object_type);
        info!(%object_type, "downloading GP catalog");
        with_retries(&self.retry, &format!("Space-Track {object_type} query"), |_| {
            get_text(&self.client, &url, &[], QUERY_TIMEOUT)
        })
    }

    fn logout(&self) {
        let url = format!("{}/ajaxauth/logout", self.base_url);
        if let Err(e) = self.client.get(&url).timeout(LOGIN_TIMEOUT).send() {
            warn!(error = %e, "Space-Track logout failed");
        }
    }

    fn download(&self) -> Result<(String, String), AppError> {
        let active = self.query(OBJECT_TYPE_PAYLOAD)?;
        info!(pause = ?self.rate_limit_pause, "pausing for rate limit");
        thread::sleep(self.rate_limit_pause);
        let debris = self.query(OBJECT_TYPE_DEBRIS)?;
        Ok((active, debris))
    }
}

impl CatalogSource for SpaceTrackClient {
    fn provider(&self) -> Provider {
        Provider::SpaceTrack
    }

    fn fetch(&self) -> Result<RawCatalog, AppError> {
        self.login()?;
        // Log out even when a query fails.
        let downloaded = self.download();
        self.logout();
        let (active_csv, debris_csv) = downloaded?;

        Ok(RawCatalog {
            provider: Provider::SpaceTrack,
            fetched_at: Utc::now(),
            active_csv,
            debris_csv,
        })
    }
}

/// Latest GP element set per object of the given type, as CSV.
///
/// `emptyresult/show` makes an empty result come back as a (header-only)
/// body instead of an error.
pub fn gp_query_url(base_url: &str, object_type: &str) -> String {
    format!(
        "{base_url}/basicspacedata/query/class/gp/OBJECT_TYPE/{object_type}/format/csv/emptyresult/show"
    )
}

/// Space-Track answers a bad login with `200 OK` and a JSON body such as
/// `{"Login":"Failed"}`.
fn login_rejected(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("Login").and_then(|s| s.as_str()).map(|s| s.eq_ignore_ascii_case("failed")))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stub_server::StubServer;

    #[test]
    fn builds_gp_query_urls() {
        assert_eq!(
            gp_query_url(BASE_URL, OBJECT_TYPE_DEBRIS),
            "https://www.space-track.org/basicspacedata/query/class/gp/OBJECT_TYPE/DEBRIS/format/csv/emptyresult/show"
        );
    }

    #[test]
    fn detects_rejected_login() {
        assert!(login_rejected(r#"{"Login":"Failed"}"#));
        assert!(login_rejected("{ \"Login\" : \"Failed\" }"));
        assert!(!login_rejected(""));
        assert!(!login_rejected("\"\""));
    }

    #[test]
    fn requires_credentials() {
        let settings = Settings::default();
        let err = SpaceTrackClient::from_settings(&settings).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    const HEADER: &str = "OBJECT_NAME,NORAD_CAT_ID,MEAN_MOTION\n";

    fn client_for(server: &StubServer) -> SpaceTrackClient {
        let settings = Settings {
            credentials: Some(Credentials {
                identity: "user@example.com".to_string(),
                password: "secret".to_string(),
            }),
            retry: RetryPolicy::immediate(3),
            rate_limit_pause: Duration::ZERO,
            ..Settings::default()
        };
        SpaceTrackClient::from_settings(&settings)
            .unwrap()
            .with_base_url(server.base_url.clone())
    }

    /// Successful login and queries; the PAYLOAD query can be made to fail.
    fn respond(line: &str, payload_status: u16) -> (u16, String) {
        if line.contains("OBJECT_TYPE/PAYLOAD") {
            (payload_status, format!("{HEADER}ISS (ZARYA),25544,15.5\n"))
        } else if line.contains("OBJECT_TYPE/DEBRIS") {
            (200, format!("{HEADER}COSMOS 2251 DEB,34427,14.2\n"))
        } else {
            (200, String::new())
        }
    }

    #[test]
    fn fetch_logs_in_queries_both_types_and_logs_out() {
        let server = StubServer::start(|line| respond(line, 200));
        let raw = client_for(&server).fetch().unwrap();

        assert_eq!(raw.provider, Provider::SpaceTrack);
        assert!(raw.active_csv.contains("ISS (ZARYA)"));
        assert!(raw.debris_csv.contains("COSMOS 2251 DEB"));

        let requests = server.requests();
        assert_eq!(requests.len(), 4, "{requests:?}");
        assert!(requests[0].starts_with("POST /ajaxauth/login "));
        assert!(requests[1].contains("/class/gp/OBJECT_TYPE/PAYLOAD/format/csv/emptyresult/show"));
        assert!(requests[2].contains("/class/gp/OBJECT_TYPE/DEBRIS/format/csv/emptyresult/show"));
        assert!(requests[3].starts_with("GET /ajaxauth/logout "));
    }

    #[test]
    fn logout_still_runs_after_failed_query() {
        let server = StubServer::start(|line| respond(line, 404));
        let err = client_for(&server).fetch().unwrap_err();

        assert_eq!(err.exit_code(), 4);
        let requests = server.requests();
        assert_eq!(requests.len(), 3, "{requests:?}");
        assert!(requests[1].contains("OBJECT_TYPE/PAYLOAD"));
        assert!(requests[2].starts_with("GET /ajaxauth/logout "));
    }

    #[test]
    fn login_failed_reply_is_a_config_error() {
        let server = StubServer::start(|_| (200, r#"{"Login":"Failed"}"#.to_string()));
        let err = client_for(&server).fetch().unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn login_error_status_is_fatal_without_retry() {
        for status in [500u16, 429, 404, 401] {
            let server = StubServer::start(move |_| (status, "nope".to_string()));
            let err = client_for(&server).fetch().unwrap_err();

            assert_eq!(err.exit_code(), 2, "status {status}: {}", err.message());
            assert_eq!(server.requests().len(), 1, "status {status}");
        }
    }
}
