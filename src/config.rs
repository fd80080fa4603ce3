//! Runtime settings.
//!
//! Resolution order (lowest to highest precedence): built-in defaults, `.env`,
//! process environment, CLI flags (applied by `app` via [`Settings::apply_overrides`]).

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;

use crate::data::retry::RetryPolicy;
use crate::domain::Provider;
use crate::error::AppError;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;
/// Space-Track asks clients to space out queries.
pub const DEFAULT_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(3);

/// Space-Track login.
#[derive(Clone)]
pub struct Credentials {
    pub identity: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub provider: Provider,
    pub cache_ttl: TimeDelta,
    pub credentials: Option<Credentials>,
    pub retry: RetryPolicy,
    pub rate_limit_pause: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            provider: Provider::SpaceTrack,
            cache_ttl: TimeDelta::seconds(DEFAULT_CACHE_TTL_SECS),
            credentials: None,
            retry: RetryPolicy::default(),
            rate_limit_pause: DEFAULT_RATE_LIMIT_PAUSE,
        }
    }
}

/// CLI-level overrides; `None` keeps the environment/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub provider: Option<Provider>,
    pub ttl_secs: Option<i64>,
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Settings::default();

        if let Some(dir) = non_empty(lookup("ORBIT_DATA_DIR")) {
            settings.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = non_empty(lookup("ORBIT_PROVIDER")) {
            settings.provider = raw.parse::<Provider>().map_err(AppError::config)?;
        }

        if let Some(raw) = non_empty(lookup("ORBIT_CACHE_TTL_SECS")) {
            let secs = raw.trim().parse::<i64>().map_err(|e| {
                AppError::config(format!("Invalid ORBIT_CACHE_TTL_SECS '{raw}': {e}"))
            })?;
            settings.cache_ttl = ttl_from_secs(secs)?;
        }

        // Both spellings show up in the wild.
        let user = non_empty(lookup("SPACETRACK_USER")).or_else(|| non_empty(lookup("SPACE_TRACK_USER")));
        let pass = non_empty(lookup("SPACETRACK_PASS")).or_else(|| non_empty(lookup("SPACE_TRACK_PASS")));
        settings.credentials = match (user, pass) {
            (Some(identity), Some(password)) => Some(Credentials { identity, password }),
            _ => None,
        };

        Ok(settings)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), AppError> {
        if let Some(dir) = &overrides.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(provider) = overrides.provider {
            self.provider = provider;
        }
        if let Some(secs) = overrides.ttl_secs {
            self.cache_ttl = ttl_from_secs(secs)?;
        }
        Ok(())
    }

    /// Credentials, or a configuration error explaining where to put them.
    pub fn require_credentials(&self) -> Result<&Credentials, AppError> {
        self.credentials.as_ref().ok_or_else(|| {
            AppError::config(
                "Missing SPACETRACK_USER / SPACETRACK_PASS in environment (.env). \
                 Use `--provider mirror` to fetch from the public mirror instead.",
            )
        })
    }
}

fn ttl_from_secs(secs: i64) -> Result<TimeDelta, AppError> {
    if secs < 0 {
        return Err(AppError::config(format!("Cache TTL must be >= 0 seconds (got {secs}).")));
    }
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| AppError::config(format!("Cache TTL out of range: {secs} seconds.")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.provider, Provider::SpaceTrack);
        assert_eq!(settings.cache_ttl, TimeDelta::seconds(3600));
        assert!(settings.credentials.is_none());
        assert!(settings.require_credentials().is_err());
    }

    #[test]
    fn reads_alternate_credential_spelling() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("SPACE_TRACK_USER", "ops@example.org"),
            ("SPACE_TRACK_PASS", "hunter2"),
        ]))
        .unwrap();
        let creds = settings.require_credentials().unwrap();
        assert_eq!(creds.identity, "ops@example.org");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn rejects_bad_ttl_and_provider() {
        let err = Settings::from_lookup(lookup_from(&[("ORBIT_CACHE_TTL_SECS", "soon")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Settings::from_lookup(lookup_from(&[("ORBIT_PROVIDER", "nasa")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn cli_overrides_win() {
        let mut settings = Settings::from_lookup(lookup_from(&[
            ("ORBIT_DATA_DIR", "/var/cache/orbit"),
            ("ORBIT_PROVIDER", "spacetrack"),
        ]))
        .unwrap();
        settings
            .apply_overrides(&Overrides {
                data_dir: Some(PathBuf::from("snapshots")),
                provider: Some(Provider::Mirror),
                ttl_secs: Some(60),
            })
            .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("snapshots"));
        assert_eq!(settings.provider, Provider::Mirror);
        assert_eq!(settings.cache_ttl, TimeDelta::seconds(60));
    }
}
