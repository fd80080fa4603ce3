//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by any catalog source (live fetch or cached file)
//! - consumed by the census core without knowing where rows came from
//! - exported to JSON/CSV

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::census::CensusError;

/// Orbit regime derived from mean motion.
///
/// The declaration order is the canonical display order (LEO, MEO, GEO), so
/// ordered maps keyed by regime iterate in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrbitRegime {
    Leo,
    Meo,
    Geo,
}

impl OrbitRegime {
    pub const ALL: [OrbitRegime; 3] = [OrbitRegime::Leo, OrbitRegime::Meo, OrbitRegime::Geo];

    pub fn label(self) -> &'static str {
        match self {
            OrbitRegime::Leo => "LEO",
            OrbitRegime::Meo => "MEO",
            OrbitRegime::Geo => "GEO",
        }
    }

    /// Approximate altitude band, for display next to the label.
    pub fn altitude_band(self) -> &'static str {
        match self {
            OrbitRegime::Leo => "< 2,000 km",
            OrbitRegime::Meo => "2,000 - 35,786 km",
            OrbitRegime::Geo => "~35,786 km",
        }
    }
}

impl fmt::Display for OrbitRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Object category, assigned by the collector (never present in raw rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Active,
    Debris,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Active, Category::Debris];

    pub fn tag(self) -> &'static str {
        match self {
            Category::Active => "active",
            Category::Debris => "debris",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = CensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Category::Active),
            "debris" => Ok(Category::Debris),
            _ => Err(CensusError::UnknownCategory(s.to_string())),
        }
    }
}

/// One catalog row, normalized from whatever schema the provider uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub name: Option<String>,
    pub catalog_id: Option<u64>,
    /// Revolutions per day. `None` when the provider omitted it or the value
    /// was not a finite number.
    pub mean_motion: Option<f64>,
    pub epoch: Option<String>,
    pub category: Category,
}

impl CatalogRecord {
    pub fn new(category: Category) -> Self {
        Self {
            name: None,
            catalog_id: None,
            mean_motion: None,
            epoch: None,
            category,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_catalog_id(mut self, id: u64) -> Self {
        self.catalog_id = Some(id);
        self
    }

    pub fn with_mean_motion(mut self, mean_motion: f64) -> Self {
        self.mean_motion = Some(mean_motion);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

/// Where catalog data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Authenticated Space-Track GP queries.
    #[value(name = "spacetrack")]
    SpaceTrack,
    /// Public CelesTrak mirror.
    Mirror,
}

impl Provider {
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::SpaceTrack => "Space-Track",
            Provider::Mirror => "CelesTrak",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spacetrack" | "space-track" => Ok(Provider::SpaceTrack),
            "mirror" | "celestrak" => Ok(Provider::Mirror),
            other => Err(format!("Unknown provider '{other}' (expected `spacetrack` or `mirror`).")),
        }
    }
}

/// When to hit the network instead of reading the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RefreshPolicy {
    /// Fetch only when the cache is missing or stale.
    Auto,
    /// Always fetch before loading.
    Always,
    /// Never fetch; read whatever is cached.
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tags_parse_case_insensitively() {
        assert_eq!("Active".parse::<Category>().unwrap(), Category::Active);
        assert_eq!(" debris ".parse::<Category>().unwrap(), Category::Debris);
    }

    #[test]
    fn unknown_category_tag_is_rejected() {
        let err = "rocket body".parse::<Category>().unwrap_err();
        assert!(matches!(err, CensusError::UnknownCategory(ref tag) if tag == "rocket body"));
    }

    #[test]
    fn regimes_sort_in_canonical_order() {
        let mut regimes = vec![OrbitRegime::Geo, OrbitRegime::Leo, OrbitRegime::Meo];
        regimes.sort();
        assert_eq!(regimes, OrbitRegime::ALL.to_vec());
    }

    #[test]
    fn provider_accepts_aliases() {
        assert_eq!("celestrak".parse::<Provider>().unwrap(), Provider::Mirror);
        assert_eq!("Space-Track".parse::<Provider>().unwrap(), Provider::SpaceTrack);
        assert!("nasa".parse::<Provider>().is_err());
    }
}
