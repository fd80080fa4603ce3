//! Per-provider column maps.
//!
//! Providers disagree on column names. Each provider gets a `ProviderSchema`
//! listing the accepted aliases for every `CatalogRecord` field; ingest uses
//! it to map any provider CSV onto the one record shape. Aliases are matched
//! against lowercased, BOM-stripped headers.

use crate::domain::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSchema {
    pub name: &'static [&'static str],
    pub catalog_id: &'static [&'static str],
    pub mean_motion: &'static [&'static str],
    pub epoch: &'static [&'static str],
}

pub const SPACE_TRACK_SCHEMA: ProviderSchema = ProviderSchema {
    name: &["object_name"],
    catalog_id: &["norad_cat_id"],
    mean_motion: &["mean_motion"],
    epoch: &["epoch"],
};

/// The mirror has shipped both the GP column names and a lowercase
/// `name`/`catalog_number` layout without a mean-motion column.
pub const MIRROR_SCHEMA: ProviderSchema = ProviderSchema {
    name: &["object_name", "name"],
    catalog_id: &["norad_cat_id", "catalog_number"],
    mean_motion: &["mean_motion"],
    epoch: &["epoch"],
};

impl ProviderSchema {
    pub fn for_provider(provider: Provider) -> &'static ProviderSchema {
        match provider {
            Provider::SpaceTrack => &SPACE_TRACK_SCHEMA,
            Provider::Mirror => &MIRROR_SCHEMA,
        }
    }

    pub fn all_aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.name
            .iter()
            .chain(self.catalog_id)
            .chain(self.mean_motion)
            .chain(self.epoch)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_lowercase() {
        for schema in [&SPACE_TRACK_SCHEMA, &MIRROR_SCHEMA] {
            for alias in schema.all_aliases() {
                assert_eq!(alias, alias.to_ascii_lowercase());
            }
        }
    }

    #[test]
    fn mirror_accepts_lowercase_layout() {
        let schema = ProviderSchema::for_provider(Provider::Mirror);
        assert!(schema.name.contains(&"name"));
        assert!(schema.catalog_id.contains(&"catalog_number"));
    }
}
