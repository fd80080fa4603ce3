//! Name search over catalog records.

use crate::app::pipeline::CensusRun;
use crate::census::{classify, usable_mean_motion};
use crate::domain::{CatalogRecord, Category, OrbitRegime};

/// Report for the first object matching a search.
#[derive(Debug, Clone)]
pub struct SearchReport<'a> {
    pub query: String,
    pub target: &'a CatalogRecord,
    /// `None` when the target has no usable mean motion.
    pub regime: Option<OrbitRegime>,
    /// Debris objects classified into the same regime as the target.
    pub debris_in_regime: Option<usize>,
    /// Remaining matches after the target, in catalog order.
    pub other_matches: Vec<&'a CatalogRecord>,
}

/// Case-insensitive substring match on the object name, in catalog order.
///
/// Records without a name never match; an empty query matches nothing.
pub fn search_by_name<'a>(records: &'a [CatalogRecord], query: &str) -> Vec<&'a CatalogRecord> {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| {
            r.name
                .as_deref()
                .is_some_and(|name| name.to_uppercase().contains(&needle))
        })
        .collect()
}

/// Search active objects and describe the first hit plus its neighbourhood.
pub fn target_report<'a>(run: &'a CensusRun, query: &str) -> Option<SearchReport<'a>> {
    let mut matches = search_by_name(run.records(Category::Active), query).into_iter();
    let target = matches.next()?;

    let regime = usable_mean_motion(target.mean_motion).map(classify);
    let debris_in_regime = regime.map(|r| run.census.count(r, Category::Debris));

    Some(SearchReport {
        query: query.trim().to_string(),
        target,
        regime,
        debris_in_regime,
        other_matches: matches.collect(),
    })
}
