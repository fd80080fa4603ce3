//! Grouped counts by orbit regime and object category.

use std::collections::BTreeMap;

use tracing::debug;

use crate::census::classify::{classify, usable_mean_motion};
use crate::domain::{CatalogRecord, Category, OrbitRegime};

/// Records left out of the census because they had no usable mean motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exclusions {
    pub active: usize,
    pub debris: usize,
}

impl Exclusions {
    pub fn total(&self) -> usize {
        self.active + self.debris
    }

    fn bump(&mut self, category: Category) {
        match category {
            Category::Active => self.active += 1,
            Category::Debris => self.debris += 1,
        }
    }
}

/// Derived, read-only view over a set of catalog records.
///
/// Totals count classified records only; rows dropped for lack of a mean
/// motion are reported in `excluded` so that
/// `input_count() == total_objects + excluded.total()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    /// Sparse: pairs with no records have no entry.
    pub by_regime_and_category: BTreeMap<(OrbitRegime, Category), usize>,
    pub by_regime: BTreeMap<OrbitRegime, usize>,
    pub total_active: usize,
    pub total_debris: usize,
    pub total_objects: usize,
    pub excluded: Exclusions,
}

impl AggregationResult {
    /// Share of debris among classified objects, `None` for an empty census.
    pub fn debris_fraction(&self) -> Option<f64> {
        if self.total_objects == 0 {
            return None;
        }
        Some(self.total_debris as f64 / self.total_objects as f64)
    }

    pub fn count(&self, regime: OrbitRegime, category: Category) -> usize {
        self.by_regime_and_category
            .get(&(regime, category))
            .copied()
            .unwrap_or(0)
    }

    pub fn regime_total(&self, regime: OrbitRegime) -> usize {
        self.by_regime.get(&regime).copied().unwrap_or(0)
    }

    /// Number of records that were handed to [`aggregate`].
    pub fn input_count(&self) -> usize {
        self.total_objects + self.excluded.total()
    }

    /// Dense 3×2 grid in canonical order, for charts that expect every cell.
    pub fn dense_grid(&self) -> Vec<(OrbitRegime, Category, usize)> {
        OrbitRegime::ALL
            .iter()
            .flat_map(|&regime| {
                Category::ALL
                    .iter()
                    .map(move |&category| (regime, category, self.count(regime, category)))
            })
            .collect()
    }
}

/// Classify every record and count by `(regime, category)` and by regime.
pub fn aggregate(records: &[CatalogRecord]) -> AggregationResult {
    let mut out = AggregationResult::default();

    for record in records {
        let Some(mean_motion) = usable_mean_motion(record.mean_motion) else {
            out.excluded.bump(record.category);
            continue;
        };

        let regime = classify(mean_motion);
        *out.by_regime_and_category
            .entry((regime, record.category))
            .or_insert(0) += 1;
        *out.by_regime.entry(regime).or_insert(0) += 1;

        match record.category {
            Category::Active => out.total_active += 1,
            Category::Debris => out.total_debris += 1,
        }
    }

    out.total_objects = out.total_active + out.total_debris;

    if out.excluded.total() > 0 {
        debug!(
            excluded_active = out.excluded.active,
            excluded_debris = out.excluded.debris,
            "records without usable mean motion left out of census"
        );
    }

    out
}
