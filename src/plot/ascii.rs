//! ASCII bar chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-width bars), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Bar glyphs:
//! - active objects: `#`
//! - debris: `x`

use crate::census::AggregationResult;
use crate::domain::{Category, OrbitRegime};

/// Render one bar per (regime, category) cell, scaled to the largest cell.
pub fn render_bar_chart(census: &AggregationResult, width: usize) -> String {
    let width = width.max(10);
    let grid = census.dense_grid();
    let max = grid.iter().map(|&(_, _, n)| n).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str("Objects by orbit regime\n");

    for regime in OrbitRegime::ALL {
        for category in Category::ALL {
            let count = census.count(regime, category);
            let bar = bar_len(count, max, width);
            let glyph = match category {
                Category::Active => '#',
                Category::Debris => 'x',
            };
            let label = if category == Category::Active { regime.label() } else { "" };
            out.push_str(
                format!(
                    "{label:<4} {:<7}|{} {count}\n",
                    category.tag(),
                    glyph.to_string().repeat(bar),
                )
                .as_str(),
            );
        }
    }

    out.push_str("legend: # active, x debris\n");
    out
}

/// Length of a bar for `count`, where `max` fills `width`.
///
/// Non-zero counts always get at least one glyph so small cells stay visible.
fn bar_len(count: usize, max: usize, width: usize) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    let scaled = (count as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::aggregate;
    use crate::domain::CatalogRecord;

    #[test]
    fn bars_scale_to_largest_cell() {
        assert_eq!(bar_len(0, 10, 20), 0);
        assert_eq!(bar_len(10, 10, 20), 20);
        assert_eq!(bar_len(5, 10, 20), 10);
        assert_eq!(bar_len(1, 1000, 20), 1);
    }

    #[test]
    fn renders_six_bars() {
        let census = aggregate(&[
            CatalogRecord::new(Category::Active).with_mean_motion(15.0),
            CatalogRecord::new(Category::Active).with_mean_motion(15.2),
            CatalogRecord::new(Category::Debris).with_mean_motion(14.0),
        ]);
        let chart = render_bar_chart(&census, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], "LEO  active |########## 2");
        assert_eq!(lines[2], "     debris |xxxxx 1");
        assert_eq!(lines[3], "MEO  active | 0");
    }

    #[test]
    fn empty_census_renders_without_bars() {
        let chart = render_bar_chart(&aggregate(&[]), 10);
        assert!(chart.lines().skip(1).take(6).all(|l| l.ends_with(" 0")));
    }
}
