//! Mean-motion based orbit classification.

use crate::domain::OrbitRegime;

/// Lowest mean motion (rev/day) still counted as LEO.
pub const LEO_MIN_MEAN_MOTION: f64 = 11.25;

/// Lowest mean motion (rev/day) still counted as MEO. Anything slower is GEO.
pub const MEO_MIN_MEAN_MOTION: f64 = 2.0;

/// Bucket a mean motion (revolutions per day) into an orbit regime.
///
/// Mean motion falls as altitude rises, so the thresholds are inclusive lower
/// bounds checked from fastest to slowest. No range validation happens here:
/// callers filter out missing values first (see [`usable_mean_motion`]).
pub fn classify(mean_motion: f64) -> OrbitRegime {
    if mean_motion >= LEO_MIN_MEAN_MOTION {
        OrbitRegime::Leo
    } else if mean_motion >= MEO_MIN_MEAN_MOTION {
        OrbitRegime::Meo
    } else {
        OrbitRegime::Geo
    }
}

/// Returns the mean motion if it can be classified (present and finite).
pub fn usable_mean_motion(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
