//! Connectivity oracle: decides whether two parts touch.
//!
//! CAD assemblies mix millimeter fasteners with meter-scale frames, so
//! the acceptance radius scales with part size instead of being a
//! fixed constant, clamped to an absolute ceiling.

use crate::model::Part;
use crate::shape::Shape;

/// Fraction of the average characteristic size used as tolerance.
pub const TOLERANCE_FRACTION: f64 = 1e-4;

/// Absolute ceiling on the tolerance, in model length units.
pub const TOLERANCE_CEILING: f64 = 0.1;

/// Acceptance radius for a given average characteristic size.
pub fn size_adaptive_tolerance(avg_size: f64) -> f64 {
    (avg_size * TOLERANCE_FRACTION).min(TOLERANCE_CEILING)
}

/// Whether two parts are connected (touching or within tolerance).
///
/// Primary test: the adapter's exact minimum distance. When that is
/// inconclusive or misses, every cross pair of vertices is checked
/// against the same tolerance. Pure function of the two shapes.
pub fn are_connected<S: Shape>(a: &Part<S>, b: &Part<S>) -> bool {
    let avg_size = (a.characteristic_size() + b.characteristic_size()) / 2.0;
    let tolerance = size_adaptive_tolerance(avg_size);

    if let Some(dist) = a.shape.distance_to(&b.shape) {
        if dist <= tolerance {
            return true;
        }
    }

    // Vertex-pair fallback. O(V1 x V2), affordable because per-part
    // vertex counts are small relative to exact geometric comparison.
    for v1 in a.shape.vertices() {
        for v2 in b.shape.vertices() {
            if (v1 - v2).norm() <= tolerance {
                return true;
            }
        }
    }

    false
}
