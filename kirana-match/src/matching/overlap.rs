//! Drift-overlap gating of candidate cluster pairs.

use crate::core::XSpan;

/// O(1) pre-filter applied to every cluster pair before sampling.
///
/// Rejects pairs whose drift spans share too little range, either in
/// absolute length or as a fraction of the union span. Geometrically
/// unrelated pairs never reach the expensive projection stage.
#[derive(Clone, Copy, Debug)]
pub struct OverlapGate {
    min_x_overlap: f32,
    min_x_overlap_fraction: f32,
}

impl OverlapGate {
    /// Create a gate from the two overlap thresholds.
    pub fn new(min_x_overlap: f32, min_x_overlap_fraction: f32) -> Self {
        Self {
            min_x_overlap,
            min_x_overlap_fraction,
        }
    }

    /// The shared sampling range of two spans, or `None` when the pair
    /// fails either overlap requirement.
    pub fn shared_range(&self, a: &XSpan, b: &XSpan) -> Option<XSpan> {
        let overlap = a.overlap(b);
        let span = a.union_span(b);

        if overlap < self.min_x_overlap {
            return None;
        }
        if span > 0.0 && overlap / span < self.min_x_overlap_fraction {
            return None;
        }

        a.intersection(b)
    }
}
