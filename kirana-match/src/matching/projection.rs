//! Trajectory sampling and third-view projection.

use crate::core::{View, XSpan};
use crate::fit::SlidingLinearFit;
use crate::geometry::{DetectorGeometry, MergedPosition};

/// Sample the shared drift range of a fitted pair and project each sample
/// into the third view.
///
/// Sampling is midpoint-offset: `x = min + (n + 0.5) / count * (max - min)`,
/// so samples stay interior to the range. A sample is dropped when either
/// fit query lands outside its cluster's actual fitted domain or when the
/// geometric merge cannot resolve a position; a partially covered pair
/// still proceeds with fewer points. An empty result means the pair cannot
/// be matched.
pub fn project_pair(
    geometry: &DetectorGeometry,
    view_a: View,
    fit_a: &SlidingLinearFit,
    view_b: View,
    fit_b: &SlidingLinearFit,
    range: &XSpan,
    count: usize,
) -> Vec<MergedPosition> {
    let mut projected = Vec::with_capacity(count);

    for n in 0..count {
        let alpha = (n as f32 + 0.5) / count as f32;
        let x = range.min + alpha * (range.max - range.min);

        let Ok(pos_a) = fit_a.position_at(x) else {
            continue;
        };
        let Ok(pos_b) = fit_b.position_at(x) else {
            continue;
        };
        match geometry.merge_two_positions(view_a, pos_a, view_b, pos_b) {
            Ok(merged) => projected.push(merged),
            Err(_) => continue,
        }
    }

    log::trace!(
        "projected {}/{} samples for views {}+{}",
        projected.len(),
        count,
        view_a,
        view_b
    );

    projected
}
