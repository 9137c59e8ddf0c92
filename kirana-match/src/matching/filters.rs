//! Consistency filters applied to an associated candidate.
//!
//! The filters run in a fixed order and any failure drops the candidate
//! with no side effects: span check, hit proximity, matched-hit count,
//! sample coverage. All are pure queries over the association.

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::{ClusterId, HitId, Point2D, XSpan};
use crate::error::Result;
use crate::event::EventStore;

/// Check that no associated cluster spans more drift range than the
/// smaller of the two seed clusters.
///
/// An associated cluster longer than either seed cannot be a sub-segment
/// of the matched trajectory.
pub fn clusters_within_seed_span(
    store: &EventStore,
    associated_clusters: &[ClusterId],
    seed_a: &XSpan,
    seed_b: &XSpan,
) -> Result<bool> {
    let limit = seed_a.length().min(seed_b.length());
    for &id in associated_clusters {
        if store.cluster_span_x(id)?.length() > limit {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Drop associated hits with no other associated hit within
/// `max_hit_displacement`.
///
/// Isolated associations are noise picked up along the trajectory corridor;
/// the survivors are the candidate's matched hits.
pub fn select_proximate_hits(
    store: &EventStore,
    associated_hits: &[HitId],
    max_hit_displacement: f32,
) -> Vec<HitId> {
    if associated_hits.len() < 2 {
        return Vec::new();
    }

    let mut tree: KdTree<f32, 2> = KdTree::with_capacity(associated_hits.len());
    for (i, &hit_id) in associated_hits.iter().enumerate() {
        let p = store.hit_position(hit_id);
        tree.add(&[p.x, p.z], i as u64);
    }

    let radius_sq = max_hit_displacement * max_hit_displacement;
    let mut matched = Vec::with_capacity(associated_hits.len());

    for (i, &hit_id) in associated_hits.iter().enumerate() {
        let p = store.hit_position(hit_id);
        let neighbors = tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.z], radius_sq);
        let has_companion = neighbors
            .iter()
            .any(|n| n.item != i as u64 && n.distance < radius_sq);
        if has_companion {
            matched.push(hit_id);
        }
    }

    matched
}

/// Fraction of predicted sample positions explained by a matched hit
/// within `max_point_displacement`.
///
/// The match must account for most of the sampled trajectory, not just a
/// localized clump of hits.
pub fn matched_sample_fraction(
    store: &EventStore,
    predicted: &[Point2D],
    matched_hits: &[HitId],
    max_point_displacement: f32,
) -> f32 {
    if predicted.is_empty() || matched_hits.is_empty() {
        return 0.0;
    }

    let mut tree: KdTree<f32, 2> = KdTree::with_capacity(matched_hits.len());
    for (i, &hit_id) in matched_hits.iter().enumerate() {
        let p = store.hit_position(hit_id);
        tree.add(&[p.x, p.z], i as u64);
    }

    let radius_sq = max_point_displacement * max_point_displacement;
    let covered = predicted
        .iter()
        .filter(|p| tree.nearest_one::<SquaredEuclidean>(&[p.x, p.z]).distance < radius_sq)
        .count();

    covered as f32 / predicted.len() as f32
}
