//! Hit/cluster association against predicted trajectory positions.

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::{ClusterId, HitId, Point2D};
use crate::error::Result;
use crate::event::EventStore;

/// Hits and clusters of the third view found near a predicted trajectory.
#[derive(Clone, Debug, Default)]
pub struct Association {
    /// Hits within the association radius of at least one predicted
    /// position, in discovery order.
    pub hits: Vec<HitId>,
    /// Clusters contributing at least one associated hit.
    pub clusters: Vec<ClusterId>,
}

impl Association {
    /// Check whether nothing was associated.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Find every hit of the candidate clusters lying within `radius` of any
/// predicted position.
///
/// The predicted positions are indexed in a k-d tree, so each hit costs one
/// logarithmic nearest-neighbor query instead of a scan over all samples;
/// the full cross product of the source algorithm degrades gracefully with
/// hit volume this way.
pub fn associate_hits(
    store: &EventStore,
    candidate_clusters: &[ClusterId],
    predicted: &[Point2D],
    radius: f32,
) -> Result<Association> {
    let mut association = Association::default();
    if predicted.is_empty() {
        return Ok(association);
    }

    let mut tree: KdTree<f32, 2> = KdTree::with_capacity(predicted.len());
    for (i, p) in predicted.iter().enumerate() {
        tree.add(&[p.x, p.z], i as u64);
    }

    let radius_sq = radius * radius;

    for &cluster_id in candidate_clusters {
        let cluster = store.cluster(cluster_id)?;
        let mut cluster_associated = false;

        for &hit_id in cluster.hit_ids() {
            let p = store.hit_position(hit_id);
            let nearest = tree.nearest_one::<SquaredEuclidean>(&[p.x, p.z]);
            if nearest.distance < radius_sq {
                association.hits.push(hit_id);
                cluster_associated = true;
            }
        }

        if cluster_associated {
            association.clusters.push(cluster_id);
        }
    }

    Ok(association)
}
