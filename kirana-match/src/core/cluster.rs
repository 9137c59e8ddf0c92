//! Clusters of hits within one projection view.

use serde::{Deserialize, Serialize};

use super::hit::HitId;
use super::view::View;

/// Stable identifier of a cluster slot within an event's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    /// Arena slot index of this cluster.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A collection of hits within one projection view.
///
/// A cluster is `available` until a downstream algorithm consumes it; only
/// available clusters take part in matching and re-partitioning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cluster {
    /// View the cluster lives in.
    pub view: View,
    /// Member hits, in insertion order.
    hit_ids: Vec<HitId>,
    /// Not yet consumed by a downstream algorithm.
    pub available: bool,
}

impl Cluster {
    /// Create a new available cluster from its member hits.
    pub fn new(view: View, hit_ids: Vec<HitId>) -> Self {
        Self {
            view,
            hit_ids,
            available: true,
        }
    }

    /// Member hit ids.
    #[inline]
    pub fn hit_ids(&self) -> &[HitId] {
        &self.hit_ids
    }

    /// Number of member hits.
    #[inline]
    pub fn len(&self) -> usize {
        self.hit_ids.len()
    }

    /// Check whether the cluster has no hits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hit_ids.is_empty()
    }

    /// Drop the listed hits from the cluster, preserving the order of the
    /// remainder. Returns the number of hits removed.
    pub fn remove_hits(&mut self, to_remove: &[HitId]) -> usize {
        let before = self.hit_ids.len();
        self.hit_ids.retain(|id| !to_remove.contains(id));
        before - self.hit_ids.len()
    }
}
