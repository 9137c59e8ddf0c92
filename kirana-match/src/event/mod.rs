//! Event-scoped storage for hits and clusters.
//!
//! [`EventStore`] is an arena: hits and clusters are addressed by stable
//! integer ids, and named per-view cluster lists hold the ids visible to
//! downstream algorithms. Fetching a list returns a snapshot copy;
//! algorithms mutate through store operations and publish a new snapshot
//! with [`EventStore::replace_list`]. Hits are never removed from the
//! arena — re-partitioning only moves them between clusters.

use std::collections::HashMap;

use crate::core::{Cluster, ClusterId, Hit2D, HitId, Point2D, View, XSpan};
use crate::error::{MatchError, Result};

/// Arena storage for one event's hits, clusters, and named cluster lists.
#[derive(Clone, Debug, Default)]
pub struct EventStore {
    hits: Vec<Hit2D>,
    clusters: Vec<Option<Cluster>>,
    lists: HashMap<String, Vec<ClusterId>>,
}

impl EventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit and return its id.
    pub fn add_hit(&mut self, hit: Hit2D) -> HitId {
        let id = HitId(self.hits.len() as u32);
        self.hits.push(hit);
        id
    }

    /// Look up a hit by id.
    #[inline]
    pub fn hit(&self, id: HitId) -> &Hit2D {
        &self.hits[id.index()]
    }

    /// Position of a hit.
    #[inline]
    pub fn hit_position(&self, id: HitId) -> Point2D {
        self.hits[id.index()].position
    }

    /// Number of hits recorded in the event.
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    /// Create a cluster object in the arena, outside any list.
    ///
    /// The caller decides which list (if any) the new id is published to.
    pub fn insert_cluster(&mut self, view: View, hit_ids: Vec<HitId>) -> ClusterId {
        let id = ClusterId(self.clusters.len() as u32);
        self.clusters.push(Some(Cluster::new(view, hit_ids)));
        id
    }

    /// Look up a live cluster.
    pub fn cluster(&self, id: ClusterId) -> Result<&Cluster> {
        self.clusters
            .get(id.index())
            .and_then(|slot| slot.as_ref())
            .ok_or(MatchError::InvalidCluster(id))
    }

    /// Check whether a cluster slot is live.
    #[inline]
    pub fn is_live(&self, id: ClusterId) -> bool {
        matches!(self.clusters.get(id.index()), Some(Some(_)))
    }

    /// Free a cluster slot. Lists referencing the id must be re-published
    /// by the caller; fetching a list drops dead ids defensively.
    pub fn discard_cluster(&mut self, id: ClusterId) -> Result<()> {
        let slot = self
            .clusters
            .get_mut(id.index())
            .ok_or(MatchError::InvalidCluster(id))?;
        if slot.take().is_none() {
            return Err(MatchError::InvalidCluster(id));
        }
        Ok(())
    }

    /// Remove the given hits from a cluster. Returns the number removed.
    pub fn remove_hits_from_cluster(&mut self, id: ClusterId, hits: &[HitId]) -> Result<usize> {
        let cluster = self
            .clusters
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
            .ok_or(MatchError::InvalidCluster(id))?;
        Ok(cluster.remove_hits(hits))
    }

    /// Set a cluster's availability flag.
    pub fn set_available(&mut self, id: ClusterId, available: bool) -> Result<()> {
        let cluster = self
            .clusters
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
            .ok_or(MatchError::InvalidCluster(id))?;
        cluster.available = available;
        Ok(())
    }

    /// Bounding span of a cluster's hits along the drift axis.
    pub fn cluster_span_x(&self, id: ClusterId) -> Result<XSpan> {
        let cluster = self.cluster(id)?;
        let mut span = XSpan::empty();
        for &hit_id in cluster.hit_ids() {
            span.expand_to_include(self.hit_position(hit_id).x);
        }
        Ok(span)
    }

    /// Squared end-to-end length of a cluster: the squared distance between
    /// its two drift-extremal hits.
    pub fn cluster_length_squared(&self, id: ClusterId) -> Result<f32> {
        let cluster = self.cluster(id)?;
        let mut lo: Option<Point2D> = None;
        let mut hi: Option<Point2D> = None;
        for &hit_id in cluster.hit_ids() {
            let p = self.hit_position(hit_id);
            if lo.map_or(true, |q| p.x < q.x) {
                lo = Some(p);
            }
            if hi.map_or(true, |q| p.x > q.x) {
                hi = Some(p);
            }
        }
        match (lo, hi) {
            (Some(a), Some(b)) => Ok(a.distance_squared(&b)),
            _ => Ok(0.0),
        }
    }

    /// Hit positions of a cluster, in member order.
    pub fn cluster_positions(&self, id: ClusterId) -> Result<Vec<Point2D>> {
        let cluster = self.cluster(id)?;
        Ok(cluster
            .hit_ids()
            .iter()
            .map(|&h| self.hit_position(h))
            .collect())
    }

    /// Register a named cluster list, replacing any previous content.
    pub fn replace_list(&mut self, name: &str, ids: Vec<ClusterId>) {
        self.lists.insert(name.to_string(), ids);
    }

    /// Snapshot of a named list, with dead ids dropped.
    pub fn cluster_list(&self, name: &str) -> Result<Vec<ClusterId>> {
        let ids = self
            .lists
            .get(name)
            .ok_or_else(|| MatchError::ListNotFound(name.to_string()))?;
        Ok(ids.iter().copied().filter(|&id| self.is_live(id)).collect())
    }

    /// Snapshot of a named list restricted to available clusters.
    pub fn available_clusters(&self, name: &str) -> Result<Vec<ClusterId>> {
        let ids = self.cluster_list(name)?;
        Ok(ids
            .into_iter()
            .filter(|&id| self.cluster(id).map(|c| c.available).unwrap_or(false))
            .collect())
    }

    /// Total hits across the live clusters of a named list.
    ///
    /// Re-partitioning must preserve this count exactly.
    pub fn total_hits_in_list(&self, name: &str) -> Result<usize> {
        let ids = self.cluster_list(name)?;
        let mut total = 0;
        for id in ids {
            total += self.cluster(id)?.len();
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_cluster(zs: &[f32]) -> (EventStore, ClusterId) {
        let mut store = EventStore::new();
        let hits: Vec<HitId> = zs
            .iter()
            .enumerate()
            .map(|(i, &z)| store.add_hit(Hit2D::new(Point2D::new(i as f32, z), 1.0, View::W)))
            .collect();
        let id = store.insert_cluster(View::W, hits);
        store.replace_list("ClustersW", vec![id]);
        (store, id)
    }

    #[test]
    fn test_span_and_length() {
        let (store, id) = store_with_cluster(&[0.0, 1.0, 2.0, 3.0]);
        let span = store.cluster_span_x(id).unwrap();
        assert_eq!(span, XSpan::new(0.0, 3.0));
        // End hits at (0,0) and (3,3): squared distance 18
        assert!((store.cluster_length_squared(id).unwrap() - 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_discard_removes_from_fetch() {
        let (mut store, id) = store_with_cluster(&[0.0, 1.0]);
        assert_eq!(store.cluster_list("ClustersW").unwrap(), vec![id]);
        store.discard_cluster(id).unwrap();
        assert!(store.cluster_list("ClustersW").unwrap().is_empty());
        assert!(store.cluster(id).is_err());
    }

    #[test]
    fn test_availability_filter() {
        let (mut store, id) = store_with_cluster(&[0.0, 1.0]);
        assert_eq!(store.available_clusters("ClustersW").unwrap(), vec![id]);
        store.set_available(id, false).unwrap();
        assert!(store.available_clusters("ClustersW").unwrap().is_empty());
        // Still in the raw list
        assert_eq!(store.cluster_list("ClustersW").unwrap(), vec![id]);
    }

    #[test]
    fn test_missing_list() {
        let store = EventStore::new();
        assert!(matches!(
            store.cluster_list("NoSuchList"),
            Err(MatchError::ListNotFound(_))
        ));
    }

    #[test]
    fn test_hit_conservation_accounting() {
        let (mut store, id) = store_with_cluster(&[0.0, 1.0, 2.0]);
        let before = store.total_hits_in_list("ClustersW").unwrap();

        // Move one hit into a new cluster
        let moved = store.cluster(id).unwrap().hit_ids()[0];
        store.remove_hits_from_cluster(id, &[moved]).unwrap();
        let new_id = store.insert_cluster(View::W, vec![moved]);
        store.replace_list("ClustersW", vec![id, new_id]);

        assert_eq!(store.total_hits_in_list("ClustersW").unwrap(), before);
    }
}
