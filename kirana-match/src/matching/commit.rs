//! Re-partitioning commit: move accepted hits into new clusters.

use std::collections::{BTreeMap, HashMap};

use crate::core::{ClusterId, HitId};
use crate::error::{MatchError, Result};
use crate::event::EventStore;

use super::{AssociationSet, CandidateId};

/// Outcome of committing one view's accepted associations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepartitionStats {
    /// Candidates that contributed at least one committable hit.
    pub candidates_committed: usize,
    /// Hits moved out of their original cluster.
    pub hits_reassigned: usize,
    /// Hits left in place because more than one candidate claimed them.
    pub hits_ambiguous: usize,
    /// Original clusters deleted after losing all their hits.
    pub clusters_deleted: usize,
    /// Original clusters that lost some (not all) hits.
    pub clusters_trimmed: usize,
    /// New clusters created, one per committed candidate.
    pub clusters_created: usize,
}

impl RepartitionStats {
    /// Check whether the commit changed anything.
    pub fn is_noop(&self) -> bool {
        self.clusters_created == 0
    }
}

/// Apply a view's accepted hit associations to its cluster list.
///
/// The current list is re-fetched from the store, so ownership reflects
/// any changes made since the matching phase snapshot was taken. Hits
/// claimed by more than one candidate stay in their original cluster;
/// a claimed hit whose current ownership cannot be resolved to exactly one
/// available cluster is a fatal [`MatchError::OwnershipViolation`].
///
/// Commit order: clusters losing every hit are deleted, the rest are
/// trimmed, then one new cluster is created per candidate and the updated
/// list is published. When no candidate has a committable hit the list is
/// left untouched.
pub fn commit_repartition(
    store: &mut EventStore,
    list_name: &str,
    associations: &AssociationSet,
) -> Result<RepartitionStats> {
    let mut stats = RepartitionStats::default();

    // Ownership tables over the view's current available clusters
    let current = store.cluster_list(list_name)?;
    let mut hit_owners: HashMap<HitId, Vec<ClusterId>> = HashMap::new();
    for &cluster_id in &current {
        let cluster = store.cluster(cluster_id)?;
        if !cluster.available {
            continue;
        }
        for &hit_id in cluster.hit_ids() {
            hit_owners.entry(hit_id).or_default().push(cluster_id);
        }
    }

    // Stage removals and creations; ordered maps keep commit deterministic
    let mut to_modify: BTreeMap<ClusterId, Vec<HitId>> = BTreeMap::new();
    let mut to_create: BTreeMap<CandidateId, Vec<HitId>> = BTreeMap::new();

    for (candidate, claimed) in associations.candidates() {
        let mut resolved: Vec<(HitId, ClusterId)> = Vec::with_capacity(claimed.len());
        for &hit_id in claimed {
            if associations.claim_count(hit_id) > 1 {
                stats.hits_ambiguous += 1;
                continue;
            }

            let owners = hit_owners.get(&hit_id).map_or(0, |o| o.len());
            if owners != 1 {
                return Err(MatchError::OwnershipViolation {
                    hit: hit_id,
                    owners,
                });
            }
            resolved.push((hit_id, hit_owners[&hit_id][0]));
        }

        if resolved.is_empty() {
            continue;
        }

        // A candidate reproducing an existing cluster exactly commits
        // nothing: re-running on consistent output must be a no-op
        let first_owner = resolved[0].1;
        if resolved.iter().all(|&(_, owner)| owner == first_owner)
            && resolved.len() == store.cluster(first_owner)?.len()
        {
            log::trace!(
                "candidate {} reproduces cluster {:?}; skipped",
                candidate,
                first_owner
            );
            continue;
        }

        for &(hit_id, owner) in &resolved {
            to_modify.entry(owner).or_default().push(hit_id);
            to_create.entry(candidate).or_default().push(hit_id);
        }
    }

    if to_create.is_empty() {
        log::debug!("list '{}': no committable candidates", list_name);
        return Ok(stats);
    }

    // Remove claimed hits from their original clusters
    let mut deleted: Vec<ClusterId> = Vec::new();
    for (cluster_id, hits) in &to_modify {
        let remaining = store.cluster(*cluster_id)?.len();
        if hits.len() == remaining {
            store.discard_cluster(*cluster_id)?;
            deleted.push(*cluster_id);
            stats.clusters_deleted += 1;
        } else {
            store.remove_hits_from_cluster(*cluster_id, hits)?;
            stats.clusters_trimmed += 1;
        }
        stats.hits_reassigned += hits.len();
    }

    // Create one cluster per candidate
    let mut created: Vec<ClusterId> = Vec::new();
    for (candidate, hits) in to_create {
        if hits.is_empty() {
            return Err(MatchError::EmptyCandidate { candidate });
        }
        let view = store.hit(hits[0]).view;
        created.push(store.insert_cluster(view, hits));
        stats.candidates_committed += 1;
    }
    stats.clusters_created = created.len();

    // Publish the updated list
    let mut updated: Vec<ClusterId> = current
        .into_iter()
        .filter(|id| !deleted.contains(id))
        .collect();
    updated.extend(created);
    store.replace_list(list_name, updated);

    log::debug!(
        "list '{}': {} hits reassigned, {} clusters deleted, {} trimmed, {} created",
        list_name,
        stats.hits_reassigned,
        stats.clusters_deleted,
        stats.clusters_trimmed,
        stats.clusters_created
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Hit2D, Point2D, View};

    fn hit(store: &mut EventStore, x: f32) -> HitId {
        store.add_hit(Hit2D::new(Point2D::new(x, 0.0), 1.0, View::W))
    }

    fn two_cluster_store() -> (EventStore, ClusterId, ClusterId, Vec<HitId>) {
        let mut store = EventStore::new();
        let hits: Vec<HitId> = (0..6).map(|i| hit(&mut store, i as f32)).collect();
        let a = store.insert_cluster(View::W, hits[..3].to_vec());
        let b = store.insert_cluster(View::W, hits[3..].to_vec());
        store.replace_list("ClustersW", vec![a, b]);
        (store, a, b, hits)
    }

    #[test]
    fn test_full_merge_deletes_originals() {
        let (mut store, a, b, hits) = two_cluster_store();
        let before = store.total_hits_in_list("ClustersW").unwrap();

        let mut assoc = AssociationSet::default();
        assoc.record(1, &hits);

        let stats = commit_repartition(&mut store, "ClustersW", &assoc).unwrap();
        assert_eq!(stats.clusters_deleted, 2);
        assert_eq!(stats.clusters_created, 1);
        assert_eq!(stats.hits_reassigned, 6);

        let list = store.cluster_list("ClustersW").unwrap();
        assert_eq!(list.len(), 1);
        assert!(!list.contains(&a) && !list.contains(&b));
        assert_eq!(store.total_hits_in_list("ClustersW").unwrap(), before);
    }

    #[test]
    fn test_partial_claim_trims_cluster() {
        let (mut store, a, _b, hits) = two_cluster_store();

        let mut assoc = AssociationSet::default();
        assoc.record(1, &hits[..2]);

        let stats = commit_repartition(&mut store, "ClustersW", &assoc).unwrap();
        assert_eq!(stats.clusters_deleted, 0);
        assert_eq!(stats.clusters_trimmed, 1);
        assert_eq!(store.cluster(a).unwrap().hit_ids(), &[hits[2]]);
        assert_eq!(store.total_hits_in_list("ClustersW").unwrap(), 6);
    }

    #[test]
    fn test_ambiguous_hits_stay_put() {
        let (mut store, a, b, hits) = two_cluster_store();

        let mut assoc = AssociationSet::default();
        assoc.record(1, &hits);
        assoc.record(2, &hits[..2]);

        // hits 0 and 1 are claimed twice and stay in cluster a; candidate 1
        // still moves the other four
        let stats = commit_repartition(&mut store, "ClustersW", &assoc).unwrap();
        assert_eq!(stats.hits_ambiguous, 4);
        assert_eq!(stats.hits_reassigned, 4);
        assert_eq!(stats.clusters_trimmed, 1);
        assert_eq!(stats.clusters_deleted, 1);
        assert!(store.is_live(a));
        assert!(!store.is_live(b));
        assert_eq!(store.cluster(a).unwrap().hit_ids(), &hits[..2]);
        assert_eq!(store.total_hits_in_list("ClustersW").unwrap(), 6);
    }

    #[test]
    fn test_ambiguous_remainder_matching_cluster_is_noop() {
        let (mut store, a, b, hits) = two_cluster_store();

        // Both candidates claim cluster a's hits; after dropping the
        // ambiguous claims, candidate 1 reproduces cluster b exactly
        let mut assoc = AssociationSet::default();
        assoc.record(1, &hits);
        assoc.record(2, &hits[..3]);

        let stats = commit_repartition(&mut store, "ClustersW", &assoc).unwrap();
        assert!(stats.is_noop());
        assert_eq!(store.cluster_list("ClustersW").unwrap(), vec![a, b]);
    }

    #[test]
    fn test_exact_reproduction_is_noop() {
        let (mut store, a, b, hits) = two_cluster_store();

        // Candidate 1 claims exactly cluster a's membership
        let mut assoc = AssociationSet::default();
        assoc.record(1, &hits[..3]);

        let stats = commit_repartition(&mut store, "ClustersW", &assoc).unwrap();
        assert!(stats.is_noop());
        assert_eq!(store.cluster_list("ClustersW").unwrap(), vec![a, b]);
    }

    #[test]
    fn test_no_claims_is_noop() {
        let (mut store, a, b, _hits) = two_cluster_store();
        let assoc = AssociationSet::default();
        let stats = commit_repartition(&mut store, "ClustersW", &assoc).unwrap();
        assert!(stats.is_noop());
        assert_eq!(store.cluster_list("ClustersW").unwrap(), vec![a, b]);
    }

    #[test]
    fn test_unowned_hit_is_fatal() {
        let (mut store, _a, _b, _hits) = two_cluster_store();
        let stray = hit(&mut store, 99.0);

        let mut assoc = AssociationSet::default();
        assoc.record(1, &[stray]);

        assert!(matches!(
            commit_repartition(&mut store, "ClustersW", &assoc),
            Err(MatchError::OwnershipViolation { owners: 0, .. })
        ));
    }

    #[test]
    fn test_unavailable_owner_is_fatal() {
        let (mut store, a, _b, hits) = two_cluster_store();
        store.set_available(a, false).unwrap();

        let mut assoc = AssociationSet::default();
        assoc.record(1, &hits[..3]);

        // Hits of an unavailable cluster have no resolvable owner
        assert!(matches!(
            commit_repartition(&mut store, "ClustersW", &assoc),
            Err(MatchError::OwnershipViolation { owners: 0, .. })
        ));
    }
}
