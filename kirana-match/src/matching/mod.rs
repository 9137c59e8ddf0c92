//! Cross-view track matching and cluster re-partitioning.
//!
//! For each cyclic view pair (U,V → W), (V,W → U), (W,U → V) the matcher
//! pairs every fitted clean cluster of the first view with every fitted
//! clean cluster of the second, predicts where the shared trajectory
//! should appear in the third view, and claims the third-view hits that
//! line up with the prediction. After all three passes, each view's
//! accepted claims are committed: claimed hits leave their original
//! clusters (deleting clusters left empty) and regroup into one new
//! cluster per accepted pairing.
//!
//! Matching reads per-view snapshots taken at the start of the run; each
//! commit re-reads its view's current state. A commit touches only its own
//! view's cluster list, so the three passes stay consistent as long as
//! evaluation and commit never interleave within one view — the driver
//! runs all evaluation before the first commit.

mod association;
mod commit;
mod filters;
mod observer;
mod overlap;
mod projection;

pub use association::{associate_hits, Association};
pub use commit::{commit_repartition, RepartitionStats};
pub use filters::{clusters_within_seed_span, matched_sample_fraction, select_proximate_hits};
pub use observer::{MatchObserver, NullObserver};
pub use overlap::OverlapGate;
pub use projection::project_pair;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::MatcherConfig;
use crate::core::{ClusterId, HitId, Point2D, View};
use crate::error::{MatchError, Result};
use crate::event::EventStore;
use crate::fit::FitCache;
use crate::geometry::{DetectorGeometry, MergedPosition};

/// Ephemeral identifier of one attempted cluster pairing; unique within a
/// single view pass.
pub type CandidateId = u32;

/// Accepted hit claims of one view pass.
///
/// Keeps both directions of the claim: which candidates claimed each hit
/// (ambiguity detection) and which hits each candidate claimed (cluster
/// creation). Ordered maps make the later commit deterministic.
#[derive(Clone, Debug, Default)]
pub struct AssociationSet {
    hit_claims: BTreeMap<HitId, BTreeSet<CandidateId>>,
    candidate_hits: BTreeMap<CandidateId, Vec<HitId>>,
}

impl AssociationSet {
    /// Record a candidate's matched hits.
    pub fn record(&mut self, candidate: CandidateId, hits: &[HitId]) {
        for &hit in hits {
            self.hit_claims.entry(hit).or_default().insert(candidate);
        }
        self.candidate_hits
            .entry(candidate)
            .or_default()
            .extend_from_slice(hits);
    }

    /// Number of candidates claiming a hit.
    pub fn claim_count(&self, hit: HitId) -> usize {
        self.hit_claims.get(&hit).map_or(0, |c| c.len())
    }

    /// Iterate candidates and their claimed hits in id order.
    pub fn candidates(&self) -> impl Iterator<Item = (CandidateId, &[HitId])> {
        self.candidate_hits
            .iter()
            .map(|(&id, hits)| (id, hits.as_slice()))
    }

    /// Number of accepted candidates.
    pub fn len(&self) -> usize {
        self.candidate_hits.len()
    }

    /// Check whether no candidate was accepted.
    pub fn is_empty(&self) -> bool {
        self.candidate_hits.is_empty()
    }
}

/// Per-event result of a matching run.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchSummary {
    /// Cluster pairings evaluated across all three passes.
    pub candidates_evaluated: usize,
    /// Pairings that survived every consistency filter.
    pub candidates_accepted: usize,
    /// Commit outcome for the U view.
    pub stats_u: RepartitionStats,
    /// Commit outcome for the V view.
    pub stats_v: RepartitionStats,
    /// Commit outcome for the W view.
    pub stats_w: RepartitionStats,
}

impl MatchSummary {
    /// Check whether any view changed.
    pub fn changed(&self) -> bool {
        !(self.stats_u.is_noop() && self.stats_v.is_noop() && self.stats_w.is_noop())
    }
}

/// Three-view track matcher.
///
/// # Example
///
/// ```rust,no_run
/// use kirana_match::{EventStore, MatcherConfig, TrackMatcher};
///
/// let matcher = TrackMatcher::new(MatcherConfig::default());
/// let mut store = EventStore::new();
/// // ... populate the store's three cluster lists ...
/// let summary = matcher.run(&mut store)?;
/// println!("created {} clusters in W", summary.stats_w.clusters_created);
/// # Ok::<(), kirana_match::MatchError>(())
/// ```
#[derive(Clone, Debug)]
pub struct TrackMatcher {
    config: MatcherConfig,
    geometry: DetectorGeometry,
}

impl TrackMatcher {
    /// Create a matcher with the given configuration and default geometry.
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            geometry: DetectorGeometry::default(),
        }
    }

    /// Replace the detector geometry.
    pub fn with_geometry(mut self, geometry: DetectorGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Run the full matching pass over an event.
    pub fn run(&self, store: &mut EventStore) -> Result<MatchSummary> {
        self.run_with_observer(store, &mut NullObserver)
    }

    /// Run the full matching pass, reporting progress to an observer.
    pub fn run_with_observer(
        &self,
        store: &mut EventStore,
        observer: &mut dyn MatchObserver,
    ) -> Result<MatchSummary> {
        let cfg = &self.config;

        // Per-view snapshots; an empty view stops the event
        let avail_u = self.fetch_available(store, &cfg.input_list_u, View::U)?;
        let avail_v = self.fetch_available(store, &cfg.input_list_v, View::V)?;
        let avail_w = self.fetch_available(store, &cfg.input_list_w, View::W)?;

        let clean_u = self.select_clean(store, &avail_u)?;
        let clean_v = self.select_clean(store, &avail_v)?;
        let clean_w = self.select_clean(store, &avail_w)?;

        // One fit per clean cluster, shared by every pairing
        let mut fits = FitCache::new(cfg.sliding_fit_half_window);
        let fitted_u = self.fit_clusters(store, &mut fits, &clean_u);
        let fitted_v = self.fit_clusters(store, &mut fits, &clean_v);
        let fitted_w = self.fit_clusters(store, &mut fits, &clean_w);

        let mut summary = MatchSummary::default();

        // All evaluation happens on the snapshots before any commit runs
        let assoc_w = self.match_pass(
            store, &fits, View::W, &fitted_u, &fitted_v, &avail_w, &mut summary, observer,
        )?;
        let assoc_u = self.match_pass(
            store, &fits, View::U, &fitted_v, &fitted_w, &avail_u, &mut summary, observer,
        )?;
        let assoc_v = self.match_pass(
            store, &fits, View::V, &fitted_w, &fitted_u, &avail_v, &mut summary, observer,
        )?;

        summary.stats_u = commit_repartition(store, &cfg.input_list_u, &assoc_u)?;
        observer.on_view_committed(View::U, &summary.stats_u);
        summary.stats_v = commit_repartition(store, &cfg.input_list_v, &assoc_v)?;
        observer.on_view_committed(View::V, &summary.stats_v);
        summary.stats_w = commit_repartition(store, &cfg.input_list_w, &assoc_w)?;
        observer.on_view_committed(View::W, &summary.stats_w);

        Ok(summary)
    }

    /// Available clusters of a named list, largest first.
    fn fetch_available(
        &self,
        store: &EventStore,
        list_name: &str,
        view: View,
    ) -> Result<Vec<ClusterId>> {
        let mut ids = store.available_clusters(list_name)?;
        if ids.is_empty() {
            return Err(MatchError::EmptyView(view));
        }
        let mut keyed: Vec<(usize, ClusterId)> = Vec::with_capacity(ids.len());
        for id in ids.drain(..) {
            keyed.push((store.cluster(id)?.len(), id));
        }
        keyed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(keyed.into_iter().map(|(_, id)| id).collect())
    }

    /// Clusters long enough to fit and match.
    fn select_clean(&self, store: &EventStore, ids: &[ClusterId]) -> Result<Vec<ClusterId>> {
        let min_sq = self.config.cluster_min_length * self.config.cluster_min_length;
        let mut clean = Vec::with_capacity(ids.len());
        for &id in ids {
            if store.cluster_length_squared(id)? >= min_sq {
                clean.push(id);
            }
        }
        Ok(clean)
    }

    /// Fit each cluster, keeping only the ones with a usable fit.
    fn fit_clusters(
        &self,
        store: &EventStore,
        fits: &mut FitCache,
        ids: &[ClusterId],
    ) -> Vec<ClusterId> {
        ids.iter()
            .copied()
            .filter(|&id| fits.fit_cluster(store, id))
            .collect()
    }

    /// Evaluate every pairing of two seed views against the third view's
    /// available clusters.
    #[allow(clippy::too_many_arguments)]
    fn match_pass(
        &self,
        store: &EventStore,
        fits: &FitCache,
        target_view: View,
        seeds_a: &[ClusterId],
        seeds_b: &[ClusterId],
        targets: &[ClusterId],
        summary: &mut MatchSummary,
        observer: &mut dyn MatchObserver,
    ) -> Result<AssociationSet> {
        let mut associations = AssociationSet::default();
        if seeds_a.is_empty() || seeds_b.is_empty() || targets.is_empty() {
            return Ok(associations);
        }

        // Views must be pairwise distinct or the pass is meaningless
        let view_a = store.cluster(seeds_a[0])?.view;
        let view_b = store.cluster(seeds_b[0])?.view;
        if view_a == view_b || view_a == target_view || view_b == target_view {
            log::warn!(
                "skipping pass into {}: seed views {} and {} are not distinct",
                target_view,
                view_a,
                view_b
            );
            return Ok(associations);
        }

        let mut candidate: CandidateId = 0;
        for &id_a in seeds_a {
            for &id_b in seeds_b {
                candidate += 1;
                summary.candidates_evaluated += 1;

                if let Some((matched, predicted)) =
                    self.evaluate_candidate(store, fits, view_a, id_a, view_b, id_b, targets)?
                {
                    summary.candidates_accepted += 1;
                    observer.on_candidate_accepted(target_view, candidate, &matched, &predicted);
                    associations.record(candidate, &matched);
                }
            }
        }

        Ok(associations)
    }

    /// Run one cluster pairing through the gate, projector, association
    /// engine, and consistency filters.
    ///
    /// Returns the matched hits and predicted samples on acceptance.
    #[allow(clippy::too_many_arguments)]
    fn evaluate_candidate(
        &self,
        store: &EventStore,
        fits: &FitCache,
        view_a: View,
        id_a: ClusterId,
        view_b: View,
        id_b: ClusterId,
        targets: &[ClusterId],
    ) -> Result<Option<(Vec<HitId>, Vec<MergedPosition>)>> {
        let cfg = &self.config;

        let span_a = store.cluster_span_x(id_a)?;
        let span_b = store.cluster_span_x(id_b)?;

        let gate = OverlapGate::new(cfg.min_x_overlap, cfg.min_x_overlap_fraction);
        let Some(range) = gate.shared_range(&span_a, &span_b) else {
            return Ok(None);
        };

        let (Some(fit_a), Some(fit_b)) = (fits.get(id_a), fits.get(id_b)) else {
            return Ok(None);
        };

        let predicted = project_pair(
            &self.geometry,
            view_a,
            fit_a,
            view_b,
            fit_b,
            &range,
            cfg.n_sampling_points,
        );
        if predicted.is_empty() {
            return Ok(None);
        }
        let predicted_points: Vec<Point2D> = predicted.iter().map(|m| m.position).collect();

        let association = associate_hits(
            store,
            targets,
            &predicted_points,
            cfg.max_point_displacement,
        )?;
        if association.is_empty() {
            return Ok(None);
        }

        // Filter 1: associated clusters must fit inside the seed spans
        if !filters::clusters_within_seed_span(store, &association.clusters, &span_a, &span_b)? {
            return Ok(None);
        }

        // Filter 2: drop isolated hits
        let matched =
            filters::select_proximate_hits(store, &association.hits, cfg.max_hit_displacement);

        // Filter 3: enough matched hits
        if matched.len() < cfg.min_matched_hits {
            return Ok(None);
        }

        // Filter 4: the match must cover most of the sampled trajectory
        let coverage = filters::matched_sample_fraction(
            store,
            &predicted_points,
            &matched,
            cfg.max_point_displacement,
        );
        if coverage < cfg.min_matched_point_fraction {
            return Ok(None);
        }

        log::debug!(
            "accepted pairing {:?}+{:?}: {} matched hits, coverage {:.2}",
            id_a,
            id_b,
            matched.len(),
            coverage
        );

        Ok(Some((matched, predicted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_set_claims() {
        let mut set = AssociationSet::default();
        set.record(1, &[HitId(0), HitId(1)]);
        set.record(2, &[HitId(1)]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.claim_count(HitId(0)), 1);
        assert_eq!(set.claim_count(HitId(1)), 2);
        assert_eq!(set.claim_count(HitId(9)), 0);

        let candidates: Vec<_> = set.candidates().map(|(id, _)| id).collect();
        assert_eq!(candidates, vec![1, 2]);
    }

    #[test]
    fn test_summary_changed() {
        let mut summary = MatchSummary::default();
        assert!(!summary.changed());
        summary.stats_w.clusters_created = 1;
        assert!(summary.changed());
    }
}
