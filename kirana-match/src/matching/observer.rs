//! Instrumentation hooks for the matching pipeline.

use crate::core::{HitId, View};
use crate::geometry::MergedPosition;

use super::commit::RepartitionStats;
use super::CandidateId;

/// Receives notifications as the matcher accepts candidates and commits
/// re-partitioned views.
///
/// All methods have empty default bodies; implement only what you need
/// (event displays, tuning histograms, debug dumps). The matcher's
/// behavior never depends on an observer.
pub trait MatchObserver {
    /// A candidate passed every consistency filter.
    fn on_candidate_accepted(
        &mut self,
        target_view: View,
        candidate: CandidateId,
        matched_hits: &[HitId],
        predicted: &[MergedPosition],
    ) {
        let _ = (target_view, candidate, matched_hits, predicted);
    }

    /// A view's cluster list was re-partitioned (possibly a no-op).
    fn on_view_committed(&mut self, view: View, stats: &RepartitionStats) {
        let _ = (view, stats);
    }
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl MatchObserver for NullObserver {}
