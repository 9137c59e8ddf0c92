//! Error types for kirana-match.

use crate::core::{ClusterId, HitId, View};

/// Result type alias.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Terminal failures of an event's matching run.
///
/// Per-candidate rejections (overlap, span, proximity, coverage) are
/// ordinary negative outcomes and never surface here; sample-level fit and
/// geometry failures are consumed inside the sampling loop.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// A configured input cluster list does not exist in the event store.
    #[error("cluster list '{0}' not found")]
    ListNotFound(String),

    /// An input view has no available clusters; the event cannot be matched.
    #[error("no available clusters in view {0}")]
    EmptyView(View),

    /// A claimed hit maps to zero or more than one current cluster during
    /// commit. The store snapshot is stale or corrupt; not recoverable.
    #[error("hit {hit:?} owned by {owners} clusters at commit (expected exactly 1)")]
    OwnershipViolation {
        /// The hit with broken ownership.
        hit: HitId,
        /// Number of owning clusters found.
        owners: usize,
    },

    /// A match candidate reached cluster creation with no claimed hits.
    #[error("candidate {candidate} has no hits at cluster creation")]
    EmptyCandidate {
        /// The offending candidate identifier.
        candidate: u32,
    },

    /// A cluster id referenced a deleted or out-of-range arena slot.
    #[error("cluster {0:?} is not live in the event store")]
    InvalidCluster(ClusterId),
}
