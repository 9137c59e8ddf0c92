//! # Kirana-Match: Three-View Track Matching
//!
//! Reconstructs a single continuous trajectory (e.g. a through-going
//! cosmic-ray track) that upstream 2D segmentation has split inconsistently
//! across the three projection views of a wire-plane detector.
//!
//! Each view sees the same 3D object as a set of 2D clusters of
//! position+charge hits. When one view splits the track where the others do
//! not, cluster boundaries disagree between views. The matcher detects
//! cluster pairs from two views that are consistent with a common
//! trajectory, predicts where the corresponding hits must lie in the third
//! view, and re-partitions that view's hits so boundaries agree everywhere.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kirana_match::{EventStore, MatcherConfig, TrackMatcher};
//! use kirana_match::{Hit2D, Point2D, View};
//!
//! let mut store = EventStore::new();
//!
//! // Populate hits and clusters from upstream segmentation
//! let hit = store.add_hit(Hit2D::new(Point2D::new(0.0, 1.0), 3.2, View::U));
//! let cluster = store.insert_cluster(View::U, vec![hit]);
//! store.replace_list("ClustersU", vec![cluster]);
//! // ... same for "ClustersV" and "ClustersW" ...
//!
//! let matcher = TrackMatcher::new(MatcherConfig::default());
//! let summary = matcher.run(&mut store)?;
//! println!(
//!     "evaluated {} pairings, accepted {}",
//!     summary.candidates_evaluated, summary.candidates_accepted
//! );
//! # Ok::<(), kirana_match::MatchError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: fundamental types ([`Point2D`], [`XSpan`], [`View`],
//!   hits and clusters with arena ids)
//! - [`event`]: the [`EventStore`] arena and named per-view cluster lists
//! - [`geometry`]: wire-plane transforms and the two-view position merge
//! - [`fit`]: sliding linear trajectory fits, memoized per cluster
//! - [`matching`]: the matching pipeline and re-partitioning commit
//! - [`config`]: tunables with YAML loading
//!
//! ## Data Flow
//!
//! ```text
//!   ClustersU     ClustersV     ClustersW        (named input lists)
//!       │             │             │
//!       └──── available / clean / fitted ────┐   (per-view snapshots)
//!                                            │
//!   for each cyclic pass (A, B → C):         │
//!       overlap gate → sample & project → associate hits → filters
//!                                            │
//!                        accepted hit claims per view
//!                                            │
//!   commit per view: delete emptied clusters, trim the rest,
//!   create one cluster per accepted pairing, publish the new list
//! ```
//!
//! ## Invariants
//!
//! Hits are conserved: re-partitioning moves hits between clusters, never
//! creates or drops them, and every hit belongs to exactly one cluster of
//! its view. A hit claimed by more than one accepted pairing is ambiguous
//! and stays where it is. Broken ownership at commit time aborts the event
//! with [`MatchError::OwnershipViolation`] rather than guessing.

pub mod config;
pub mod core;
pub mod error;
pub mod event;
pub mod fit;
pub mod geometry;
pub mod matching;

// Re-export the main types at the crate root
pub use crate::config::{ConfigError, MatcherConfig, YamlConfigError};
pub use crate::core::{Cluster, ClusterId, Hit2D, HitId, Point2D, View, XSpan};
pub use crate::error::{MatchError, Result};
pub use crate::event::EventStore;
pub use crate::fit::{FitCache, FitError, OutOfRange, SlidingLinearFit};
pub use crate::geometry::{DetectorGeometry, MergedPosition, Unresolvable};
pub use crate::matching::{
    AssociationSet, CandidateId, MatchObserver, MatchSummary, NullObserver, RepartitionStats,
    TrackMatcher,
};
