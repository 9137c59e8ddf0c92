//! Per-cluster trajectory fitting.
//!
//! [`SlidingLinearFit`] turns a cluster's 2D point cloud into a smooth
//! function of the drift coordinate; [`FitCache`] memoizes one fit per
//! cluster for reuse across all pairings in a processing pass.

mod cache;
mod sliding_fit;

pub use cache::FitCache;
pub use sliding_fit::{FitError, OutOfRange, SlidingLinearFit};
