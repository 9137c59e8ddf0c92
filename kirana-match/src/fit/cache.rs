//! Memoized per-cluster fits.

use std::collections::HashMap;

use crate::core::ClusterId;
use crate::event::EventStore;

use super::sliding_fit::SlidingLinearFit;

/// Caches one [`SlidingLinearFit`] per cluster within a processing pass.
///
/// Fits are computed once per clean cluster regardless of how many pairings
/// reuse them. Clusters whose fit fails are recorded as absent; pairings
/// simply skip them.
#[derive(Debug, Default)]
pub struct FitCache {
    fits: HashMap<ClusterId, SlidingLinearFit>,
    half_window: usize,
}

impl FitCache {
    /// Create an empty cache with the given smoothing half-window.
    pub fn new(half_window: usize) -> Self {
        Self {
            fits: HashMap::new(),
            half_window,
        }
    }

    /// Fit a cluster if not already cached. Returns whether a usable fit is
    /// available afterwards.
    pub fn fit_cluster(&mut self, store: &EventStore, id: ClusterId) -> bool {
        if self.fits.contains_key(&id) {
            return true;
        }
        let positions = match store.cluster_positions(id) {
            Ok(positions) => positions,
            Err(err) => {
                log::warn!("fit requested for dead cluster {:?}: {}", id, err);
                return false;
            }
        };
        match SlidingLinearFit::fit(&positions, self.half_window) {
            Ok(fit) => {
                self.fits.insert(id, fit);
                true
            }
            Err(err) => {
                log::debug!("cluster {:?} excluded from matching: {}", id, err);
                false
            }
        }
    }

    /// Fetch a cached fit.
    #[inline]
    pub fn get(&self, id: ClusterId) -> Option<&SlidingLinearFit> {
        self.fits.get(&id)
    }

    /// Number of cached fits.
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }
}
