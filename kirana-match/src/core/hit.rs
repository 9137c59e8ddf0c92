//! Hit samples and their arena identifiers.

use serde::{Deserialize, Serialize};

use super::point::Point2D;
use super::view::View;

/// Stable identifier of a hit within an event's arena.
///
/// Ownership tables are keyed by id rather than by reference, so deleting
/// clusters mid-pass can never dangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitId(pub u32);

impl HitId {
    /// Arena index of this hit.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single position + charge sample in one projection view.
///
/// Hits are immutable once recorded; only their cluster membership changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit2D {
    /// Sample position (drift, wire).
    pub position: Point2D,
    /// Collected charge / amplitude.
    pub charge: f32,
    /// View the sample was recorded in.
    pub view: View,
}

impl Hit2D {
    /// Create a new hit.
    #[inline]
    pub fn new(position: Point2D, charge: f32, view: View) -> Self {
        Self {
            position,
            charge,
            view,
        }
    }
}
