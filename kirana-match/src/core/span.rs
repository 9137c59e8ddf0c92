//! One-dimensional interval along the drift axis.

use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]` along the shared drift coordinate.
///
/// The empty span has `min > max` (like an inverted bounding box) and will
/// expand to fit any value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct XSpan {
    /// Lower edge of the interval.
    pub min: f32,
    /// Upper edge of the interval.
    pub max: f32,
}

impl XSpan {
    /// Create a span from its edges.
    #[inline]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Create an empty (invalid) span that expands to fit any value.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    /// Check whether the span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Extent of the interval, or 0 for an empty span.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.max - self.min).max(0.0)
    }

    /// Grow the span to include `x`.
    #[inline]
    pub fn expand_to_include(&mut self, x: f32) {
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Check whether `x` lies within the closed interval.
    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min && x <= self.max
    }

    /// Shared extent of two spans. Negative when they do not overlap.
    #[inline]
    pub fn overlap(&self, other: &XSpan) -> f32 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Extent of the union interval covering both spans.
    #[inline]
    pub fn union_span(&self, other: &XSpan) -> f32 {
        self.max.max(other.max) - self.min.min(other.min)
    }

    /// The overlapping sub-interval of two spans, if any.
    pub fn intersection(&self, other: &XSpan) -> Option<XSpan> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Some(XSpan::new(min, max))
        } else {
            None
        }
    }
}

impl Default for XSpan {
    fn default() -> Self {
        Self::empty()
    }
}
