//! Position types for projection-plane samples.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A position within one projection view (length units, f32).
///
/// `x` is the drift coordinate shared by all three views; `z` is the wire
/// coordinate measured by the view the position belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Drift coordinate (common to all views).
    pub x: f32,
    /// Wire coordinate of the owning view.
    pub z: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Origin.
    pub const ZERO: Point2D = Point2D { x: 0.0, z: 0.0 };

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (faster, avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// Length (magnitude) of this point as a vector from the origin.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point2D::new(self.x + other.x, self.z + other.z)
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point2D::new(self.x - other.x, self.z - other.z)
    }
}

impl Mul<f32> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point2D::new(self.x * scalar, self.z * scalar)
    }
}
