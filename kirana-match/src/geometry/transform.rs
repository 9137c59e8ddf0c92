//! Two-view position merging.

use serde::{Deserialize, Serialize};

use crate::core::{Point2D, View};

/// Wire pairs closer to parallel than this (in |sin Δθ|) cannot resolve a
/// third-view position.
const MIN_WIRE_ANGLE_SIN: f32 = 1e-3;

/// The merge of two observed projections: a predicted position in the third
/// view plus a drift-consistency residual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergedPosition {
    /// Predicted position in the third view.
    pub position: Point2D,
    /// Squared drift disagreement of the inputs, in units of `sigma_x`.
    pub chi2: f32,
}

/// Merge failed: the two wire directions are too close to parallel (or the
/// same view was given twice), so (y, z) is not determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("wire directions too close to parallel to resolve a third-view position")]
pub struct Unresolvable;

/// Fixed angular relationship between the three wire planes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorGeometry {
    /// U-plane wire inclination (radians).
    pub angle_u: f32,
    /// V-plane wire inclination (radians).
    pub angle_v: f32,
    /// W-plane wire inclination (radians).
    pub angle_w: f32,
    /// Drift-coordinate resolution used to normalize the merge residual.
    pub sigma_x: f32,
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        // Standard LArTPC plane inclinations: induction planes at ±35.9°,
        // vertical collection plane.
        Self {
            angle_u: 0.6265,
            angle_v: -0.6265,
            angle_w: 0.0,
            sigma_x: 1.0,
        }
    }
}

impl DetectorGeometry {
    /// Wire inclination of a view.
    #[inline]
    pub fn angle(&self, view: View) -> f32 {
        match view {
            View::U => self.angle_u,
            View::V => self.angle_v,
            View::W => self.angle_w,
        }
    }

    /// Wire coordinate seen by `view` for a global (y, z) position.
    #[inline]
    pub fn wire_coordinate(&self, view: View, y: f32, z: f32) -> f32 {
        let theta = self.angle(view);
        z * theta.cos() - y * theta.sin()
    }

    /// Predict the third view's position from two observed projections.
    ///
    /// `pos_a` and `pos_b` are positions in views `view_a` and `view_b`;
    /// the result lies in `View::third(view_a, view_b)`. Fails when the two
    /// wire directions do not intersect transversally.
    pub fn merge_two_positions(
        &self,
        view_a: View,
        pos_a: Point2D,
        view_b: View,
        pos_b: Point2D,
    ) -> Result<MergedPosition, Unresolvable> {
        let view_c = View::third(view_a, view_b).ok_or(Unresolvable)?;

        let theta_a = self.angle(view_a);
        let theta_b = self.angle(view_b);
        let det = (theta_b - theta_a).sin();
        if det.abs() < MIN_WIRE_ANGLE_SIN {
            return Err(Unresolvable);
        }

        // Solve  w = z cos θ − y sin θ  for both views (Cramer's rule).
        let (wa, wb) = (pos_a.z, pos_b.z);
        let y = (wa * theta_b.cos() - wb * theta_a.cos()) / det;
        let z = (wa * theta_b.sin() - wb * theta_a.sin()) / det;

        let x = 0.5 * (pos_a.x + pos_b.x);
        let dx = (pos_a.x - pos_b.x) / self.sigma_x;

        Ok(MergedPosition {
            position: Point2D::new(x, self.wire_coordinate(view_c, y, z)),
            chi2: dx * dx,
        })
    }
}
