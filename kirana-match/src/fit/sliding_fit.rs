//! Sliding linear fit along the drift coordinate.
//!
//! The fit orders hits by x and, for each query, solves a local
//! least-squares line over the hits inside a window of ±`half_window`
//! samples around the query position. Track-like clusters are locally
//! straight, so a small window follows gentle curvature while smoothing
//! sample noise.

use crate::core::{Point2D, XSpan};

/// Minimum number of hits a fit needs.
const MIN_FIT_HITS: usize = 2;

/// The cluster cannot be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// Fewer hits than a line fit requires.
    #[error("cluster has too few hits to fit ({found} < {required})")]
    TooFewHits {
        /// Hits present.
        found: usize,
        /// Hits required.
        required: usize,
    },
    /// All hits share one drift coordinate; z(x) is undefined.
    #[error("cluster hits span a single drift coordinate")]
    DegenerateSpan,
}

/// A position query outside the fitted span.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("x = {x} lies outside the fitted span [{min}, {max}]")]
pub struct OutOfRange {
    /// Queried coordinate.
    pub x: f32,
    /// Lower edge of the fitted span.
    pub min: f32,
    /// Upper edge of the fitted span.
    pub max: f32,
}

/// A reusable fitted trajectory for one cluster.
#[derive(Clone, Debug)]
pub struct SlidingLinearFit {
    /// Hit drift coordinates, ascending.
    xs: Vec<f32>,
    /// Wire coordinates, co-sorted with `xs`.
    zs: Vec<f32>,
    half_window: usize,
    span: XSpan,
}

impl SlidingLinearFit {
    /// Fit a cluster's hit positions.
    ///
    /// `half_window` is the smoothing parameter: each query uses up to
    /// `2 * half_window + 1` neighboring samples.
    pub fn fit(points: &[Point2D], half_window: usize) -> Result<Self, FitError> {
        if points.len() < MIN_FIT_HITS {
            return Err(FitError::TooFewHits {
                found: points.len(),
                required: MIN_FIT_HITS,
            });
        }

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));

        let xs: Vec<f32> = order.iter().map(|&i| points[i].x).collect();
        let zs: Vec<f32> = order.iter().map(|&i| points[i].z).collect();

        let span = XSpan::new(xs[0], xs[xs.len() - 1]);
        if span.length() <= f32::EPSILON {
            return Err(FitError::DegenerateSpan);
        }

        Ok(Self {
            xs,
            zs,
            half_window: half_window.max(1),
            span,
        })
    }

    /// The fitted drift span.
    #[inline]
    pub fn span_x(&self) -> XSpan {
        self.span
    }

    /// Evaluate the fitted trajectory at drift coordinate `x`.
    ///
    /// Fails with [`OutOfRange`] when `x` lies outside the fitted span.
    pub fn position_at(&self, x: f32) -> Result<Point2D, OutOfRange> {
        if !self.span.contains(x) {
            return Err(OutOfRange {
                x,
                min: self.span.min,
                max: self.span.max,
            });
        }

        let center = self.xs.partition_point(|&xi| xi < x);
        let lo = center.saturating_sub(self.half_window);
        let hi = (center + self.half_window + 1).min(self.xs.len());

        Ok(Point2D::new(x, self.local_fit(lo, hi, x)))
    }

    /// Least-squares line through samples `[lo, hi)` evaluated at `x`.
    fn local_fit(&self, lo: usize, hi: usize, x: f32) -> f32 {
        let n = (hi - lo) as f32;
        let mut mean_x = 0.0;
        let mut mean_z = 0.0;
        for i in lo..hi {
            mean_x += self.xs[i];
            mean_z += self.zs[i];
        }
        mean_x /= n;
        mean_z /= n;

        let mut cxx = 0.0;
        let mut cxz = 0.0;
        for i in lo..hi {
            let dx = self.xs[i] - mean_x;
            cxx += dx * dx;
            cxz += dx * (self.zs[i] - mean_z);
        }

        // Window collapsed to one drift coordinate: fall back to the mean
        if cxx <= f32::EPSILON {
            return mean_z;
        }

        mean_z + (cxz / cxx) * (x - mean_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_track(n: usize, slope: f32, offset: f32) -> Vec<Point2D> {
        (0..n)
            .map(|i| {
                let x = i as f32 * 0.5;
                Point2D::new(x, offset + slope * x)
            })
            .collect()
    }

    #[test]
    fn test_fit_straight_line() {
        let fit = SlidingLinearFit::fit(&straight_track(40, 0.7, -2.0), 15).unwrap();
        let p = fit.position_at(5.3).unwrap();
        assert_relative_eq!(p.x, 5.3, epsilon = 1e-6);
        assert_relative_eq!(p.z, -2.0 + 0.7 * 5.3, epsilon = 1e-4);
    }

    #[test]
    fn test_fit_unsorted_input() {
        let mut points = straight_track(20, -1.2, 4.0);
        points.reverse();
        points.swap(3, 11);
        let fit = SlidingLinearFit::fit(&points, 5).unwrap();
        let p = fit.position_at(2.0).unwrap();
        assert_relative_eq!(p.z, 4.0 - 1.2 * 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_query_out_of_range() {
        let fit = SlidingLinearFit::fit(&straight_track(10, 0.0, 0.0), 15).unwrap();
        let err = fit.position_at(100.0).unwrap_err();
        assert_relative_eq!(err.max, 4.5, epsilon = 1e-6);
        assert!(fit.position_at(-0.1).is_err());
        assert!(fit.position_at(0.0).is_ok());
        assert!(fit.position_at(4.5).is_ok());
    }

    #[test]
    fn test_too_few_hits() {
        let points = vec![Point2D::new(0.0, 0.0)];
        assert!(matches!(
            SlidingLinearFit::fit(&points, 15),
            Err(FitError::TooFewHits { found: 1, .. })
        ));
    }

    #[test]
    fn test_degenerate_span() {
        let points = vec![
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(1.0, 4.0),
        ];
        assert!(matches!(
            SlidingLinearFit::fit(&points, 15),
            Err(FitError::DegenerateSpan)
        ));
    }

    #[test]
    fn test_window_follows_kink() {
        // Two straight segments meeting at x = 10; a small window should
        // track each arm away from the kink.
        let mut points = Vec::new();
        for i in 0..=20 {
            let x = i as f32;
            let z = if x <= 10.0 { x } else { 20.0 - x };
            points.push(Point2D::new(x, z));
        }
        let fit = SlidingLinearFit::fit(&points, 2).unwrap();
        assert_relative_eq!(fit.position_at(3.0).unwrap().z, 3.0, epsilon = 1e-3);
        assert_relative_eq!(fit.position_at(17.0).unwrap().z, 3.0, epsilon = 1e-3);
    }
}
