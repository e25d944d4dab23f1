//! Piecewise-linear satisfaction functions.
//!
//! A [`SatSpline`] maps a raw property measurement (screen area, angle,
//! distance, ...) to a satisfaction in `[0, 1]` by straight segments
//! between control points. Queries outside the domain snap to the nearest
//! endpoint. The spline doubles as an unnormalized probability density:
//! [`SatSpline::sample_x`] draws an `x` with probability proportional to
//! `y(x)`, which is what seeds property-aware viewpoint sampling.

use rand::Rng;
use thiserror::Error;

use crate::math::Real;

#[derive(Debug, Error, PartialEq)]
pub enum SplineError {
    #[error("need at least 2 control points, got {0}")]
    TooFewPoints(usize),
    #[error("x and y lengths differ ({xs} vs {ys})")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("x values must be strictly increasing (at index {0})")]
    NonIncreasingX(usize),
    #[error("y value {value} at index {index} outside [0, 1]")]
    OutOfRangeY { index: usize, value: Real },
}

/// Monotone-indexed piecewise-linear curve with `y` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SatSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Cumulative trapezoid areas: `cum[i]` is the area of `y(x)` over
    /// `[xs[0], xs[i]]`. Rebuilt on construction, used by `sample_x`.
    cum: Vec<Real>,
}

impl SatSpline {
    pub fn new(xs: Vec<Real>, ys: Vec<Real>) -> Result<Self, SplineError> {
        if xs.len() != ys.len() {
            return Err(SplineError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(SplineError::TooFewPoints(xs.len()));
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(SplineError::NonIncreasingX(i));
            }
        }
        for (index, &value) in ys.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SplineError::OutOfRangeY { index, value });
            }
        }
        let mut cum = Vec::with_capacity(xs.len());
        cum.push(0.0);
        for i in 1..xs.len() {
            let area = (xs[i] - xs[i - 1]) * (ys[i] + ys[i - 1]) / 2.0;
            cum.push(cum[i - 1] + area);
        }
        Ok(Self { xs, ys, cum })
    }

    /// Convenience constructor from control-point pairs.
    pub fn from_points(points: &[(Real, Real)]) -> Result<Self, SplineError> {
        let (xs, ys) = points.iter().copied().unzip();
        Self::new(xs, ys)
    }

    pub fn domain(&self) -> (Real, Real) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Interpolated value at `x`, clamped to the domain endpoints.
    pub fn eval(&self, x: Real) -> Real {
        if x <= self.xs[0] {
            return self.ys[0];
        }
        let last = self.xs.len() - 1;
        if x >= self.xs[last] {
            return self.ys[last];
        }
        let seg = match self.xs.partition_point(|&v| v <= x) {
            0 => 0,
            i => i - 1,
        };
        let t = (x - self.xs[seg]) / (self.xs[seg + 1] - self.xs[seg]);
        self.ys[seg] + t * (self.ys[seg + 1] - self.ys[seg])
    }

    /// Draw an `x` with probability proportional to `y(x)`.
    ///
    /// Inverse-transform sampling on the precomputed cumulative areas:
    /// binary-search the segment, then invert the quadratic area function
    /// within it. A constant-zero curve has no density to follow and falls
    /// back to a uniform draw over the domain.
    pub fn sample_x<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        let total = *self.cum.last().expect("cum is never empty");
        let (lo, hi) = self.domain();
        if total < 1e-12 {
            return rng.random_range(lo..hi);
        }
        let u = rng.random_range(0.0..total);
        let seg = match self.cum.partition_point(|&a| a <= u) {
            0 => 0,
            i => (i - 1).min(self.xs.len() - 2),
        };
        let a = u - self.cum[seg];
        let x0 = self.xs[seg];
        let x1 = self.xs[seg + 1];
        let y0 = self.ys[seg];
        let y1 = self.ys[seg + 1];
        let m = (y1 - y0) / (x1 - x0);
        // Area from x0 to x0+t is y0*t + m*t^2/2; solve for t.
        let t = if m.abs() < 1e-12 {
            if y0 < 1e-12 {
                0.0
            } else {
                a / y0
            }
        } else {
            let disc = (y0 * y0 + 2.0 * m * a).max(0.0);
            (disc.sqrt() - y0) / m
        };
        (x0 + t).clamp(x0, x1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn ramp() -> SatSpline {
        SatSpline::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap()
    }

    #[test]
    fn rejects_bad_control_points() {
        assert_eq!(
            SatSpline::new(vec![0.0], vec![0.5]),
            Err(SplineError::TooFewPoints(1))
        );
        assert_eq!(
            SatSpline::new(vec![0.0, 0.0], vec![0.0, 1.0]),
            Err(SplineError::NonIncreasingX(1))
        );
        assert!(matches!(
            SatSpline::new(vec![0.0, 1.0], vec![0.0, 1.5]),
            Err(SplineError::OutOfRangeY { index: 1, .. })
        ));
        assert!(matches!(
            SatSpline::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0]),
            Err(SplineError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn eval_interpolates_and_clamps() {
        let s = SatSpline::new(vec![0.0, 90.0, 180.0], vec![0.0, 1.0, 0.0]).unwrap();
        assert_eq!(s.eval(-10.0), 0.0);
        assert_eq!(s.eval(190.0), 0.0);
        assert!((s.eval(45.0) - 0.5).abs() < 1e-12);
        assert!((s.eval(90.0) - 1.0).abs() < 1e-12);
        assert!((s.eval(135.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sample_x_stays_in_domain() {
        let s = ramp();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let x = s.sample_x(&mut rng);
            assert!((0.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn sample_x_follows_density() {
        // Linear ramp pdf: P(x < 0.5) = 0.25. Check the empirical mass in
        // each half against the analytic value with a loose tolerance.
        let s = ramp();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 100_000;
        let below = (0..n).filter(|_| s.sample_x(&mut rng) < 0.5).count();
        let frac = below as f64 / n as f64;
        assert!((frac - 0.25).abs() < 0.01, "got {}", frac);
    }

    #[test]
    fn sample_x_peaked_density_prefers_peak() {
        let s = SatSpline::new(vec![0.0, 0.45, 0.55, 1.0], vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let central = (0..n)
            .filter(|_| {
                let x = s.sample_x(&mut rng);
                (0.25..=0.75).contains(&x)
            })
            .count();
        // The central half carries most of the area for this tent shape.
        assert!(central as f64 / n as f64 > 0.7);
    }

    #[test]
    fn zero_density_falls_back_to_uniform() {
        let s = SatSpline::new(vec![2.0, 4.0], vec![0.0, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let n = 50_000;
        let mut below = 0;
        for _ in 0..n {
            let x = s.sample_x(&mut rng);
            assert!((2.0..=4.0).contains(&x));
            if x < 3.0 {
                below += 1;
            }
        }
        let frac = below as f64 / n as f64;
        assert!((frac - 0.5).abs() < 0.02, "got {}", frac);
    }
}
