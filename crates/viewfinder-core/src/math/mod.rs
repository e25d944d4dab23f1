//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental types used throughout the library
//! and small geometry helpers shared by projection and sampling code.

use nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};

mod aabb;
mod polygon;

pub use aabb::Aabb;
pub use polygon::{clip_polygon, polygon_area, polygon_bounds, Rect};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates (viewport space).
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates (world space).
pub type Pt3 = Point3<Real>;
/// Unit quaternion rotation with [`Real`] components.
pub type UnitQuat = UnitQuaternion<Real>;

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns 0 when either vector is (numerically) zero.
pub fn angle_deg(a: &Vec3, b: &Vec3) -> Real {
    let na = a.norm();
    let nb = b.norm();
    if na < 1e-12 || nb < 1e-12 {
        return 0.0;
    }
    let cos = (a.dot(b) / (na * nb)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Unit directions distributed on a Fibonacci lattice over the sphere.
///
/// The lattice gives a near-uniform angular coverage for any `n`, which is
/// what surface-sampling raycasts want: no clustering at the poles.
pub fn fibonacci_sphere(n: usize) -> Vec<Vec3> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut dirs = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as Real / n as Real;
        let theta = 2.0 * std::f64::consts::PI * t * golden_ratio;
        let phi = (1.0 - 2.0 * (i as Real + 0.5) / n as Real).acos();
        dirs.push(Vec3::new(
            phi.sin() * theta.cos(),
            phi.cos(),
            phi.sin() * theta.sin(),
        ));
    }
    dirs
}
