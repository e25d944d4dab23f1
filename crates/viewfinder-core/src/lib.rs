//! Geometry, projection and satisfaction primitives for `viewfinder-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...) and small
//!   geometry types (`Aabb`, `Rect`, polygon clipping),
//! - the virtual camera ([`ViewCamera`]) with world-to-viewport projection,
//! - piecewise-linear satisfaction functions ([`SatSpline`]),
//! - the [`SceneOracle`] trait over the host 3D engine, with a
//!   deterministic [`scene::synthetic::BoxScene`] for tests,
//! - scene [`Target`]s: silhouette rendering, visibility points,
//!   occlusion measurement and analytic sizing.
//!
//! Property objectives and the viewpoint optimizer live in
//! `viewfinder-optim`, and are re-exported via the top-level
//! `viewfinder` crate.

/// Linear algebra type aliases and geometry helpers.
pub mod math;
/// Virtual camera pose and viewport projection.
pub mod camera;
/// Piecewise-linear satisfaction functions.
pub mod spline;
/// Scene services trait and the synthetic box scene.
pub mod scene;
/// Scene targets: bounds, silhouettes, visibility points, occlusion.
pub mod target;

pub use camera::ViewCamera;
pub use math::*;
pub use scene::{
    LayerGuard, LayerMask, LocalFrame, ObjectId, RayHit, SceneOracle, IGNORE_LAYER,
};
pub use spline::{SatSpline, SplineError};
pub use target::{
    SizeMode, Target, TargetAxis, TargetBuilder, TargetScratch, VisibilityMethod,
};
