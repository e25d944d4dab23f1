//! Services the host 3D engine provides to viewpoint computation.
//!
//! The library never walks scene graphs itself: everything it needs from
//! the engine goes through [`SceneOracle`]. Implementations are expected
//! to be cheap per call; occlusion measurement alone issues hundreds of
//! thousands of line casts per solve.
//!
//! Layer state is mutated during occlusion queries (a target's own
//! colliders are parked on [`IGNORE_LAYER`] so they cannot occlude
//! themselves) and restored by [`LayerGuard`] on every exit path.

pub mod synthetic;

use crate::math::{Aabb, Pt3, Real, Vec3};

/// Opaque handle to an engine-side object (renderable or collider).
pub type ObjectId = u32;

/// Collision layer index in `0..32`.
pub type Layer = u8;

/// Layer reserved for objects that must not be hit by occlusion casts.
pub const IGNORE_LAYER: Layer = 31;

/// Set of collision layers included in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    pub fn only(layer: Layer) -> Self {
        LayerMask(1 << layer)
    }

    #[must_use]
    pub fn with(self, layer: Layer) -> Self {
        LayerMask(self.0 | (1 << layer))
    }

    #[must_use]
    pub fn without(self, layer: Layer) -> Self {
        LayerMask(self.0 & !(1 << layer))
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// Result of a line cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub object: ObjectId,
    pub point: Pt3,
}

/// Local coordinate frame of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl LocalFrame {
    /// World-aligned frame: +X right, +Y up, +Z forward.
    pub fn world() -> Self {
        Self {
            right: Vec3::x(),
            up: Vec3::y(),
            forward: Vec3::z(),
        }
    }
}

/// Geometry services consumed by viewpoint computation.
///
/// `set_object_layer` takes `&self`: evaluation holds shared references
/// to the scene throughout a solve, so implementations keep layers behind
/// interior mutability (see [`synthetic::BoxScene`]). The contract stays
/// single-threaded.
pub trait SceneOracle {
    /// World bounds of an object, `None` for unknown ids.
    fn world_aabb(&self, object: ObjectId) -> Option<Aabb>;

    /// Nearest blocking hit on the segment `from -> to`, restricted to
    /// objects whose layer is in `mask`. Objects the segment starts
    /// inside of are not reported.
    fn linecast(&self, from: Pt3, to: Pt3, mask: LayerMask) -> Option<RayHit>;

    /// Whether a sphere overlaps any geometry on the masked layers.
    fn sphere_overlap(&self, center: Pt3, radius: Real, mask: LayerMask) -> bool;

    fn object_layer(&self, object: ObjectId) -> Layer;

    fn set_object_layer(&self, object: ObjectId, layer: Layer);

    /// Local axes of an object, world-aligned for unknown ids.
    fn local_frame(&self, object: ObjectId) -> LocalFrame;

    /// Map a point from an object's local frame to world space.
    fn transform_point(&self, object: ObjectId, local: Pt3) -> Pt3;
}

/// Scoped layer reassignment.
///
/// Parks a set of objects on a layer and restores their previous layers
/// when dropped, including during unwinding, so a failed evaluation never
/// leaves the scene with scrambled layers.
pub struct LayerGuard<'a, S: SceneOracle + ?Sized> {
    scene: &'a S,
    saved: Vec<(ObjectId, Layer)>,
}

impl<'a, S: SceneOracle + ?Sized> LayerGuard<'a, S> {
    pub fn park(scene: &'a S, objects: &[ObjectId], layer: Layer) -> Self {
        let saved = objects
            .iter()
            .map(|&id| {
                let previous = scene.object_layer(id);
                scene.set_object_layer(id, layer);
                (id, previous)
            })
            .collect();
        Self { scene, saved }
    }
}

impl<S: SceneOracle + ?Sized> Drop for LayerGuard<'_, S> {
    fn drop(&mut self) {
        for &(id, layer) in &self.saved {
            self.scene.set_object_layer(id, layer);
        }
    }
}
