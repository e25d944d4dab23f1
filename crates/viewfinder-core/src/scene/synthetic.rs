//! Deterministic synthetic scene used by tests, examples and benchmarks.
//!
//! A [`BoxScene`] is a flat list of axis-aligned boxes with per-object
//! layers and local frames. It implements every [`SceneOracle`] service
//! with straight slab tests, which is all the scenes in this repository
//! need: unit cubes, walls, and floors.

use std::cell::Cell;

use nalgebra::Rotation3;

use super::{Layer, LayerMask, LocalFrame, ObjectId, RayHit, SceneOracle};
use crate::math::{Aabb, Pt3, Real, Vec3};

struct BoxObject {
    aabb: Aabb,
    layer: Cell<Layer>,
    rotation: Rotation3<Real>,
}

/// Scene oracle backed by a list of axis-aligned boxes.
#[derive(Default)]
pub struct BoxScene {
    objects: Vec<BoxObject>,
}

impl BoxScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box on `layer` with a world-aligned local frame.
    pub fn add_box(&mut self, aabb: Aabb, layer: Layer) -> ObjectId {
        self.add_oriented_box(aabb, layer, Rotation3::identity())
    }

    /// Add a box whose local frame is rotated relative to the world.
    ///
    /// Only the frame is rotated; collision geometry stays the AABB.
    pub fn add_oriented_box(
        &mut self,
        aabb: Aabb,
        layer: Layer,
        rotation: Rotation3<Real>,
    ) -> ObjectId {
        let id = self.objects.len() as ObjectId;
        self.objects.push(BoxObject {
            aabb,
            layer: Cell::new(layer),
            rotation,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn object(&self, id: ObjectId) -> Option<&BoxObject> {
        self.objects.get(id as usize)
    }
}

/// Entry parameter of the segment `from + t*(to-from)` into `aabb`, for
/// `t` in `(0, 1]`; `None` when the segment misses. A segment starting
/// inside the box does not hit it (engine raycast semantics: no hits
/// from within a collider).
fn segment_hit(aabb: &Aabb, from: &Pt3, to: &Pt3) -> Option<Real> {
    let dir = to - from;
    let mut t_min: Real = 0.0;
    let mut t_max: Real = 1.0;
    for axis in 0..3 {
        let d = dir[axis];
        let lo = aabb.min[axis];
        let hi = aabb.max[axis];
        let o = from[axis];
        if d.abs() < 1e-12 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let mut t0 = (lo - o) / d;
        let mut t1 = (hi - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    (t_min > 1e-12).then_some(t_min)
}

impl SceneOracle for BoxScene {
    fn world_aabb(&self, object: ObjectId) -> Option<Aabb> {
        self.object(object).map(|o| o.aabb)
    }

    fn linecast(&self, from: Pt3, to: Pt3, mask: LayerMask) -> Option<RayHit> {
        let mut best: Option<(Real, ObjectId)> = None;
        for (idx, obj) in self.objects.iter().enumerate() {
            if !mask.contains(obj.layer.get()) {
                continue;
            }
            if let Some(t) = segment_hit(&obj.aabb, &from, &to) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, idx as ObjectId));
                }
            }
        }
        best.map(|(t, object)| RayHit {
            object,
            point: from + (to - from) * t,
        })
    }

    fn sphere_overlap(&self, center: Pt3, radius: Real, mask: LayerMask) -> bool {
        self.objects.iter().any(|obj| {
            mask.contains(obj.layer.get())
                && (obj.aabb.clamp_point(&center) - center).norm() <= radius
        })
    }

    fn object_layer(&self, object: ObjectId) -> Layer {
        self.object(object).map_or(0, |o| o.layer.get())
    }

    fn set_object_layer(&self, object: ObjectId, layer: Layer) {
        if let Some(o) = self.object(object) {
            o.layer.set(layer);
        }
    }

    fn local_frame(&self, object: ObjectId) -> LocalFrame {
        self.object(object).map_or_else(LocalFrame::world, |o| LocalFrame {
            right: o.rotation * Vec3::x(),
            up: o.rotation * Vec3::y(),
            forward: o.rotation * Vec3::z(),
        })
    }

    fn transform_point(&self, object: ObjectId, local: Pt3) -> Pt3 {
        match self.object(object) {
            Some(o) => o.aabb.center() + o.rotation * local.coords,
            None => local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_cube() -> (BoxScene, ObjectId) {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        (scene, id)
    }

    #[test]
    fn linecast_hits_box_between_endpoints() {
        let (scene, id) = scene_with_cube();
        let hit = scene
            .linecast(Pt3::new(0.0, 0.0, -5.0), Pt3::new(0.0, 0.0, 5.0), LayerMask::ALL)
            .expect("segment crosses the cube");
        assert_eq!(hit.object, id);
        assert!((hit.point.z - -1.0).abs() < 1e-9);
    }

    #[test]
    fn linecast_misses_offset_segment() {
        let (scene, _) = scene_with_cube();
        let hit = scene.linecast(
            Pt3::new(5.0, 5.0, -5.0),
            Pt3::new(5.0, 5.0, 5.0),
            LayerMask::ALL,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn linecast_respects_layer_mask() {
        let (scene, _) = scene_with_cube();
        let mask = LayerMask::ALL.without(0);
        let hit = scene.linecast(Pt3::new(0.0, 0.0, -5.0), Pt3::new(0.0, 0.0, 5.0), mask);
        assert!(hit.is_none());
    }

    #[test]
    fn linecast_returns_nearest_of_two() {
        let mut scene = BoxScene::new();
        let near = scene.add_box(Aabb::cube(Pt3::new(0.0, 0.0, 2.0), 1.0), 0);
        let _far = scene.add_box(Aabb::cube(Pt3::new(0.0, 0.0, 6.0), 1.0), 0);
        let hit = scene
            .linecast(Pt3::origin(), Pt3::new(0.0, 0.0, 10.0), LayerMask::ALL)
            .unwrap();
        assert_eq!(hit.object, near);
    }

    #[test]
    fn segment_ending_before_box_misses() {
        let (scene, _) = scene_with_cube();
        let hit = scene.linecast(
            Pt3::new(0.0, 0.0, -5.0),
            Pt3::new(0.0, 0.0, -2.0),
            LayerMask::ALL,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn segment_starting_inside_does_not_hit() {
        let (scene, _) = scene_with_cube();
        let hit = scene.linecast(Pt3::origin(), Pt3::new(0.0, 0.0, 5.0), LayerMask::ALL);
        assert!(hit.is_none());
    }

    #[test]
    fn sphere_overlap_threshold() {
        let (scene, _) = scene_with_cube();
        assert!(scene.sphere_overlap(Pt3::new(0.0, 0.0, 1.5), 0.6, LayerMask::ALL));
        assert!(!scene.sphere_overlap(Pt3::new(0.0, 0.0, 2.0), 0.5, LayerMask::ALL));
    }

    #[test]
    fn transform_point_composes_center_and_rotation() {
        let mut scene = BoxScene::new();
        let rot = Rotation3::from_axis_angle(&Vec3::y_axis(), std::f64::consts::FRAC_PI_2);
        let id = scene.add_oriented_box(Aabb::cube(Pt3::new(2.0, 0.0, 0.0), 1.0), 0, rot);
        // Local +z lands on world +x, offset from the box center.
        let p = scene.transform_point(id, Pt3::new(0.0, 0.0, 3.0));
        assert!((p - Pt3::new(5.0, 0.0, 0.0)).norm() < 1e-9);
        // Unknown objects pass the point through unchanged.
        let q = scene.transform_point(999, Pt3::new(1.0, 2.0, 3.0));
        assert_eq!(q, Pt3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn local_frame_follows_rotation() {
        let mut scene = BoxScene::new();
        let rot = Rotation3::from_axis_angle(&Vec3::y_axis(), std::f64::consts::FRAC_PI_2);
        let id = scene.add_oriented_box(Aabb::cube(Pt3::origin(), 1.0), 0, rot);
        let frame = scene.local_frame(id);
        // Quarter turn about +Y sends +Z onto +X.
        assert!((frame.forward - Vec3::x()).norm() < 1e-9);
        assert!((frame.up - Vec3::y()).norm() < 1e-9);
    }
}
