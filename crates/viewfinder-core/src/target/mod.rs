//! Scene targets.
//!
//! A [`Target`] names a piece of scene content the camera should care
//! about: the objects that define its screen-space extent, the colliders
//! that belong to it (and therefore must not count as occluders of it),
//! and precomputed visibility points for occlusion measurement. Geometry
//! derived from the scene (AABB, bounding-sphere radius, visibility
//! points) is refreshed by [`Target::update_bounds`] whenever the scene
//! moves.
//!
//! Per-camera-evaluation results live in [`TargetScratch`], kept outside
//! the target itself so evaluation state never leaks between problems
//! sharing targets.

mod occlusion;
mod silhouette;
mod sizing;
mod visibility;

pub use sizing::SizeMode;
pub use visibility::VisibilityMethod;

use anyhow::{anyhow, ensure, Result};
use rand::Rng;

use crate::math::{angle_deg, Aabb, Pt2, Pt3, Real, Rect, Vec3};
use crate::scene::{LocalFrame, ObjectId, SceneOracle};

/// Axis a direction can be measured against, in the target's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAxis {
    Right,
    Up,
    Forward,
    /// World up, independent of the target's orientation.
    WorldUp,
}

/// Areas and ratios below this are treated as degenerate (zero).
pub(crate) const DEGENERATE_AREA: Real = 1e-5;

/// Builder for [`Target`]; `build` resolves the initial bounds.
#[derive(Debug, Clone)]
pub struct TargetBuilder {
    name: String,
    size_sources: Vec<ObjectId>,
    occluders: Vec<ObjectId>,
    frame_object: Option<ObjectId>,
    n_rays: usize,
    max_points: usize,
    visibility_method: VisibilityMethod,
}

impl TargetBuilder {
    /// A target named `name` whose extent comes from `size_sources`
    /// (renderables or colliders, whichever the caller tracks).
    pub fn new(name: impl Into<String>, size_sources: Vec<ObjectId>) -> Self {
        Self {
            name: name.into(),
            size_sources,
            occluders: Vec::new(),
            frame_object: None,
            n_rays: 8,
            max_points: 8,
            visibility_method: VisibilityMethod::default(),
        }
    }

    /// Colliders belonging to the target itself; they are ignored by
    /// occlusion casts and used by on-mesh visibility sampling.
    #[must_use]
    pub fn occluders(mut self, occluders: Vec<ObjectId>) -> Self {
        self.occluders = occluders;
        self
    }

    /// Object whose local frame orients the target (defaults to the
    /// first size source).
    #[must_use]
    pub fn frame_object(mut self, object: ObjectId) -> Self {
        self.frame_object = Some(object);
        self
    }

    #[must_use]
    pub fn n_rays(mut self, n_rays: usize) -> Self {
        self.n_rays = n_rays;
        self
    }

    #[must_use]
    pub fn max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    #[must_use]
    pub fn visibility_method(mut self, method: VisibilityMethod) -> Self {
        self.visibility_method = method;
        self
    }

    pub fn build<S, R>(self, scene: &S, rng: &mut R) -> Result<Target>
    where
        S: SceneOracle + ?Sized,
        R: Rng + ?Sized,
    {
        ensure!(!self.name.is_empty(), "target needs a non-empty name");
        ensure!(
            !self.size_sources.is_empty(),
            "target '{}' needs at least one size source",
            self.name
        );
        ensure!(
            self.n_rays >= 1,
            "target '{}' needs at least one occlusion ray",
            self.name
        );
        ensure!(
            self.max_points >= self.n_rays,
            "target '{}': n_rays ({}) exceeds max_points ({})",
            self.name,
            self.n_rays,
            self.max_points
        );
        let frame_object = self.frame_object.unwrap_or(self.size_sources[0]);
        let mut target = Target {
            name: self.name,
            size_sources: self.size_sources,
            occluders: self.occluders,
            frame_object,
            n_rays: self.n_rays,
            max_points: self.max_points,
            visibility_method: self.visibility_method,
            aabb: Aabb::new(Pt3::origin(), Pt3::origin()),
            radius: 0.0,
            visibility_points: Vec::new(),
        };
        target.update_bounds(scene, rng)?;
        Ok(target)
    }
}

/// A named scene object the camera composes shots around.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    size_sources: Vec<ObjectId>,
    occluders: Vec<ObjectId>,
    frame_object: ObjectId,
    n_rays: usize,
    max_points: usize,
    visibility_method: VisibilityMethod,
    aabb: Aabb,
    radius: Real,
    visibility_points: Vec<Pt3>,
}

impl Target {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World bounds as of the last [`Target::update_bounds`].
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Bounding-sphere radius (half the AABB diagonal).
    pub fn radius(&self) -> Real {
        self.radius
    }

    pub fn center(&self) -> Pt3 {
        self.aabb.center()
    }

    pub fn occluders(&self) -> &[ObjectId] {
        &self.occluders
    }

    pub fn n_rays(&self) -> usize {
        self.n_rays
    }

    pub fn visibility_points(&self) -> &[Pt3] {
        &self.visibility_points
    }

    /// Refresh world bounds, bounding sphere and visibility points.
    pub fn update_bounds<S, R>(&mut self, scene: &S, rng: &mut R) -> Result<()>
    where
        S: SceneOracle + ?Sized,
        R: Rng + ?Sized,
    {
        let mut bounds: Option<Aabb> = None;
        for &id in &self.size_sources {
            if let Some(b) = scene.world_aabb(id) {
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }
        self.aabb = bounds.ok_or_else(|| {
            anyhow!("target '{}' has no resolvable size sources", self.name)
        })?;
        self.radius = self.aabb.half_diagonal();

        self.visibility_points = match self.visibility_method {
            VisibilityMethod::Random => {
                visibility::generate_random(scene, &self.aabb, &self.occluders, self.max_points, rng)
            }
            VisibilityMethod::UniformInBb => {
                visibility::generate_structured(&self.aabb, self.max_points).unwrap_or_else(|| {
                    visibility::generate_random(
                        scene,
                        &self.aabb,
                        &self.occluders,
                        self.max_points,
                        rng,
                    )
                })
            }
            VisibilityMethod::OnMesh => {
                let pts = visibility::generate_on_mesh(
                    scene,
                    &self.aabb,
                    self.radius,
                    &self.occluders,
                    self.max_points,
                );
                if pts.is_empty() {
                    // No surface found (no colliders registered, or all
                    // casts missed): interior points still work as ray
                    // destinations.
                    visibility::generate_random(
                        scene,
                        &self.aabb,
                        &self.occluders,
                        self.max_points,
                        rng,
                    )
                } else {
                    pts
                }
            }
        };
        Ok(())
    }

    /// The target's local frame, from its frame object.
    pub fn frame<S: SceneOracle + ?Sized>(&self, scene: &S) -> LocalFrame {
        scene.local_frame(self.frame_object)
    }

    /// Angle in degrees (`[0, 180]`) between `v` and a target axis.
    pub fn angle_with_axis<S: SceneOracle + ?Sized>(
        &self,
        scene: &S,
        axis: TargetAxis,
        v: &Vec3,
    ) -> Real {
        let frame = self.frame(scene);
        let axis_v = match axis {
            TargetAxis::Right => frame.right,
            TargetAxis::Up => frame.up,
            TargetAxis::Forward => frame.forward,
            TargetAxis::WorldUp => Vec3::y(),
        };
        angle_deg(v, &axis_v)
    }
}

/// Per-evaluation projection results for one target.
///
/// One scratch per target lives in the evaluator; `rendered` guarantees
/// each target is projected at most once per camera evaluation no matter
/// how many properties reference it. Buffers are reused across
/// evaluations, so the render path allocates nothing once warm.
#[derive(Debug, Clone, Default)]
pub struct TargetScratch {
    pub rendered: bool,
    pub behind_camera: bool,
    /// Clipped silhouette area as a viewport fraction, capped at 1.
    pub screen_area: Real,
    /// Clipped area over unclipped projected area, with the edge-case
    /// conventions documented on [`Target::render`].
    pub on_screen_ratio: Real,
    /// Bounds of the clipped silhouette.
    pub screen_aabb: Rect,
    /// Clipped silhouette polygon in viewport coordinates.
    pub polygon: Vec<Pt2>,
    raw: Vec<Pt2>,
    frame_buf: Vec<Pt2>,
    tmp: Vec<Pt2>,
}

impl TargetScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous camera's results.
    pub fn reset(&mut self) {
        self.rendered = false;
        self.behind_camera = false;
        self.screen_area = 0.0;
        self.on_screen_ratio = 0.0;
        self.screen_aabb = Rect::empty();
        self.polygon.clear();
        self.raw.clear();
    }
}
