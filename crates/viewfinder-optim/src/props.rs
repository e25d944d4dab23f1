//! Visual properties.
//!
//! A [`Property`] measures one visual criterion of a candidate camera
//! against its targets and maps the raw measurement through a
//! satisfaction spline into `[0, 1]`. Kinds are a closed enum rather than
//! trait objects: the evaluator's inner loop runs millions of times per
//! solve and a small match keeps it flat.

use anyhow::{ensure, Result};

use viewfinder_core::math::{Pt2, Real, Rect, UnitQuat};
use viewfinder_core::scene::SceneOracle;
use viewfinder_core::spline::SatSpline;
use viewfinder_core::target::{SizeMode, TargetAxis};

use crate::scratch::EvalContext;

/// Which target axis the camera direction is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationMode {
    /// Angle in the target's horizontal plane, against its forward axis:
    /// front/side/back viewing.
    HorizontalLocal,
    /// Angle against the target's up axis: high/low viewing in the
    /// target's own frame.
    VerticalLocal,
    /// Angle against world up, ignoring the target's orientation.
    VerticalWorld,
}

/// Screen-space placement relative to a second target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Left,
    Right,
    Above,
    Below,
}

/// Discriminated payload of a [`Property`].
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// On-screen size of the target, or the size ratio of two targets.
    Size { mode: SizeMode },
    /// Fraction of the target's visibility points hidden from the camera.
    Occlusion { double_sided: bool, random_rays: bool },
    /// Viewing angle of the target.
    Orientation { mode: OrientationMode },
    /// Fraction of the target's silhouette inside a viewport rectangle.
    Framing { rect: Rect },
    /// Placement of the target relative to a second target's silhouette.
    RelativePosition { placement: Placement },
    /// Viewport distance of the projected target center from a point.
    TargetPosition { point: Pt2 },
    /// Angular difference of the camera from a reference orientation.
    CameraOrientation { reference: UnitQuat },
    /// The camera's vertical field of view, in degrees.
    CameraFov,
}

impl PropertyKind {
    /// Relative evaluation cost, used to order properties so lazy
    /// pruning skips the expensive ones. Occlusion dominates: it is the
    /// only kind that issues scene casts per evaluation.
    pub fn default_cost(&self) -> Real {
        match self {
            PropertyKind::CameraFov => 0.5,
            PropertyKind::CameraOrientation { .. } => 1.0,
            PropertyKind::Orientation { .. } => 2.0,
            PropertyKind::TargetPosition { .. } => 3.0,
            PropertyKind::Size { .. } => 4.0,
            PropertyKind::RelativePosition { .. } => 4.0,
            PropertyKind::Framing { .. } => 5.0,
            PropertyKind::Occlusion { .. } => 10.0,
        }
    }

    fn target_arity(&self) -> (usize, usize) {
        match self {
            PropertyKind::Size { .. } => (1, 2),
            PropertyKind::Occlusion { .. } => (1, 1),
            PropertyKind::Orientation { .. } => (1, 1),
            PropertyKind::Framing { .. } => (1, 1),
            PropertyKind::RelativePosition { .. } => (2, 2),
            PropertyKind::TargetPosition { .. } => (1, 1),
            PropertyKind::CameraOrientation { .. } => (0, 0),
            PropertyKind::CameraFov => (0, 0),
        }
    }
}

/// One visual criterion bound to target indices and a satisfaction spline.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    kind: PropertyKind,
    targets: Vec<usize>,
    spline: SatSpline,
    cost: Real,
}

impl Property {
    /// Build a property; `targets` are indices into the rig's target
    /// list and must match the kind's arity.
    pub fn new(
        name: impl Into<String>,
        kind: PropertyKind,
        targets: Vec<usize>,
        spline: SatSpline,
    ) -> Result<Self> {
        let name = name.into();
        let (min, max) = kind.target_arity();
        ensure!(
            (min..=max).contains(&targets.len()),
            "property '{}' takes {}..={} targets, got {}",
            name,
            min,
            max,
            targets.len()
        );
        let cost = kind.default_cost();
        Ok(Self {
            name,
            kind,
            targets,
            spline,
            cost,
        })
    }

    /// Override the default cost estimate.
    #[must_use]
    pub fn with_cost(mut self, cost: Real) -> Self {
        self.cost = cost;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn spline(&self) -> &SatSpline {
        &self.spline
    }

    pub fn cost(&self) -> Real {
        self.cost
    }

    /// Satisfaction of this property for the context's camera, memoized
    /// per evaluation via the property's scratch slot.
    pub(crate) fn evaluate<S: SceneOracle + ?Sized>(
        &self,
        index: usize,
        ctx: &mut EvalContext<'_, S>,
    ) -> Real {
        if ctx.scratch.props[index].evaluated {
            return ctx.scratch.props[index].satisfaction;
        }
        ctx.scratch.prop_evaluations += 1;
        let (metric, in_screen_ratio) = self.measure(ctx);
        let satisfaction = self.spline.eval(metric).clamp(0.0, 1.0);
        let slot = &mut ctx.scratch.props[index];
        slot.evaluated = true;
        slot.satisfaction = satisfaction;
        slot.in_screen_ratio = in_screen_ratio;
        satisfaction
    }

    /// Raw metric plus the in-screen diagnostic for this property.
    fn measure<S: SceneOracle + ?Sized>(&self, ctx: &mut EvalContext<'_, S>) -> (Real, Real) {
        match &self.kind {
            PropertyKind::Size { mode } => {
                let t0 = self.targets[0];
                ctx.ensure_rendered(t0);
                let m0 = size_metric(ctx, t0, *mode);
                let mut ratio = ctx.scratch.targets[t0].on_screen_ratio;
                let metric = if let Some(&t1) = self.targets.get(1) {
                    ctx.ensure_rendered(t1);
                    ratio *= ctx.scratch.targets[t1].on_screen_ratio;
                    let m1 = size_metric(ctx, t1, *mode);
                    if m1 < 1e-5 {
                        0.0
                    } else {
                        m0 / m1
                    }
                } else {
                    m0
                };
                (metric, ratio)
            }
            PropertyKind::Occlusion {
                double_sided,
                random_rays,
            } => {
                let target = &ctx.targets[self.targets[0]];
                let occluded = target.occlusion_ratio(
                    ctx.scene,
                    ctx.camera.position,
                    *double_sided,
                    *random_rays,
                    ctx.rng,
                );
                (occluded, 1.0)
            }
            PropertyKind::Orientation { mode } => {
                let target = &ctx.targets[self.targets[0]];
                let to_camera = ctx.camera.position - target.center();
                let metric = match mode {
                    OrientationMode::VerticalWorld => {
                        target.angle_with_axis(ctx.scene, TargetAxis::WorldUp, &to_camera)
                    }
                    OrientationMode::VerticalLocal => {
                        target.angle_with_axis(ctx.scene, TargetAxis::Up, &to_camera)
                    }
                    OrientationMode::HorizontalLocal => {
                        let frame = target.frame(ctx.scene);
                        let horizontal = to_camera - frame.up * to_camera.dot(&frame.up);
                        if horizontal.norm() < 1e-9 {
                            // Straight above or below: no horizontal bearing.
                            90.0
                        } else {
                            target.angle_with_axis(ctx.scene, TargetAxis::Forward, &horizontal)
                        }
                    }
                };
                (metric, 1.0)
            }
            PropertyKind::Framing { rect } => {
                let t0 = self.targets[0];
                ctx.ensure_rendered(t0);
                let ratio = ctx.scratch.targets[t0].on_screen_ratio;
                let framed = ctx.scratch.targets[t0].framing_ratio(rect);
                (framed, ratio)
            }
            PropertyKind::RelativePosition { placement } => {
                let (t0, t1) = (self.targets[0], self.targets[1]);
                ctx.ensure_rendered(t0);
                ctx.ensure_rendered(t1);
                let sa = &ctx.scratch.targets[t0];
                let sb = &ctx.scratch.targets[t1];
                let ratio = sa.on_screen_ratio * sb.on_screen_ratio;
                if sa.screen_area < 1e-5 || sb.screen_area < 1e-5 {
                    return (0.0, ratio);
                }
                (placement_fraction(*placement, &sa.screen_aabb, &sb.screen_aabb), ratio)
            }
            PropertyKind::TargetPosition { point } => {
                let t0 = self.targets[0];
                ctx.ensure_rendered(t0);
                let ratio = ctx.scratch.targets[t0].on_screen_ratio;
                let projected = ctx.camera.world_to_viewport(&ctx.targets[t0].center());
                let metric = if projected.z < 0.0 {
                    // Behind the camera: as far from any viewport point as
                    // the metric can meaningfully get.
                    2.0
                } else {
                    (Pt2::new(projected.x, projected.y) - *point).norm()
                };
                (metric, ratio)
            }
            PropertyKind::CameraOrientation { reference } => {
                (ctx.camera.rotation.angle_to(reference).to_degrees(), 1.0)
            }
            PropertyKind::CameraFov => (ctx.camera.vfov_deg, 1.0),
        }
    }
}

fn size_metric<S: SceneOracle + ?Sized>(
    ctx: &EvalContext<'_, S>,
    target: usize,
    mode: SizeMode,
) -> Real {
    let scratch = &ctx.scratch.targets[target];
    match mode {
        SizeMode::Area => scratch.screen_area,
        SizeMode::Width => scratch.screen_aabb.width(),
        SizeMode::Height => scratch.screen_aabb.height(),
    }
}

/// Fraction of `a`'s extent on the requested side of `b`.
///
/// 1 when `a` is entirely past `b`'s edge, 0 when entirely on the wrong
/// side, linear in between so the metric degrades smoothly as the boxes
/// start to overlap.
fn placement_fraction(placement: Placement, a: &Rect, b: &Rect) -> Real {
    let (span, past) = match placement {
        Placement::Left => (a.width(), b.min.x - a.min.x),
        Placement::Right => (a.width(), a.max.x - b.max.x),
        Placement::Above => (a.height(), a.max.y - b.max.y),
        Placement::Below => (a.height(), b.min.y - a.min.y),
    };
    if span < 1e-9 {
        return if past >= 0.0 { 1.0 } else { 0.0 };
    }
    (past / span).clamp(0.0, 1.0)
}
