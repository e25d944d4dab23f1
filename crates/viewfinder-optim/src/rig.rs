//! The camera rig: parameter vectors bound to camera poses.
//!
//! A [`CameraRig`] owns everything one viewpoint problem needs (domain,
//! objective, targets, the working camera and the per-evaluation
//! scratch) and is what the solver drives: `update` binds a parameter
//! vector to a pose, `evaluate` scores it.

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::Rng;

use viewfinder_core::math::{Pt3, Real};
use viewfinder_core::scene::SceneOracle;
use viewfinder_core::target::Target;
use viewfinder_core::ViewCamera;

use crate::domain::{Domain, DomainKind};
use crate::objective::{Eval, Objective};
use crate::scratch::{EvalContext, ScratchContext};
use crate::viewpoint::Viewpoint;

#[derive(Debug)]
pub struct CameraRig {
    domain: Domain,
    objective: Objective,
    targets: Vec<Target>,
    camera: ViewCamera,
    scratch: ScratchContext,
    /// Property indices referencing each target; smart sampling reads
    /// this to find a target's size and orientation preferences.
    props_by_target: Vec<Vec<usize>>,
    pub(crate) smart_fallbacks: u64,
}

impl CameraRig {
    pub fn new(
        domain: Domain,
        objective: Objective,
        targets: Vec<Target>,
        aspect: Real,
    ) -> Result<Self> {
        domain.validate()?;
        ensure!(aspect > 0.0, "aspect ratio must be positive");
        for prop in objective.props() {
            for &t in prop.targets() {
                ensure!(
                    t < targets.len(),
                    "property '{}' references target {} but only {} exist",
                    prop.name(),
                    t,
                    targets.len()
                );
            }
        }

        let mut props_by_target = vec![Vec::new(); targets.len()];
        for (i, prop) in objective.props().iter().enumerate() {
            for &t in prop.targets() {
                props_by_target[t].push(i);
            }
        }

        let (fov_lo, fov_hi) = fov_range(&domain);
        let camera = ViewCamera::new(Pt3::origin(), (fov_lo + fov_hi) / 2.0, aspect);
        let scratch = ScratchContext::new(targets.len(), objective.len());
        Ok(Self {
            domain,
            objective,
            targets,
            camera,
            scratch,
            props_by_target,
            smart_fallbacks: 0,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    pub(crate) fn props_of_target(&self, target: usize) -> &[usize] {
        &self.props_by_target[target]
    }

    pub fn dims(&self) -> usize {
        self.domain.dims()
    }

    pub fn bounds(&self) -> (Vec<Real>, Vec<Real>) {
        self.domain.bounds()
    }

    /// Total property evaluations so far (across camera evaluations);
    /// lazy pruning shows up as this growing slower than
    /// `evaluations * properties`.
    pub fn prop_evaluations(&self) -> u64 {
        self.scratch.prop_evaluations
    }

    pub fn reset_prop_evaluations(&mut self) {
        self.scratch.prop_evaluations = 0;
    }

    /// How often smart sampling gave up and fell back to uniform.
    pub fn smart_fallbacks(&self) -> u64 {
        self.smart_fallbacks
    }

    /// Bind a parameter vector to the physical camera.
    ///
    /// Look-at vectors are accepted down to a 3-long prefix (position
    /// only, orientation untouched); roll defaults to 0 and the field of
    /// view keeps its previous value when absent.
    pub fn update(&mut self, params: &[Real]) {
        match &self.domain.kind {
            DomainKind::LookAt { .. } => {
                debug_assert!(params.len() >= 3);
                self.camera.position = Pt3::new(params[0], params[1], params[2]);
                if params.len() >= 8 {
                    self.camera.vfov_deg = params[7];
                }
                if params.len() >= 6 {
                    let look_at = Pt3::new(params[3], params[4], params[5]);
                    let roll = params.get(6).copied().unwrap_or(0.0);
                    self.camera.aim(look_at, roll);
                }
            }
            DomainKind::Orbit { pivot, .. } => {
                debug_assert!(params.len() >= 3);
                let pivot = *pivot;
                self.camera.position = self.domain.position_of(params);
                if params.len() >= 5 {
                    self.camera.vfov_deg = params[4];
                }
                let roll = params.get(3).copied().unwrap_or(0.0);
                self.camera.aim(pivot, roll);
            }
        }
    }

    /// Score the currently bound camera.
    pub fn evaluate<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        lazy_threshold: Real,
        rng: &mut StdRng,
    ) -> Eval {
        self.scratch.reset();
        let mut ctx = EvalContext {
            scene,
            camera: &self.camera,
            targets: &self.targets,
            scratch: &mut self.scratch,
            rng,
        };
        self.objective.evaluate(&mut ctx, lazy_threshold)
    }

    /// Bind and score in one call.
    pub fn evaluate_params<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        params: &[Real],
        lazy_threshold: Real,
        rng: &mut StdRng,
    ) -> Eval {
        self.update(params);
        self.evaluate(scene, lazy_threshold, rng)
    }

    pub fn in_domain<S: SceneOracle + ?Sized>(&self, scene: &S, params: &[Real]) -> bool {
        self.domain.contains(scene, params)
    }

    pub fn random_viewpoint<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Real> {
        self.domain.sample(rng)
    }

    /// Refresh every target's bounds and visibility points.
    pub fn refresh_targets<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        rng: &mut StdRng,
    ) -> Result<()> {
        for target in &mut self.targets {
            target.update_bounds(scene, rng)?;
        }
        Ok(())
    }

    /// Full un-pruned evaluation of `params`, packaged for consumers.
    pub fn snapshot<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        params: &[Real],
        rng: &mut StdRng,
    ) -> Viewpoint {
        let eval = self.evaluate_params(scene, params, Real::NEG_INFINITY, rng);
        let n = self.objective.len();
        let mut satisfactions = Vec::with_capacity(n + 1);
        let mut in_screen_ratios = Vec::with_capacity(n + 1);
        satisfactions.push(eval.score());
        in_screen_ratios.push(self.scratch.combined_in_screen);
        for slot in &self.scratch.props {
            satisfactions.push(slot.satisfaction);
            in_screen_ratios.push(slot.in_screen_ratio);
        }
        Viewpoint {
            params: params.to_vec(),
            satisfactions,
            in_screen_ratios,
        }
    }
}

fn fov_range(domain: &Domain) -> (Real, Real) {
    match &domain.kind {
        DomainKind::LookAt { vfov_deg, .. } | DomainKind::Orbit { vfov_deg, .. } => *vfov_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{Property, PropertyKind};
    use rand::SeedableRng;
    use viewfinder_core::math::Aabb;
    use viewfinder_core::scene::synthetic::BoxScene;
    use viewfinder_core::spline::SatSpline;
    use viewfinder_core::target::{SizeMode, TargetBuilder};

    fn cube_problem() -> (BoxScene, CameraRig) {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        let mut rng = StdRng::seed_from_u64(1);
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .build(&scene, &mut rng)
            .unwrap();
        let size = Property::new(
            "cube size",
            PropertyKind::Size { mode: SizeMode::Area },
            vec![0],
            SatSpline::new(
                vec![0.0, 0.002, 0.1, 0.4, 0.5, 1.0],
                vec![0.0, 0.1, 0.8, 1.0, 0.1, 0.0],
            )
            .unwrap(),
        )
        .unwrap();
        let objective = Objective::new(vec![size], vec![1.0]).unwrap();
        let ten = Aabb::new(Pt3::new(-10.0, -10.0, -10.0), Pt3::new(10.0, 10.0, 10.0));
        let domain = Domain::look_at(ten, ten);
        let rig = CameraRig::new(domain, objective, vec![target], 1.0).unwrap();
        (scene, rig)
    }

    #[test]
    fn rejects_dangling_target_references() {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        let mut rng = StdRng::seed_from_u64(1);
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .build(&scene, &mut rng)
            .unwrap();
        let size = Property::new(
            "size",
            PropertyKind::Size { mode: SizeMode::Area },
            vec![3],
            SatSpline::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap(),
        )
        .unwrap();
        let objective = Objective::new(vec![size], vec![1.0]).unwrap();
        let ten = Aabb::new(Pt3::new(-10.0, -10.0, -10.0), Pt3::new(10.0, 10.0, 10.0));
        let err = CameraRig::new(Domain::look_at(ten, ten), objective, vec![target], 1.0);
        assert!(err.is_err());
    }

    #[test]
    fn update_binds_full_lookat_vector() {
        let (_, mut rig) = cube_problem();
        rig.update(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 45.0]);
        assert_eq!(rig.camera().position, Pt3::new(1.0, 2.0, 3.0));
        assert_eq!(rig.camera().vfov_deg, 45.0);
        let expected = (Pt3::origin() - Pt3::new(1.0, 2.0, 3.0)).normalize();
        assert!((rig.camera().forward() - expected).norm() < 1e-9);
    }

    #[test]
    fn update_accepts_position_only_prefix() {
        let (_, mut rig) = cube_problem();
        let fov_before = rig.camera().vfov_deg;
        let rot_before = rig.camera().rotation;
        rig.update(&[4.0, 0.0, 0.0]);
        assert_eq!(rig.camera().position, Pt3::new(4.0, 0.0, 0.0));
        assert_eq!(rig.camera().vfov_deg, fov_before);
        assert_eq!(rig.camera().rotation, rot_before);
    }

    #[test]
    fn known_good_view_scores_high() {
        // Camera five meters back, straight on: the silhouette is the
        // front face and lands in the high-satisfaction band.
        let (scene, mut rig) = cube_problem();
        let mut rng = StdRng::seed_from_u64(2);
        let eval = rig.evaluate_params(
            &scene,
            &[0.0, 0.0, -5.0, 0.0, 0.0, 0.0, 0.0, 60.0],
            Real::NEG_INFINITY,
            &mut rng,
        );
        let v = eval.value().expect("valid evaluation");
        assert!((0.7..=1.0).contains(&v), "satisfaction {}", v);
    }

    #[test]
    fn snapshot_lists_objective_then_properties() {
        let (scene, mut rig) = cube_problem();
        let mut rng = StdRng::seed_from_u64(2);
        let vp = rig.snapshot(&scene, &[0.0, 0.0, -5.0, 0.0, 0.0, 0.0, 0.0, 60.0], &mut rng);
        assert!(vp.is_valid());
        assert_eq!(vp.satisfactions.len(), 2);
        // Single property: aggregate equals the property value.
        assert!((vp.satisfactions[0] - vp.satisfactions[1]).abs() < 1e-12);
        assert!((vp.in_screen_ratios[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orbit_update_aims_at_pivot() {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::new(0.0, 1.0, 0.0), 2.0), 0);
        let mut rng = StdRng::seed_from_u64(1);
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .build(&scene, &mut rng)
            .unwrap();
        let size = Property::new(
            "size",
            PropertyKind::Size { mode: SizeMode::Area },
            vec![0],
            SatSpline::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap(),
        )
        .unwrap();
        let objective = Objective::new(vec![size], vec![1.0]).unwrap();
        let pivot = Pt3::new(0.0, 1.0, 0.0);
        let domain = Domain::new(DomainKind::Orbit {
            pivot,
            distance: (2.0, 8.0),
            theta_deg: (0.0, 360.0),
            phi_deg: (10.0, 170.0),
            roll_deg: (0.0, 0.0),
            vfov_deg: (60.0, 60.0),
        });
        let mut rig = CameraRig::new(domain, objective, vec![target], 1.0).unwrap();
        rig.update(&[5.0, 30.0, 90.0, 0.0, 60.0]);
        let cam = rig.camera();
        assert!(((cam.position - pivot).norm() - 5.0).abs() < 1e-9);
        let dir = (pivot - cam.position).normalize();
        assert!((cam.forward() - dir).norm() < 1e-9);
    }
}
