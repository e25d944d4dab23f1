//! Config-driven viewpoint search.
//!
//! This crate is the data-in, data-out front end over `viewfinder-optim`:
//! describe targets, properties, domain and budget as plain serde types
//! ([`ProblemConfig`], [`SearchConfig`]), then call
//! [`run_viewpoint_search`] against any [`SceneOracle`] and get a
//! serializable [`SearchReport`] back. Properties are ordered by
//! evaluation cost during assembly so the evaluator's lazy pruning works
//! as intended.

mod config;

pub use config::{
    BoxConfig, ClearanceConfig, DomainConfig, PlacementConfig, ProblemConfig, PropertyConfig,
    PropertyKindConfig, PsoConfig, RectConfig, SearchConfig, SizeModeConfig, SplineConfig,
    TargetConfig, VisibilityMethodConfig,
};

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use viewfinder_core::math::{Pt2, Real};
use viewfinder_core::scene::{LayerMask, SceneOracle};
use viewfinder_core::spline::SatSpline;
use viewfinder_core::target::TargetBuilder;
use viewfinder_optim::domain::DomainKind;
use viewfinder_optim::props::PropertyKind;
use viewfinder_optim::{
    CameraRig, Domain, ExitCondition, Objective, Property, PsoSolver, SolveRequest,
};

/// Outcome of a config-driven search, ready for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Raw domain parameters of the best viewpoint (the sentinel pose
    /// when nothing valid was found).
    pub params: Vec<Real>,
    /// Aggregated satisfaction; `-1` when the search found nothing.
    pub best_satisfaction: Real,
    /// Property names in evaluation (cost) order.
    pub property_names: Vec<String>,
    /// Per-property satisfactions, aligned with `property_names`.
    pub satisfactions: Vec<Real>,
    /// Per-property in-screen ratios, aligned with `property_names`.
    pub in_screen_ratios: Vec<Real>,
    pub iterations: usize,
    pub evaluations: u64,
    pub smart_fallbacks: u64,
    pub elapsed_ms: u64,
    pub exit: ExitReason,
}

/// Serializable mirror of [`ExitCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    TimeOut,
    Satisfied,
    IterationCap,
}

impl From<ExitCondition> for ExitReason {
    fn from(e: ExitCondition) -> Self {
        match e {
            ExitCondition::TimeOut => ExitReason::TimeOut,
            ExitCondition::Satisfied => ExitReason::Satisfied,
            ExitCondition::IterationCap => ExitReason::IterationCap,
        }
    }
}

fn build_domain(config: &ProblemConfig) -> Domain {
    let kind = match &config.domain {
        DomainConfig::LookAt {
            position,
            look_at,
            roll_deg,
            vfov_deg,
        } => DomainKind::LookAt {
            position: position.to_aabb(),
            look_at: look_at.to_aabb(),
            roll_deg: *roll_deg,
            vfov_deg: *vfov_deg,
        },
        DomainConfig::Orbit {
            pivot,
            distance,
            theta_deg,
            phi_deg,
            roll_deg,
            vfov_deg,
        } => DomainKind::Orbit {
            pivot: viewfinder_core::math::Pt3::new(pivot[0], pivot[1], pivot[2]),
            distance: *distance,
            theta_deg: *theta_deg,
            phi_deg: *phi_deg,
            roll_deg: *roll_deg,
            vfov_deg: *vfov_deg,
        },
    };
    let mut domain = Domain::new(kind);
    if let Some(clearance) = &config.clearance {
        let mut mask = LayerMask::ALL;
        for &layer in &clearance.exclude_layers {
            mask = mask.without(layer);
        }
        domain = domain.with_clearance(clearance.min_clearance, mask);
    }
    domain
}

fn build_property(
    config: &PropertyConfig,
    target_indices: &HashMap<&str, usize>,
) -> Result<Property> {
    let mut targets = Vec::with_capacity(config.targets.len());
    for name in &config.targets {
        match target_indices.get(name.as_str()) {
            Some(&idx) => targets.push(idx),
            None => bail!("property '{}' references unknown target '{}'", config.name, name),
        }
    }
    let spline = SatSpline::new(config.spline.xs.clone(), config.spline.ys.clone())
        .with_context(|| format!("satisfaction spline of property '{}'", config.name))?;
    let kind = match &config.kind {
        PropertyKindConfig::Size { mode } => PropertyKind::Size {
            mode: mode.to_mode(),
        },
        PropertyKindConfig::Occlusion {
            double_sided,
            random_rays,
        } => PropertyKind::Occlusion {
            double_sided: *double_sided,
            random_rays: *random_rays,
        },
        PropertyKindConfig::Orientation { mode } => PropertyKind::Orientation {
            mode: mode.to_mode(),
        },
        PropertyKindConfig::Framing { rect } => PropertyKind::Framing {
            rect: rect.to_rect(),
        },
        PropertyKindConfig::RelativePosition { placement } => PropertyKind::RelativePosition {
            placement: placement.to_placement(),
        },
        PropertyKindConfig::TargetPosition { point } => PropertyKind::TargetPosition {
            point: Pt2::new(point[0], point[1]),
        },
        PropertyKindConfig::CameraOrientation { reference } => PropertyKind::CameraOrientation {
            reference: PropertyKindConfig::reference_rotation(reference),
        },
        PropertyKindConfig::CameraFov => PropertyKind::CameraFov,
    };
    let mut property = Property::new(config.name.clone(), kind, targets, spline)?;
    if let Some(cost) = config.cost {
        property = property.with_cost(cost);
    }
    Ok(property)
}

/// Assemble a solvable problem from configuration.
///
/// Target names are resolved to indices, satisfaction splines are
/// validated, properties are sorted cheapest-first and the initial
/// target bounds are resolved against `scene`.
pub fn build_problem<S: SceneOracle + ?Sized>(
    scene: &S,
    config: &ProblemConfig,
) -> Result<(CameraRig, PsoSolver)> {
    if config.targets.is_empty() {
        bail!("problem needs at least one target");
    }
    if config.properties.is_empty() {
        bail!("problem needs at least one property");
    }

    let pso_options = viewfinder_optim::PsoOptions::default();
    let mut rng = StdRng::seed_from_u64(pso_options.seed);

    let mut target_indices = HashMap::new();
    let mut targets = Vec::with_capacity(config.targets.len());
    for (i, tc) in config.targets.iter().enumerate() {
        if target_indices.insert(tc.name.as_str(), i).is_some() {
            bail!("duplicate target name '{}'", tc.name);
        }
        let mut builder = TargetBuilder::new(tc.name.clone(), tc.size_sources.clone())
            .occluders(tc.occluders.clone());
        if let Some(frame) = tc.frame_object {
            builder = builder.frame_object(frame);
        }
        if let Some(n_rays) = tc.n_rays {
            builder = builder.n_rays(n_rays);
        }
        if let Some(max_points) = tc.max_points {
            builder = builder.max_points(max_points);
        }
        if let Some(method) = tc.visibility_method {
            builder = builder.visibility_method(method.to_method());
        }
        targets.push(
            builder
                .build(scene, &mut rng)
                .with_context(|| format!("building target '{}'", tc.name))?,
        );
    }

    let mut props = Vec::with_capacity(config.properties.len());
    let mut weights = Vec::with_capacity(config.properties.len());
    for pc in &config.properties {
        props.push(build_property(pc, &target_indices)?);
        weights.push(pc.weight);
    }
    let objective = Objective::sorted_by_cost(props, weights)?;

    let domain = build_domain(config);
    let rig = CameraRig::new(domain, objective, targets, config.viewport_aspect)?;
    let solver = PsoSolver::new(pso_options)?;
    Ok((rig, solver))
}

/// Build the problem, run one solve, and package the outcome.
pub fn run_viewpoint_search<S: SceneOracle + ?Sized>(
    scene: &S,
    problem: &ProblemConfig,
    search: &SearchConfig,
) -> Result<SearchReport> {
    let (mut rig, _) = build_problem(scene, problem)?;
    let mut solver = PsoSolver::new(search.pso.to_options())?;

    let request = SolveRequest::with_budget(
        Duration::from_millis(search.time_limit_ms),
        search.sat_threshold,
    );
    let viewpoint = solver.solve(scene, &mut rig, &request);
    let stats = solver.last_stats();

    let property_names = rig
        .objective()
        .props()
        .iter()
        .map(|p| p.name().to_string())
        .collect();

    log::debug!(
        "viewpoint search: best {:.4} in {} iterations",
        stats.best_satisfaction,
        stats.iterations
    );

    Ok(SearchReport {
        params: viewpoint.params.clone(),
        best_satisfaction: viewpoint.objective(),
        property_names,
        satisfactions: viewpoint.satisfactions.get(1..).unwrap_or(&[]).to_vec(),
        in_screen_ratios: viewpoint.in_screen_ratios.get(1..).unwrap_or(&[]).to_vec(),
        iterations: stats.iterations,
        evaluations: stats.evaluations,
        smart_fallbacks: stats.smart_fallbacks,
        elapsed_ms: stats.elapsed.as_millis() as u64,
        exit: stats.exit.into(),
    })
}
