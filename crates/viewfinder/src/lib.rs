//! High-level entry crate for the `viewfinder-rs` toolbox.
//!
//! `viewfinder-rs` computes virtual-camera viewpoints: given scene
//! targets and a set of declarative *visual properties* (how big each
//! target should be on screen, from which side it should be seen, how
//! unoccluded it must stay, ...), it searches a bounded camera parameter
//! space with a particle swarm and returns the best viewpoint found
//! within a wall-clock budget.
//!
//! ## Config API
//!
//! Describe the problem as plain data and run one call:
//!
//! ```ignore
//! use viewfinder::pipeline::{run_viewpoint_search, ProblemConfig, SearchConfig};
//!
//! let report = run_viewpoint_search(&scene, &problem_config, &search_config)?;
//! println!("best satisfaction: {}", report.best_satisfaction);
//! ```
//!
//! ## Imperative API
//!
//! Build the pieces yourself for custom workflows (warm starts, seeded
//! candidates, per-frame re-solves):
//!
//! ```ignore
//! use std::time::Duration;
//! use viewfinder::prelude::*;
//!
//! let target = TargetBuilder::new("hero", vec![hero_id])
//!     .occluders(vec![hero_id])
//!     .build(&scene, &mut rng)?;
//! let size = Property::new(
//!     "hero size",
//!     PropertyKind::Size { mode: SizeMode::Area },
//!     vec![0],
//!     SatSpline::new(vec![0.0, 0.25, 1.0], vec![0.0, 1.0, 0.0])?,
//! )?;
//! let objective = Objective::sorted_by_cost(vec![size], vec![1.0])?;
//! let mut rig = CameraRig::new(domain, objective, vec![target], 16.0 / 9.0)?;
//!
//! let mut solver = PsoSolver::new(PsoOptions::default())?;
//! let request = SolveRequest::with_budget(Duration::from_millis(500), 0.95);
//! let viewpoint = solver.solve(&scene, &mut rig, &request);
//! ```
//!
//! ## Module Organization
//!
//! - **[`core`]**: geometry, projection, splines, the scene-oracle trait
//!   and targets
//! - **[`optim`]**: properties, objectives, domains, the camera rig and
//!   the PSO solver
//! - **[`pipeline`]**: serde configs, problem assembly and reports

/// Geometry, projection, splines, scene services and targets.
pub mod core {
    pub use viewfinder_core::*;
}

/// Deterministic synthetic scenes for tests and examples.
pub mod synthetic {
    pub use viewfinder_core::scene::synthetic::*;
}

/// Properties, objectives, domains, camera rig and PSO solver.
pub mod optim {
    pub use viewfinder_optim::*;
}

/// Config-driven search sessions and serializable reports.
pub mod pipeline {
    pub use viewfinder_pipeline::*;
}

// Re-exports for convenience
pub use viewfinder_core::{
    SatSpline, SceneOracle, SizeMode, Target, TargetBuilder, ViewCamera, VisibilityMethod,
};

pub use viewfinder_optim::{
    CameraRig, Domain, DomainKind, Eval, Objective, Property, PropertyKind, PsoOptions, PsoSolver,
    SolveRequest, Viewpoint,
};

pub use viewfinder_pipeline::{run_viewpoint_search, ProblemConfig, SearchConfig, SearchReport};

/// Convenient re-exports for common use cases.
pub mod prelude {
    pub use viewfinder_core::math::{Aabb, Pt2, Pt3, Real, Rect, Vec2, Vec3};
    pub use viewfinder_core::scene::{LayerMask, ObjectId, SceneOracle};
    pub use viewfinder_core::spline::SatSpline;
    pub use viewfinder_core::target::{SizeMode, Target, TargetBuilder, VisibilityMethod};
    pub use viewfinder_core::ViewCamera;

    pub use viewfinder_optim::props::{OrientationMode, Placement};
    pub use viewfinder_optim::{
        CameraRig, Domain, DomainKind, Eval, Objective, Property, PropertyKind, PsoOptions,
        PsoSolver, SolveRequest, Viewpoint,
    };

    pub use viewfinder_pipeline::{run_viewpoint_search, ProblemConfig, SearchConfig};
}
