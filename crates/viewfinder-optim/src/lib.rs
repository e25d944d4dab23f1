//! Visual-property objectives and stochastic viewpoint search.
//!
//! This crate turns declarative shot descriptions into an optimization
//! problem and solves it:
//!
//! 1. **Properties** ([`props`]) measure one visual criterion each (size,
//!    occlusion, orientation, framing, ...) and map the raw measurement
//!    through a satisfaction spline.
//! 2. **The objective** ([`objective`]) is a weighted, normalized sum of
//!    properties with lazy upper-bound pruning: once a partial sum cannot
//!    beat the threshold it stops evaluating the expensive tail.
//! 3. **The domain** ([`domain`]) bounds the camera parameter space and
//!    rejects candidates too close to scene geometry.
//! 4. **The rig** ([`rig`]) binds flat parameter vectors to camera poses
//!    and owns targets, objective and per-evaluation scratch.
//! 5. **The solver** ([`pso`]) runs particle-swarm search over the domain
//!    within a wall-clock budget, seeded partly by property-aware
//!    sampling ([`rig::CameraRig::smart_viewpoint`]).
//!
//! Geometry primitives come from `viewfinder-core`; a serde-friendly
//! front end lives in `viewfinder-pipeline`.

pub mod domain;
pub mod objective;
pub mod props;
pub mod pso;
pub mod rig;
mod sampling;
mod scratch;
pub mod viewpoint;

pub use domain::{Domain, DomainKind};
pub use objective::{Eval, Objective};
pub use props::{OrientationMode, Placement, Property, PropertyKind};
pub use pso::{ExitCondition, PsoOptions, PsoSolver, SolveRequest, SolveStats};
pub use rig::CameraRig;
pub use scratch::{EvalContext, PropScratch, ScratchContext};
pub use viewpoint::Viewpoint;
