//! The bounded camera parameter space.

use anyhow::{ensure, Result};
use rand::Rng;

use viewfinder_core::math::{Aabb, Pt3, Real, Vec3};
use viewfinder_core::scene::{LayerMask, SceneOracle};

/// Parameterization of the search space.
#[derive(Debug, Clone)]
pub enum DomainKind {
    /// Free camera: `[px, py, pz, lx, ly, lz, roll, fov]`.
    LookAt {
        position: Aabb,
        look_at: Aabb,
        roll_deg: (Real, Real),
        vfov_deg: (Real, Real),
    },
    /// Camera on a sphere around a pivot, always aimed at it:
    /// `[distance, theta, phi, roll, fov]` with `theta` the azimuth
    /// around world up and `phi` the polar angle from world up.
    Orbit {
        pivot: Pt3,
        distance: (Real, Real),
        theta_deg: (Real, Real),
        phi_deg: (Real, Real),
        roll_deg: (Real, Real),
        vfov_deg: (Real, Real),
    },
}

/// Bounded domain plus an optional clearance requirement: a candidate
/// position closer than `min_clearance` to geometry on the masked layers
/// is rejected.
#[derive(Debug, Clone)]
pub struct Domain {
    pub kind: DomainKind,
    pub min_clearance: Real,
    pub clearance_mask: LayerMask,
}

impl Domain {
    /// A look-at domain with fixed roll 0 and fixed 60 degree fov.
    pub fn look_at(position: Aabb, look_at: Aabb) -> Self {
        Self::new(DomainKind::LookAt {
            position,
            look_at,
            roll_deg: (0.0, 0.0),
            vfov_deg: (60.0, 60.0),
        })
    }

    pub fn new(kind: DomainKind) -> Self {
        Self {
            kind,
            min_clearance: 0.0,
            clearance_mask: LayerMask::ALL,
        }
    }

    #[must_use]
    pub fn with_clearance(mut self, min_clearance: Real, mask: LayerMask) -> Self {
        self.min_clearance = min_clearance;
        self.clearance_mask = mask;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.bounds();
        for (j, (l, h)) in lo.iter().zip(&hi).enumerate() {
            ensure!(l <= h, "domain dimension {} has inverted range", j);
        }
        ensure!(self.min_clearance >= 0.0, "clearance must be non-negative");
        Ok(())
    }

    /// Number of parameters a full vector carries.
    pub fn dims(&self) -> usize {
        match self.kind {
            DomainKind::LookAt { .. } => 8,
            DomainKind::Orbit { .. } => 5,
        }
    }

    /// Per-dimension lower and upper bounds.
    pub fn bounds(&self) -> (Vec<Real>, Vec<Real>) {
        match &self.kind {
            DomainKind::LookAt {
                position,
                look_at,
                roll_deg,
                vfov_deg,
            } => (
                vec![
                    position.min.x,
                    position.min.y,
                    position.min.z,
                    look_at.min.x,
                    look_at.min.y,
                    look_at.min.z,
                    roll_deg.0,
                    vfov_deg.0,
                ],
                vec![
                    position.max.x,
                    position.max.y,
                    position.max.z,
                    look_at.max.x,
                    look_at.max.y,
                    look_at.max.z,
                    roll_deg.1,
                    vfov_deg.1,
                ],
            ),
            DomainKind::Orbit {
                distance,
                theta_deg,
                phi_deg,
                roll_deg,
                vfov_deg,
                ..
            } => (
                vec![distance.0, theta_deg.0, phi_deg.0, roll_deg.0, vfov_deg.0],
                vec![distance.1, theta_deg.1, phi_deg.1, roll_deg.1, vfov_deg.1],
            ),
        }
    }

    /// World position encoded by a parameter vector.
    pub fn position_of(&self, params: &[Real]) -> Pt3 {
        match &self.kind {
            DomainKind::LookAt { .. } => Pt3::new(params[0], params[1], params[2]),
            DomainKind::Orbit { pivot, .. } => {
                orbit_position(*pivot, params[0], params[1], params[2])
            }
        }
    }

    /// Whether `params` lies inside the domain.
    ///
    /// Range checks run in declaration order and only for the dimensions
    /// present: a look-at prefix of 3 skips the look-at point, roll and
    /// fov checks. The clearance test runs last because it is the only
    /// one that touches the scene. This runs once per candidate
    /// evaluation and allocates nothing.
    pub fn contains<S: SceneOracle + ?Sized>(&self, scene: &S, params: &[Real]) -> bool {
        if params.len() < 3 {
            return false;
        }
        let in_ranges = match &self.kind {
            DomainKind::LookAt {
                position,
                look_at,
                roll_deg,
                vfov_deg,
            } => {
                point_in_box(position, &params[0..3])
                    && (params.len() < 6 || point_in_box(look_at, &params[3..6]))
                    && (params.len() < 7 || value_in_range(*roll_deg, params[6]))
                    && (params.len() < 8 || value_in_range(*vfov_deg, params[7]))
            }
            DomainKind::Orbit {
                distance,
                theta_deg,
                phi_deg,
                roll_deg,
                vfov_deg,
                ..
            } => {
                let ranges = [*distance, *theta_deg, *phi_deg, *roll_deg, *vfov_deg];
                params
                    .iter()
                    .zip(ranges.iter())
                    .all(|(&p, &r)| value_in_range(r, p))
            }
        };
        if !in_ranges {
            return false;
        }
        if self.min_clearance > 0.0 {
            let position = self.position_of(params);
            if scene.sphere_overlap(position, self.min_clearance, self.clearance_mask) {
                return false;
            }
        }
        true
    }

    /// Uniform-independent sample of a full parameter vector.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Real> {
        let (lo, hi) = self.bounds();
        lo.iter()
            .zip(&hi)
            .map(|(&l, &h)| {
                if h - l < 1e-12 {
                    l
                } else {
                    rng.random_range(l..h)
                }
            })
            .collect()
    }
}

fn point_in_box(aabb: &Aabb, xyz: &[Real]) -> bool {
    xyz[0] >= aabb.min.x
        && xyz[0] <= aabb.max.x
        && xyz[1] >= aabb.min.y
        && xyz[1] <= aabb.max.y
        && xyz[2] >= aabb.min.z
        && xyz[2] <= aabb.max.z
}

fn value_in_range((lo, hi): (Real, Real), v: Real) -> bool {
    v >= lo && v <= hi
}

/// Spherical-coordinate position: `theta` azimuth around world up,
/// `phi` polar angle from world up, both in degrees.
pub fn orbit_position(pivot: Pt3, distance: Real, theta_deg: Real, phi_deg: Real) -> Pt3 {
    let theta = theta_deg.to_radians();
    let phi = phi_deg.to_radians();
    pivot
        + Vec3::new(
            phi.sin() * theta.cos(),
            phi.cos(),
            phi.sin() * theta.sin(),
        ) * distance
}
