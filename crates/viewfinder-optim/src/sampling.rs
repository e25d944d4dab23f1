//! Property-aware ("smart") viewpoint sampling.
//!
//! Uniform seeding wastes most candidates on hopeless regions: a size
//! preference alone already pins the useful camera distances to a narrow
//! band. Smart sampling inverts the declared preferences instead: draw a
//! preferred size from the size property's spline and convert it to a
//! distance analytically, draw viewing angles from the orientation
//! splines. Only when the domain keeps rejecting the proposals does it
//! fall back to uniform.
//!
//! Orbit domains sample uniformly: their parameterization already centers
//! on the pivot, and the look-at proposal logic does not transfer.

use rand::rngs::StdRng;
use rand::Rng;

use viewfinder_core::math::{Real, Vec3};
use viewfinder_core::scene::SceneOracle;
use viewfinder_core::spline::SatSpline;
use viewfinder_core::target::SizeMode;

use crate::domain::DomainKind;
use crate::props::{OrientationMode, PropertyKind};
use crate::rig::CameraRig;

/// Rejected proposals tolerated before giving up on a target.
const SMART_RETRIES: usize = 30;

impl CameraRig {
    /// Sample a viewpoint biased toward `target`'s declared preferences.
    ///
    /// Falls back to [`CameraRig::random_viewpoint`] after
    /// `SMART_RETRIES` out-of-domain proposals (counted in
    /// [`CameraRig::smart_fallbacks`]), for orbit domains, and when there
    /// is nothing to be smart about.
    pub fn smart_viewpoint<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        target: usize,
        rng: &mut StdRng,
    ) -> Vec<Real> {
        if !matches!(self.domain().kind, DomainKind::LookAt { .. }) || self.targets().is_empty() {
            return self.random_viewpoint(rng);
        }
        let target = target.min(self.targets().len() - 1);
        for _ in 0..SMART_RETRIES {
            let params = self.propose(scene, target, rng);
            if self.in_domain(scene, &params) {
                return params;
            }
        }
        self.smart_fallbacks += 1;
        log::debug!(
            "smart sampling for target '{}' exhausted {} retries, falling back to uniform",
            self.targets()[target].name(),
            SMART_RETRIES,
        );
        self.random_viewpoint(rng)
    }

    fn propose<S: SceneOracle + ?Sized>(
        &self,
        scene: &S,
        t: usize,
        rng: &mut StdRng,
    ) -> Vec<Real> {
        let (lo, hi) = self.bounds();
        let tgt = &self.targets()[t];
        let center = tgt.center();

        let fov = self
            .fov_spline()
            .map(|s| s.sample_x(rng))
            .unwrap_or_else(|| sample_dim(rng, lo[7], hi[7]))
            .clamp(lo[7], hi[7]);

        let distance = match self.size_spline(t) {
            Some((mode, spline)) => {
                let size = spline.sample_x(rng);
                tgt.distance_for_size(mode, size, fov, self.camera().aspect)
            }
            // No size preference: somewhere between a close-up and a
            // wide establishing distance.
            None => tgt.radius() * rng.random_range(1.5..6.0),
        };

        let frame = tgt.frame(scene);
        let (vertical_axis, vertical) = match self.orientation_spline(t, true) {
            Some((mode, spline)) => {
                let axis = if mode == OrientationMode::VerticalWorld {
                    Vec3::y()
                } else {
                    frame.up
                };
                (axis, spline.sample_x(rng).clamp(0.0, 180.0))
            }
            None => (Vec3::y(), rng.random_range(0.0..180.0)),
        };
        let horizontal = match self.orientation_spline(t, false) {
            Some((_, spline)) => spline.sample_x(rng).clamp(0.0, 180.0),
            None => rng.random_range(0.0..180.0),
        };
        // The horizontal angle is unsigned; pick a side at random.
        let side: Real = if rng.random_range(0..2) == 0 { 1.0 } else { -1.0 };

        let v = vertical.to_radians();
        let h = horizontal.to_radians();
        let dir = (frame.forward * h.cos() + frame.right * (h.sin() * side)) * v.sin()
            + vertical_axis * v.cos();
        let position = center + dir * distance;

        let look = match &self.domain().kind {
            DomainKind::LookAt { look_at, .. } => look_at.clamp_point(&center),
            DomainKind::Orbit { pivot, .. } => *pivot,
        };
        let roll = sample_dim(rng, lo[6], hi[6]);

        vec![
            position.x, position.y, position.z, look.x, look.y, look.z, roll, fov,
        ]
    }

    fn fov_spline(&self) -> Option<&SatSpline> {
        self.objective()
            .props()
            .iter()
            .find(|p| matches!(p.kind(), PropertyKind::CameraFov))
            .map(|p| p.spline())
    }

    fn size_spline(&self, t: usize) -> Option<(SizeMode, &SatSpline)> {
        self.props_of_target(t).iter().find_map(|&i| {
            let prop = &self.objective().props()[i];
            match prop.kind() {
                PropertyKind::Size { mode } if prop.targets().first() == Some(&t) => {
                    Some((*mode, prop.spline()))
                }
                _ => None,
            }
        })
    }

    fn orientation_spline(&self, t: usize, vertical: bool) -> Option<(OrientationMode, &SatSpline)> {
        self.props_of_target(t).iter().find_map(|&i| {
            let prop = &self.objective().props()[i];
            match prop.kind() {
                PropertyKind::Orientation { mode } => {
                    let is_vertical = *mode != OrientationMode::HorizontalLocal;
                    (is_vertical == vertical).then(|| (*mode, prop.spline()))
                }
                _ => None,
            }
        })
    }
}

fn sample_dim<R: Rng + ?Sized>(rng: &mut R, lo: Real, hi: Real) -> Real {
    if hi - lo < 1e-12 {
        lo
    } else {
        rng.random_range(lo..hi)
    }
}
