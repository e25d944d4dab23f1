//! Analytic size-to-distance conversion.
//!
//! Treating the target as its bounding sphere, the distance at which it
//! covers a desired fraction of the screen has a closed form. Smart
//! viewpoint sampling uses this to turn a preferred on-screen size drawn
//! from a satisfaction spline into a camera distance, skipping any search
//! over the distance axis.

use crate::math::Real;

use super::Target;

/// Which on-screen measure a size refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// Fraction of the viewport area.
    #[default]
    Area,
    /// Fraction of the viewport width.
    Width,
    /// Fraction of the viewport height.
    Height,
}

/// Desired size converted to a projected half-height in viewport units.
pub(super) fn half_height_for_size(mode: SizeMode, size: Real, aspect: Real) -> Real {
    match mode {
        SizeMode::Height => size / 2.0,
        SizeMode::Width => size * aspect / 2.0,
        SizeMode::Area => (size * aspect / std::f64::consts::PI).sqrt(),
    }
}

impl Target {
    /// Camera distance at which this target covers `size` of the screen.
    ///
    /// `size` is a viewport fraction in the given `mode`; `vfov_deg` is
    /// the camera's full vertical field of view. Degenerate sizes are
    /// floored so the result stays finite.
    pub fn distance_for_size(
        &self,
        mode: SizeMode,
        size: Real,
        vfov_deg: Real,
        aspect: Real,
    ) -> Real {
        let projected_half = half_height_for_size(mode, size.max(0.0), aspect).max(1e-5);
        let half_world = self.radius() * 0.5 / projected_half;
        half_world / (vfov_deg.to_radians() / 2.0).tan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewCamera;
    use crate::math::{Aabb, Pt3};
    use crate::scene::synthetic::BoxScene;
    use crate::target::{TargetBuilder, TargetScratch};
    use rand::{rngs::StdRng, SeedableRng};

    fn cube_target() -> (BoxScene, Target) {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        let mut rng = StdRng::seed_from_u64(2);
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .build(&scene, &mut rng)
            .unwrap();
        (scene, target)
    }

    #[test]
    fn height_and_width_conversions() {
        assert!((half_height_for_size(SizeMode::Height, 0.5, 1.0) - 0.25).abs() < 1e-12);
        assert!((half_height_for_size(SizeMode::Width, 0.5, 2.0) - 0.5).abs() < 1e-12);
        let a = half_height_for_size(SizeMode::Area, 0.25, 1.0);
        assert!((a - (0.25 / std::f64::consts::PI).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn distance_shrinks_for_larger_sizes() {
        let (_, target) = cube_target();
        let near = target.distance_for_size(SizeMode::Area, 0.5, 60.0, 1.0);
        let far = target.distance_for_size(SizeMode::Area, 0.05, 60.0, 1.0);
        assert!(near < far);
    }

    #[test]
    fn computed_distance_yields_roughly_requested_area() {
        let (_, target) = cube_target();
        let want = 0.25;
        let d = target.distance_for_size(SizeMode::Area, want, 60.0, 1.0);
        let cam = ViewCamera::looking_at(Pt3::new(0.0, 0.0, d), Pt3::origin(), 0.0, 60.0, 1.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        // Sphere approximation of a cube silhouette: expect the right
        // ballpark, not the exact fraction.
        assert!(
            scratch.screen_area > want * 0.4 && scratch.screen_area < want * 2.0,
            "area {} for requested {}",
            scratch.screen_area,
            want
        );
    }

    #[test]
    fn degenerate_size_stays_finite() {
        let (_, target) = cube_target();
        let d = target.distance_for_size(SizeMode::Area, 0.0, 60.0, 1.0);
        assert!(d.is_finite());
        assert!(d > 0.0);
    }
}
