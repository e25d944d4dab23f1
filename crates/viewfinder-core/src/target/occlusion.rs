//! Occlusion measurement.

use rand::Rng;

use crate::math::{Pt3, Real};
use crate::scene::{LayerGuard, LayerMask, SceneOracle, IGNORE_LAYER};

use super::Target;

impl Target {
    /// Fraction of this target's visibility points hidden from `from`.
    ///
    /// The target's own colliders are parked on [`IGNORE_LAYER`] for the
    /// duration of the casts so the target cannot occlude itself; the
    /// guard restores their layers on every exit path. With `resample`
    /// the destinations are drawn from the precomputed points with
    /// replacement, otherwise the first `n_rays` points are used in
    /// order. `double_sided` also casts the reverse ray and counts a
    /// point occluded when either direction is blocked, which matters
    /// against one-sided geometry in real engines.
    pub fn occlusion_ratio<S, R>(
        &self,
        scene: &S,
        from: Pt3,
        double_sided: bool,
        resample: bool,
        rng: &mut R,
    ) -> Real
    where
        S: SceneOracle + ?Sized,
        R: Rng + ?Sized,
    {
        let points = self.visibility_points();
        if points.is_empty() {
            return 0.0;
        }
        let n = self.n_rays().min(points.len()).max(1);

        let _guard = LayerGuard::park(scene, self.occluders(), IGNORE_LAYER);
        let mask = LayerMask::ALL.without(IGNORE_LAYER);

        let mut occluded = 0usize;
        for k in 0..n {
            let dest = if resample {
                points[rng.random_range(0..points.len())]
            } else {
                points[k]
            };
            let blocked = scene.linecast(from, dest, mask).is_some()
                || (double_sided && scene.linecast(dest, from, mask).is_some());
            if blocked {
                occluded += 1;
            }
        }
        (occluded as Real / n as Real).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Aabb;
    use crate::scene::synthetic::BoxScene;
    use crate::target::{TargetBuilder, VisibilityMethod};
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn unobstructed_target_is_fully_visible() {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        let mut rng = rng();
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .visibility_method(VisibilityMethod::UniformInBb)
            .build(&scene, &mut rng)
            .unwrap();
        let ratio = target.occlusion_ratio(&scene, Pt3::new(0.0, 0.0, -6.0), false, false, &mut rng);
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn wall_between_camera_and_target_occludes_fully() {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        // Wide wall at z = -3.
        let _wall = scene.add_box(
            Aabb::new(Pt3::new(-10.0, -10.0, -3.2), Pt3::new(10.0, 10.0, -2.8)),
            0,
        );
        let mut rng = rng();
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .visibility_method(VisibilityMethod::UniformInBb)
            .build(&scene, &mut rng)
            .unwrap();
        let ratio = target.occlusion_ratio(&scene, Pt3::new(0.0, 0.0, -8.0), false, false, &mut rng);
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn own_colliders_do_not_self_occlude() {
        let mut scene = BoxScene::new();
        // Two-part target: rays toward the far part cross the near part.
        let near = scene.add_box(Aabb::cube(Pt3::new(0.0, 0.0, -1.5), 1.0), 0);
        let far = scene.add_box(Aabb::cube(Pt3::new(0.0, 0.0, 1.5), 1.0), 0);
        let mut rng = rng();
        let target = TargetBuilder::new("pair", vec![near, far])
            .occluders(vec![near, far])
            .visibility_method(VisibilityMethod::UniformInBb)
            .build(&scene, &mut rng)
            .unwrap();
        let ratio = target.occlusion_ratio(&scene, Pt3::new(0.0, 0.0, -8.0), false, false, &mut rng);
        assert_eq!(ratio, 0.0);
        // Layers restored after the guarded casts.
        assert_eq!(scene.object_layer(near), 0);
        assert_eq!(scene.object_layer(far), 0);
    }

    #[test]
    fn partial_wall_occludes_partially() {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        // Wall covering only the lower half of the target.
        let _wall = scene.add_box(
            Aabb::new(Pt3::new(-10.0, -10.0, -3.2), Pt3::new(10.0, 0.0, -2.8)),
            0,
        );
        let mut rng = rng();
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .visibility_method(VisibilityMethod::UniformInBb)
            .max_points(9)
            .n_rays(9)
            .build(&scene, &mut rng)
            .unwrap();
        let ratio = target.occlusion_ratio(&scene, Pt3::new(0.0, 0.0, -8.0), false, false, &mut rng);
        assert!(ratio > 0.0);
        assert!(ratio < 1.0);
    }

    #[test]
    fn double_sided_counts_reverse_blockage() {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);
        let mut rng = rng();
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .visibility_method(VisibilityMethod::UniformInBb)
            .build(&scene, &mut rng)
            .unwrap();
        // Symmetric box scenes block both directions equally, so the
        // double-sided measure agrees with the single-sided one.
        let single =
            target.occlusion_ratio(&scene, Pt3::new(0.0, 0.0, -6.0), false, false, &mut rng);
        let double =
            target.occlusion_ratio(&scene, Pt3::new(0.0, 0.0, -6.0), true, false, &mut rng);
        assert_eq!(single, double);
    }
}
