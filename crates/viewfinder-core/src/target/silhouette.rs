//! AABB silhouette rendering.
//!
//! The visible silhouette of a box from a given eye position depends only
//! on which of the 27 half-space regions the eye sits in. The region is a
//! 6-bit code (low/high per axis) indexing a table of ordered corner
//! indices; the resulting polygon is projected, clipped to the camera's
//! clip rectangle and measured. Corner numbering follows [`Aabb::vertex`].

use crate::camera::ViewCamera;
use crate::math::{clip_polygon, polygon_area, polygon_bounds, Aabb, Pt2, Pt3, Real, Rect};

use super::{Target, TargetScratch, DEGENERATE_AREA};

/// Up to six ordered corner indices per region; `len == 0` marks the
/// eye-inside region and the impossible bit combinations.
struct SilhouetteEntry {
    len: usize,
    verts: [u8; 6],
}

const fn entry(len: usize, verts: [u8; 6]) -> SilhouetteEntry {
    SilhouetteEntry { len, verts }
}

const NONE: SilhouetteEntry = entry(0, [0; 6]);

/// Region code -> ordered silhouette corners.
///
/// Bit 0/1: eye below min.x / above max.x; bits 2/3 the same for y;
/// bits 4/5 for z. Quad entries pad the last two slots with zeros.
#[rustfmt::skip]
static SILHOUETTE: [SilhouetteEntry; 43] = [
    NONE,                            //  0: inside
    entry(4, [0, 2, 6, 4, 0, 0]),    //  1: -x
    entry(4, [1, 3, 7, 5, 0, 0]),    //  2: +x
    NONE,                            //  3
    entry(4, [0, 1, 5, 4, 0, 0]),    //  4: -y
    entry(6, [0, 1, 5, 4, 6, 2]),    //  5: -x -y
    entry(6, [0, 1, 3, 7, 5, 4]),    //  6: +x -y
    NONE,                            //  7
    entry(4, [2, 3, 7, 6, 0, 0]),    //  8: +y
    entry(6, [0, 2, 3, 7, 6, 4]),    //  9: -x +y
    entry(6, [1, 3, 2, 6, 7, 5]),    // 10: +x +y
    NONE, NONE, NONE, NONE, NONE,    // 11-15
    entry(4, [0, 1, 3, 2, 0, 0]),    // 16: -z
    entry(6, [0, 1, 3, 2, 6, 4]),    // 17: -x -z
    entry(6, [0, 1, 5, 7, 3, 2]),    // 18: +x -z
    NONE,                            // 19
    entry(6, [4, 5, 1, 3, 2, 0]),    // 20: -y -z
    entry(6, [1, 3, 2, 6, 4, 5]),    // 21: -x -y -z
    entry(6, [0, 2, 3, 7, 5, 4]),    // 22: +x -y -z
    NONE,                            // 23
    entry(6, [0, 1, 3, 7, 6, 2]),    // 24: +y -z
    entry(6, [0, 1, 3, 7, 6, 4]),    // 25: -x +y -z
    entry(6, [0, 1, 5, 7, 6, 2]),    // 26: +x +y -z
    NONE, NONE, NONE, NONE, NONE,    // 27-31
    entry(4, [4, 5, 7, 6, 0, 0]),    // 32: +z
    entry(6, [0, 2, 6, 7, 5, 4]),    // 33: -x +z
    entry(6, [1, 3, 7, 6, 4, 5]),    // 34: +x +z
    NONE,                            // 35
    entry(6, [0, 1, 5, 7, 6, 4]),    // 36: -y +z
    entry(6, [0, 1, 5, 7, 6, 2]),    // 37: -x -y +z
    entry(6, [0, 1, 3, 7, 6, 4]),    // 38: +x -y +z
    NONE,                            // 39
    entry(6, [2, 3, 7, 5, 4, 6]),    // 40: +y +z
    entry(6, [0, 2, 3, 7, 5, 4]),    // 41: -x +y +z
    entry(6, [1, 3, 2, 6, 4, 5]),    // 42: +x +y +z
];

/// 6-bit region code of `eye` relative to the box half-spaces.
pub(super) fn region_code(aabb: &Aabb, eye: &Pt3) -> usize {
    let mut code = 0;
    if eye.x < aabb.min.x {
        code |= 1;
    } else if eye.x > aabb.max.x {
        code |= 2;
    }
    if eye.y < aabb.min.y {
        code |= 4;
    } else if eye.y > aabb.max.y {
        code |= 8;
    }
    if eye.z < aabb.min.z {
        code |= 16;
    } else if eye.z > aabb.max.z {
        code |= 32;
    }
    code
}

impl Target {
    /// Compute the target's on-screen silhouette for `camera`.
    ///
    /// Fills `scratch` with the clipped polygon, its bounds, the screen
    /// area (viewport fraction, capped at 1) and the on-screen ratio, and
    /// marks the scratch rendered so other properties referencing the same
    /// target reuse the result within one evaluation.
    pub fn render(&self, camera: &ViewCamera, scratch: &mut TargetScratch) {
        scratch.rendered = true;
        scratch.behind_camera = false;
        scratch.polygon.clear();
        scratch.raw.clear();
        scratch.screen_aabb = Rect::empty();
        scratch.screen_area = 0.0;
        scratch.on_screen_ratio = 0.0;

        let entry = &SILHOUETTE[region_code(&self.aabb, &camera.position)];
        if entry.len == 0 {
            // Eye inside the box: no silhouette.
            return;
        }

        for &vi in &entry.verts[..entry.len] {
            let p = camera.world_to_viewport(&self.aabb.vertex(vi as usize));
            if p.z < 0.0 {
                scratch.behind_camera = true;
            } else {
                scratch.raw.push(Pt2::new(p.x, p.y));
            }
        }

        let raw_area = polygon_area(&scratch.raw);
        let raw_bounds = polygon_bounds(&scratch.raw);
        let was_clipped = raw_bounds.map_or(true, |b| !camera.clip.contains_rect(&b));

        clip_polygon(&scratch.raw, &camera.clip, &mut scratch.polygon, &mut scratch.tmp);
        let clipped_area = if scratch.polygon.len() < 3 {
            0.0
        } else {
            polygon_area(&scratch.polygon)
        };

        scratch.screen_area = clipped_area.min(1.0);
        scratch.screen_aabb = polygon_bounds(&scratch.polygon).unwrap_or_else(Rect::empty);

        scratch.on_screen_ratio = if raw_area < DEGENERATE_AREA {
            0.0
        } else {
            let ratio = clipped_area / raw_area;
            if scratch.behind_camera && !was_clipped {
                // Projection of a partially-behind silhouette is not
                // trustworthy either way.
                0.5
            } else if ratio > 1.0 {
                if was_clipped {
                    0.0
                } else {
                    1.0
                }
            } else {
                ratio
            }
        };
    }
}

impl TargetScratch {
    /// Fraction of the rendered silhouette inside `rect`.
    ///
    /// Clips the already-clipped polygon a second time; a degenerate
    /// silhouette frames nothing.
    pub fn framing_ratio(&mut self, rect: &Rect) -> Real {
        if self.screen_area < DEGENERATE_AREA {
            return 0.0;
        }
        clip_polygon(&self.polygon, rect, &mut self.frame_buf, &mut self.tmp);
        let framed = if self.frame_buf.len() < 3 {
            0.0
        } else {
            polygon_area(&self.frame_buf)
        };
        (framed / self.screen_area).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::synthetic::BoxScene;
    use crate::target::TargetBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    fn cube_target(side: Real) -> (BoxScene, Target) {
        let mut scene = BoxScene::new();
        let id = scene.add_box(Aabb::cube(Pt3::origin(), side), 0);
        let mut rng = StdRng::seed_from_u64(1);
        let target = TargetBuilder::new("cube", vec![id])
            .occluders(vec![id])
            .build(&scene, &mut rng)
            .unwrap();
        (scene, target)
    }

    #[test]
    fn region_codes_cover_faces_edges_corners() {
        let b = Aabb::cube(Pt3::origin(), 2.0);
        assert_eq!(region_code(&b, &Pt3::origin()), 0);
        assert_eq!(region_code(&b, &Pt3::new(-5.0, 0.0, 0.0)), 1);
        assert_eq!(region_code(&b, &Pt3::new(5.0, 0.0, 0.0)), 2);
        assert_eq!(region_code(&b, &Pt3::new(0.0, -5.0, 0.0)), 4);
        assert_eq!(region_code(&b, &Pt3::new(0.0, 5.0, 0.0)), 8);
        assert_eq!(region_code(&b, &Pt3::new(0.0, 0.0, -5.0)), 16);
        assert_eq!(region_code(&b, &Pt3::new(0.0, 0.0, 5.0)), 32);
        assert_eq!(region_code(&b, &Pt3::new(5.0, 5.0, 5.0)), 42);
        assert_eq!(region_code(&b, &Pt3::new(-5.0, -5.0, -5.0)), 21);
    }

    #[test]
    fn every_valid_region_entry_is_a_simple_loop() {
        // Every populated entry must reference 4 or 6 distinct corners.
        for e in SILHOUETTE.iter().filter(|e| e.len > 0) {
            assert!(e.len == 4 || e.len == 6);
            let mut seen = [false; 8];
            for &v in &e.verts[..e.len] {
                assert!(!seen[v as usize], "corner repeated in entry");
                seen[v as usize] = true;
            }
        }
    }

    #[test]
    fn face_on_view_matches_analytic_area() {
        let (_, target) = cube_target(2.0);
        // Straight-on view: the silhouette is the front face, a 2 m square
        // at depth 9. Full width in viewport units is 2/(2*9*tan(30)).
        let cam = ViewCamera::looking_at(Pt3::new(0.0, 0.0, 10.0), Pt3::origin(), 0.0, 60.0, 1.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        let expected = (1.0 / (9.0 * 30.0_f64.to_radians().tan())).powi(2);
        assert!(
            (scratch.screen_area - expected).abs() < 1e-6,
            "area {} vs {}",
            scratch.screen_area,
            expected
        );
        assert!((scratch.on_screen_ratio - 1.0).abs() < 1e-9);
        assert_eq!(scratch.polygon.len(), 4);
    }

    #[test]
    fn corner_view_renders_hexagon() {
        let (_, target) = cube_target(2.0);
        let cam = ViewCamera::looking_at(Pt3::new(6.0, 6.0, 6.0), Pt3::origin(), 0.0, 60.0, 1.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        assert_eq!(scratch.polygon.len(), 6);
        assert!(scratch.screen_area > 0.0);
        assert!((scratch.on_screen_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eye_inside_box_renders_nothing() {
        let (_, target) = cube_target(4.0);
        let cam = ViewCamera::looking_at(Pt3::new(0.5, 0.0, 0.0), Pt3::new(5.0, 0.0, 0.0), 0.0, 60.0, 1.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        assert_eq!(scratch.screen_area, 0.0);
        assert_eq!(scratch.on_screen_ratio, 0.0);
        assert!(scratch.polygon.is_empty());
        assert!(scratch.rendered);
    }

    #[test]
    fn off_screen_box_has_zero_ratio() {
        let (_, target) = cube_target(2.0);
        // Looking away from the cube: silhouette projects behind/off screen.
        let mut cam = ViewCamera::looking_at(Pt3::new(0.0, 0.0, 10.0), Pt3::origin(), 0.0, 60.0, 1.0);
        cam.aim(Pt3::new(0.0, 0.0, 20.0), 0.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        assert_eq!(scratch.screen_area, 0.0);
    }

    #[test]
    fn partially_clipped_box_ratio_between_zero_and_one() {
        let (_, target) = cube_target(2.0);
        // Aim well above the cube so it hangs off the bottom of the frame.
        let cam = ViewCamera::looking_at(
            Pt3::new(0.0, 0.0, 6.0),
            Pt3::new(0.0, 2.5, 0.0),
            0.0,
            40.0,
            1.0,
        );
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        assert!(scratch.on_screen_ratio > 0.0);
        assert!(scratch.on_screen_ratio < 1.0);
        assert!(scratch.screen_aabb.min.y >= -1e-12);
    }

    #[test]
    fn framing_full_viewport_is_identity() {
        let (_, target) = cube_target(2.0);
        let cam = ViewCamera::looking_at(Pt3::new(0.0, 0.0, 8.0), Pt3::origin(), 0.0, 60.0, 1.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        assert!((scratch.framing_ratio(&Rect::unit()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn framing_disjoint_rect_is_zero() {
        let (_, target) = cube_target(2.0);
        let cam = ViewCamera::looking_at(Pt3::new(0.0, 0.0, 8.0), Pt3::origin(), 0.0, 60.0, 1.0);
        let mut scratch = TargetScratch::new();
        target.render(&cam, &mut scratch);
        let corner = Rect::new(Pt2::new(0.9, 0.9), Pt2::new(1.0, 1.0));
        assert_eq!(scratch.framing_ratio(&corner), 0.0);
    }

    #[test]
    fn silhouette_area_shrinks_with_distance() {
        let (_, target) = cube_target(2.0);
        let mut scratch = TargetScratch::new();
        let mut prev = Real::MAX;
        for d in [4.0, 6.0, 9.0, 14.0] {
            let cam =
                ViewCamera::looking_at(Pt3::new(0.0, 0.0, d), Pt3::origin(), 0.0, 60.0, 1.0);
            target.render(&cam, &mut scratch);
            assert!(scratch.screen_area < prev);
            prev = scratch.screen_area;
        }
    }
}
