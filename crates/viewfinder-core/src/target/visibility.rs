//! Visibility-point generation.
//!
//! Visibility points are the ray destinations occlusion measurement casts
//! toward. They are precomputed once per bounds update; the per-evaluation
//! cost is then just the casts themselves.

use rand::Rng;

use crate::math::{fibonacci_sphere, Aabb, Pt3, Real, Vec3};
use crate::scene::{LayerMask, ObjectId, SceneOracle};

/// Strategy for placing visibility points inside a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityMethod {
    /// Uniform random points in the AABB, seeded from collider centers
    /// when the target has at least as many colliders as points.
    #[default]
    Random,
    /// Fixed symmetric patterns (up to 9 points) anchored to the AABB
    /// extents; larger counts fall back to [`VisibilityMethod::Random`].
    UniformInBb,
    /// Points on the target's own collider surfaces, found by casting
    /// inward from a Fibonacci lattice around the bounding sphere.
    OnMesh,
}

pub(super) fn generate_random<S, R>(
    scene: &S,
    aabb: &Aabb,
    occluders: &[ObjectId],
    max_points: usize,
    rng: &mut R,
) -> Vec<Pt3>
where
    S: SceneOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut points = Vec::with_capacity(max_points);
    if occluders.len() >= max_points {
        for &id in occluders.iter().take(max_points) {
            if let Some(b) = scene.world_aabb(id) {
                points.push(b.center());
            }
        }
    }
    while points.len() < max_points {
        points.push(aabb.sample_inside(rng));
    }
    points
}

/// Structured patterns keyed on the requested count.
///
/// Offsets sit at the 25% and 75% marks of the AABB extents, taken along
/// the axes sorted by extent (longest first) so elongated targets get
/// their points spread along the long direction first. Returns `None`
/// for counts the pattern set does not cover.
pub(super) fn generate_structured(aabb: &Aabb, max_points: usize) -> Option<Vec<Pt3>> {
    if max_points == 0 || max_points > 9 {
        return None;
    }
    let c = aabb.center();
    let he = aabb.half_extents();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| he[b].partial_cmp(&he[a]).unwrap_or(std::cmp::Ordering::Equal));
    let offset = |axis: usize| -> Vec3 {
        let mut v = Vec3::zeros();
        v[axis] = he[axis] / 2.0;
        v
    };
    let q0 = offset(order[0]);
    let q1 = offset(order[1]);
    let q2 = offset(order[2]);

    let mut points = Vec::with_capacity(max_points);
    match max_points {
        1 => points.push(c),
        2 => points.extend([c - q0, c + q0]),
        3 => points.extend([c, c - q0, c + q0]),
        4 => points.extend([c - q0 - q1, c - q0 + q1, c + q0 - q1, c + q0 + q1]),
        5 => {
            points.push(c);
            points.extend([c - q0 - q1, c - q0 + q1, c + q0 - q1, c + q0 + q1]);
        }
        6 => {
            points.extend([c - q0 - q1, c - q0 + q1, c + q0 - q1, c + q0 + q1]);
            points.extend([c - q2, c + q2]);
        }
        7 => {
            points.push(c);
            points.extend([c - q0 - q1, c - q0 + q1, c + q0 - q1, c + q0 + q1]);
            points.extend([c - q2, c + q2]);
        }
        8 => {
            for i in 0..8 {
                let sx = if i & 1 != 0 { 1.0 } else { -1.0 };
                let sy = if i & 2 != 0 { 1.0 } else { -1.0 };
                let sz = if i & 4 != 0 { 1.0 } else { -1.0 };
                points.push(c + q0 * sx + q1 * sy + q2 * sz);
            }
        }
        9 => {
            points.push(c);
            for i in 0..8 {
                let sx = if i & 1 != 0 { 1.0 } else { -1.0 };
                let sy = if i & 2 != 0 { 1.0 } else { -1.0 };
                let sz = if i & 4 != 0 { 1.0 } else { -1.0 };
                points.push(c + q0 * sx + q1 * sy + q2 * sz);
            }
        }
        _ => unreachable!(),
    }
    Some(points)
}

pub(super) fn generate_on_mesh<S>(
    scene: &S,
    aabb: &Aabb,
    radius: Real,
    occluders: &[ObjectId],
    max_points: usize,
) -> Vec<Pt3>
where
    S: SceneOracle + ?Sized,
{
    if occluders.is_empty() || max_points == 0 {
        return Vec::new();
    }
    let center = aabb.center();
    let start_radius = radius * 1.05 + 1e-3;
    let n_dirs = (max_points * 4).max(16);
    let mut points = Vec::with_capacity(max_points);
    for dir in fibonacci_sphere(n_dirs) {
        let start = center + dir * start_radius;
        if let Some(hit) = scene.linecast(start, center, LayerMask::ALL) {
            if occluders.contains(&hit.object) {
                points.push(hit.point);
                if points.len() == max_points {
                    break;
                }
            }
        }
    }
    points
}
