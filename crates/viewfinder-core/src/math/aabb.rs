use rand::Rng;

use super::{Pt3, Real, Vec3};

/// Axis-aligned bounding box in world space.
///
/// Corners are numbered with bit 0 selecting the x extreme, bit 1 the y
/// extreme and bit 2 the z extreme (bit set picks the maximum). The
/// silhouette lookup in `target` depends on this numbering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Pt3,
    pub max: Pt3,
}

impl Aabb {
    /// Box from two opposite corners, normalized component-wise.
    pub fn new(a: Pt3, b: Pt3) -> Self {
        Self {
            min: Pt3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Pt3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Cube of the given side length centered at `center`.
    pub fn cube(center: Pt3, side: Real) -> Self {
        let h = Vec3::repeat(side.abs() / 2.0);
        Self::new(center - h, center + h)
    }

    /// Smallest box containing all points; `None` on an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Pt3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb = aabb.expanded_to(p);
        }
        Some(aabb)
    }

    /// Smallest box containing `self` and `p`.
    pub fn expanded_to(&self, p: Pt3) -> Self {
        Self {
            min: Pt3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Pt3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Self {
        self.expanded_to(other.min).expanded_to(other.max)
    }

    pub fn center(&self) -> Pt3 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) / 2.0
    }

    /// Radius of the bounding sphere: half the main diagonal.
    pub fn half_diagonal(&self) -> Real {
        (self.max - self.min).norm() / 2.0
    }

    /// Corner `i` in `0..8` with the numbering documented on the type.
    pub fn vertex(&self, i: usize) -> Pt3 {
        debug_assert!(i < 8);
        Pt3::new(
            if i & 1 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    pub fn contains(&self, p: &Pt3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Box grown by `margin` on every side (negative shrinks).
    pub fn grown(&self, margin: Real) -> Self {
        let m = Vec3::repeat(margin);
        Self::new(self.min - m, self.max + m)
    }

    /// Uniform random point inside the box.
    pub fn sample_inside<R: Rng + ?Sized>(&self, rng: &mut R) -> Pt3 {
        Pt3::new(
            sample_range(rng, self.min.x, self.max.x),
            sample_range(rng, self.min.y, self.max.y),
            sample_range(rng, self.min.z, self.max.z),
        )
    }

    /// Point on the surface closest to `p` (or `p` itself when inside).
    pub fn clamp_point(&self, p: &Pt3) -> Pt3 {
        Pt3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }
}

fn sample_range<R: Rng + ?Sized>(rng: &mut R, lo: Real, hi: Real) -> Real {
    if hi - lo < 1e-12 {
        lo
    } else {
        rng.random_range(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn corners_are_normalized() {
        let b = Aabb::new(Pt3::new(1.0, -2.0, 3.0), Pt3::new(-1.0, 2.0, -3.0));
        assert_eq!(b.min, Pt3::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Pt3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn vertex_numbering_matches_bit_convention() {
        let b = Aabb::new(Pt3::new(0.0, 0.0, 0.0), Pt3::new(1.0, 2.0, 3.0));
        assert_eq!(b.vertex(0), Pt3::new(0.0, 0.0, 0.0));
        assert_eq!(b.vertex(1), Pt3::new(1.0, 0.0, 0.0));
        assert_eq!(b.vertex(2), Pt3::new(0.0, 2.0, 0.0));
        assert_eq!(b.vertex(7), Pt3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn half_diagonal_of_unit_cube() {
        let b = Aabb::cube(Pt3::origin(), 1.0);
        assert!((b.half_diagonal() - 3.0_f64.sqrt() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn sampled_points_stay_inside() {
        let b = Aabb::new(Pt3::new(-2.0, 0.0, 1.0), Pt3::new(3.0, 4.0, 9.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(b.contains(&b.sample_inside(&mut rng)));
        }
    }

    #[test]
    fn degenerate_extent_samples_at_bound() {
        let b = Aabb::new(Pt3::new(0.0, 1.0, 2.0), Pt3::new(5.0, 1.0, 2.0));
        let mut rng = StdRng::seed_from_u64(7);
        let p = b.sample_inside(&mut rng);
        assert_eq!(p.y, 1.0);
        assert_eq!(p.z, 2.0);
    }
}
