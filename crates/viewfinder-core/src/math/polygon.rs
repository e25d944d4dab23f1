//! Viewport rectangles and 2D polygon operations.
//!
//! Everything here works in viewport coordinates, where the full screen is
//! the unit square and areas are fractions of the screen.

use super::{Pt2, Real};

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Pt2,
    pub max: Pt2,
}

impl Rect {
    pub fn new(a: Pt2, b: Pt2) -> Self {
        Self {
            min: Pt2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Pt2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The full viewport `[0,1] x [0,1]`.
    pub fn unit() -> Self {
        Self {
            min: Pt2::new(0.0, 0.0),
            max: Pt2::new(1.0, 1.0),
        }
    }

    /// Empty rectangle at the origin.
    pub fn empty() -> Self {
        Self {
            min: Pt2::origin(),
            max: Pt2::origin(),
        }
    }

    pub fn width(&self) -> Real {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Real {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> Real {
        self.width() * self.height()
    }

    pub fn center(&self) -> Pt2 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn contains(&self, p: &Pt2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::empty()
    }
}

/// Absolute area of a simple polygon (shoelace formula).
pub fn polygon_area(poly: &[Pt2]) -> Real {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in poly.iter().enumerate() {
        let b = &poly[(i + 1) % poly.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice.abs() / 2.0
}

/// Axis-aligned bounds of a polygon; `None` when empty.
pub fn polygon_bounds(poly: &[Pt2]) -> Option<Rect> {
    let first = poly.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &poly[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Rect { min, max })
}

#[derive(Clone, Copy)]
enum ClipEdge {
    Left(Real),
    Right(Real),
    Bottom(Real),
    Top(Real),
}

impl ClipEdge {
    fn inside(&self, p: &Pt2) -> bool {
        match *self {
            ClipEdge::Left(x) => p.x >= x,
            ClipEdge::Right(x) => p.x <= x,
            ClipEdge::Bottom(y) => p.y >= y,
            ClipEdge::Top(y) => p.y <= y,
        }
    }

    fn intersect(&self, a: &Pt2, b: &Pt2) -> Pt2 {
        match *self {
            ClipEdge::Left(x) | ClipEdge::Right(x) => {
                let t = (x - a.x) / (b.x - a.x);
                Pt2::new(x, a.y + t * (b.y - a.y))
            }
            ClipEdge::Bottom(y) | ClipEdge::Top(y) => {
                let t = (y - a.y) / (b.y - a.y);
                Pt2::new(a.x + t * (b.x - a.x), y)
            }
        }
    }
}

/// Sutherland-Hodgman clip of `input` against `rect`.
///
/// The result lands in `out`; `tmp` is a scratch buffer so repeated clips
/// allocate nothing once the buffers have grown. A polygon clipped away
/// entirely leaves `out` empty.
pub fn clip_polygon(input: &[Pt2], rect: &Rect, out: &mut Vec<Pt2>, tmp: &mut Vec<Pt2>) {
    out.clear();
    out.extend_from_slice(input);
    let edges = [
        ClipEdge::Left(rect.min.x),
        ClipEdge::Right(rect.max.x),
        ClipEdge::Bottom(rect.min.y),
        ClipEdge::Top(rect.max.y),
    ];
    for edge in edges {
        tmp.clear();
        std::mem::swap(out, tmp);
        if tmp.is_empty() {
            return;
        }
        for (i, cur) in tmp.iter().enumerate() {
            let prev = &tmp[(i + tmp.len() - 1) % tmp.len()];
            let cur_in = edge.inside(cur);
            let prev_in = edge.inside(prev);
            if cur_in {
                if !prev_in {
                    out.push(edge.intersect(prev, cur));
                }
                out.push(*cur);
            } else if prev_in {
                out.push(edge.intersect(prev, cur));
            }
        }
    }
}
