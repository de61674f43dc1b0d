//! Quickhull-style convex hull generation with radial padding.
//!
//! The padded hull is what the packer places: vertices are pushed away from the
//! centroid by a fixed radius, the result is moved to a local origin and snapped
//! to integer coordinates.

use crate::error::{HullPackerError, Result};
use crate::model::{Point, SpriteInput};
use tracing::trace;

const EPSILON: f32 = 0.00001;

/// Per-sprite state threaded through hull generation.
///
/// Pivot ties always go to the first candidate in input order, so the seed never
/// changes the hull. It only tags the `trace!` event emitted per hull, which keeps
/// parallel hull batches attributable in logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HullContext {
    pub seed: u32,
}

impl HullContext {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

/// Padded convex hull of one sprite in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    /// Closed counter-clockwise ring (first point repeated last), integer-valued,
    /// with the bounding box's min corner at (0, 0).
    pub points: Vec<Point>,
    /// Bounding extents of the padded hull before snapping.
    pub width: f32,
    pub height: f32,
    /// Fan area around the centroid.
    pub area: f32,
    /// Sprite-space position that maps to the local origin.
    pub origin: Point,
}

impl ConvexPolygon {
    /// Number of stored points, closing point included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maps a sprite-space point onto a page for a hull anchored at `(x, y)`.
    pub fn to_page(&self, p: Point, x: i32, y: i32) -> Point {
        Point::new(p.x - self.origin.x + x as f32, p.y - self.origin.y + y as f32)
    }
}

// Distance from `pq` to the segment `p0..p1`.
fn distance_point_to_segment(pq: Point, p0: Point, p1: Point) -> f32 {
    let v = p1 - p0;
    let w = pq - p0;
    let a = w.dot(v);
    if a <= 0.0 {
        return (p0 - pq).length();
    }
    let b = v.dot(v);
    if b <= a {
        return (p1 - pq).length();
    }
    let p = p0 + v * (a / b);
    (p - pq).length()
}

fn sign(p1: Point, p2: Point, p3: Point) -> f32 {
    (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
}

// Inclusive of the boundary.
fn point_in_triangle(pt: Point, v1: Point, v2: Point, v3: Point) -> bool {
    let d1 = sign(pt, v1, v2);
    let d2 = sign(pt, v2, v3);
    let d3 = sign(pt, v3, v1);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Positive when `p` lies on the clockwise side of the directed line `l -> r`.
#[inline]
fn side(l: Point, r: Point, p: Point) -> f32 {
    (r - l).cross(r - p)
}

// Ties keep the earliest point.
fn expand(out: &mut Vec<Point>, input: &[Point], l: Point, r: Point) {
    let mut pivot: Option<Point> = None;
    let mut best = EPSILON;
    for &p in input {
        let d = distance_point_to_segment(p, l, r);
        if d > best {
            best = d;
            pivot = Some(p);
        }
    }
    let Some(pt) = pivot else {
        return;
    };
    out.push(pt);

    let outside: Vec<Point> = input
        .iter()
        .copied()
        .filter(|&p| !point_in_triangle(p, l, pt, r))
        .collect();

    let left: Vec<Point> = outside
        .iter()
        .copied()
        .filter(|&p| side(l, pt, p) > 0.0)
        .collect();
    if !left.is_empty() {
        expand(out, &left, l, pt);
    }

    let right: Vec<Point> = outside
        .iter()
        .copied()
        .filter(|&p| side(pt, r, p) > 0.0)
        .collect();
    if !right.is_empty() {
        expand(out, &right, pt, r);
    }
}

/// Unordered hull vertices: the two x extremes first, then every discovered pivot.
fn hull_vertices(points: &[Point], ctx: &HullContext) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut left = first;
    let mut right = first;
    for &v in points {
        if v.x < left.x {
            left = v;
        }
        if v.x > right.x {
            right = v;
        }
    }

    let mut found = vec![left, right];
    let mut cw = Vec::new();
    let mut ccw = Vec::new();
    for &v in points {
        let s = side(left, right, v);
        if s > 0.0 {
            cw.push(v);
        } else if s < 0.0 {
            ccw.push(v);
        }
    }
    if !cw.is_empty() {
        expand(&mut found, &cw, left, right);
    }
    if !ccw.is_empty() {
        expand(&mut found, &ccw, right, left);
    }
    trace!(seed = ctx.seed, input = points.len(), found = found.len(), "hull vertices");
    found
}

/// Computes the unpadded convex hull of `points` as a closed counter-clockwise ring
/// (y-up), starting and ending at the leftmost point.
///
/// Returns `None` when fewer than three hull points exist (empty, single point or collinear input).
pub fn convex_hull(points: &[Point], ctx: &HullContext) -> Option<Vec<Point>> {
    let found = hull_vertices(points, ctx);
    if found.len() < 3 {
        return None;
    }
    Some(order_ring(&found))
}

fn order_ring(found: &[Point]) -> Vec<Point> {
    let left = found[0];
    let right = found[1];
    let axis = right - left;

    let mut tagged: Vec<(Point, f32)> = found
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let z = if i > 1 { axis.cross(right - p) } else { 0.0 };
            (p, z)
        })
        .collect();
    // Stable, so the extremes keep their place among equal x.
    tagged.sort_by(|a, b| a.0.x.total_cmp(&b.0.x));

    let mut ring = Vec::with_capacity(found.len() + 1);
    ring.push(left);
    ring.extend(tagged.iter().filter(|t| t.1 > 0.0).map(|t| t.0));
    ring.push(right);
    ring.extend(tagged.iter().rev().filter(|t| t.1 < 0.0).map(|t| t.0));
    ring.push(left);
    ring
}

fn triangle_area(a: Point, b: Point, c: Point) -> f32 {
    (a - b).cross(a - c).abs() * 0.5
}

/// Builds the padded, origin-aligned hull that placement works with.
///
/// Each hull vertex `v` becomes `c + normalize(v - c) * (|v - c| + padding)` where `c` is the
/// mean of the hull vertices. This radial offset is what all placement geometry is built on.
pub fn build_hull(sprite: &SpriteInput<'_>, padding: f32, ctx: &HullContext) -> Result<ConvexPolygon> {
    let found = hull_vertices(sprite.vertices, ctx);
    if found.len() < 3 {
        return Err(HullPackerError::DegenerateHull {
            key: sprite.key.to_string(),
            points: found.len(),
        });
    }
    let mut ring = order_ring(&found);

    let distinct = ring.len() - 1;
    let sum = ring[..distinct]
        .iter()
        .fold(Point::ZERO, |acc, &p| acc + p);
    let center = sum / distinct as f32;

    let mut min = Point::new(f32::MAX, f32::MAX);
    let mut max = Point::new(f32::MIN, f32::MIN);
    for p in ring.iter_mut() {
        let d = *p - center;
        let len = d.length();
        if len > 0.0 {
            *p = center + d * ((len + padding) / len);
        }
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }

    let local_center = center - min;
    for p in ring.iter_mut() {
        *p = Point::new((p.x - min.x).floor(), (p.y - min.y).floor());
    }
    let area = ring
        .windows(2)
        .map(|w| triangle_area(w[1], local_center, w[0]))
        .sum();

    Ok(ConvexPolygon {
        points: ring,
        width: max.x - min.x,
        height: max.y - min.y,
        area,
        origin: min,
    })
}
