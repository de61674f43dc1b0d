use crate::hull::ConvexPolygon;
use crate::model::Point;
use crate::page::AtlasPage;

// True when every point lies on the non-negative side of the axis through `origin`
// with normal `normal`, with at least one strictly positive.
fn all_on_positive_side(points: &[Point], origin: Point, normal: Point) -> bool {
    let mut pos = 0usize;
    let mut neg = 0usize;
    for &q in points {
        let dt = normal.dot(q - origin);
        if dt > 0.0 {
            pos += 1;
        } else if dt < 0.0 {
            neg += 1;
        }
        if pos != 0 && neg != 0 {
            return false;
        }
    }
    pos > 0
}

fn separated_by_edges_of(edges: &[Point], other: &[Point]) -> bool {
    let n = edges.len();
    (0..n).any(|i| {
        let j = if i == 0 { n - 1 } else { i - 1 };
        let p = edges[i];
        let d = edges[i] - edges[j];
        all_on_positive_side(other, p, Point::new(d.y, -d.x))
    })
}

/// Separating-axis test for two closed counter-clockwise convex rings.
///
/// Returns false as soon as an edge normal of either polygon separates them.
/// Polygons that only touch along an edge or at a vertex do not collide.
pub fn polygons_collide(a: &[Point], b: &[Point]) -> bool {
    !(separated_by_edges_of(a, b) || separated_by_edges_of(b, a))
}

/// Decides whether `candidate` anchored at `(x, y)` would collide with anything on `page`
/// (or leave its active rectangle).
///
/// `scratch` receives the translated candidate ring; callers running shards in parallel
/// give each shard its own buffer.
pub fn overlaps(
    candidate: &ConvexPolygon,
    x: i32,
    y: i32,
    page: &AtlasPage,
    granularity: u32,
    scratch: &mut Vec<Point>,
) -> bool {
    if page.is_empty() {
        return false;
    }

    let (fx, fy) = (x as f32, y as f32);

    // Not enough free area below the furthest corner to fit this shape there.
    let corner = page.corner();
    if candidate.area * granularity as f32 > corner.free && fx < corner.x && fy < corner.y {
        return true;
    }

    let (w, h) = (page.width() as f32, page.height() as f32);
    if candidate.width + fx > w || candidate.height + fy > h {
        return true;
    }

    scratch.clear();
    for p in &candidate.points {
        let t = Point::new(p.x + fx, p.y + fy);
        if t.x >= w || t.y >= h {
            return true;
        }
        scratch.push(t);
    }

    page.polygons().any(|placed| polygons_collide(placed, scratch))
}
