use hull_packer_core::error::HullPackerError;
use hull_packer_core::hull::{HullContext, build_hull, convex_hull};
use hull_packer_core::model::{Point, SpriteInput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const QUAD: [u32; 6] = [0, 1, 2, 0, 2, 3];

fn rect(w: f32, h: f32) -> [Point; 4] {
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

fn sprite<'a>(key: &'a str, vertices: &'a [Point], indices: &'a [u32]) -> SpriteInput<'a> {
    SpriteInput {
        key,
        vertices,
        indices,
        width: 0,
        height: 0,
    }
}

fn random_points(rng: &mut StdRng, n: usize) -> Vec<Point> {
    (0..n)
        .map(|_| Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect()
}

// Every point lies left of (or on) every edge of a counter-clockwise ring.
fn assert_contains(ring: &[Point], points: &[Point]) {
    for e in ring.windows(2) {
        let d = e[1] - e[0];
        for &p in points {
            let s = d.cross(p - e[0]);
            assert!(s >= -1e-3, "point {:?} outside edge {:?}->{:?} ({})", p, e[0], e[1], s);
        }
    }
}

fn sorted(points: &[Point]) -> Vec<(f32, f32)> {
    let mut v: Vec<(f32, f32)> = points.iter().map(|p| (p.x, p.y)).collect();
    v.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    v.dedup();
    v
}

#[test]
fn unit_square_hull() {
    let verts = rect(1.0, 1.0);
    let hull = build_hull(&sprite("sq", &verts, &QUAD), 0.0, &HullContext::new(7)).unwrap();
    assert_eq!(hull.len(), 5);
    assert_eq!(hull.points.first(), hull.points.last());
    assert_eq!(hull.width, 1.0);
    assert_eq!(hull.height, 1.0);
    assert!((hull.area - 1.0).abs() < 1e-6);
    assert_eq!(
        sorted(&hull.points),
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]
    );
}

#[test]
fn ring_is_closed_and_counter_clockwise() {
    let verts = [
        Point::new(3.0, 1.0),
        Point::new(9.0, 2.0),
        Point::new(11.0, 8.0),
        Point::new(5.0, 12.0),
        Point::new(1.0, 6.0),
        Point::new(6.0, 6.0),
    ];
    let ring = convex_hull(&verts, &HullContext::default()).unwrap();
    assert_eq!(ring.first(), ring.last());
    assert_eq!(ring.len(), 6);
    let signed: f32 = ring.windows(2).map(|e| e[0].cross(e[1])).sum();
    assert!(signed > 0.0, "expected counter-clockwise ring, got signed area {}", signed);
    assert!(!ring.contains(&Point::new(6.0, 6.0)));
}

#[test]
fn padding_grows_hull_radially() {
    let verts = rect(10.0, 10.0);
    let ctx = HullContext::new(1);
    let plain = build_hull(&sprite("a", &verts, &QUAD), 0.0, &ctx).unwrap();
    let padded = build_hull(&sprite("a", &verts, &QUAD), 1.0, &ctx).unwrap();
    assert_eq!(plain.width, 10.0);
    assert!(padded.width > 11.0 && padded.width < 12.0, "width {}", padded.width);
    assert!(padded.height > 11.0 && padded.height < 12.0);
    assert!(padded.area > plain.area);
    // Origin shifts by the extrusion at the corners.
    assert!(padded.origin.x < 0.0 && padded.origin.y < 0.0);
    for p in &padded.points {
        assert_eq!(p.x, p.x.floor());
        assert_eq!(p.y, p.y.floor());
        assert!(p.x >= 0.0 && p.y >= 0.0);
    }
}

#[test]
fn local_origin_is_bounding_box_min() {
    let verts: Vec<Point> = rect(4.0, 6.0)
        .iter()
        .map(|p| Point::new(p.x + 20.0, p.y + 30.0))
        .collect();
    let hull = build_hull(&sprite("off", &verts, &QUAD), 0.0, &HullContext::new(3)).unwrap();
    assert_eq!(hull.origin, Point::new(20.0, 30.0));
    let min_x = hull.points.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    let min_y = hull.points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    assert_eq!((min_x, min_y), (0.0, 0.0));
    assert_eq!(hull.to_page(Point::new(22.0, 33.0), 8, 16), Point::new(10.0, 19.0));
}

#[test]
fn random_hull_contains_inputs() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for round in 0..20 {
        let pts = random_points(&mut rng, 50 + round * 10);
        let ring = convex_hull(&pts, &HullContext::new(rng.r#gen())).unwrap();
        assert_contains(&ring, &pts);
    }
}

#[test]
fn hull_of_hull_is_same_hull() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let pts = random_points(&mut rng, 120);
        let ctx = HullContext::new(rng.r#gen());
        let ring = convex_hull(&pts, &ctx).unwrap();
        let again = convex_hull(&ring[..ring.len() - 1], &ctx).unwrap();
        assert_eq!(sorted(&ring), sorted(&again));
    }
}

#[test]
fn hull_does_not_depend_on_seed() {
    let verts = rect(16.0, 16.0);
    let a = build_hull(&sprite("s", &verts, &QUAD), 2.0, &HullContext::new(0)).unwrap();
    for seed in 1..32 {
        let b = build_hull(&sprite("s", &verts, &QUAD), 2.0, &HullContext::new(seed)).unwrap();
        assert_eq!(sorted(&a.points), sorted(&b.points));
        assert_eq!(a.area, b.area);
    }
}

#[test]
fn equal_distance_pivots_ignore_seed() {
    // Three points sit 20 from the base edge; the midpoint lies on the top edge.
    let verts = [
        Point::new(0.0, 0.0),
        Point::new(40.0, 0.0),
        Point::new(40.0, 20.0),
        Point::new(0.0, 20.0),
        Point::new(20.0, 20.0),
    ];
    let indices = [0, 1, 2, 0, 2, 3];
    let ring = convex_hull(&verts, &HullContext::default()).unwrap();
    assert_eq!(ring.len(), 5);
    assert!(!ring.contains(&Point::new(20.0, 20.0)));

    let a = build_hull(&sprite("r", &verts, &indices), 8.0, &HullContext::new(0)).unwrap();
    assert_eq!(a.len(), 5);
    assert_eq!(sorted(&a.points).len(), 4);
    for seed in 1..64 {
        let b = build_hull(&sprite("r", &verts, &indices), 8.0, &HullContext::new(seed)).unwrap();
        assert_eq!(a.points, b.points, "seed {}", seed);
        assert_eq!((a.width, a.height, a.area), (b.width, b.height, b.area));
    }
}

#[test]
fn collinear_input_is_degenerate() {
    let verts = [
        Point::new(0.0, 0.0),
        Point::new(5.0, 5.0),
        Point::new(10.0, 10.0),
    ];
    assert!(convex_hull(&verts, &HullContext::default()).is_none());
    let err = build_hull(&sprite("line", &verts, &[0, 1, 2]), 1.0, &HullContext::default())
        .unwrap_err();
    match err {
        HullPackerError::DegenerateHull { key, points } => {
            assert_eq!(key, "line");
            assert!(points < 3);
        }
        other => panic!("Expected DegenerateHull, got {:?}", other),
    }
}

#[test]
fn empty_and_single_point_inputs() {
    assert!(convex_hull(&[], &HullContext::default()).is_none());
    assert!(convex_hull(&[Point::new(1.0, 1.0)], &HullContext::default()).is_none());
    let dup = [Point::new(2.0, 2.0); 4];
    assert!(convex_hull(&dup, &HullContext::default()).is_none());
}
