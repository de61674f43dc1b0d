use hull_packer_core::config::PackingConfig;
use hull_packer_core::hull::{ConvexPolygon, HullContext, build_hull};
use hull_packer_core::model::{Point, SpriteInput};
use hull_packer_core::overlap::{overlaps, polygons_collide};
use hull_packer_core::page::AtlasPage;

fn ring(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
        Point::new(x0, y0),
    ]
}

fn square_hull(size: f32) -> ConvexPolygon {
    let verts = [
        Point::new(0.0, 0.0),
        Point::new(size, 0.0),
        Point::new(size, size),
        Point::new(0.0, size),
    ];
    let sprite = SpriteInput {
        key: "sq",
        vertices: &verts,
        indices: &[0, 1, 2, 0, 2, 3],
        width: size as u32,
        height: size as u32,
    };
    build_hull(&sprite, 0.0, &HullContext::default()).unwrap()
}

fn cfg() -> PackingConfig {
    PackingConfig::builder().padding(0).max_texture_size(64).build()
}

#[test]
fn overlapping_squares_collide() {
    assert!(polygons_collide(&ring(0.0, 0.0, 2.0, 2.0), &ring(1.0, 1.0, 3.0, 3.0)));
    // Containment is an overlap too.
    assert!(polygons_collide(&ring(0.0, 0.0, 10.0, 10.0), &ring(2.0, 2.0, 3.0, 3.0)));
}

#[test]
fn touching_squares_do_not_collide() {
    assert!(!polygons_collide(&ring(0.0, 0.0, 1.0, 1.0), &ring(1.0, 0.0, 2.0, 1.0)));
    assert!(!polygons_collide(&ring(0.0, 0.0, 1.0, 1.0), &ring(0.0, 1.0, 1.0, 2.0)));
    // Corner contact.
    assert!(!polygons_collide(&ring(0.0, 0.0, 1.0, 1.0), &ring(1.0, 1.0, 2.0, 2.0)));
}

#[test]
fn separated_squares_do_not_collide() {
    assert!(!polygons_collide(&ring(0.0, 0.0, 1.0, 1.0), &ring(5.0, 5.0, 6.0, 6.0)));
}

#[test]
fn diagonal_gap_is_found_by_triangle_edge() {
    let tri = vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
        Point::new(0.0, 0.0),
    ];
    // Bounding boxes overlap, shapes do not.
    assert!(!polygons_collide(&tri, &ring(3.0, 3.0, 5.0, 5.0)));
    assert!(polygons_collide(&tri, &ring(1.0, 1.0, 3.0, 3.0)));
}

#[test]
fn empty_page_accepts_anything() {
    let cfg = cfg();
    let page = AtlasPage::new(0, &cfg);
    let hull = square_hull(10.0);
    let mut scratch = Vec::new();
    assert!(!overlaps(&hull, 0, 0, &page, cfg.granularity(), &mut scratch));
    // No bounds check on an empty page.
    assert!(!overlaps(&hull, 60, 60, &page, cfg.granularity(), &mut scratch));
}

#[test]
fn placed_hull_blocks_and_neighbours_fit() {
    let cfg = cfg();
    let mut page = AtlasPage::new(0, &cfg);
    let hull = square_hull(10.0);
    page.commit(0, &hull, 0, 0);
    let step = cfg.granularity();
    let mut scratch = Vec::new();

    // Below the furthest corner with too little free area.
    assert!(overlaps(&hull, 0, 0, &page, step, &mut scratch));
    // Past the corner on x but still intersecting the placed square.
    assert!(overlaps(&hull, 6, 4, &page, step, &mut scratch));
    // Edge contact.
    assert!(!overlaps(&hull, 10, 0, &page, step, &mut scratch));
    assert!(!overlaps(&hull, 20, 0, &page, step, &mut scratch));
    // Leaves the active rectangle.
    assert!(overlaps(&hull, 56, 0, &page, step, &mut scratch));
    assert!(overlaps(&hull, 0, 60, &page, step, &mut scratch));
}

#[test]
fn commit_tracks_area_corner_and_extent() {
    let cfg = cfg();
    let mut page = AtlasPage::new(0, &cfg);
    let hull = square_hull(10.0);
    page.commit(3, &hull, 0, 0);
    page.commit(4, &hull, 10, 0);

    assert_eq!(page.len(), 2);
    assert_eq!(page.placed()[1].sprite, 4);
    assert!((page.packed_area() - 200.0).abs() < 1e-3);
    let corner = page.corner();
    assert_eq!((corner.x, corner.y), (15.0, 5.0));
    assert!((corner.free - (75.0 - 200.0)).abs() < 1e-3);
    assert_eq!(page.used_size(), (20, 10));
    assert_eq!(page.point_count(), 10);
    assert_eq!(page.polygon(1)[0], Point::new(10.0, 0.0));
    assert!(page.validate_disjoint().is_ok());
}

#[test]
fn validate_disjoint_reports_forced_overlap() {
    let cfg = cfg();
    let mut page = AtlasPage::new(0, &cfg);
    let hull = square_hull(10.0);
    page.commit(0, &hull, 0, 0);
    page.commit(1, &hull, 5, 5);
    let err = page.validate_disjoint().unwrap_err();
    assert!(matches!(
        err,
        hull_packer_core::HullPackerError::Overlap { page: 0, a: 0, b: 1 }
    ));
}
