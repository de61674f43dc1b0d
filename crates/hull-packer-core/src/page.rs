use crate::config::PackingConfig;
use crate::error::{HullPackerError, Result};
use crate::hull::ConvexPolygon;
use crate::model::Point;
use crate::overlap::polygons_collide;
use crate::packer::{GridCell, scan_pattern};

/// Furthest-placement heuristic: running maxima of placed sprite centres and the
/// area left inside the box they span.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Corner {
    pub x: f32,
    pub y: f32,
    /// `x * y - packed_area`; may be negative.
    pub free: f32,
}

/// One placed hull: a range into the page's point arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPolygon {
    /// Index of the sprite in the input batch.
    pub sprite: usize,
    pub offset: usize,
    pub len: usize,
    pub x: i32,
    pub y: i32,
}

/// A growable atlas page holding translated hulls in a flat arena.
#[derive(Debug, Clone)]
pub struct AtlasPage {
    id: usize,
    width: u32,
    height: u32,
    points: Vec<Point>,
    placed: Vec<PlacedPolygon>,
    packed_area: f32,
    corner: Corner,
    used: (u32, u32),
    candidates: Vec<GridCell>,
}

impl AtlasPage {
    /// Opens a page at the configured start size and builds its candidate table.
    pub fn new(id: usize, cfg: &PackingConfig) -> Self {
        Self::with_capacity(id, cfg, 0, 0)
    }

    /// Like [`AtlasPage::new`], reserving arena space for `sprites` hulls of `points` total points.
    pub fn with_capacity(id: usize, cfg: &PackingConfig, sprites: usize, points: usize) -> Self {
        let size = cfg.start_page_size();
        let mut page = Self {
            id,
            width: size,
            height: size,
            points: Vec::with_capacity(points),
            placed: Vec::with_capacity(sprites),
            packed_area: 0.0,
            corner: Corner::default(),
            used: (0, 0),
            candidates: Vec::new(),
        };
        page.rebuild_candidates(cfg);
        page
    }

    pub fn id(&self) -> usize {
        self.id
    }
    /// Active search width; never exceeds the max texture size.
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    /// Bounding size of everything placed so far.
    pub fn used_size(&self) -> (u32, u32) {
        self.used
    }
    /// Size to allocate for this page's bitmap: the active rectangle or the used
    /// extent, whichever is larger.
    pub fn extent(&self) -> (u32, u32) {
        (self.width.max(self.used.0), self.height.max(self.used.1))
    }
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
    pub fn len(&self) -> usize {
        self.placed.len()
    }
    pub fn placed(&self) -> &[PlacedPolygon] {
        &self.placed
    }
    pub fn packed_area(&self) -> f32 {
        self.packed_area
    }
    pub fn corner(&self) -> Corner {
        self.corner
    }
    pub fn candidates(&self) -> &[GridCell] {
        &self.candidates
    }
    /// Total points held by the arena.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Translated ring of the `index`-th placed hull.
    pub fn polygon(&self, index: usize) -> &[Point] {
        let p = &self.placed[index];
        &self.points[p.offset..p.offset + p.len]
    }

    pub fn polygons(&self) -> impl Iterator<Item = &[Point]> + '_ {
        self.placed
            .iter()
            .map(move |p| &self.points[p.offset..p.offset + p.len])
    }

    pub fn is_at_max(&self, max: u32) -> bool {
        self.width >= max && self.height >= max
    }

    /// Grows the page by the style's rule and rebuilds the candidate table.
    /// Returns false when the page is already at the max size in both axes.
    pub fn grow(&mut self, cfg: &PackingConfig) -> bool {
        let max = cfg.max_texture_size;
        if self.is_at_max(max) {
            return false;
        }
        let (w, h) = scan_pattern(cfg.style).grow(self.width, self.height, max);
        self.width = w.max(self.width);
        self.height = h.max(self.height);
        self.rebuild_candidates(cfg);
        true
    }

    fn rebuild_candidates(&mut self, cfg: &PackingConfig) {
        self.candidates.clear();
        scan_pattern(cfg.style).fill(
            self.width,
            self.height,
            cfg.granularity(),
            &mut self.candidates,
        );
    }

    /// Appends `hull` anchored at `(x, y)` and updates the heuristic state.
    /// The placement is not checked; run [`crate::overlap::overlaps`] first.
    pub fn commit(&mut self, sprite: usize, hull: &ConvexPolygon, x: i32, y: i32) {
        let (fx, fy) = (x as f32, y as f32);
        let offset = self.points.len();
        for p in &hull.points {
            let t = Point::new(p.x + fx, p.y + fy);
            self.used.0 = self.used.0.max(t.x.max(0.0).ceil() as u32);
            self.used.1 = self.used.1.max(t.y.max(0.0).ceil() as u32);
            self.points.push(t);
        }
        self.placed.push(PlacedPolygon {
            sprite,
            offset,
            len: hull.points.len(),
            x,
            y,
        });

        self.packed_area += hull.area;
        let cx = fx + hull.width / 2.0;
        let cy = fy + hull.height / 2.0;
        self.corner.x = self.corner.x.max(cx);
        self.corner.y = self.corner.y.max(cy);
        self.corner.free = self.corner.x * self.corner.y - self.packed_area;
    }

    /// Re-runs the separating-axis test on every pair of placed hulls.
    pub fn validate_disjoint(&self) -> Result<()> {
        for a in 0..self.placed.len() {
            for b in (a + 1)..self.placed.len() {
                if polygons_collide(self.polygon(a), self.polygon(b)) {
                    return Err(HullPackerError::Overlap {
                        page: self.id,
                        a: self.placed[a].sprite,
                        b: self.placed[b].sprite,
                    });
                }
            }
        }
        Ok(())
    }
}
