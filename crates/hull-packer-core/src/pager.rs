use crate::config::PackingConfig;
use crate::hull::ConvexPolygon;
use crate::model::Placement;
use crate::page::AtlasPage;
use crate::search::{SearchScratch, find_placement};
use tracing::{debug, trace};

/// Owns the pages of one packing run and places hulls on them in order.
pub struct AtlasPager<'c> {
    cfg: &'c PackingConfig,
    pages: Vec<AtlasPage>,
    scratch: SearchScratch,
    // Arena reservation for new pages: (sprites, points).
    hint: (usize, usize),
}

impl<'c> AtlasPager<'c> {
    pub fn new(cfg: &'c PackingConfig) -> Self {
        Self {
            cfg,
            pages: Vec::new(),
            scratch: SearchScratch::new(cfg),
            hint: (0, 0),
        }
    }

    /// Sets how much arena space each newly opened page reserves.
    pub fn with_capacity_hint(mut self, sprites: usize, points: usize) -> Self {
        self.hint = (sprites, points);
        self
    }

    /// Tries every existing page in creation order, then a fresh page.
    /// Returns `None` when even an empty page at max size cannot hold `hull`.
    pub fn place(&mut self, sprite: usize, hull: &ConvexPolygon) -> Option<Placement> {
        for page in self.pages.iter_mut() {
            if let Some((x, y)) = find_placement(hull, page, self.cfg, &mut self.scratch) {
                page.commit(sprite, hull, x, y);
                trace!(sprite, page = page.id(), x, y, "placed");
                return Some(Placement::new(x, y, page.id() as i32));
            }
        }

        let id = self.pages.len();
        let mut page = AtlasPage::with_capacity(id, self.cfg, self.hint.0, self.hint.1);
        debug!(page = id, size = page.width(), "opened page");
        let (x, y) = find_placement(hull, &mut page, self.cfg, &mut self.scratch)?;
        page.commit(sprite, hull, x, y);
        trace!(sprite, page = id, x, y, "placed");
        self.pages.push(page);
        Some(Placement::new(x, y, id as i32))
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<AtlasPage> {
        self.pages
    }
}
