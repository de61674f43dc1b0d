//! Best-fit placement search over a page's candidate table.
//!
//! The table is cut into contiguous shards, every shard is scanned to completion, and
//! the hit with the lowest table index wins. The result therefore depends only on the
//! table, never on the number of shards or on which worker finishes first.

use crate::config::PackingConfig;
use crate::hull::ConvexPolygon;
use crate::model::Point;
use crate::overlap::overlaps;
use crate::packer::GridCell;
use crate::page::AtlasPage;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of workers available to fan-out phases.
pub fn worker_count(cfg: &PackingConfig) -> usize {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return rayon::current_num_threads().max(1);
        }
    }
    let _ = cfg;
    1
}

/// Number of shards a candidate table is split into.
pub fn shard_count(cfg: &PackingConfig) -> usize {
    cfg.shard_count.unwrap_or_else(|| worker_count(cfg)).max(1)
}

/// Per-shard translation buffers, allocated once per packing run and reused by every search.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
pub struct SearchScratch {
    buffers: Vec<Vec<Point>>,
    parallel: bool,
}

impl SearchScratch {
    pub fn new(cfg: &PackingConfig) -> Self {
        Self::with_shards(shard_count(cfg), cfg.parallel)
    }

    pub fn with_shards(shards: usize, parallel: bool) -> Self {
        Self {
            buffers: vec![Vec::new(); shards.max(1)],
            parallel,
        }
    }

    pub fn shards(&self) -> usize {
        self.buffers.len()
    }

    /// Makes sure every shard can hold a ring of `points` without reallocating.
    pub fn reserve(&mut self, points: usize) {
        for buf in &mut self.buffers {
            if buf.capacity() < points {
                buf.reserve(points - buf.len());
            }
        }
    }
}

fn scan_shard(
    candidate: &ConvexPolygon,
    page: &AtlasPage,
    step: u32,
    base: usize,
    cells: &[GridCell],
    buf: &mut Vec<Point>,
) -> Option<usize> {
    cells
        .iter()
        .position(|c| {
            let x = (c.col * step) as i32;
            let y = (c.row * step) as i32;
            !overlaps(candidate, x, y, page, step, buf)
        })
        .map(|i| base + i)
}

/// Scans the page's current candidate table and returns the lowest table index at which
/// `candidate` fits, or `None`.
pub fn find_first_fit(
    candidate: &ConvexPolygon,
    page: &AtlasPage,
    step: u32,
    scratch: &mut SearchScratch,
) -> Option<usize> {
    let cells = page.candidates();
    if cells.is_empty() {
        return None;
    }
    let chunk = cells.len().div_ceil(scratch.buffers.len());
    scratch.reserve(candidate.len());

    #[cfg(feature = "parallel")]
    {
        if scratch.parallel {
            let hits: Vec<Option<usize>> = cells
                .par_chunks(chunk)
                .zip(scratch.buffers.par_iter_mut())
                .enumerate()
                .map(|(shard, (cells, buf))| {
                    scan_shard(candidate, page, step, shard * chunk, cells, buf)
                })
                .collect();
            return hits.into_iter().flatten().min();
        }
    }

    let hits: Vec<Option<usize>> = cells
        .chunks(chunk)
        .zip(scratch.buffers.iter_mut())
        .enumerate()
        .map(|(shard, (cells, buf))| scan_shard(candidate, page, step, shard * chunk, cells, buf))
        .collect();
    hits.into_iter().flatten().min()
}

/// Finds an anchor for `candidate` on `page`, growing the page until a fit is found or the
/// page reaches the max size. Does not commit the placement.
pub fn find_placement(
    candidate: &ConvexPolygon,
    page: &mut AtlasPage,
    cfg: &PackingConfig,
    scratch: &mut SearchScratch,
) -> Option<(i32, i32)> {
    let step = cfg.granularity();
    loop {
        if let Some(index) = find_first_fit(candidate, page, step, scratch) {
            let cell = page.candidates()[index];
            return Some(((cell.col * step) as i32, (cell.row * step) as i32));
        }
        if !page.grow(cfg) {
            return None;
        }
        debug!(
            page = page.id(),
            width = page.width(),
            height = page.height(),
            candidates = page.candidates().len(),
            "page grown"
        );
    }
}
