use crate::config::PackingConfig;
use crate::error::{HullPackerError, Result};
use crate::hull::{ConvexPolygon, HullContext, build_hull};
use crate::model::{PackStats, Placement, SpriteBatch, SpriteInput};
use crate::page::AtlasPage;
use crate::pager::AtlasPager;
use crate::search::worker_count;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Output of a packing run: one placement per sprite, the filled pages and the padded hulls.
pub struct PackOutput {
    /// Indexed like the input batch.
    pub placements: Vec<Placement>,
    pub pages: Vec<AtlasPage>,
    /// Indexed like the input batch.
    pub hulls: Vec<ConvexPolygon>,
}

impl PackOutput {
    pub fn stats(&self) -> PackStats {
        let mut stats = PackStats {
            num_pages: self.pages.len(),
            num_sprites: self.placements.len(),
            total_page_area: 0,
            packed_area: 0.0,
            occupancy: 0.0,
            max_page_width: 0,
            max_page_height: 0,
            hull_points: 0,
        };
        for page in &self.pages {
            let (w, h) = page.extent();
            stats.total_page_area += w as u64 * h as u64;
            stats.packed_area += page.packed_area() as f64;
            stats.max_page_width = stats.max_page_width.max(w);
            stats.max_page_height = stats.max_page_height.max(h);
            stats.hull_points += page.point_count();
        }
        if stats.total_page_area > 0 {
            stats.occupancy = stats.packed_area / stats.total_page_area as f64;
        }
        stats
    }

    /// Re-runs the overlap test on every pair of hulls sharing a page.
    pub fn validate(&self) -> Result<()> {
        self.pages.iter().try_for_each(AtlasPage::validate_disjoint)
    }
}

#[instrument(skip_all)]
/// Packs every sprite of `batch` or fails as a whole.
///
/// Notes:
/// - Sprites are placed strictly in input order; pages are tried in creation order.
/// - Results do not depend on `parallel` or `shard_count`.
/// - Any oversized sprite, degenerate hull or exhausted page aborts the run.
pub fn pack_sprites(batch: &SpriteBatch, cfg: &PackingConfig) -> Result<PackOutput> {
    cfg.validate()?;

    if batch.is_empty() {
        return Err(HullPackerError::Empty);
    }
    batch.validate()?;

    if cfg.enable_rotation {
        warn!("enable_rotation is set but rotation is not supported; ignoring");
    }

    let start = Instant::now();
    let sprites: Vec<SpriteInput<'_>> = batch.iter().collect();
    let max = cfg.max_texture_size;
    let pad = cfg.padding.saturating_mul(2);
    for s in &sprites {
        let (w, h) = (s.width.saturating_add(pad), s.height.saturating_add(pad));
        if w > max || h > max {
            return Err(HullPackerError::Oversized {
                key: s.key.to_string(),
                width: w,
                height: h,
                max,
            });
        }
    }

    let hulls = build_hulls(&sprites, cfg)?;
    for (s, hull) in sprites.iter().zip(&hulls) {
        if hull.width > max as f32 || hull.height > max as f32 {
            return Err(HullPackerError::Oversized {
                key: s.key.to_string(),
                width: hull.width.ceil() as u32,
                height: hull.height.ceil() as u32,
                max,
            });
        }
    }

    let points: usize = hulls.iter().map(ConvexPolygon::len).sum();
    let mut pager = AtlasPager::new(cfg).with_capacity_hint(sprites.len(), points);
    let mut placements = Vec::with_capacity(sprites.len());
    for (i, hull) in hulls.iter().enumerate() {
        match pager.place(i, hull) {
            Some(p) => placements.push(p),
            None => {
                return Err(HullPackerError::OutOfSpace {
                    placed: i,
                    total: sprites.len(),
                });
            }
        }
    }

    let out = PackOutput {
        placements,
        pages: pager.into_pages(),
        hulls,
    };
    let stats = out.stats();
    info!(
        sprites = stats.num_sprites,
        pages = stats.num_pages,
        occupancy = stats.occupancy,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "packed"
    );
    Ok(out)
}

/// Like [`pack_sprites`], but returns only placements and turns any failure into
/// [`Placement::FAILED`] for every sprite.
pub fn pack_placements(batch: &SpriteBatch, cfg: &PackingConfig) -> Vec<Placement> {
    match pack_sprites(batch, cfg) {
        Ok(out) => out.placements,
        Err(e) => {
            error!(error = %e, sprites = batch.len(), "packing failed");
            vec![Placement::FAILED; batch.len()]
        }
    }
}

// Seeds are drawn in input order up front so hull batches can fan out freely.
fn build_hulls(sprites: &[SpriteInput<'_>], cfg: &PackingConfig) -> Result<Vec<ConvexPolygon>> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let contexts: Vec<HullContext> = sprites
        .iter()
        .map(|_| HullContext::new(rng.next_u32()))
        .collect();
    let padding = cfg.hull_padding();
    let batch_size = worker_count(cfg);

    let mut hulls = Vec::with_capacity(sprites.len());
    for (chunk, ctxs) in sprites.chunks(batch_size).zip(contexts.chunks(batch_size)) {
        for built in build_batch(chunk, ctxs, padding, cfg.parallel) {
            match built {
                Ok(hull) => hulls.push(hull),
                Err(e) => {
                    warn!(error = %e, "hull generation failed");
                    return Err(e);
                }
            }
        }
    }
    Ok(hulls)
}

fn build_batch(
    sprites: &[SpriteInput<'_>],
    contexts: &[HullContext],
    padding: f32,
    parallel: bool,
) -> Vec<Result<ConvexPolygon>> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return sprites
                .par_iter()
                .zip(contexts.par_iter())
                .map(|(s, ctx)| build_hull(s, padding, ctx))
                .collect();
        }
    }
    let _ = parallel;
    sprites
        .iter()
        .zip(contexts)
        .map(|(s, ctx)| build_hull(s, padding, ctx))
        .collect()
}
