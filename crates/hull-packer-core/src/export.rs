use crate::config::PackingConfig;
use crate::model::{Meta, Placement, SpriteBatch};
use crate::pipeline::PackOutput;
use serde_json::{Value, json};

/// Atlas metadata for a configuration.
pub fn meta(cfg: &PackingConfig) -> Meta {
    Meta {
        schema_version: "1".into(),
        app: "hull-packer".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        max_texture_size: cfg.max_texture_size,
        padding: cfg.padding,
        granularity: cfg.granularity(),
        style: cfg.style,
        quality: cfg.quality,
        enable_rotation: cfg.enable_rotation,
    }
}

fn sprite_entries<'a>(
    batch: &'a SpriteBatch,
    placements: impl Iterator<Item = Placement> + 'a,
) -> Vec<Value> {
    batch
        .sprites
        .iter()
        .zip(placements)
        .map(|(rec, p)| json!({"key": rec.key, "x": p.x, "y": p.y, "page": p.page}))
        .collect()
}

/// Serialize a packing result.
/// Shape: `{ sprites: [{ key, x, y, page }], pages: [{ id, width, height, usedWidth, usedHeight, sprites }], meta }`.
/// `sprites` follows input order; each page lists the input indices it holds in placement order.
pub fn to_json(out: &PackOutput, batch: &SpriteBatch, cfg: &PackingConfig) -> Value {
    let sprites = sprite_entries(batch, out.placements.iter().copied());
    let pages: Vec<Value> = out
        .pages
        .iter()
        .map(|p| {
            let (w, h) = p.extent();
            let (uw, uh) = p.used_size();
            let held: Vec<usize> = p.placed().iter().map(|pp| pp.sprite).collect();
            json!({
                "id": p.id(),
                "width": w,
                "height": h,
                "usedWidth": uw,
                "usedHeight": uh,
                "sprites": held,
            })
        })
        .collect();
    json!({"sprites": sprites, "pages": pages, "meta": meta(cfg)})
}

/// Same shape as [`to_json`] for a failed run: every sprite carries the `-1` sentinel and
/// there are no pages.
pub fn failure_json(batch: &SpriteBatch, cfg: &PackingConfig) -> Value {
    let sprites = sprite_entries(batch, std::iter::repeat(Placement::FAILED));
    json!({"sprites": sprites, "pages": [], "meta": meta(cfg)})
}
