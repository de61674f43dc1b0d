//! Core library for packing irregular sprite silhouettes into texture atlases.
//!
//! - Shapes: each sprite mesh is reduced to a radially padded convex hull
//! - Placement: grid anchors tried in a style-specific order (flip-flop, ramp, square), checked with a separating-axis test
//! - Pages grow up to the max texture size; sprites that fit nowhere open a new page
//! - Pipeline: `pack_sprites` is all-or-nothing; `pack_placements` turns failure into `-1` sentinels
//!
//! Quick example:
//! ```ignore
//! use hull_packer_core::{Point, PackingConfig, SpriteBatch, pack_sprites};
//! # fn main() -> anyhow::Result<()> {
//! let mut batch = SpriteBatch::new();
//! let quad = [
//!     Point::new(0.0, 0.0),
//!     Point::new(32.0, 0.0),
//!     Point::new(32.0, 32.0),
//!     Point::new(0.0, 32.0),
//! ];
//! batch.push("a", &quad, &[0, 1, 2, 0, 2, 3], 32, 32);
//! batch.push("b", &quad, &[0, 1, 2, 0, 2, 3], 32, 32);
//! let cfg = PackingConfig { max_texture_size: 512, ..Default::default() };
//! let out = pack_sprites(&batch, &cfg)?;
//! println!("pages: {}", out.pages.len());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod hull;
pub mod model;
pub mod overlap;
pub mod packer;
pub mod page;
pub mod pager;
pub mod pipeline;
#[cfg(feature = "image")]
pub mod raster;
pub mod search;

pub use config::*;
pub use error::*;
pub use export::*;
pub use hull::{ConvexPolygon, HullContext, build_hull, convex_hull};
pub use model::*;
pub use overlap::{overlaps, polygons_collide};
pub use packer::*;
pub use page::{AtlasPage, Corner, PlacedPolygon};
pub use pager::AtlasPager;
pub use pipeline::*;
pub use search::{SearchScratch, find_first_fit, find_placement};

/// Convenience prelude for common types and functions.
/// Importing `hull_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackingConfig, PackingConfigBuilder, PackingQuality, PackingStyle};
    pub use crate::hull::ConvexPolygon;
    pub use crate::model::{PackStats, Placement, Point, SpriteBatch, SpriteInput};
    pub use crate::page::AtlasPage;
    pub use crate::{PackOutput, failure_json, pack_placements, pack_sprites, to_json};
}
