use crate::error::{HullPackerError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// 2D point / vector in pixel space. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
    #[inline]
    pub fn dot(self, o: Point) -> f32 {
        self.x * o.x + self.y * o.y
    }
    /// Z component of the 3D cross product.
    #[inline]
    pub fn cross(self, o: Point) -> f32 {
        self.x * o.y - self.y * o.x
    }
    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, s: f32) -> Point {
        Point::new(self.x * s, self.y * s)
    }
}

impl Div<f32> for Point {
    type Output = Point;
    fn div(self, s: f32) -> Point {
        Point::new(self.x / s, self.y / s)
    }
}

impl From<[f32; 2]> for Point {
    fn from(v: [f32; 2]) -> Self {
        Point::new(v[0], v[1])
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// One sprite's ranges into the shared vertex/index buffers of a [`SpriteBatch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteRecord {
    /// User-specified key (e.g., sprite name or asset path).
    pub key: String,
    pub vertex_offset: usize,
    pub vertex_count: usize,
    pub index_offset: usize,
    pub index_count: usize,
    /// Source rectangle size, used for the up-front oversize check.
    pub width: u32,
    pub height: u32,
}

/// Borrowed view of one sprite: its silhouette mesh and source size.
#[derive(Debug, Clone, Copy)]
pub struct SpriteInput<'a> {
    pub key: &'a str,
    pub vertices: &'a [Point],
    /// Triangle list; indices are local to `vertices`.
    pub indices: &'a [u32],
    pub width: u32,
    pub height: u32,
}

/// Sprites sharing one vertex buffer and one index buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteBatch {
    pub vertices: Vec<Point>,
    pub indices: Vec<u32>,
    pub sprites: Vec<SpriteRecord>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sprite, copying its mesh into the shared buffers. Returns the sprite index.
    pub fn push(
        &mut self,
        key: impl Into<String>,
        vertices: &[Point],
        indices: &[u32],
        width: u32,
        height: u32,
    ) -> usize {
        let record = SpriteRecord {
            key: key.into(),
            vertex_offset: self.vertices.len(),
            vertex_count: vertices.len(),
            index_offset: self.indices.len(),
            index_count: indices.len(),
            width,
            height,
        };
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);
        self.sprites.push(record);
        self.sprites.len() - 1
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<SpriteInput<'_>> {
        let rec = self.sprites.get(index)?;
        let vertices = self
            .vertices
            .get(rec.vertex_offset..rec.vertex_offset.checked_add(rec.vertex_count)?)?;
        let indices = self
            .indices
            .get(rec.index_offset..rec.index_offset.checked_add(rec.index_count)?)?;
        Some(SpriteInput {
            key: &rec.key,
            vertices,
            indices,
            width: rec.width,
            height: rec.height,
        })
    }

    /// Iterates sprites in input order. Records with out-of-range slices are skipped;
    /// call [`SpriteBatch::validate`] first to reject them instead.
    pub fn iter(&self) -> impl Iterator<Item = SpriteInput<'_>> + '_ {
        (0..self.sprites.len()).filter_map(move |i| self.get(i))
    }

    /// Checks that every record addresses valid ranges and forms a triangle list.
    pub fn validate(&self) -> Result<()> {
        for (i, rec) in self.sprites.iter().enumerate() {
            let sprite = self.get(i).ok_or_else(|| {
                HullPackerError::InvalidInput(format!(
                    "sprite '{}' addresses vertices {}+{} / indices {}+{} outside the shared buffers ({} / {})",
                    rec.key,
                    rec.vertex_offset,
                    rec.vertex_count,
                    rec.index_offset,
                    rec.index_count,
                    self.vertices.len(),
                    self.indices.len()
                ))
            })?;
            if sprite.indices.len() % 3 != 0 {
                return Err(HullPackerError::InvalidInput(format!(
                    "sprite '{}' has {} indices, not a triangle list",
                    rec.key,
                    sprite.indices.len()
                )));
            }
            if let Some(bad) = sprite
                .indices
                .iter()
                .find(|&&ix| ix as usize >= sprite.vertices.len())
            {
                return Err(HullPackerError::InvalidInput(format!(
                    "sprite '{}' index {} out of range for {} vertices",
                    rec.key,
                    bad,
                    sprite.vertices.len()
                )));
            }
            if sprite.vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
                return Err(HullPackerError::InvalidInput(format!(
                    "sprite '{}' has non-finite vertex coordinates",
                    rec.key
                )));
            }
        }
        Ok(())
    }
}

/// Final position of one sprite: anchor offset on a page, or the failure sentinel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub page: i32,
}

impl Placement {
    /// Written for every sprite when a batch cannot be packed.
    pub const FAILED: Placement = Placement {
        x: -1,
        y: -1,
        page: -1,
    };

    pub fn new(x: i32, y: i32, page: i32) -> Self {
        Self { x, y, page }
    }

    pub fn is_failed(&self) -> bool {
        *self == Self::FAILED
    }
}

/// Atlas-level metadata written alongside placements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version for the JSON output; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub max_texture_size: u32,
    pub padding: u32,
    pub granularity: u32,
    pub style: crate::config::PackingStyle,
    pub quality: crate::config::PackingQuality,
    pub enable_rotation: bool,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Total number of pages in the atlas.
    pub num_pages: usize,
    /// Total number of sprites placed.
    pub num_sprites: usize,
    /// Sum of width * height over all pages.
    pub total_page_area: u64,
    /// Sum of padded hull areas of all placed sprites.
    pub packed_area: f64,
    /// Occupancy ratio: packed_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
    pub max_page_width: u32,
    pub max_page_height: u32,
    /// Total number of hull points stored across page arenas.
    pub hull_points: usize,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Sprites: {}, Occupancy: {:.2}%, Total Area: {} px², Packed Area: {:.0} px², Hull Points: {}",
            self.num_pages,
            self.num_sprites,
            self.occupancy * 100.0,
            self.total_page_area,
            self.packed_area,
            self.hull_points,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> f64 {
        (self.total_page_area as f64 - self.packed_area).max(0.0)
    }
}
