//! Debug rendering of packed pages.

use crate::hull::ConvexPolygon;
use crate::model::{Point, SpriteBatch};
use crate::page::AtlasPage;
use crate::pipeline::PackOutput;
use image::{Rgba, RgbaImage};

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);

// Evenly spread hues via the golden ratio.
fn sprite_color(index: usize) -> Rgba<u8> {
    let h = (index as f32 * 0.618_034).fract() * 6.0;
    let (s, v) = (0.55f32, 0.9f32);
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([to(r), to(g), to(b), 255])
}

fn fill_triangle(img: &mut RgbaImage, a: Point, b: Point, c: Point, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let area = (b - a).cross(c - a);
    if area == 0.0 {
        return;
    }
    let x0 = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
    let y0 = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
    let x1 = (a.x.max(b.x).max(c.x).ceil().max(0.0) as u32).min(w - 1);
    let y1 = (a.y.max(b.y).max(c.y).ceil().max(0.0) as u32).min(h - 1);
    for py in y0..=y1 {
        for px in x0..=x1 {
            let p = Point::new(px as f32 + 0.5, py as f32 + 0.5);
            let w0 = (c - b).cross(p - b) * area.signum();
            let w1 = (a - c).cross(p - c) * area.signum();
            let w2 = (b - a).cross(p - a) * area.signum();
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                img.put_pixel(px, py, color);
            }
        }
    }
}

// Bresenham; pixels outside the image are skipped.
fn draw_line(img: &mut RgbaImage, a: Point, b: Point, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let (mut x, mut y) = (a.x.floor() as i64, a.y.floor() as i64);
    let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Renders one page at its extent: each sprite's triangles in a per-sprite colour, its
/// padded hull outlined in red.
pub fn render_page(page: &AtlasPage, batch: &SpriteBatch, hulls: &[ConvexPolygon]) -> RgbaImage {
    let (w, h) = page.extent();
    let mut img = RgbaImage::new(w, h);
    for (i, placed) in page.placed().iter().enumerate() {
        if let (Some(sprite), Some(hull)) = (batch.get(placed.sprite), hulls.get(placed.sprite)) {
            let color = sprite_color(placed.sprite);
            for tri in sprite.indices.chunks_exact(3) {
                let corner = |k: usize| {
                    sprite
                        .vertices
                        .get(tri[k] as usize)
                        .map(|&v| hull.to_page(v, placed.x, placed.y))
                };
                if let (Some(a), Some(b), Some(c)) = (corner(0), corner(1), corner(2)) {
                    fill_triangle(&mut img, a, b, c, color);
                }
            }
        }
        for edge in page.polygon(i).windows(2) {
            draw_line(&mut img, edge[0], edge[1], OUTLINE);
        }
    }
    img
}

/// Renders every page of a packing result, in page order.
pub fn render_pages(out: &PackOutput, batch: &SpriteBatch) -> Vec<RgbaImage> {
    out.pages
        .iter()
        .map(|p| render_page(p, batch, &out.hulls))
        .collect()
}
