//! The world-sized backing store that drawing tools paint into.
//!
//! Pixels live in a flat grid of 64x64 RGBA tiles. Tiles are `Arc`-shared, so
//! cloning a surface (for a history snapshot) only bumps reference counts and
//! painting clones just the tiles it touches (`Arc::make_mut`). A missing tile
//! reads as the background colour.

use std::fmt;
use std::sync::Arc;

use egui::{Color32, ColorImage, Pos2, Rect, pos2};
use image::{Rgba, RgbaImage};

use crate::id_generator::next_revision;

pub const TILE_SIZE: u32 = 64;

#[derive(Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    tiles_per_row: u32,
    background: Rgba<u8>,
    tiles: Vec<Option<Arc<RgbaImage>>>,
    revision: u64,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("allocated_tiles", &self.allocated_tiles())
            .field("revision", &self.revision)
            .finish()
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba([color.r(), color.g(), color.b(), color.a()])
}

fn to_color32(pixel: Rgba<u8>) -> Color32 {
    let [r, g, b, a] = pixel.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

impl Surface {
    /// A blank surface filled with `background`. No tile memory is allocated.
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let tiles_per_row = width.div_ceil(TILE_SIZE);
        let tiles_per_col = height.div_ceil(TILE_SIZE);
        Self {
            width,
            height,
            tiles_per_row,
            background: to_rgba(background),
            tiles: vec![None; (tiles_per_row * tiles_per_col) as usize],
            revision: next_revision(),
        }
    }

    /// Build a surface from tightly packed RGBA rows. Returns `None` when the
    /// buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: &[u8], background: Color32) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 4 {
            return None;
        }
        let mut surface = Self::new(width, height, background);
        let stride = width as usize * 4;
        let tiles_per_col = height.div_ceil(TILE_SIZE);
        for ty in 0..tiles_per_col {
            for tx in 0..surface.tiles_per_row {
                let base_x = tx * TILE_SIZE;
                let base_y = ty * TILE_SIZE;
                let w = TILE_SIZE.min(width - base_x);
                let h = TILE_SIZE.min(height - base_y);
                let mut tile = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, surface.background);
                let mut is_background = true;
                for ly in 0..h {
                    let row = (base_y + ly) as usize * stride;
                    for lx in 0..w {
                        let i = row + (base_x + lx) as usize * 4;
                        let pixel = Rgba([data[i], data[i + 1], data[i + 2], data[i + 3]]);
                        if pixel != surface.background {
                            is_background = false;
                        }
                        tile.put_pixel(lx, ly, pixel);
                    }
                }
                if !is_background {
                    let idx = surface.tile_index(tx, ty);
                    surface.tiles[idx] = Some(Arc::new(tile));
                }
            }
        }
        Some(surface)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bounds of the surface in world coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_min_max(Pos2::ZERO, pos2(self.width as f32, self.height as f32))
    }

    pub fn background(&self) -> Color32 {
        to_color32(self.background)
    }

    /// Content stamp. Changes on every mutation and is shared by clones, so two
    /// surfaces with the same revision hold the same pixels.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of tiles holding real pixel data.
    pub fn allocated_tiles(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    fn tile_index(&self, tx: u32, ty: u32) -> usize {
        (ty * self.tiles_per_row + tx) as usize
    }

    fn tile_mut(&mut self, tx: u32, ty: u32) -> &mut RgbaImage {
        let idx = self.tile_index(tx, ty);
        let background = self.background;
        let tile = self.tiles[idx]
            .get_or_insert_with(|| Arc::new(RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, background)));
        Arc::make_mut(tile)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.tile_index(x / TILE_SIZE, y / TILE_SIZE);
        let pixel = match &self.tiles[idx] {
            Some(tile) => *tile.get_pixel(x % TILE_SIZE, y % TILE_SIZE),
            None => self.background,
        };
        Some(to_color32(pixel))
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color32) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.revision = next_revision();
        let tile = self.tile_mut(x / TILE_SIZE, y / TILE_SIZE);
        tile.put_pixel(x % TILE_SIZE, y % TILE_SIZE, to_rgba(color));
    }

    /// Paint every pixel inside `bounds` whose centre satisfies `inside`.
    fn fill_where(&mut self, bounds: Rect, color: Color32, inside: impl Fn(Pos2) -> bool) {
        let clipped = bounds.intersect(self.rect());
        if !clipped.is_positive() {
            return;
        }
        let x0 = clipped.min.x.floor() as u32;
        let y0 = clipped.min.y.floor() as u32;
        let x1 = (clipped.max.x.ceil() as u32).min(self.width);
        let y1 = (clipped.max.y.ceil() as u32).min(self.height);
        let rgba = to_rgba(color);
        self.revision = next_revision();

        for ty in (y0 / TILE_SIZE)..=((y1 - 1) / TILE_SIZE) {
            for tx in (x0 / TILE_SIZE)..=((x1 - 1) / TILE_SIZE) {
                let base_x = tx * TILE_SIZE;
                let base_y = ty * TILE_SIZE;
                let lx0 = x0.max(base_x) - base_x;
                let ly0 = y0.max(base_y) - base_y;
                let lx1 = x1.min(base_x + TILE_SIZE) - base_x;
                let ly1 = y1.min(base_y + TILE_SIZE) - base_y;

                // Tiles the shape misses stay shared.
                let hits: Vec<(u32, u32)> = (ly0..ly1)
                    .flat_map(|ly| (lx0..lx1).map(move |lx| (lx, ly)))
                    .filter(|&(lx, ly)| {
                        inside(pos2((base_x + lx) as f32 + 0.5, (base_y + ly) as f32 + 0.5))
                    })
                    .collect();
                if hits.is_empty() {
                    continue;
                }
                let tile = self.tile_mut(tx, ty);
                for (lx, ly) in hits {
                    tile.put_pixel(lx, ly, rgba);
                }
            }
        }
    }

    /// Filled disc of `radius` world pixels around `center`.
    pub fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let radius = radius.max(0.5);
        let bounds = Rect::from_center_size(center, egui::Vec2::splat(radius * 2.0 + 1.0));
        let r2 = radius * radius;
        self.fill_where(bounds, color, |p| p.distance_sq(center) <= r2);
    }

    /// Thick segment from `a` to `b` with round caps.
    pub fn stroke_segment(&mut self, a: Pos2, b: Pos2, width: f32, color: Color32) {
        let radius = (width / 2.0).max(0.5);
        let bounds = Rect::from_two_pos(a, b).expand(radius + 1.0);
        let r2 = radius * radius;
        let ab = b - a;
        let len_sq = ab.length_sq();
        self.fill_where(bounds, color, |p| {
            let t = if len_sq > 0.0 { ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
            p.distance_sq(a + ab * t) <= r2
        });
    }

    /// Reset every pixel to the background colour.
    pub fn clear(&mut self) {
        self.tiles.iter_mut().for_each(|tile| *tile = None);
        self.revision = next_revision();
    }

    /// Tightly packed RGBA rows for the whole surface.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let width = self.width as usize;
        let mut data = Vec::with_capacity(width * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.tile_index(x / TILE_SIZE, y / TILE_SIZE);
                let pixel = match &self.tiles[idx] {
                    Some(tile) => *tile.get_pixel(x % TILE_SIZE, y % TILE_SIZE),
                    None => self.background,
                };
                data.extend_from_slice(&pixel.0);
            }
        }
        data
    }

    /// Flatten to a single image at 1:1 scale (used by export).
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.to_rgba_bytes())
            .unwrap_or_else(|| RgbaImage::from_pixel(self.width, self.height, self.background))
    }

    /// Copy of this surface centered on a fresh `width` x `height` buffer.
    /// Content that does not fit is cropped evenly on both sides.
    pub fn recentered(&self, width: u32, height: u32) -> Surface {
        let mut out = Surface::new(width, height, self.background());
        let off_x = (i64::from(width) - i64::from(self.width)) / 2;
        let off_y = (i64::from(height) - i64::from(self.height)) / 2;
        for y in 0..self.height {
            let dy = i64::from(y) + off_y;
            if dy < 0 || dy >= i64::from(height) {
                continue;
            }
            for x in 0..self.width {
                let dx = i64::from(x) + off_x;
                if dx < 0 || dx >= i64::from(width) {
                    continue;
                }
                if let Some(color) = self.pixel(x, y) {
                    if color != out.background() {
                        out.put_pixel(dx as u32, dy as u32, color);
                    }
                }
            }
        }
        out
    }

    /// Nearest-neighbour extract of `src` (world rect) scaled to
    /// `dest_w` x `dest_h` pixels.
    pub fn sample_region(&self, src: Rect, dest_w: usize, dest_h: usize) -> ColorImage {
        let mut pixels = Vec::with_capacity(dest_w * dest_h);
        let sx = src.width() / dest_w.max(1) as f32;
        let sy = src.height() / dest_h.max(1) as f32;
        let max_x = self.width - 1;
        let max_y = self.height - 1;
        for dy in 0..dest_h {
            let y = ((src.min.y + (dy as f32 + 0.5) * sy).floor().max(0.0) as u32).min(max_y);
            for dx in 0..dest_w {
                let x = ((src.min.x + (dx as f32 + 0.5) * sx).floor().max(0.0) as u32).min(max_x);
                let idx = self.tile_index(x / TILE_SIZE, y / TILE_SIZE);
                let pixel = match &self.tiles[idx] {
                    Some(tile) => *tile.get_pixel(x % TILE_SIZE, y % TILE_SIZE),
                    None => self.background,
                };
                pixels.push(to_color32(pixel));
            }
        }
        ColorImage { size: [dest_w, dest_h], pixels }
    }
}
