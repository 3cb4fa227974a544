//! Per-tile contrast features.
//!
//! A tile's feature is its RMS luminance gradient per axis, divided by its
//! mean luminance plus the brightness sensitivity (Weber contrast). The
//! gradient is a forward difference with clamp-to-edge sampling, so the
//! last column/row of the image contributes zero.

use glam::{Vec2, Vec3};

use crate::coords::PixelRect;
use crate::grid::{Image2d, TileGrid};

/// Rec. 709 luma weights.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Lower bound of the contrast denominator.
pub const MIN_ADAPTATION: f32 = 1e-4;

#[inline]
pub fn luminance(rgba: [f32; 4]) -> f32 {
    Vec3::new(rgba[0], rgba[1], rgba[2]).dot(LUMA_WEIGHTS)
}

/// Feature of the pixel block `rect` of `color`.
pub fn tile_feature(color: &Image2d<[f32; 4]>, rect: PixelRect, brightness_sensitivity: f32) -> Vec2 {
    if rect.is_empty() {
        return Vec2::ZERO;
    }

    let mut grad_sq = Vec2::ZERO;
    let mut lum_sum = 0.0f32;
    for (x, y) in rect.pixels() {
        let (x, y) = (x as i64, y as i64);
        let l = luminance(color.get_clamped(x, y));
        let dx = luminance(color.get_clamped(x + 1, y)) - l;
        let dy = luminance(color.get_clamped(x, y + 1)) - l;
        grad_sq += Vec2::new(dx * dx, dy * dy);
        lum_sum += l;
    }

    let n = rect.area() as f32;
    let rms = Vec2::new((grad_sq.x / n).sqrt(), (grad_sq.y / n).sqrt());
    rms / (lum_sum / n + brightness_sensitivity).max(MIN_ADAPTATION)
}

/// Feature surface for every tile of `grid`.
pub fn extract_features(
    color: &Image2d<[f32; 4]>,
    grid: &TileGrid,
    brightness_sensitivity: f32,
) -> Image2d<Vec2> {
    Image2d::from_fn(grid.dimensions(), |x, y| {
        tile_feature(color, grid.tile_rect(x, y), brightness_sensitivity)
    })
}
