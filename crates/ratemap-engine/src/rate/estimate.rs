//! Per-tile rate estimate from features and reprojected depth.

use glam::{UVec2, Vec2};

use crate::coords::PixelRect;
use crate::grid::{Image2d, RateGrid, TileGrid};
use crate::settings::Sensitivities;
use crate::view::{FrameViews, Reprojection};

use super::{RatePolicy, ShadingRate};

/// Depth sample positions inside a tile: its center and the centers of its
/// four quadrants.
pub fn tile_sample_pixels(rect: PixelRect) -> [UVec2; 5] {
    let at = |kx: u32, ky: u32| {
        UVec2::new(rect.x + rect.width * kx / 4, rect.y + rect.height * ky / 4)
    };
    [at(2, 2), at(1, 1), at(3, 1), at(1, 3), at(3, 3)]
}

/// Largest displacement among the tile's depth samples, in pixels.
pub fn tile_displacement(depth: &Image2d<f32>, rect: PixelRect, reprojection: &Reprojection) -> f32 {
    tile_sample_pixels(rect)
        .into_iter()
        .map(|p| {
            let d = depth.get_clamped(p.x as i64, p.y as i64);
            reprojection.displacement(p.as_vec2() + Vec2::splat(0.5), d)
        })
        .fold(0.0, f32::max)
}

/// Rate estimate for every tile.
///
/// Without a usable planar history every tile is 1x1.
pub fn estimate_rates(
    features: &Image2d<Vec2>,
    depth: &Image2d<f32>,
    grid: &TileGrid,
    views: &FrameViews,
    sensitivities: &Sensitivities,
    policy: &RatePolicy,
) -> RateGrid {
    let reprojection = views
        .planar_history()
        .and_then(|(current, previous)| Reprojection::between(current, previous));
    let Some(reprojection) = reprojection else {
        return RateGrid::uniform(grid.dimensions(), ShadingRate::Rate1x1);
    };

    RateGrid::from_fn(grid.dimensions(), |x, y| {
        let displacement = tile_displacement(depth, grid.tile_rect(x, y), &reprojection);
        let feature = features.get_clamped(x as i64, y as i64);
        policy.classify(feature, displacement, sensitivities)
    })
}
