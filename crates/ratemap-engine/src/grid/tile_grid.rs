use glam::UVec2;

use crate::coords::PixelRect;
use crate::device::ShadingRateCapability;
use crate::error::ControllerError;

/// Partition of a render target into square tiles of `tile_size` pixels.
///
/// The last row and column may be partial; every pixel belongs to exactly
/// one tile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileGrid {
    resolution: UVec2,
    tile_size: u32,
    dimensions: UVec2,
}

impl TileGrid {
    pub fn new(resolution: UVec2, tile_size: u32) -> Result<Self, ControllerError> {
        if resolution.x == 0 || resolution.y == 0 {
            return Err(ControllerError::EmptyResolution {
                width: resolution.x,
                height: resolution.y,
            });
        }
        if !tile_size.is_power_of_two() {
            return Err(ControllerError::InvalidTileSize(tile_size));
        }

        let dimensions = UVec2::new(
            resolution.x.div_ceil(tile_size),
            resolution.y.div_ceil(tile_size),
        );

        Ok(Self {
            resolution,
            tile_size,
            dimensions,
        })
    }

    /// Grid for `resolution` using the tile size the device reports.
    pub fn for_device(
        resolution: UVec2,
        caps: &impl ShadingRateCapability,
    ) -> Result<Self, ControllerError> {
        let info = caps.require_variable_rate_shading()?;
        Self::new(resolution, info.tile_size)
    }

    #[inline]
    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Grid size in tiles: `ceil(resolution / tile_size)`.
    #[inline]
    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        (self.dimensions.x * self.dimensions.y) as usize
    }

    /// Row-major index of tile `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.dimensions.x + x) as usize
    }

    /// Pixel block covered by tile `(x, y)`, clipped to the target.
    pub fn tile_rect(&self, x: u32, y: u32) -> PixelRect {
        let x0 = x * self.tile_size;
        let y0 = y * self.tile_size;
        let full = PixelRect::new(x0, y0, self.tile_size, self.tile_size);
        full.intersect(PixelRect::new(0, 0, self.resolution.x, self.resolution.y))
            .unwrap_or(PixelRect::new(x0, y0, 0, 0))
    }

    /// Tile containing pixel `(px, py)`.
    #[inline]
    pub fn tile_of_pixel(&self, px: u32, py: u32) -> UVec2 {
        UVec2::new(px / self.tile_size, py / self.tile_size).min(self.dimensions - UVec2::ONE)
    }

    /// Dispatch size for a compute pass that handles one tile per thread in
    /// `group`x`group` workgroups.
    #[inline]
    pub fn workgroups(&self, group: u32) -> UVec2 {
        UVec2::new(
            self.dimensions.x.div_ceil(group),
            self.dimensions.y.div_ceil(group),
        )
    }

    /// Iterates tile coordinates row by row.
    pub fn tiles(&self) -> impl Iterator<Item = UVec2> + use<> {
        let dims = self.dimensions;
        (0..dims.y).flat_map(move |y| (0..dims.x).map(move |x| UVec2::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::VariableRateShadingInfo;

    #[test]
    fn hd_target_with_16px_tiles() {
        let grid = TileGrid::new(UVec2::new(1920, 1080), 16).unwrap();
        assert_eq!(grid.dimensions(), UVec2::new(120, 68));
        assert_eq!(grid.tile_count(), 120 * 68);
    }

    #[test]
    fn dimensions_round_up() {
        for (w, h, t) in [(1, 1, 16), (17, 15, 16), (1000, 1, 8), (64, 64, 32), (65, 33, 32)] {
            let grid = TileGrid::new(UVec2::new(w, h), t).unwrap();
            assert_eq!(grid.dimensions(), UVec2::new(w.div_ceil(t), h.div_ceil(t)));
        }
    }

    #[test]
    fn partial_edge_tiles_are_clipped() {
        let grid = TileGrid::new(UVec2::new(1920, 1080), 16).unwrap();
        let last = grid.tile_rect(119, 67);
        assert_eq!(last, PixelRect::new(1904, 1072, 16, 8));
    }

    #[test]
    fn every_pixel_maps_back_to_its_tile() {
        let grid = TileGrid::new(UVec2::new(50, 30), 8).unwrap();
        for tile in grid.tiles() {
            for (px, py) in grid.tile_rect(tile.x, tile.y).pixels() {
                assert_eq!(grid.tile_of_pixel(px, py), tile);
            }
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(
            TileGrid::new(UVec2::new(0, 10), 16),
            Err(ControllerError::EmptyResolution { width: 0, height: 10 })
        );
        assert_eq!(
            TileGrid::new(UVec2::new(10, 10), 0),
            Err(ControllerError::InvalidTileSize(0))
        );
    }

    #[test]
    fn tile_size_comes_from_the_device() {
        let caps = Some(VariableRateShadingInfo { tile_size: 8 });
        let grid = TileGrid::for_device(UVec2::new(64, 64), &caps).unwrap();
        assert_eq!(grid.tile_size(), 8);
        assert_eq!(grid.dimensions(), UVec2::new(8, 8));

        let none: Option<VariableRateShadingInfo> = None;
        assert_eq!(
            TileGrid::for_device(UVec2::new(64, 64), &none),
            Err(ControllerError::VariableRateShadingUnsupported)
        );
    }

    #[test]
    fn workgroups_cover_the_grid() {
        let grid = TileGrid::new(UVec2::new(1920, 1080), 16).unwrap();
        assert_eq!(grid.workgroups(8), UVec2::new(15, 9));
    }
}
