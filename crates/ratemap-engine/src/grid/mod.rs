//! Tile grid and the CPU-side grid images.
//!
//! The GPU surfaces are grid-sized textures; these types describe the same
//! layouts on the CPU for readback, diagnostics and the reference passes.

mod image;
mod rate_grid;
mod tile_grid;

pub use image::Image2d;
pub use rate_grid::{RateGrid, RateHistogram};
pub use tile_grid::TileGrid;
