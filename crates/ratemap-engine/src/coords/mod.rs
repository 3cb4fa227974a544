//! Coordinate types shared by the grid, the views and the passes.
//!
//! Canonical space:
//! - Physical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Clip space follows wgpu: NDC +Y up, depth in [0, 1].

mod rect;
mod viewport;

pub use rect::PixelRect;
pub use viewport::ViewportRect;
