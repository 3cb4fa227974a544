//! GPU side of the controller.
//!
//! Each pass owns its pipeline, bind group layout and uniform buffer. Bind
//! groups are rebuilt per frame because the host's depth and color views may
//! change between frames.
//!
//! Convention:
//! - grid textures are addressed in tiles, target textures in pixels
//! - all passes record into the caller's encoder in submission order

mod ctx;
pub mod passes;
pub mod readback;
mod scope;
mod surfaces;

#[cfg(test)]
mod wgsl_tests;

pub use ctx::RenderCtx;
pub(crate) use scope::capture_errors;
pub use surfaces::{GridTexture, RateSurfaces};
