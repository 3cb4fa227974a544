//! Ratemap engine crate.
//!
//! This crate owns the adaptive shading-rate controller: the tile grid, the
//! GPU passes that turn last frame's color and this frame's depth into a
//! per-tile shading-rate surface, and the applier that brackets the host's
//! shading pass with the rate state.
//!
//! The host keeps ownership of everything else (scene, geometry passes,
//! presentation). It supplies depth, optional motion vectors, the previous
//! frame's color and the current/previous view transforms each frame.

pub mod apply;
pub mod controller;
pub mod coords;
pub mod device;
pub mod error;
pub mod grid;
pub mod logging;
pub mod rate;
pub mod render;
pub mod settings;
pub mod view;

pub use controller::{AdaptiveShading, FrameInputs, RenderTargetDesc};
pub use error::ControllerError;
