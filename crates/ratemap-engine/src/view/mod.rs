//! Camera views as seen by the controller.

mod reprojection;
mod state;

pub use reprojection::Reprojection;
pub use state::{FrameViews, ViewLayout, ViewState};
