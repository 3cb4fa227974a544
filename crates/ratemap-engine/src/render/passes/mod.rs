//! Controller passes in recording order: features, estimate, smooth, and the
//! optional overlay.

mod common;
mod estimate;
mod features;
mod smooth;
mod visualize;

pub use estimate::{EstimatePass, EstimateUniform};
#[cfg(test)]
pub(crate) use estimate::estimate_source;
pub use features::{FeaturePass, FeatureUniform};
pub use smooth::{SmoothPass, SmoothUniform};
pub use visualize::{RateVisualizer, VisualizeUniform, VisualizerStatus};

pub(crate) const FEATURES_WGSL: &str = include_str!("../shaders/features.wgsl");
pub(crate) const ESTIMATE_WGSL: &str = include_str!("../shaders/estimate.wgsl");
pub(crate) const SMOOTH_WGSL: &str = include_str!("../shaders/smooth.wgsl");
pub(crate) const VISUALIZE_WGSL: &str = include_str!("../shaders/visualize.wgsl");
