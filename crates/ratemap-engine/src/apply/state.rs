use crate::rate::ShadingRate;

/// How the rate image combines with the per-draw base rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ShadingRateCombiner {
    /// Keep the base rate; the image is ignored.
    #[default]
    Passthrough,
    /// The rate image replaces the base rate.
    Override,
}

/// Variable-rate shading state pushed to the host for one planar view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VariableRateShadingState {
    pub enabled: bool,
    pub base_rate: ShadingRate,
    pub image_combiner: ShadingRateCombiner,
}

impl VariableRateShadingState {
    /// Rate image in control.
    pub const fn engaged() -> Self {
        Self {
            enabled: true,
            base_rate: ShadingRate::Rate1x1,
            image_combiner: ShadingRateCombiner::Override,
        }
    }

    /// Uniform full rate.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            base_rate: ShadingRate::Rate1x1,
            image_combiner: ShadingRateCombiner::Passthrough,
        }
    }
}

impl Default for VariableRateShadingState {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Applier state. Never survives past a bracket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ApplierState {
    #[default]
    Disabled,
    Engaged,
}
