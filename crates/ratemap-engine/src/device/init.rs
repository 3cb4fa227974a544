use super::VariableRateShadingInfo;

/// Initialization parameters for the GPU layer.
///
/// Keep this structure minimal. Add configuration flags only when a concrete
/// platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter preference.
    pub power_preference: wgpu::PowerPreference,

    /// Forces a software adapter. Used by CI and tests.
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// The controller itself needs none; favor an empty set for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Shading-rate image support reported by the native backend.
    ///
    /// wgpu cannot query this; hosts that drive a shading-rate image fill it
    /// in from their own backend query.
    pub variable_rate_shading: Option<VariableRateShadingInfo>,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            variable_rate_shading: None,
        }
    }
}
