use crate::error::ControllerError;

/// Variable-rate shading support as reported by the native backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VariableRateShadingInfo {
    /// Edge length in pixels of one shading-rate image texel.
    pub tile_size: u32,
}

impl VariableRateShadingInfo {
    /// Checks that the tile size is a non-zero power of two.
    pub fn validated(self) -> Result<Self, ControllerError> {
        if self.tile_size.is_power_of_two() {
            Ok(self)
        } else {
            Err(ControllerError::InvalidTileSize(self.tile_size))
        }
    }
}

/// Capability query for image-based variable-rate shading.
///
/// wgpu does not expose shading-rate images, so the host answers this from
/// its native backend. `None` means the controller cannot run.
pub trait ShadingRateCapability {
    fn variable_rate_shading(&self) -> Option<VariableRateShadingInfo>;

    /// Returns the validated info or the fatal startup error.
    fn require_variable_rate_shading(&self) -> Result<VariableRateShadingInfo, ControllerError> {
        self.variable_rate_shading()
            .ok_or(ControllerError::VariableRateShadingUnsupported)?
            .validated()
    }
}

impl ShadingRateCapability for Option<VariableRateShadingInfo> {
    fn variable_rate_shading(&self) -> Option<VariableRateShadingInfo> {
        *self
    }
}

impl ShadingRateCapability for VariableRateShadingInfo {
    fn variable_rate_shading(&self) -> Option<VariableRateShadingInfo> {
        Some(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_support_is_fatal() {
        let none: Option<VariableRateShadingInfo> = None;
        assert_eq!(
            none.require_variable_rate_shading(),
            Err(ControllerError::VariableRateShadingUnsupported)
        );
    }

    #[test]
    fn tile_size_must_be_power_of_two() {
        let bad = VariableRateShadingInfo { tile_size: 12 };
        assert_eq!(
            bad.require_variable_rate_shading(),
            Err(ControllerError::InvalidTileSize(12))
        );

        let zero = VariableRateShadingInfo { tile_size: 0 };
        assert!(zero.require_variable_rate_shading().is_err());

        let good = VariableRateShadingInfo { tile_size: 16 };
        assert_eq!(good.require_variable_rate_shading(), Ok(good));
    }
}
