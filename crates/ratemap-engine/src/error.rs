//! Controller errors.
//!
//! Only startup/configuration failures are errors. Per-frame degenerate
//! conditions (no history, multi-viewport) are handled by falling back to
//! full-rate shading and never surface here.

use std::fmt;

/// Fatal controller error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The device does not report variable-rate shading support.
    VariableRateShadingUnsupported,
    /// The reported shading-rate tile size is zero or not a power of two.
    InvalidTileSize(u32),
    /// The render target has a zero width or height.
    EmptyResolution { width: u32, height: u32 },
    /// Sample counts other than 1, 2, 4, 8 and 16 cannot back a depth texture.
    UnsupportedSampleCount(u32),
    /// The device rejected a controller texture or pipeline, typically a
    /// downlevel adapter missing a storage format or shader feature.
    GpuResource { label: &'static str, message: String },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VariableRateShadingUnsupported => {
                write!(f, "variable rate shading is not supported by the device")
            }
            Self::InvalidTileSize(size) => {
                write!(f, "invalid shading-rate tile size {size}: expected a non-zero power of two")
            }
            Self::EmptyResolution { width, height } => {
                write!(f, "render target resolution {width}x{height} is empty")
            }
            Self::UnsupportedSampleCount(count) => {
                write!(f, "unsupported sample count {count}")
            }
            Self::GpuResource { label, message } => {
                write!(f, "device rejected {label}: {message}")
            }
        }
    }
}

impl std::error::Error for ControllerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_value() {
        let msg = ControllerError::InvalidTileSize(12).to_string();
        assert!(msg.contains("12"));

        let msg = ControllerError::EmptyResolution { width: 0, height: 720 }.to_string();
        assert!(msg.contains("0x720"));
    }

    #[test]
    fn gpu_resource_keeps_the_device_message() {
        let err = ControllerError::GpuResource {
            label: "rate surfaces",
            message: "Texture usages STORAGE_BINDING are not allowed".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("device rejected rate surfaces"));
        assert!(msg.contains("STORAGE_BINDING"));
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = ControllerError::VariableRateShadingUnsupported.into();
        assert!(err.downcast_ref::<ControllerError>().is_some());
    }
}
