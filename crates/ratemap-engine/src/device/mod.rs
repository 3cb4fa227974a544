//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for headless use
//! - carrying the host's variable-rate shading capability report

mod caps;
mod gpu;
mod init;

pub use caps::{ShadingRateCapability, VariableRateShadingInfo};
pub use gpu::Gpu;
pub use init::GpuInit;
