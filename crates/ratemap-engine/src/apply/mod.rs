//! Rate application around the host's shading pass.
//!
//! wgpu has no shading-rate image binding, so the actual pipeline state is
//! owned by the host behind [`RateStateSink`]. This module guarantees the
//! enable/disable pairing.

mod applier;
mod state;

pub use applier::{RateApplier, RateStateSink};
pub use state::{ApplierState, ShadingRateCombiner, VariableRateShadingState};
