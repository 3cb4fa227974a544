//! Shading-rate codes, the per-tile decision policy and CPU reference passes.
//!
//! `features`, `estimate` and `smooth` compute exactly what the GPU passes in
//! `render::passes` compute. They back the unit tests and host-side
//! diagnostics; the controller never runs them per frame.

mod code;
pub mod estimate;
pub mod features;
mod policy;
pub mod smooth;

pub use code::ShadingRate;
pub use policy::RatePolicy;
