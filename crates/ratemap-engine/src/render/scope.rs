//! Error scopes around resource creation.
//!
//! Without a scope, wgpu hands validation failures to the device's
//! uncaptured-error handler, which panics by default.

/// Runs `create` with validation and internal errors captured.
///
/// Scopes are per thread, so `create` must record everything on the
/// calling thread. The value is dropped when an error was captured.
pub(crate) fn capture_errors<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let internal = device.push_error_scope(wgpu::ErrorFilter::Internal);

    let value = create();

    let internal = pollster::block_on(internal.pop());
    let validation = pollster::block_on(validation.pop());
    match validation.or(internal) {
        Some(error) => Err(error),
        None => Ok(value),
    }
}
