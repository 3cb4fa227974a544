/// Pass-facing context (device/queue).
///
/// This is intentionally small and stable.
#[derive(Copy, Clone)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl<'a> From<&'a crate::device::Gpu> for RenderCtx<'a> {
    fn from(gpu: &'a crate::device::Gpu) -> Self {
        Self::new(gpu.device(), gpu.queue())
    }
}
