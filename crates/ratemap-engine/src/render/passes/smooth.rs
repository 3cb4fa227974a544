use bytemuck::{Pod, Zeroable};

use crate::rate::smooth::smoothing_radius;
use crate::render::{RateSurfaces, RenderCtx};

use super::common::{
    compute_pipeline, dispatch, storage_entry, texture_entry, uniform_buffer, uniform_entry,
};
use super::SMOOTH_WGSL;

/// Tiles per workgroup edge.
const GROUP: u32 = 8;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SmoothUniform {
    pub max_delta: u32,
    pub radius: u32,
    pub _pad: [u32; 2], // 16-byte alignment
}

impl SmoothUniform {
    pub fn new(max_delta: u32) -> Self {
        let max_delta = max_delta.max(1);
        Self {
            max_delta,
            radius: smoothing_radius(max_delta),
            _pad: [0; 2],
        }
    }
}

/// Bounded-gradient smoothing from the estimate surface into the rate surface.
pub struct SmoothPass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_ubo: wgpu::Buffer,
}

impl SmoothPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ratemap smooth bgl"),
            entries: &[
                uniform_entry::<SmoothUniform>(0, wgpu::ShaderStages::COMPUTE),
                texture_entry(1, wgpu::ShaderStages::COMPUTE, wgpu::TextureSampleType::Uint, false),
                storage_entry(2, RateSurfaces::RATE_FORMAT),
            ],
        });

        let pipeline = compute_pipeline(device, "ratemap smooth", SMOOTH_WGSL, &bind_group_layout);
        let params_ubo = uniform_buffer::<SmoothUniform>(device, "ratemap smooth ubo");

        Self {
            pipeline,
            bind_group_layout,
            params_ubo,
        }
    }

    pub fn encode(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        surfaces: &RateSurfaces,
        max_delta: u32,
    ) {
        let params = SmoothUniform::new(max_delta);
        ctx.queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&params));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ratemap smooth bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&surfaces.rates_estimate().view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&surfaces.rates().view),
                },
            ],
        });

        let groups = surfaces.grid().workgroups(GROUP);
        dispatch(encoder, "ratemap smooth pass", &self.pipeline, &bind_group, groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_cpu_radius() {
        assert_eq!(std::mem::size_of::<SmoothUniform>(), 16);
        let u = SmoothUniform::new(0);
        assert_eq!(u.max_delta, 1);
        assert_eq!(u.radius, 4);
        assert_eq!(SmoothUniform::new(2).radius, 2);
    }
}
