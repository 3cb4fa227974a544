use bytemuck::{Pod, Zeroable};

use crate::render::{RateSurfaces, RenderCtx};

use super::common::{
    compute_pipeline, dispatch, storage_entry, texture_entry, uniform_buffer, uniform_entry,
    UNFILTERABLE_FLOAT,
};
use super::FEATURES_WGSL;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FeatureUniform {
    pub brightness_sensitivity: f32,
    pub tile_size: u32,
    pub _pad: [u32; 2], // 16-byte alignment
}

/// Extracts per-tile contrast from the previous frame's color.
///
/// One workgroup per tile. The source may be any float-sampled 2D color
/// texture of the render-target size.
pub struct FeaturePass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_ubo: wgpu::Buffer,
}

impl FeaturePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ratemap features bgl"),
            entries: &[
                uniform_entry::<FeatureUniform>(0, wgpu::ShaderStages::COMPUTE),
                texture_entry(1, wgpu::ShaderStages::COMPUTE, UNFILTERABLE_FLOAT, false),
                storage_entry(2, RateSurfaces::FEATURE_FORMAT),
            ],
        });

        let pipeline = compute_pipeline(device, "ratemap features", FEATURES_WGSL, &bind_group_layout);
        let params_ubo = uniform_buffer::<FeatureUniform>(device, "ratemap features ubo");

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
        previous_color: &wgpu::TextureView,
        brightness_sensitivity: f32,
    ) {
        let grid = surfaces.grid();
        let params = FeatureUniform {
            brightness_sensitivity,
            tile_size: grid.tile_size(),
            _pad: [0; 2],
        };
        ctx.queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&params));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ratemap features bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(previous_color),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&surfaces.features().view),
                },
            ],
        });

        dispatch(encoder, "ratemap features pass", &self.pipeline, &bind_group, grid.dimensions());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_16_bytes() {
        assert_eq!(std::mem::size_of::<FeatureUniform>(), 16);
    }
}
