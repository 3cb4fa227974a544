use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::rate::RatePolicy;
use crate::render::{RateSurfaces, RenderCtx};
use crate::settings::Sensitivities;
use crate::view::Reprojection;

use super::common::{
    compute_pipeline, dispatch, storage_entry, texture_entry, uniform_buffer, uniform_entry,
    UNFILTERABLE_FLOAT,
};
use super::ESTIMATE_WGSL;

/// Tiles per workgroup edge.
const GROUP: u32 = 8;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct EstimateUniform {
    pub reprojection: [[f32; 4]; 4],
    pub current_origin: [f32; 2],
    pub current_size: [f32; 2],
    pub previous_origin: [f32; 2],
    pub previous_size: [f32; 2],
    pub error_sensitivity: f32,
    pub motion_sensitivity: f32,
    pub quarter_rate_scale: f32,
    pub motion_error_gain: f32,
    pub motion_full_rate: f32,
    pub tile_size: u32,
    pub history_valid: u32,
    pub _pad: u32,
}

impl EstimateUniform {
    /// Uniform for one frame. `reprojection == None` writes 1x1 everywhere.
    pub fn new(
        reprojection: Option<&Reprojection>,
        sensitivities: &Sensitivities,
        policy: &RatePolicy,
        tile_size: u32,
    ) -> Self {
        let (matrix, current, previous) = match reprojection {
            Some(r) => (
                r.current_clip_to_previous_clip,
                r.current_viewport,
                r.previous_viewport,
            ),
            None => (Mat4::IDENTITY, Default::default(), Default::default()),
        };

        Self {
            reprojection: matrix.to_cols_array_2d(),
            current_origin: current.origin.to_array(),
            current_size: current.size.to_array(),
            previous_origin: previous.origin.to_array(),
            previous_size: previous.size.to_array(),
            error_sensitivity: sensitivities.error,
            motion_sensitivity: sensitivities.motion,
            quarter_rate_scale: policy.quarter_rate_scale,
            motion_error_gain: policy.motion_error_gain,
            motion_full_rate: policy.motion_full_rate,
            tile_size,
            history_valid: reprojection.is_some() as u32,
            _pad: 0,
        }
    }
}

const DEPTH_BINDING: &str = "var depth: texture_2d<f32>;";
const DEPTH_BINDING_MULTISAMPLED: &str = "var depth: texture_multisampled_2d<f32>;";

/// WGSL source for single- or multi-sampled depth.
pub(crate) fn estimate_source(multisampled: bool) -> Cow<'static, str> {
    if multisampled {
        Cow::Owned(ESTIMATE_WGSL.replace(DEPTH_BINDING, DEPTH_BINDING_MULTISAMPLED))
    } else {
        Cow::Borrowed(ESTIMATE_WGSL)
    }
}

/// Per-tile rate estimate from features and reprojected depth.
///
/// The pipeline depends on whether the depth buffer is multisampled. It is
/// built by [`EstimatePass::prepare`] when the surfaces are configured;
/// `encode` records nothing until then.
#[derive(Default)]
pub struct EstimatePass {
    pipeline_multisampled: Option<bool>,
    pipeline: Option<wgpu::ComputePipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    params_ubo: Option<wgpu::Buffer>,
}

impl EstimatePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        surfaces: &RateSurfaces,
        depth: &wgpu::TextureView,
        params: &EstimateUniform,
    ) {
        if self.pipeline_multisampled != Some(surfaces.sample_count() > 1) {
            log::warn!("estimate pipeline does not match the surfaces; skipping");
            return;
        }
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(ubo) = self.params_ubo.as_ref() else { return };

        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(params));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ratemap estimate bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&surfaces.features().view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(depth),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&surfaces.rates_estimate().view),
                },
            ],
        });

        let groups = surfaces.grid().workgroups(GROUP);
        dispatch(encoder, "ratemap estimate pass", pipeline, &bind_group, groups);
    }

    /// Builds the pipeline for single- or multi-sampled depth. No-op when it
    /// already exists.
    pub fn prepare(&mut self, device: &wgpu::Device, multisampled: bool) {
        if self.pipeline_multisampled == Some(multisampled) && self.pipeline.is_some() {
            return;
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ratemap estimate bgl"),
            entries: &[
                uniform_entry::<EstimateUniform>(0, wgpu::ShaderStages::COMPUTE),
                texture_entry(1, wgpu::ShaderStages::COMPUTE, UNFILTERABLE_FLOAT, false),
                texture_entry(2, wgpu::ShaderStages::COMPUTE, UNFILTERABLE_FLOAT, multisampled),
                storage_entry(3, RateSurfaces::RATE_FORMAT),
            ],
        });

        let source = estimate_source(multisampled);
        let pipeline = compute_pipeline(device, "ratemap estimate", &source, &bind_group_layout);

        if self.params_ubo.is_none() {
            self.params_ubo = Some(uniform_buffer::<EstimateUniform>(device, "ratemap estimate ubo"));
        }

        log::debug!("estimate pipeline built (multisampled depth: {multisampled})");
        self.pipeline_multisampled = Some(multisampled);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ViewportRect;
    use crate::view::ViewState;
    use glam::{UVec2, Vec3};

    #[test]
    fn uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<EstimateUniform>(), 128);
        assert_eq!(std::mem::offset_of!(EstimateUniform, current_origin), 64);
        assert_eq!(std::mem::offset_of!(EstimateUniform, error_sensitivity), 96);
        assert_eq!(std::mem::offset_of!(EstimateUniform, tile_size), 116);
    }

    #[test]
    fn missing_history_clears_the_flag() {
        let u = EstimateUniform::new(None, &Sensitivities::default(), &RatePolicy::default(), 16);
        assert_eq!(u.history_valid, 0);
        assert_eq!(u.tile_size, 16);
    }

    #[test]
    fn reprojection_is_packed_column_major() {
        let res = UVec2::new(64, 32);
        let view = ViewState::look_at(Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO, 1.0, res, 0.1, 50.0);
        let r = Reprojection::between(&view, &view).unwrap();
        let u = EstimateUniform::new(Some(&r), &Sensitivities::default(), &RatePolicy::default(), 8);

        assert_eq!(u.history_valid, 1);
        assert_eq!(u.reprojection, r.current_clip_to_previous_clip.to_cols_array_2d());
        assert_eq!(u.previous_size, ViewportRect::full(res).size.to_array());
    }

    #[test]
    fn multisampled_source_swaps_the_depth_type() {
        assert!(estimate_source(false).contains(DEPTH_BINDING));
        let ms = estimate_source(true);
        assert!(ms.contains(DEPTH_BINDING_MULTISAMPLED));
        assert!(!ms.contains(DEPTH_BINDING));
        // The feature binding is a texture_2d<f32> too and must stay single-sampled.
        assert!(ms.contains("var features: texture_2d<f32>;"));
    }

    #[test]
    fn depth_is_never_bound_as_a_depth_texture() {
        for multisampled in [false, true] {
            assert!(!estimate_source(multisampled).contains("texture_depth"));
        }
    }
}
