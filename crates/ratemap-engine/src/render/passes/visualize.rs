use bytemuck::{Pod, Zeroable};

use crate::render::{capture_errors, RateSurfaces, RenderCtx};

use super::common::{
    straight_alpha_blend, texture_entry, uniform_buffer, uniform_entry, UNFILTERABLE_FLOAT,
};
use super::VISUALIZE_WGSL;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct VisualizeUniform {
    pub tile_size: u32,
    pub has_motion: u32,
    pub opacity: f32,
    /// Motion-vector length (px) mapped to full blue.
    pub motion_scale: f32,
}

/// Whether the overlay can be drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VisualizerStatus {
    /// No pipeline built yet.
    #[default]
    Idle,
    Ready,
    /// Pipeline or bind group creation failed; the overlay stays off for
    /// the session.
    Unavailable,
}

/// Rate overlay drawn over the host's final target.
///
/// Debug-only. Failures disable the overlay without affecting rates.
pub struct RateVisualizer {
    status: VisualizerStatus,
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    params_ubo: Option<wgpu::Buffer>,
    /// 1x1 zero texture bound when the host has no motion vectors.
    no_motion: Option<wgpu::TextureView>,

    pub opacity: f32,
    pub motion_scale: f32,
}

impl Default for RateVisualizer {
    fn default() -> Self {
        Self {
            status: VisualizerStatus::Idle,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            params_ubo: None,
            no_motion: None,
            opacity: 0.4,
            motion_scale: 1.0 / 16.0,
        }
    }
}

impl RateVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> VisualizerStatus {
        self.status
    }

    /// Draws the overlay into `target`, which must match the render-target size
    /// and have format `target_format`.
    ///
    /// `motion_vectors` is an optional float texture of per-pixel motion in pixels.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        target_format: wgpu::TextureFormat,
        surfaces: &RateSurfaces,
        motion_vectors: Option<&wgpu::TextureView>,
    ) {
        if self.status == VisualizerStatus::Unavailable {
            return;
        }
        self.ensure_pipeline(ctx.device, target_format);
        if self.status == VisualizerStatus::Unavailable {
            return;
        }
        self.ensure_resources(ctx);

        let params = VisualizeUniform {
            tile_size: surfaces.grid().tile_size(),
            has_motion: motion_vectors.is_some() as u32,
            opacity: self.opacity,
            motion_scale: self.motion_scale,
        };

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(ubo) = self.params_ubo.as_ref() else { return };
        let Some(no_motion) = self.no_motion.as_ref() else { return };

        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&params));

        // Host motion vectors of the wrong format or sample count fail here.
        let bind_group = capture_errors(ctx.device, || {
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ratemap visualize bind group"),
                layout: bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&surfaces.rates().view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(motion_vectors.unwrap_or(no_motion)),
                    },
                ],
            })
        });
        let bind_group = match bind_group {
            Ok(bind_group) => bind_group,
            Err(err) => {
                log::warn!("rate overlay disabled: bind group creation failed: {err}");
                self.disable();
                return;
            }
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ratemap visualize pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..4, 0..1);
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let created = capture_errors(device, || Self::build_pipeline(device, format));
        match created {
            Ok((pipeline, bind_group_layout)) => {
                self.status = VisualizerStatus::Ready;
                self.pipeline_format = Some(format);
                self.pipeline = Some(pipeline);
                self.bind_group_layout = Some(bind_group_layout);
            }
            Err(err) => {
                log::warn!("rate overlay disabled: pipeline creation failed for {format:?}: {err}");
                self.disable();
            }
        }
    }

    fn disable(&mut self) {
        self.status = VisualizerStatus::Unavailable;
        self.pipeline = None;
        self.pipeline_format = None;
        self.bind_group_layout = None;
    }

    fn build_pipeline(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ratemap visualize shader"),
            source: wgpu::ShaderSource::Wgsl(VISUALIZE_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ratemap visualize bgl"),
            entries: &[
                uniform_entry::<VisualizeUniform>(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::ShaderStages::FRAGMENT, wgpu::TextureSampleType::Uint, false),
                texture_entry(2, wgpu::ShaderStages::FRAGMENT, UNFILTERABLE_FLOAT, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ratemap visualize pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ratemap visualize pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(straight_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        (pipeline, bind_group_layout)
    }

    fn ensure_resources(&mut self, ctx: &RenderCtx<'_>) {
        if self.params_ubo.is_none() {
            self.params_ubo = Some(uniform_buffer::<VisualizeUniform>(ctx.device, "ratemap visualize ubo"));
        }
        if self.no_motion.is_none() {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("ratemap no-motion texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rg32Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            // Fresh textures are zero-initialized by wgpu.
            self.no_motion = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_16_bytes() {
        assert_eq!(std::mem::size_of::<VisualizeUniform>(), 16);
    }

    #[test]
    fn starts_idle() {
        let vis = RateVisualizer::new();
        assert_eq!(vis.status(), VisualizerStatus::Idle);
        assert!(vis.opacity > 0.0 && vis.opacity < 1.0);
    }
}
