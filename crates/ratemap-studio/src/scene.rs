//! Procedural host scene.
//!
//! Two fullscreen passes over the same ray-traced geometry: a geometry pass
//! writing depth and motion vectors, and a shading pass writing color. The
//! shading pass is the one the rate image applies to.

use bytemuck::{Pod, Zeroable};
use glam::{UVec2, Vec3};
use ratemap_engine::view::ViewState;

const SCENE_WGSL: &str = include_str!("shaders/scene.wgsl");

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const MOTION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniform {
    pub clip_to_world: [[f32; 4]; 4],
    pub world_to_clip: [[f32; 4]; 4],
    pub prev_world_to_clip: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

impl SceneUniform {
    pub fn new(current: &ViewState, previous: &ViewState, eye: Vec3) -> Self {
        let world_to_clip = current.world_to_clip();
        Self {
            clip_to_world: world_to_clip.inverse().to_cols_array_2d(),
            world_to_clip: world_to_clip.to_cols_array_2d(),
            prev_world_to_clip: previous.world_to_clip().to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
            resolution: current.viewport.size.to_array(),
            _pad: [0.0; 2],
        }
    }
}

fn target_texture(
    device: &wgpu::Device,
    label: &str,
    size: UVec2,
    format: wgpu::TextureFormat,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

/// Per-resolution render targets.
pub struct SceneTargets {
    pub size: UVec2,

    pub depth_view: wgpu::TextureView,
    /// Multisampled motion attachment, resolved into `motion_view`.
    motion_ms: Option<wgpu::TextureView>,
    pub motion_view: wgpu::TextureView,

    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    /// Last frame's final color (before the overlay).
    pub history: wgpu::Texture,
    pub history_view: wgpu::TextureView,
}

impl SceneTargets {
    pub fn new(device: &wgpu::Device, size: UVec2, sample_count: u32) -> Self {
        let depth = target_texture(
            device,
            "studio depth",
            size,
            DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let motion_ms = (sample_count > 1).then(|| {
            target_texture(
                device,
                "studio motion (ms)",
                size,
                MOTION_FORMAT,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .create_view(&wgpu::TextureViewDescriptor::default())
        });
        let motion = target_texture(
            device,
            "studio motion",
            size,
            MOTION_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let color = target_texture(
            device,
            "studio color",
            size,
            COLOR_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let history = target_texture(
            device,
            "studio history",
            size,
            COLOR_FORMAT,
            1,
            wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        Self {
            size,
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            motion_ms,
            motion_view: motion.create_view(&wgpu::TextureViewDescriptor::default()),
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            history_view: history.create_view(&wgpu::TextureViewDescriptor::default()),
            history,
        }
    }

    /// Copies this frame's color into the history texture.
    pub fn store_history(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_texture(
            self.color.as_image_copy(),
            self.history.as_image_copy(),
            wgpu::Extent3d {
                width: self.size.x,
                height: self.size.y,
                depth_or_array_layers: 1,
            },
        );
    }
}

pub struct SceneRenderer {
    geometry: wgpu::RenderPipeline,
    shade: wgpu::RenderPipeline,
    params_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, sample_count: u32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("studio scene shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("studio scene bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("studio scene pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("studio scene params"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("studio scene bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_ubo.as_entire_binding(),
            }],
        });

        let geometry = fullscreen_pipeline(
            device,
            "studio geometry pipeline",
            &pipeline_layout,
            &shader,
            "fs_geometry",
            MOTION_FORMAT,
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            sample_count,
        );
        let shade = fullscreen_pipeline(
            device,
            "studio shade pipeline",
            &pipeline_layout,
            &shader,
            "fs_shade",
            COLOR_FORMAT,
            None,
            1,
        );

        Self {
            geometry,
            shade,
            params_ubo,
            bind_group,
        }
    }

    pub fn upload(&self, queue: &wgpu::Queue, params: &SceneUniform) {
        queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(params));
    }

    /// Depth and motion vectors for the current frame.
    pub fn encode_geometry(&self, encoder: &mut wgpu::CommandEncoder, targets: &SceneTargets) {
        let (view, resolve_target) = match targets.motion_ms.as_ref() {
            Some(ms) => (ms, Some(&targets.motion_view)),
            None => (&targets.motion_view, None),
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("studio geometry pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&self.geometry);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..4, 0..1);
    }

    /// Main shading pass. Runs inside the controller's rate bracket.
    pub fn encode_shade(&self, encoder: &mut wgpu::CommandEncoder, targets: &SceneTargets) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("studio shade pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&self.shade);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..4, 0..1);
    }
}

#[allow(clippy::too_many_arguments)]
fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
    depth_stencil: Option<wgpu::DepthStencilState>,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
        cache: None,
    })
}
