//! wgpu implementation of [`RenderBackend`]
//!
//! Textures live in a slotmap keyed by [`TextureId`]. All work is recorded
//! into one command encoder that is created lazily and flushed by
//! [`RenderBackend::submit`]. Each clear and each filter draw is its own
//! render pass.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use wgpu::util::DeviceExt;

use crate::backend::{FilterDraw, RenderBackend, Viewport};
use crate::program::FilterProgram;
use crate::shaders;
use crate::texture::{TextureDescriptor, TextureId};

/// A backend-owned render target
struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    /// Single-sample copy that multisampled targets resolve into
    resolved: Option<(wgpu::Texture, wgpu::TextureView)>,
    size: (u32, u32),
    sample_count: u32,
}

impl GpuTexture {
    /// View to sample from when this texture is a filter input
    fn sample_view(&self) -> &wgpu::TextureView {
        match &self.resolved {
            Some((_, view)) => view,
            None => &self.view,
        }
    }
}

/// Target the backend draws into when nothing offscreen is bound
struct DefaultTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

#[derive(Clone, Copy)]
struct Binding {
    target: Option<TextureId>,
    viewport: Viewport,
}

/// wgpu render backend for filter passes
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    textures: SlotMap<TextureId, GpuTexture>,
    default_target: Option<DefaultTarget>,
    binding: Option<Binding>,
    encoder: Option<wgpu::CommandEncoder>,
    /// Pipelines keyed by program hash and sample count
    pipelines: FxHashMap<(u64, u32), wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    /// Bound at binding 3 for programs without uniforms of their own
    empty_uniforms: wgpu::Buffer,
}

impl WgpuBackend {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Filter Bind Group Layout"),
            entries: &[
                // FilterGlobals
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Input texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Input sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Filter uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Filter Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Filter Input Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let empty_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Filter Empty Uniforms"),
            contents: &[0u8; 16],
            usage: wgpu::BufferUsages::UNIFORM,
        });

        Self {
            device,
            queue,
            format,
            textures: SlotMap::with_key(),
            default_target: None,
            binding: None,
            encoder: None,
            pipelines: FxHashMap::default(),
            bind_group_layout,
            pipeline_layout,
            sampler,
            empty_uniforms,
        }
    }

    /// Set the target used when the filter system binds `None`
    pub fn set_default_target(&mut self, view: wgpu::TextureView, width: u32, height: u32) {
        self.default_target = Some(DefaultTarget {
            view,
            size: (width, height),
        });
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Number of live offscreen textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Underlying wgpu texture, for copying results out
    pub fn texture(&self, id: TextureId) -> Option<&wgpu::Texture> {
        self.textures.get(id).map(|t| match &t.resolved {
            Some((texture, _)) => texture,
            None => &t.texture,
        })
    }

    fn create_color_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::Texture {
        let usage = if sample_count > 1 {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
        };

        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage,
            view_formats: &[],
        })
    }

    fn pipeline_key(program: &FilterProgram, sample_count: u32) -> (u64, u32) {
        (program.pipeline_hash(), sample_count)
    }

    fn ensure_pipeline(&mut self, program: &FilterProgram, sample_count: u32) {
        let key = Self::pipeline_key(program, sample_count);
        if self.pipelines.contains_key(&key) {
            return;
        }

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(program.label),
                source: wgpu::ShaderSource::Wgsl(shaders::compose(&program.source).into()),
            });

        let blend = if program.blend {
            Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING)
        } else {
            None
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(program.label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(program.fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

        tracing::debug!(
            "created filter pipeline '{}' (sample_count={}), {} cached",
            program.label,
            sample_count,
            self.pipelines.len() + 1
        );
        self.pipelines.insert(key, pipeline);
    }

    /// Sample count and pixel size of the bound target
    fn bound_target_info(&self, target: Option<TextureId>) -> Option<(u32, (u32, u32))> {
        match target {
            Some(id) => self.textures.get(id).map(|t| (t.sample_count, t.size)),
            None => self.default_target.as_ref().map(|t| (1, t.size)),
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureId {
        let width = descriptor.width.max(1);
        let height = descriptor.height.max(1);
        let sample_count = descriptor.multisample.sample_count();

        let texture = self.create_color_texture("Filter Texture", width, height, sample_count);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let resolved = (sample_count > 1).then(|| {
            let texture = self.create_color_texture("Filter Resolve Texture", width, height, 1);
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        });

        self.textures.insert(GpuTexture {
            texture,
            view,
            resolved,
            size: (width, height),
            sample_count,
        })
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if let Some(gpu) = self.textures.remove(id) {
            gpu.texture.destroy();
            if let Some((resolved, _)) = gpu.resolved {
                resolved.destroy();
            }
        }
        if self.binding.is_some_and(|b| b.target == Some(id)) {
            self.binding = None;
        }
    }

    fn bind(&mut self, target: Option<TextureId>, viewport: Viewport) {
        self.binding = Some(Binding { target, viewport });
    }

    fn clear(&mut self, color: [f32; 4]) {
        let Some(binding) = self.binding else {
            tracing::warn!("clear with no bound target");
            return;
        };
        let view = match binding.target {
            Some(id) => self.textures.get(id).map(|t| &t.view),
            None => self.default_target.as_ref().map(|t| &t.view),
        };
        let Some(view) = view else {
            tracing::warn!("clear on a missing target {:?}", binding.target);
            return;
        };

        let encoder = self.encoder.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Filter Encoder"),
                })
        });
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Filter Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color[0] as f64,
                        g: color[1] as f64,
                        b: color[2] as f64,
                        a: color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn resolve(&mut self, id: TextureId) {
        let Some(gpu) = self.textures.get(id) else {
            return;
        };
        let Some((_, resolved_view)) = &gpu.resolved else {
            return;
        };

        let encoder = self.encoder.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Filter Encoder"),
                })
        });
        // An empty pass with a resolve target performs the resolve
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Filter Resolve Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &gpu.view,
                resolve_target: Some(resolved_view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn draw_filter(&mut self, draw: &FilterDraw<'_>) {
        let Some(binding) = self.binding else {
            tracing::warn!("filter draw '{}' with no bound target", draw.program.label);
            return;
        };
        let Some((sample_count, (target_width, target_height))) =
            self.bound_target_info(binding.target)
        else {
            tracing::warn!("filter draw on a missing target {:?}", binding.target);
            return;
        };

        let (x, y, width, height) = binding.viewport.pixel_rect();
        let x = x.min(target_width);
        let y = y.min(target_height);
        let width = width.min(target_width - x);
        let height = height.min(target_height - y);
        if width == 0 || height == 0 {
            return;
        }

        self.ensure_pipeline(draw.program, sample_count);

        let Some(input) = self.textures.get(draw.input) else {
            tracing::warn!("filter draw '{}' with a missing input", draw.program.label);
            return;
        };

        let globals_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Filter Globals"),
                contents: bytemuck::bytes_of(&draw.globals),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let uniforms_buffer = (!draw.program.uniforms.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Filter Uniforms"),
                    contents: &draw.program.uniforms,
                    usage: wgpu::BufferUsages::UNIFORM,
                })
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Filter Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input.sample_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: uniforms_buffer
                        .as_ref()
                        .unwrap_or(&self.empty_uniforms)
                        .as_entire_binding(),
                },
            ],
        });

        let target_view = match binding.target {
            Some(id) => self.textures.get(id).map(|t| &t.view),
            None => self.default_target.as_ref().map(|t| &t.view),
        };
        let (Some(target_view), Some(pipeline)) = (
            target_view,
            self.pipelines
                .get(&Self::pipeline_key(draw.program, sample_count)),
        ) else {
            return;
        };

        let encoder = self.encoder.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Filter Encoder"),
                })
        });
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(draw.program.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_viewport(
            x as f32,
            y as f32,
            width as f32,
            height as f32,
            0.0,
            1.0,
        );
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..4, 0..1);
    }

    fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }
}
