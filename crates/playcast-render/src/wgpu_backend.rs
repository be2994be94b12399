//! wgpu implementation of the graphics backend.
//!
//! The decoder's physical buffer becomes a pair of plane textures (R8 luma,
//! RG8 chroma at half resolution), the descriptors become a bind group, and
//! the finished command list becomes a `wgpu::RenderBundle` — recorded once
//! per buffer and replayed on every submit. wgpu cannot alias external
//! decoder memory, so `upload` refreshes the cached plane textures instead.

use crate::backend::{GpuBackend, StreamParams};
use crate::context::GpuContext;
use bytemuck::{Pod, Zeroable};
use playcast_core::{ColorTransform, DecodedFrame, PlaycastError, Result};
use tracing::debug;
use wgpu::util::DeviceExt;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

// Full-screen quad as a two-triangle strip.
const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { position: [-1.0, 1.0, 0.0], uv: [0.0, 0.0] },
    Vertex { position: [-1.0, -1.0, 0.0], uv: [0.0, 1.0] },
    Vertex { position: [1.0, 1.0, 0.0], uv: [1.0, 0.0] },
    Vertex { position: [1.0, -1.0, 0.0], uv: [1.0, 1.0] },
];

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

/// Uniform layout matching `ColorUniform` in shader.wgsl (std140: mat3x3
/// columns are vec4-aligned).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ColorUniform {
    yuv_matrix: [[f32; 4]; 3],
    offset: [f32; 4],
    uv_rect: [f32; 4],
}

impl From<&ColorTransform> for ColorUniform {
    fn from(t: &ColorTransform) -> Self {
        Self {
            yuv_matrix: [
                t.yuv_matrix.x_axis.extend(0.0).to_array(),
                t.yuv_matrix.y_axis.extend(0.0).to_array(),
                t.yuv_matrix.z_axis.extend(0.0).to_array(),
            ],
            offset: t.offset.extend(0.0).to_array(),
            uv_rect: t.uv_rect.to_array(),
        }
    }
}

/// A decoder buffer imported as GPU plane textures.
pub struct ImportedBuffer {
    luma: wgpu::Texture,
    luma_view: wgpu::TextureView,
    chroma: wgpu::Texture,
    chroma_view: wgpu::TextureView,
}

/// Descriptors plus the recorded, replayable draw for one imported buffer.
pub struct FrameDraw {
    // The bundle keeps its resources alive, but the bind group is the
    // explicit owner of the plane descriptors for this buffer.
    _bind_group: wgpu::BindGroup,
    bundle: wgpu::RenderBundle,
}

struct StreamResources {
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    target_view: wgpu::TextureView,
    _target: wgpu::Texture,
}

/// wgpu-backed renderer state.
pub struct WgpuBackend {
    ctx: GpuContext,
    stream: Option<StreamResources>,
}

impl WgpuBackend {
    pub fn new(ctx: GpuContext) -> Self {
        Self { ctx, stream: None }
    }

    fn stream(&self) -> Result<&StreamResources> {
        self.stream
            .as_ref()
            .ok_or_else(|| PlaycastError::Gpu("stream resources not initialized".to_string()))
    }

    fn create_plane_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> wgpu::Texture {
        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn write_planes(&self, view: &ImportedBuffer, frame: &DecodedFrame) {
        self.ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &view.luma,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.luma_plane(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(frame.width),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );

        // Interleaved chroma: w/2 texels of two bytes each per row
        self.ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &view.chroma,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.chroma_plane(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(frame.width),
                rows_per_image: Some(frame.height / 2),
            },
            wgpu::Extent3d {
                width: frame.width / 2,
                height: frame.height / 2,
                depth_or_array_layers: 1,
            },
        );
    }
}

impl GpuBackend for WgpuBackend {
    type MemoryView = ImportedBuffer;
    type CommandList = FrameDraw;

    fn begin_stream(&mut self, params: &StreamParams) -> Result<()> {
        let device = &self.ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Video Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Video Plane Bindings"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
            label: Some("Video Pipeline Layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Video Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Video Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Video Quad Vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = ColorUniform::from(&params.transform);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Color Transform Uniform"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Video Target"),
            size: wgpu::Extent3d {
                width: params.screen_width,
                height: params.screen_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        debug!(
            frame_width = params.frame_width,
            frame_height = params.frame_height,
            screen_width = params.screen_width,
            screen_height = params.screen_height,
            "stream resources created"
        );

        self.stream = Some(StreamResources {
            pipeline,
            bind_layout,
            sampler,
            vertex_buffer,
            uniform_buffer,
            target_view,
            _target: target,
        });

        Ok(())
    }

    fn import_buffer(&mut self, frame: &DecodedFrame) -> Result<Self::MemoryView> {
        self.stream()?;

        let luma = self.create_plane_texture(
            "Luma Plane",
            frame.width,
            frame.height,
            wgpu::TextureFormat::R8Unorm,
        );
        let chroma = self.create_plane_texture(
            "Chroma Plane",
            frame.width / 2,
            frame.height / 2,
            wgpu::TextureFormat::Rg8Unorm,
        );

        let view = ImportedBuffer {
            luma_view: luma.create_view(&wgpu::TextureViewDescriptor::default()),
            chroma_view: chroma.create_view(&wgpu::TextureViewDescriptor::default()),
            luma,
            chroma,
        };
        self.write_planes(&view, frame);

        debug!(
            buffer = frame.buffer.0,
            chroma_offset = frame.chroma_offset,
            "imported decoder buffer as plane textures"
        );

        Ok(view)
    }

    fn record_draw(
        &mut self,
        view: &Self::MemoryView,
        frame: &DecodedFrame,
    ) -> Result<Self::CommandList> {
        let stream = self.stream()?;
        let device = &self.ctx.device;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Video Plane Bind Group"),
            layout: &stream.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view.luma_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view.chroma_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&stream.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: stream.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder =
            device.create_render_bundle_encoder(&wgpu::RenderBundleEncoderDescriptor {
                label: Some("Video Draw Bundle"),
                color_formats: &[Some(TARGET_FORMAT)],
                depth_stencil: None,
                sample_count: 1,
                multiview: None,
            });
        encoder.set_pipeline(&stream.pipeline);
        encoder.set_bind_group(0, &bind_group, &[]);
        encoder.set_vertex_buffer(0, stream.vertex_buffer.slice(..));
        encoder.draw(0..QUAD_VERTICES.len() as u32, 0..1);

        let bundle = encoder.finish(&wgpu::RenderBundleDescriptor {
            label: Some("Video Draw Bundle"),
        });

        debug!(buffer = frame.buffer.0, "recorded draw bundle");

        Ok(FrameDraw {
            _bind_group: bind_group,
            bundle,
        })
    }

    fn upload(&mut self, view: &Self::MemoryView, frame: &DecodedFrame) -> Result<()> {
        self.write_planes(view, frame);
        Ok(())
    }

    fn submit(&mut self, list: &Self::CommandList) -> Result<()> {
        let stream = self.stream()?;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Video Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Video Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &stream.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.execute_bundles(std::iter::once(&list.bundle));
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let _ = self.ctx.device.poll(wgpu::Maintain::Wait);
        Ok(())
    }
}
