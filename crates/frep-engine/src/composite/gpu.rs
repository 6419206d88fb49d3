use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};

use crate::device::GpuContext;
use crate::render::RenderMode;

use super::{check_source_size, CompositeError, Compositor, TEXTURE_SIZE};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Render output living in device memory.
pub trait GpuSource {
    fn size_px(&self) -> u32;

    /// `R32Float` depth. 0 where the shape is absent, otherwise in `(0, 1]`,
    /// larger values nearer.
    fn depth_view(&self) -> &wgpu::TextureView;

    /// `Rgba8Unorm` image shown for `mode`.
    fn image_view(&self, mode: RenderMode) -> &wgpu::TextureView;
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CompositeParams {
    src_size: u32,
    dst_size: u32,
    _pad: [u32; 2],
}

/// Display texture composited entirely on the device.
///
/// Each publish is one fullscreen pass: overwrite clears color and depth, append
/// loads them. The `Greater` depth test keeps the nearest sample.
pub struct GpuCompositor<'g> {
    gpu: &'g GpuContext,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    params: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    /// Set when the texture must be cleared before the next publish.
    pending_clear: bool,
}

impl<'g> GpuCompositor<'g> {
    pub fn new(gpu: &'g GpuContext) -> Self {
        let device = gpu.device();

        let size = wgpu::Extent3d {
            width: TEXTURE_SIZE,
            height: TEXTURE_SIZE,
            depth_or_array_layers: 1,
        };

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frep display texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frep display depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frep composite params"),
            size: std::mem::size_of::<CompositeParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("frep composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frep composite bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("frep composite pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("frep composite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Greater,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            gpu,
            target,
            target_view,
            depth_view,
            params,
            bind_group_layout,
            pipeline,
            pending_clear: true,
        }
    }

    /// The display texture, for binding into a UI pass.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.target
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.target_view
    }

    /// Copies the display texture to host memory as tightly packed RGBA8 rows.
    ///
    /// Blocks on the copy's fence before mapping.
    pub fn read_back(&self) -> Result<Vec<u8>, CompositeError> {
        let device = self.gpu.device();
        let row_bytes = TEXTURE_SIZE * 4;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frep display readback"),
            size: u64::from(row_bytes) * u64::from(TEXTURE_SIZE),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self.gpu.create_encoder("frep readback encoder");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    // 2048 * 4 is already a multiple of COPY_BYTES_PER_ROW_ALIGNMENT.
                    bytes_per_row: Some(row_bytes),
                    rows_per_image: Some(TEXTURE_SIZE),
                },
            },
            wgpu::Extent3d {
                width: TEXTURE_SIZE,
                height: TEXTURE_SIZE,
                depth_or_array_layers: 1,
            },
        );

        let fence = self.gpu.submit(encoder);

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        fence
            .wait(self.gpu)
            .map_err(|e| CompositeError::Readback(format!("{e:#}")))?;

        rx.recv()
            .map_err(|e| CompositeError::Readback(e.to_string()))?
            .map_err(|e| CompositeError::Readback(e.to_string()))?;

        let bytes = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(bytes)
    }

    fn run_pass(&self, source: Option<(&dyn GpuSource, RenderMode)>, clear: bool) {
        let device = self.gpu.device();
        let mut encoder = self.gpu.create_encoder("frep composite encoder");

        let bind_group = source.map(|(src, mode)| {
            let params = CompositeParams {
                src_size: src.size_px(),
                dst_size: TEXTURE_SIZE,
                _pad: [0; 2],
            };
            self.gpu
                .queue()
                .write_buffer(&self.params, 0, bytemuck::bytes_of(&params));

            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("frep composite bind group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.params.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(src.depth_view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(src.image_view(mode)),
                    },
                ],
            })
        });

        let (color_load, depth_load) = if clear {
            (wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT), wgpu::LoadOp::Clear(0.0))
        } else {
            (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frep composite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(bind_group) = &bind_group {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        // Nothing on the host reads these results; the fence is not needed.
        let _ = self.gpu.submit(encoder);
    }
}

impl<S: GpuSource> Compositor<S> for GpuCompositor<'_> {
    fn publish(&mut self, source: &S, append: bool, mode: RenderMode) -> Result<(), CompositeError> {
        check_source_size(source.size_px(), TEXTURE_SIZE)?;
        let source: &dyn GpuSource = source;
        self.run_pass(Some((source, mode)), !append || self.pending_clear);
        self.pending_clear = false;
        Ok(())
    }

    fn clear(&mut self) {
        self.run_pass(None, true);
        self.pending_clear = false;
    }
}
