use crate::mesh::{Vertex, box_mesh};
use crate::shaders;
use crate::surface::{DEPTH_FORMAT, GpuSurface, MSAA_SAMPLES, RenderError};
use bytemuck::{Pod, Zeroable};
use cubescene_assets::{AssetId, TextureData};
use cubescene_common::Color;
use cubescene_scene::{
    DrawingSurface, Mesh, PerspectiveCamera, Renderer, SceneRoot, SurfaceSize,
};
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Globals {
    view_proj: [[f32; 4]; 4],
    to_light: [f32; 4],
    light_color: [f32; 4],
}

impl Globals {
    /// Camera and the first light. An unlit scene gets black light.
    pub(crate) fn from_scene(scene: &SceneRoot, camera: &PerspectiveCamera) -> Self {
        let (to_light, light_color) = match scene.lights().first() {
            Some(light) => {
                let [r, g, b] = light.color.to_linear();
                (
                    light.to_light(),
                    [r * light.intensity, g * light.intensity, b * light.intensity, 1.0],
                )
            }
            None => (Vec3::Y, [0.0, 0.0, 0.0, 1.0]),
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            to_light: to_light.extend(0.0).to_array(),
            light_color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
}

impl ObjectUniforms {
    pub(crate) fn from_mesh(mesh: &Mesh) -> Self {
        let [r, g, b] = mesh.material.base_color().to_linear();
        Self {
            model: mesh.transform.matrix().to_cols_array_2d(),
            base_color: [r, g, b, 1.0],
        }
    }
}

/// Background color as a clear value. The surface is sRGB, so the clear
/// color is given in linear light.
pub(crate) fn clear_color(background: Color) -> wgpu::Color {
    let [r, g, b] = background.to_linear();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// GPU resources for one scene mesh.
struct MeshGpu {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Texture currently bound, `None` for the plain white stand-in.
    texture: Option<AssetId>,
}

/// wgpu-based scene renderer and drawing surface.
pub struct WgpuRenderer {
    gpu: GpuSurface,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    white_view: wgpu::TextureView,
    meshes: Vec<MeshGpu>,
    sample_count: u32,
    /// Multisampled color target resolved into the surface; `None` at one
    /// sample per pixel.
    msaa_target: Option<wgpu::TextureView>,
    depth_texture: wgpu::TextureView,
}

/// Samples per pixel for the color and depth targets.
pub(crate) fn sample_count(antialias: bool, msaa_supported: bool) -> u32 {
    if antialias && msaa_supported {
        MSAA_SAMPLES
    } else {
        1
    }
}

impl WgpuRenderer {
    pub fn new(gpu: GpuSurface, antialias: bool) -> Self {
        let sample_count = sample_count(antialias, gpu.supports_msaa());
        if antialias && sample_count == 1 {
            tracing::warn!(format = ?gpu.format(), "multisampling unsupported, antialiasing disabled");
        }
        let device = &gpu.device;

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[
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
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::LAYOUT],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let white = TextureData::solid("white", 1, 1, [255, 255, 255, 255]);
        let white_view = upload_texture(device, &gpu.queue, &white);

        let size = gpu.size();
        let depth_texture = create_depth_texture(device, size, sample_count);
        let msaa_target = create_msaa_target(device, gpu.format(), size, sample_count);
        tracing::debug!(sample_count, "mesh pipeline ready");

        Self {
            gpu,
            pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            white_view,
            meshes: Vec::new(),
            sample_count,
            msaa_target,
            depth_texture,
        }
    }

    pub fn gpu(&self) -> &GpuSurface {
        &self.gpu
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Create GPU resources for meshes seen for the first time and rebind
    /// textures whose material changed since the last frame.
    fn sync_meshes(&mut self, scene: &SceneRoot) {
        for (i, mesh) in scene.meshes().iter().enumerate() {
            let wanted = mesh.material.texture().map(|t| t.id);
            if i == self.meshes.len() {
                let gpu_mesh = self.create_mesh(mesh);
                self.meshes.push(gpu_mesh);
            } else if self.meshes[i].texture != wanted {
                let bind_group =
                    self.create_object_bind_group(mesh, &self.meshes[i].uniform_buffer);
                let slot = &mut self.meshes[i];
                slot.bind_group = bind_group;
                slot.texture = wanted;
                tracing::debug!(mesh = %mesh.name, texture = ?wanted, "material texture rebound");
            }
        }
    }

    fn create_mesh(&self, mesh: &Mesh) -> MeshGpu {
        let device = &self.gpu.device;
        let (vertices, indices) = box_mesh(&mesh.geometry);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_uniform_buffer"),
            contents: bytemuck::bytes_of(&ObjectUniforms::from_mesh(mesh)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.create_object_bind_group(mesh, &uniform_buffer);

        MeshGpu {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
            texture: mesh.material.texture().map(|t| t.id),
        }
    }

    fn create_object_bind_group(&self, mesh: &Mesh, uniforms: &wgpu::Buffer) -> wgpu::BindGroup {
        let device = &self.gpu.device;
        let uploaded;
        let max = device.limits().max_texture_dimension_2d;
        let view = match mesh.material.texture() {
            Some(texture) if !fits_limit(texture, max) => {
                tracing::warn!(
                    mesh = %mesh.name,
                    width = texture.width,
                    height = texture.height,
                    max,
                    "texture exceeds device limit, drawing untextured"
                );
                &self.white_view
            }
            Some(texture) => {
                uploaded = upload_texture(device, &self.gpu.queue, texture);
                &uploaded
            }
            None => &self.white_view,
        };
        let sampler = create_sampler(device, mesh.material.anisotropy);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }
}

impl Renderer for WgpuRenderer {
    type Error = RenderError;

    /// Render one frame: clear to the background, draw every mesh, present.
    fn render(&mut self, scene: &SceneRoot, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let Some(output) = self.gpu.acquire()? else {
            return Ok(());
        };

        self.sync_meshes(scene);

        let queue = &self.gpu.queue;
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::from_scene(scene, camera)),
        );
        for (mesh, gpu_mesh) in scene.meshes().iter().zip(&self.meshes) {
            queue.write_buffer(
                &gpu_mesh.uniform_buffer,
                0,
                bytemuck::bytes_of(&ObjectUniforms::from_mesh(mesh)),
            );
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.msaa_target.as_ref().unwrap_or(&view),
                    resolve_target: self.msaa_target.as_ref().map(|_| &view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for gpu_mesh in &self.meshes {
                pass.set_bind_group(1, &gpu_mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl DrawingSurface for WgpuRenderer {
    fn resize(&mut self, size: SurfaceSize) {
        self.gpu.resize(size);
        let size = self.gpu.size();
        let device = &self.gpu.device;
        self.depth_texture = create_depth_texture(device, size, self.sample_count);
        self.msaa_target = create_msaa_target(device, self.gpu.format(), size, self.sample_count);
        tracing::debug!(width = size.width, height = size.height, "drawing surface resized");
    }
}

fn fits_limit(data: &TextureData, max_dimension: u32) -> bool {
    data.width <= max_dimension && data.height <= max_dimension
}

/// Upload RGBA8 pixels as an sRGB texture.
fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(data.label.as_str()),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(data.bytes_per_row()),
            rows_per_image: Some(data.height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Linear filtering with anisotropy clamped to the 1..=16 range wgpu accepts.
fn create_sampler(device: &wgpu::Device, anisotropy: u16) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("color_map_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        anisotropy_clamp: anisotropy.clamp(1, 16),
        ..Default::default()
    })
}

fn target_extent(size: SurfaceSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    }
}

fn create_depth_texture(device: &wgpu::Device, size: SurfaceSize, sample_count: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: target_extent(size),
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_msaa_target(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: SurfaceSize,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count == 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color_target"),
        size: target_extent(size),
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&Default::default()))
}
