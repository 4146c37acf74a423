//! Point batch renderer
//!
//! Draws a [`DrawList`] as instanced quads. Each batch role owns one
//! instance buffer that is rewritten when the batch's revision changes and
//! reallocated only when it needs to grow.

use crate::device::GpuContext;
use bytemuck::{Pod, Zeroable};
use canopy_core::{
    BatchRole, Color, DrawList, Error, FrameCamera, PointBatch, RenderSurface, Result,
    ViewportSize,
};
use nalgebra::Matrix4;
use std::collections::HashMap;
use std::sync::Arc;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Two triangles spanning the unit quad, in sprite space
const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Converts OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1])
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Per-point instance data
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}

impl PointInstance {
    /// Instances for every point of `batch`, carrying the batch material
    pub fn from_batch(batch: &PointBatch) -> Vec<Self> {
        let material = batch.material();
        batch
            .buffer()
            .iter()
            .map(|(position, color)| Self {
                position: [position.x, position.y, position.z],
                size: material.size,
                color: color.to_array(),
                opacity: material.opacity,
            })
            .collect()
    }

    /// Instance buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            1 => Float32x3,
            2 => Float32,
            3 => Float32x3,
            4 => Float32
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub right: [f32; 4],
    pub up: [f32; 4],
}

impl CameraUniform {
    pub fn from_frame(camera: &FrameCamera) -> Self {
        let view_proj = opengl_to_wgpu_matrix() * camera.view_proj;
        Self {
            view_proj: view_proj.into(),
            right: [camera.right.x, camera.right.y, camera.right.z, 0.0],
            up: [camera.up.x, camera.up.y, camera.up.z, 0.0],
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub enable_depth_test: bool,
    pub enable_alpha_blending: bool,
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enable_depth_test: true,
            enable_alpha_blending: true,
            vsync: true,
        }
    }
}

/// Uploaded instances of one batch role
struct GpuBatch {
    revision: u64,
    buffer: wgpu::Buffer,
    capacity: usize,
    instances: u32,
}

/// Instance capacity to allocate for `needed` points
fn grown_capacity(needed: usize) -> usize {
    needed.max(64).next_power_of_two()
}

/// GPU point cloud renderer bound to one window
pub struct PointCloudRenderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    batches: HashMap<BatchRole, GpuBatch>,
    config: RenderConfig,
}

impl PointCloudRenderer {
    /// Create a renderer drawing into `window`
    pub async fn new(window: Arc<Window>, config: RenderConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::with_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu.adapter);
        // Colours are authored in display space, so prefer a linear target
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let camera_uniform = CameraUniform::zeroed();
        let camera_buffer = gpu.create_buffer_init(
            "Camera Buffer",
            std::slice::from_ref(&camera_uniform),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let camera_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<CameraUniform>() as u64,
                            ),
                        },
                        count: None,
                    }],
                    label: Some("camera_bind_group_layout"),
                });

        let camera_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let shader = gpu.create_shader_module(
            "Point Cloud Shader",
            include_str!("shaders/point_cloud.wgsl"),
        );

        let quad_buffer =
            gpu.create_buffer_init("Point Quad Buffer", &QUAD_CORNERS, wgpu::BufferUsages::VERTEX);

        let render_pipeline_layout =
            gpu.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Point Cloud Render Pipeline Layout"),
                    bind_group_layouts: &[&camera_bind_group_layout],
                    push_constant_ranges: &[],
                });

        let quad_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        };

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Point Cloud Render Pipeline"),
                layout: Some(&render_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[quad_layout, PointInstance::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_config.format,
                        blend: if config.enable_alpha_blending {
                            Some(wgpu::BlendState::ALPHA_BLENDING)
                        } else {
                            Some(wgpu::BlendState::REPLACE)
                        },
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: if config.enable_depth_test {
                    Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::LessEqual,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    })
                } else {
                    None
                },
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        let depth_view = create_depth_view(&gpu.device, &surface_config);

        log::info!(
            "renderer ready: {}x{} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format
        );

        Ok(Self {
            gpu,
            surface,
            surface_config,
            pipeline,
            quad_buffer,
            camera_buffer,
            camera_bind_group,
            depth_view,
            batches: HashMap::new(),
            config,
        })
    }

    /// Number of batch roles with uploaded instances
    pub fn cached_batches(&self) -> usize {
        self.batches.len()
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.gpu.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.gpu.device, &self.surface_config);
    }

    /// Bring the instance buffer for `role` up to date with `batch`
    fn sync_batch(&mut self, role: BatchRole, batch: &PointBatch) {
        if let Some(cached) = self.batches.get(&role) {
            if cached.revision == batch.revision() {
                return;
            }
        }

        let instances = PointInstance::from_batch(batch);
        let bytes: &[u8] = bytemuck::cast_slice(&instances);

        match self.batches.get_mut(&role) {
            Some(cached) if cached.capacity >= instances.len() => {
                self.gpu.queue.write_buffer(&cached.buffer, 0, bytes);
                cached.revision = batch.revision();
                cached.instances = instances.len() as u32;
            }
            _ => {
                let capacity = grown_capacity(instances.len());
                let buffer = self.gpu.create_buffer(
                    &format!("{} instances", role.name()),
                    (capacity * std::mem::size_of::<PointInstance>()) as u64,
                    wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                );
                self.gpu.queue.write_buffer(&buffer, 0, bytes);
                log::debug!(
                    "allocated {} buffer for {} points ({} capacity)",
                    role.name(),
                    instances.len(),
                    capacity
                );
                self.batches.insert(
                    role,
                    GpuBatch {
                        revision: batch.revision(),
                        buffer,
                        capacity,
                        instances: instances.len() as u32,
                    },
                );
            }
        }
    }
}

impl RenderSurface for PointCloudRenderer {
    fn resize(&mut self, size: ViewportSize) {
        if !size.is_empty() {
            self.surface_config.width = size.width;
            self.surface_config.height = size.height;
            self.reconfigure();
        }
    }

    fn draw(&mut self, list: &DrawList<'_>) -> Result<()> {
        for entry in &list.batches {
            self.sync_batch(entry.role, entry.batch);
        }

        let uniform = CameraUniform::from_frame(&list.camera);
        self.gpu
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Cloud Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(list.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: if self.config.enable_depth_test {
                    Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    })
                } else {
                    None
                },
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));

            for entry in &list.batches {
                if let Some(gpu_batch) = self.batches.get(&entry.role) {
                    render_pass.set_vertex_buffer(1, gpu_batch.buffer.slice(..));
                    render_pass.draw(0..QUAD_CORNERS.len() as u32, 0..gpu_batch.instances);
                }
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn clear_color(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: 1.0,
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
