use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use wgpu::util::DeviceExt;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

use super::camera::{self, CameraUniform, OrbitCamera};
use super::input::InputState;
use super::mesh::VoxelMesh;
use super::perf_log::PerformanceLog;
use super::vertex::Vertex;
use crate::config::ViewerConfig;
use crate::mesh::Bounds;

/// Uploaded voxel geometry
struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_texture: wgpu::TextureView,
    render_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh: Option<MeshBuffers>,
    camera: OrbitCamera,
    home_camera: OrbitCamera,
    background: wgpu::Color,
    frames_rendered: u64,
}

impl GpuState {
    async fn new(
        window: Arc<Window>,
        mesh: &VoxelMesh,
        bounds: &Bounds,
        viewer: &ViewerConfig,
    ) -> Result<Self> {
        log::info!("[GpuState::new] Starting GPU initialization");
        let init_start = Instant::now();

        let size = window.inner_size();
        log::debug!(
            "[GpuState::new] Window size: {}x{}",
            size.width,
            size.height
        );

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).map_err(|e| {
            log::error!("[GpuState::new] Failed to create surface: {}", e);
            anyhow!("Surface creation failed: {}", e)
        })?;

        let mut adapter_options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        };

        let adapter = match instance.request_adapter(&adapter_options).await {
            Some(adapter) => adapter,
            None => {
                log::warn!(
                    "[GpuState::new] No hardware adapter found, trying fallback..."
                );
                adapter_options.force_fallback_adapter = true;
                instance
                    .request_adapter(&adapter_options)
                    .await
                    .ok_or_else(|| anyhow!("No GPU adapter available"))?
            }
        };

        let info = adapter.get_info();
        log::info!(
            "[GpuState::new] Adapter: {} ({:?}, {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Voxel Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| anyhow!("Device request failed: {}", e))?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("[GPU] Uncaptured device error: {:?}", error);
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface is incompatible with the adapter"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::debug!("[GpuState::new] Surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let home_camera = camera::init_orbit_camera(bounds, config.width, config.height);
        let camera_uniform = camera::build_camera_uniform(&home_camera);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Voxel Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/voxel.wgsl").into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let mesh = if mesh.is_empty() {
            log::warn!("[GpuState::new] Grid has no filled cells, nothing to draw");
            None
        } else {
            Some(MeshBuffers {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Voxel Vertex Buffer"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Voxel Index Buffer"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
            })
        };

        let [r, g, b] = viewer.background;
        log::info!("[GpuState::new] GPU ready in {:?}", init_start.elapsed());

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            render_pipeline,
            camera_buffer,
            camera_bind_group,
            mesh,
            camera: home_camera,
            home_camera,
            background: wgpu::Color { r, g, b, a: 1.0 },
            frames_rendered: 0,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let max_dimension = self.device.limits().max_texture_dimension_2d;
        let (width, height, was_clamped) =
            validate_texture_dimensions(new_size.width, new_size.height, max_dimension);
        if was_clamped {
            log::warn!(
                "[GpuState::resize] Window {}x{} exceeds GPU texture limit {}, clamping",
                new_size.width,
                new_size.height,
                max_dimension
            );
        }

        self.size = winit::dpi::PhysicalSize::new(width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config);
        self.camera = camera::update_aspect_ratio(&self.camera, width, height);
        self.home_camera = camera::update_aspect_ratio(&self.home_camera, width, height);
    }

    fn reset_camera(&mut self) {
        self.camera = self.home_camera;
        log::debug!("[GpuState] Camera reset");
    }

    fn update_camera(&mut self, input: &mut InputState) {
        let ((dx, dy), scroll) = input.take_motion();
        if dx != 0.0 || dy != 0.0 {
            self.camera = camera::orbit(&self.camera, dx, dy);
        }
        if scroll != 0.0 {
            self.camera = camera::zoom(&self.camera, scroll);
        }

        let uniform: CameraUniform = camera::build_camera_uniform(&self.camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
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
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(mesh) = &self.mesh {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.frames_rendered += 1;
        log::trace!(
            "[GpuState::render] Frame {} presented",
            self.frames_rendered
        );
        Ok(())
    }
}

/// Clamp texture dimensions to GPU limits.
/// Returns (clamped_width, clamped_height, was_clamped)
fn validate_texture_dimensions(
    requested_width: u32,
    requested_height: u32,
    max_dimension: u32,
) -> (u32, u32, bool) {
    let clamped_width = requested_width.min(max_dimension);
    let clamped_height = requested_height.min(max_dimension);
    let was_clamped = clamped_width != requested_width || clamped_height != requested_height;

    (clamped_width, clamped_height, was_clamped)
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let max_dimension = device.limits().max_texture_dimension_2d;
    let (width, height, was_clamped) =
        validate_texture_dimensions(config.width, config.height, max_dimension);

    if was_clamped {
        log::warn!(
            "[create_depth_texture] Texture dimensions clamped from {}x{} to {}x{} (max: {})",
            config.width,
            config.height,
            width,
            height,
            max_dimension
        );
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Open the window and run until it is closed.
///
/// Frame intervals are recorded when a performance log is configured and
/// written once the event loop has exited.
pub async fn run_app(
    event_loop: EventLoop<()>,
    mesh: VoxelMesh,
    bounds: Bounds,
    viewer: &ViewerConfig,
) -> Result<()> {
    log::info!("[gpu_state::run_app] Creating window...");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&viewer.title)
            .with_inner_size(LogicalSize::new(viewer.width, viewer.height))
            .build(&event_loop)
            .map_err(|e| {
                log::error!("[gpu_state::run_app] Window creation failed: {}", e);
                e
            })?,
    );

    let mut gpu_state = GpuState::new(window, &mesh, &bounds, viewer).await?;
    drop(mesh);

    let mut input_state = InputState::new();
    let mut perf_log = PerformanceLog::new();
    let record_frames = viewer.performance_log.is_some();
    let mut last_frame: Option<Instant> = None;

    gpu_state.window.request_redraw();

    let perf = &mut perf_log;
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == gpu_state.window.id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(physical_size) => {
                gpu_state.resize(*physical_size);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        gpu_state.reset_camera();
                        input_state.reset_mouse_tracking();
                    }
                    _ => {}
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                input_state.process_mouse_button(*button, *state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                input_state.process_cursor_moved((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                input_state.process_scroll(*delta);
            }
            WindowEvent::Focused(false) => {
                input_state.reset_mouse_tracking();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(previous) = last_frame {
                    if record_frames {
                        perf.record(now - previous);
                    }
                }
                last_frame = Some(now);

                gpu_state.update_camera(&mut input_state);

                match gpu_state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => gpu_state.resize(gpu_state.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("[gpu_state::run_app] Out of GPU memory");
                        elwt.exit();
                    }
                    Err(e) => log::warn!("[gpu_state::run_app] Render error: {:?}", e),
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            gpu_state.window.request_redraw();
        }
        _ => {}
    })?;

    if let Some(path) = &viewer.performance_log {
        perf_log.write_csv(path)?;
    }

    log::info!("[gpu_state::run_app] Viewer closed");
    Ok(())
}
