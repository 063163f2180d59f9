//! Interactive frame viewer
//!
//! A [`Viewer`] owns the window, the GPU context and one render slot per
//! registered frame. Slots keep a shared handle to their frame, so pose edits
//! made before [`Viewer::run`] show up in the first rendered image. World
//! matrices are recomputed from the tree on every redraw.

use std::sync::Arc;

use framecrate_core::{Error, FrameMesh, FrameRef, Point3, Result};
use framecrate_gpu::{DepthBuffer, FramePipelines, GpuContext, GpuMesh, TransformUniform};
use nalgebra::Matrix4;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use crate::camera::{OrbitCamera, OrbitSettings};
use crate::controller::{CameraController, PointerButton};

/// Window and rendering settings
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: [f64; 4],
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Length of the axis marker drawn for frames without geometry
    pub axis_length: f32,
    pub orbit: OrbitSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "framecrate viewer".to_string(),
            width: 1280,
            height: 720,
            background_color: [0.1, 0.1, 0.1, 1.0],
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            axis_length: 1.0,
            orbit: OrbitSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Orbit camera configured with this projection and these settings
    pub fn camera(&self) -> OrbitCamera {
        let mut camera = OrbitCamera::new(self.orbit);
        camera.fov_y = self.fov_y_degrees.to_radians();
        camera.near = self.near;
        camera.far = self.far;
        camera
    }
}

/// Red, green and blue line segments along the local X, Y and Z axes
pub fn axis_marker(length: f32) -> FrameMesh {
    let origin = Point3::origin();
    FrameMesh::line_segments(vec![
        origin,
        Point3::new(length, 0.0, 0.0),
        origin,
        Point3::new(0.0, length, 0.0),
        origin,
        Point3::new(0.0, 0.0, length),
    ])
    .with_colors(vec![
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
    ])
}

/// Mesh drawn for a slot: its own when valid, the axis marker otherwise
fn mesh_or_fallback<'a>(mesh: &'a GpuMesh, fallback: &'a GpuMesh) -> &'a GpuMesh {
    if mesh.is_valid() {
        mesh
    } else {
        fallback
    }
}

fn aspect_ratio(size: PhysicalSize<u32>) -> f32 {
    if size.height == 0 {
        1.0
    } else {
        size.width as f32 / size.height as f32
    }
}

/// One registered frame and the GPU resources drawn for it
struct FrameSlot {
    frame: FrameRef,
    mesh: GpuMesh,
    transform: TransformUniform,
}

/// Everything the event loop needs; dropped when the loop ends
struct ViewerState {
    // Field order is drop order: GPU objects go before the surface and device
    slots: Vec<FrameSlot>,
    fallback_axes: GpuMesh,
    depth: DepthBuffer,
    pipelines: FramePipelines,
    surface_config: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    gpu: GpuContext,
    window: Arc<Window>,
    controller: CameraController,
    background: wgpu::Color,
}

impl ViewerState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let (gpu, surface) = GpuContext::with_surface(window.clone()).await?;

        let surface_caps = surface.get_capabilities(&gpu.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Visualization("Surface reports no supported formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let pipelines = FramePipelines::new(&gpu, surface_format)?;
        let depth = DepthBuffer::new(&gpu.device, surface_config.width, surface_config.height);
        let fallback_axes = GpuMesh::upload(&gpu, &axis_marker(config.axis_length), "fallback axes");

        log::info!(
            "Viewer ready: {}x{} surface, format {:?}",
            surface_config.width,
            surface_config.height,
            surface_format
        );

        let [r, g, b, a] = config.background_color;
        Ok(Self {
            slots: Vec::new(),
            fallback_axes,
            depth,
            pipelines,
            surface_config,
            surface,
            gpu,
            window,
            controller: CameraController::new(config.camera()),
            background: wgpu::Color { r, g, b, a },
        })
    }

    fn add_frame(&mut self, frame: &FrameRef) {
        let name = frame.name();
        let mesh = GpuMesh::upload(&self.gpu, &frame.mesh(), &name);
        let transform = TransformUniform::new(&self.gpu, &self.pipelines.bind_group_layout, &name);

        match mesh.draw_call() {
            Some(call) => log::debug!("Registered frame '{}' ({:?}, {} elements)", name, call.mode, call.count),
            None => log::debug!("Registered frame '{}' without geometry, drawing axes", name),
        }

        self.slots.push(FrameSlot {
            frame: frame.clone(),
            mesh,
            transform,
        });
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.gpu.device, &self.surface_config);
        if self.depth.size() != (size.width, size.height) {
            self.depth = DepthBuffer::new(&self.gpu.device, size.width, size.height);
        }
    }

    fn render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let window_size = self.window.inner_size();
        if window_size.width == 0 || window_size.height == 0 {
            // Minimized
            return Ok(());
        }

        let size = PhysicalSize::new(self.surface_config.width, self.surface_config.height);
        let camera = self.controller.camera();
        let view_projection: Matrix4<f32> = camera.projection_matrix(aspect_ratio(size)) * camera.view_matrix();

        for slot in &self.slots {
            let model = slot.frame.world_matrix();
            slot.transform.write(&self.gpu.queue, &(view_projection * model));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for slot in &self.slots {
                render_pass.set_bind_group(0, slot.transform.bind_group(), &[]);
                mesh_or_fallback(&slot.mesh, &self.fallback_axes).draw(&mut render_pass, &self.pipelines);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent, target: &EventLoopWindowTarget<()>) {
        if event.state != ElementState::Pressed {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => target.exit(),
            Key::Character(c) => match c.as_str() {
                "q" | "Q" => target.exit(),
                "r" | "R" => {
                    self.controller.reset();
                    log::debug!("Camera reset");
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => target.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, target),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    _ => return,
                };
                self.controller.on_button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.controller.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.controller.on_cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.controller.on_scroll(amount);
            }
            WindowEvent::RedrawRequested => match self.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    self.resize(self.window.inner_size());
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory");
                    target.exit();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::warn!("Timeout");
                }
            },
            _ => {}
        }
    }
}

impl Drop for ViewerState {
    fn drop(&mut self) {
        // Release slots newest first
        while let Some(slot) = self.slots.pop() {
            log::trace!("Releasing slot for frame '{}'", slot.frame.name());
        }
    }
}

/// Interactive 3D viewer for frame trees
pub struct Viewer {
    event_loop: EventLoop<()>,
    state: ViewerState,
}

impl Viewer {
    /// Create a viewer with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ViewerConfig::default())
    }

    /// Open the window and initialize the GPU.
    ///
    /// Fails when the windowing system, the GPU or the frame shader cannot be
    /// initialized. No partially built viewer is ever returned.
    pub fn with_config(config: ViewerConfig) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.title.as_str())
                .with_inner_size(LogicalSize::new(config.width, config.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let state = pollster::block_on(ViewerState::new(window, &config))?;
        Ok(Self { event_loop, state })
    }

    /// Register a frame for drawing.
    ///
    /// The frame's mesh is uploaded now; later mesh changes are not picked
    /// up, pose changes are. Registering the same frame twice draws it twice.
    pub fn add_frame(&mut self, frame: &FrameRef) {
        self.state.add_frame(frame);
    }

    /// Register `root` and every frame below it
    pub fn add_frame_tree(&mut self, root: &FrameRef) {
        for frame in root.descendants() {
            self.state.add_frame(&frame);
        }
    }

    /// Number of registered frames
    pub fn frame_count(&self) -> usize {
        self.state.slots.len()
    }

    /// Run the render loop until the window is closed or Escape/Q is pressed
    pub fn run(self) -> Result<()> {
        let Viewer {
            event_loop,
            mut state,
        } = self;

        log::info!("Running viewer with {} frames", state.slots.len());
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run(move |event, target| match event {
                Event::WindowEvent { event, .. } => state.handle_window_event(event, target),
                Event::AboutToWait => state.window.request_redraw(),
                _ => {}
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))
    }
}
