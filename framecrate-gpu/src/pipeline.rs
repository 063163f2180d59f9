//! Render pipelines for frame geometry

use framecrate_core::{Error, Result};

use crate::device::GpuContext;
use crate::mesh::{ColorVertex, DrawMode};
use crate::uniform::TransformUniform;

/// WGSL source of the frame shader
pub const FRAME_SHADER: &str = include_str!("shaders/frame.wgsl");

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Triangle and line pipelines sharing the frame shader and transform layout
pub struct FramePipelines {
    pub bind_group_layout: wgpu::BindGroupLayout,
    triangles: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
}

impl FramePipelines {
    /// Compile the frame shader and build both pipelines.
    ///
    /// Shader compilation and pipeline validation run inside an error scope,
    /// so a broken shader is reported as [`Error::Shader`] instead of being
    /// left to the device's uncaptured error handler.
    pub fn new(context: &GpuContext, surface_format: wgpu::TextureFormat) -> Result<Self> {
        let device = &context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = context.create_shader_module("Frame Shader", FRAME_SHADER);
        let bind_group_layout = TransformUniform::bind_group_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Frame Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let triangles = Self::create_render_pipeline(
            device,
            &layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            "Triangle",
        );
        let lines = Self::create_render_pipeline(
            device,
            &layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            "Line",
        );

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::Shader(error.to_string()));
        }

        Ok(Self {
            bind_group_layout,
            triangles,
            lines,
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
        label: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Frame Pipeline", label)),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[ColorVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Frame meshes come with arbitrary winding
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    /// Pipeline matching a mesh's draw mode
    pub fn pipeline(&self, mode: DrawMode) -> &wgpu::RenderPipeline {
        match mode {
            DrawMode::Triangles => &self.triangles,
            DrawMode::Lines => &self.lines,
        }
    }
}

/// Depth attachment sized to the surface
pub struct DepthBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}
