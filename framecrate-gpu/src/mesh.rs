//! GPU-side frame geometry
//!
//! [`MeshGeometry`] turns a frame's vertices, faces and colors into the
//! interleaved records and flat index list the frame shader consumes. It is
//! plain data, so it can be built and inspected without a device.
//! [`GpuMesh`] owns the uploaded buffers.

use bytemuck::{Pod, Zeroable};
use framecrate_core::FrameMesh;
use nalgebra::Point3;

use crate::device::GpuContext;
use crate::pipeline::FramePipelines;

/// Interleaved vertex record: position followed by color, 6 floats
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub fn new(position: &Point3<f32>, color: [f32; 3]) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            color,
        }
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Primitive type a mesh is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Indexed triangle list
    Triangles,
    /// Non-indexed line list, consecutive vertex pairs
    Lines,
}

/// The single draw call issued for a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub mode: DrawMode,
    /// Index count for triangles, vertex count for lines
    pub count: u32,
}

/// CPU-side, render-ready geometry
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<ColorVertex>,
    pub indices: Vec<u32>,
    pub mode: DrawMode,
}

impl MeshGeometry {
    /// Build interleaved geometry.
    ///
    /// Returns `None` when there are no vertices. Vertex `i` takes
    /// `colors[i]` when present and `fallback_color` otherwise. A non-empty
    /// `faces` list yields a triangle mesh with three indices per face, an
    /// empty one a line list over the vertices as given.
    pub fn build(
        vertices: &[Point3<f32>],
        faces: &[[u32; 3]],
        colors: &[[f32; 3]],
        fallback_color: [f32; 3],
    ) -> Option<Self> {
        if vertices.is_empty() {
            return None;
        }

        let records = vertices
            .iter()
            .enumerate()
            .map(|(i, vertex)| {
                let color = colors.get(i).copied().unwrap_or(fallback_color);
                ColorVertex::new(vertex, color)
            })
            .collect();

        if faces.is_empty() {
            if vertices.len() % 2 != 0 {
                log::warn!(
                    "Line set has an odd vertex count ({}); the last vertex is ignored",
                    vertices.len()
                );
            }
            return Some(Self {
                vertices: records,
                indices: Vec::new(),
                mode: DrawMode::Lines,
            });
        }

        let vertex_count = vertices.len() as u32;
        if faces.iter().flatten().any(|&index| index >= vertex_count) {
            log::warn!(
                "Mesh faces reference vertices beyond the {} supplied",
                vertex_count
            );
        }

        Some(Self {
            vertices: records,
            indices: faces.iter().flatten().copied().collect(),
            mode: DrawMode::Triangles,
        })
    }

    /// Build geometry from a frame's mesh
    pub fn from_frame_mesh(mesh: &FrameMesh) -> Option<Self> {
        Self::build(&mesh.vertices, &mesh.faces, &mesh.colors, mesh.fallback_color)
    }

    pub fn draw_call(&self) -> DrawCall {
        let count = match self.mode {
            DrawMode::Triangles => self.indices.len(),
            DrawMode::Lines => self.vertices.len(),
        };
        DrawCall {
            mode: self.mode,
            count: count as u32,
        }
    }
}

struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    draw_call: DrawCall,
}

/// Uploaded geometry for one registered frame.
///
/// Exclusively owns its buffers: the type is move-only and releases the
/// buffers exactly once when dropped. A mesh built from no vertices stays
/// invalid and drawing it does nothing.
#[derive(Default)]
pub struct GpuMesh {
    buffers: Option<MeshBuffers>,
}

impl GpuMesh {
    /// An invalid mesh that owns no buffers
    pub fn empty() -> Self {
        Self { buffers: None }
    }

    /// Upload a frame's mesh; the result never changes afterwards
    pub fn upload(context: &GpuContext, mesh: &FrameMesh, label: &str) -> Self {
        match MeshGeometry::from_frame_mesh(mesh) {
            Some(geometry) => Self::from_geometry(context, &geometry, label),
            None => Self::empty(),
        }
    }

    pub fn from_geometry(context: &GpuContext, geometry: &MeshGeometry, label: &str) -> Self {
        let vertex_buffer = context.create_buffer_init(
            &format!("{} vertex buffer", label),
            &geometry.vertices,
            wgpu::BufferUsages::VERTEX,
        );

        let index_buffer = match geometry.mode {
            DrawMode::Triangles => Some(context.create_buffer_init(
                &format!("{} index buffer", label),
                &geometry.indices,
                wgpu::BufferUsages::INDEX,
            )),
            DrawMode::Lines => None,
        };

        Self {
            buffers: Some(MeshBuffers {
                vertex_buffer,
                index_buffer,
                draw_call: geometry.draw_call(),
            }),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.buffers.is_some()
    }

    /// The draw call this mesh issues, `None` when invalid
    pub fn draw_call(&self) -> Option<DrawCall> {
        self.buffers.as_ref().map(|buffers| buffers.draw_call)
    }

    /// Record exactly one draw into `pass`, or nothing when invalid.
    ///
    /// The transform bind group must already be set on the pass.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, pipelines: &'a FramePipelines) {
        let Some(buffers) = &self.buffers else {
            return;
        };

        pass.set_pipeline(pipelines.pipeline(buffers.draw_call.mode));
        pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
        match &buffers.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..buffers.draw_call.count, 0, 0..1);
            }
            None => pass.draw(0..buffers.draw_call.count, 0..1),
        }
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            log::trace!("Releasing mesh buffers ({:?})", buffers.draw_call);
            buffers.vertex_buffer.destroy();
            if let Some(index_buffer) = buffers.index_buffer {
                index_buffer.destroy();
            }
        }
    }
}
