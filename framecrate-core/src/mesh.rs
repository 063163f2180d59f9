//! Geometry attached to a frame

use nalgebra::{Point3, Vector3};

/// Default solid color for vertices without an explicit color
pub const DEFAULT_FRAME_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Mesh geometry expressed in a frame's local coordinates.
///
/// With an empty `faces` list the vertices are read as consecutive
/// line-segment endpoint pairs. `normals` and `colors` are per-vertex and may
/// be shorter than `vertices`; vertices past the end of `colors` use
/// `fallback_color`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[u32; 3]>,
    pub normals: Vec<Vector3<f32>>,
    pub colors: Vec<[f32; 3]>,
    pub fallback_color: [f32; 3],
}

impl FrameMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            fallback_color: DEFAULT_FRAME_COLOR,
        }
    }

    /// Create a triangle mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3<f32>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::new()
        }
    }

    /// Create a line set; `endpoints` holds segment start/end pairs
    pub fn line_segments(endpoints: Vec<Point3<f32>>) -> Self {
        Self {
            vertices: endpoints,
            ..Self::new()
        }
    }

    pub fn with_colors(mut self, colors: Vec<[f32; 3]>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_normals(mut self, normals: Vec<Vector3<f32>>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_fallback_color(mut self, color: [f32; 3]) -> Self {
        self.fallback_color = color;
        self
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh without vertices has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when the vertices describe line segments rather than triangles
    pub fn is_line_set(&self) -> bool {
        !self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Color of vertex `index`, falling back to the solid color
    pub fn vertex_color(&self, index: usize) -> [f32; 3] {
        self.colors.get(index).copied().unwrap_or(self.fallback_color)
    }
}

impl Default for FrameMesh {
    fn default() -> Self {
        Self::new()
    }
}
