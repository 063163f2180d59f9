//! # framecrate GPU
//!
//! wgpu resources for drawing frames: the device context, one-shot mesh
//! uploads, the per-draw transform uniform and the triangle/line pipelines
//! that share the frame shader.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use framecrate_core::{FrameMesh, Point3};
//! use framecrate_gpu::{GpuContext, GpuMesh};
//!
//! async fn example() -> framecrate_core::Result<()> {
//!     let context = GpuContext::new().await?;
//!     let axis = FrameMesh::line_segments(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
//!     let mesh = GpuMesh::upload(&context, &axis, "x axis");
//!     assert!(mesh.is_valid());
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod mesh;
pub mod pipeline;
pub mod uniform;

// Re-export commonly used items
pub use device::GpuContext;
pub use mesh::{ColorVertex, DrawCall, DrawMode, GpuMesh, MeshGeometry};
pub use pipeline::{DepthBuffer, FramePipelines, DEPTH_FORMAT, FRAME_SHADER};
pub use uniform::{TransformData, TransformUniform};
