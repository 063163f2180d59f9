//! GPU mesh upload tests
//!
//! These need an adapter; they are skipped on machines without one.

use framecrate_core::{FrameMesh, Point3};
use framecrate_gpu::{DrawCall, DrawMode, FramePipelines, GpuContext, GpuMesh, TransformUniform};

/// Try to create a GPU context, return None if not available
fn try_create_gpu_context() -> Option<GpuContext> {
    match pollster::block_on(GpuContext::new()) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            println!("GPU not available, skipping GPU-dependent test: {}", e);
            None
        }
    }
}

fn unit_square() -> FrameMesh {
    FrameMesh::from_vertices_and_faces(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [2, 3, 0]],
    )
}

#[test]
fn test_upload_triangle_mesh() {
    let Some(gpu) = try_create_gpu_context() else {
        return;
    };

    let mesh = GpuMesh::upload(&gpu, &unit_square(), "square");
    assert!(mesh.is_valid());
    assert_eq!(
        mesh.draw_call(),
        Some(DrawCall {
            mode: DrawMode::Triangles,
            count: 6
        })
    );
}

#[test]
fn test_upload_line_set() {
    let Some(gpu) = try_create_gpu_context() else {
        return;
    };

    let axes = FrameMesh::line_segments(vec![
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
        Point3::origin(),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    let mesh = GpuMesh::upload(&gpu, &axes, "axes");
    assert_eq!(
        mesh.draw_call(),
        Some(DrawCall {
            mode: DrawMode::Lines,
            count: 4
        })
    );
}

#[test]
fn test_upload_without_vertices_stays_invalid() {
    let Some(gpu) = try_create_gpu_context() else {
        return;
    };

    let mesh = GpuMesh::upload(&gpu, &FrameMesh::new(), "empty");
    assert!(!mesh.is_valid());
    assert_eq!(mesh.draw_call(), None);
}

#[test]
fn test_moved_mesh_keeps_buffers() {
    let Some(gpu) = try_create_gpu_context() else {
        return;
    };

    let mut slots = Vec::new();
    let mesh = GpuMesh::upload(&gpu, &unit_square(), "square");
    slots.push(mesh);
    let taken = std::mem::take(&mut slots[0]);

    assert!(taken.is_valid());
    assert!(!slots[0].is_valid());
}

#[test]
fn test_frame_shader_compiles() {
    let Some(gpu) = try_create_gpu_context() else {
        return;
    };

    let pipelines = FramePipelines::new(&gpu, wgpu::TextureFormat::Bgra8UnormSrgb)
        .expect("frame shader should validate");
    let _uniform = TransformUniform::new(&gpu, &pipelines.bind_group_layout, "test");
}
