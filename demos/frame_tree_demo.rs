//! A small arm built from frames: a base, two links and a tool tip.
//!
//! Run with `RUST_LOG=debug cargo run --bin frame_tree_demo` to see each
//! registered frame logged.

use anyhow::Result;
use framecrate_core::{Frame, FrameMesh, FrameRef, Point3, Unit, Vector3};
use nalgebra::UnitQuaternion;

/// Thin box between z = 0 and z = `length`, for drawing a link
fn link_mesh(length: f32, half_width: f32, color: [f32; 3]) -> FrameMesh {
    let w = half_width;
    let vertices = vec![
        Point3::new(-w, -w, 0.0),
        Point3::new(w, -w, 0.0),
        Point3::new(w, w, 0.0),
        Point3::new(-w, w, 0.0),
        Point3::new(-w, -w, length),
        Point3::new(w, -w, length),
        Point3::new(w, w, length),
        Point3::new(-w, w, length),
    ];
    #[rustfmt::skip]
    let faces = vec![
        [0, 2, 1], [0, 3, 2], // bottom
        [4, 5, 6], [4, 6, 7], // top
        [0, 1, 5], [0, 5, 4],
        [1, 2, 6], [1, 6, 5],
        [2, 3, 7], [2, 7, 6],
        [3, 0, 4], [3, 4, 7],
    ];
    FrameMesh::from_vertices_and_faces(vertices, faces).with_fallback_color(color)
}

/// Tetrahedron with one color per corner
fn tip_mesh(size: f32) -> FrameMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, size),
        Point3::new(size, 0.0, 0.0),
        Point3::new(-0.5 * size, 0.87 * size, 0.0),
        Point3::new(-0.5 * size, -0.87 * size, 0.0),
    ];
    let faces = vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]];
    FrameMesh::from_vertices_and_faces(vertices, faces).with_colors(vec![
        [1.0, 1.0, 0.0],
        [1.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
    ])
}

fn build_arm() -> Result<FrameRef> {
    let base = Frame::new("base");
    base.set_mesh(link_mesh(0.3, 0.4, [0.35, 0.35, 0.4]));

    let shoulder = Frame::new("shoulder");
    shoulder.set_translation(Vector3::new(0.0, 0.0, 0.3));
    shoulder.rotate(&Vector3::y_axis(), 0.6);
    shoulder.set_mesh(link_mesh(1.5, 0.1, [0.9, 0.45, 0.1]));

    let elbow = Frame::new("elbow");
    elbow.set_translation(Vector3::new(0.0, 0.0, 1.5));
    let bend = UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::new(0.0, 1.0, 0.2)), -1.1);
    elbow.set_quaternion([bend.w, bend.i, bend.j, bend.k])?;
    elbow.set_mesh(link_mesh(1.0, 0.08, [0.1, 0.55, 0.9]));

    let tool = Frame::new("tool");
    tool.set_translation(Vector3::new(0.0, 0.0, 1.0));
    tool.set_mesh(tip_mesh(0.2));

    // No mesh: drawn as an axis marker
    let camera_mount = Frame::new("camera_mount");
    camera_mount.set_translation(Vector3::new(0.15, 0.0, 0.5));

    base.add_child(shoulder.clone());
    shoulder.add_child(elbow.clone());
    elbow.add_child(tool.clone());
    elbow.add_child(camera_mount);

    log::info!("Tool tip at {:?}", tool.world_translation());
    Ok(base)
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let arm = build_arm()?;
    for frame in arm.descendants() {
        log::info!("{}", frame);
    }

    // The base also turns in the world before the viewer opens
    arm.rotate(&Vector3::z_axis(), std::f32::consts::FRAC_PI_6);

    framecrate_visualization::show_tree(&arm)?;
    Ok(())
}
