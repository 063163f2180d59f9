//! Interactive visualization of frame trees
//!
//! This crate opens a window and draws registered frames with wgpu and winit:
//! - Orbit camera with mouse controls (left drag orbits, right drag pans,
//!   scroll zooms, R resets)
//! - One draw per registered frame at its current world pose
//! - Axis markers for frames without geometry

pub mod camera;
pub mod controller;
pub mod viewer;

pub use camera::*;
pub use controller::*;
pub use viewer::*;

use framecrate_core::{FrameRef, Result};

/// Show a single frame in an interactive viewer, blocking until it closes
pub fn show(frame: &FrameRef) -> Result<()> {
    let mut viewer = Viewer::new()?;
    viewer.add_frame(frame);
    viewer.run()
}

/// Show `root` and all of its descendants, blocking until the viewer closes
pub fn show_tree(root: &FrameRef) -> Result<()> {
    let mut viewer = Viewer::new()?;
    viewer.add_frame_tree(root);
    viewer.run()
}
