//! Core data structures for framecrate
//!
//! This crate provides the transform tree: rigid poses, named frames that own
//! their children and reference their parent weakly, and the mesh geometry a
//! frame can carry for display.

pub mod error;
pub mod frame;
pub mod mesh;
pub mod pose;

pub use error::*;
pub use frame::*;
pub use mesh::*;
pub use pose::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, Unit, UnitQuaternion, Vector3};
