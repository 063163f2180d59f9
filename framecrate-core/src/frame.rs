//! Named coordinate frames arranged in a transform tree
//!
//! Parents own their children through strong [`Rc`] handles while every child
//! keeps only a [`Weak`] back-reference, so a tree never forms a reference
//! cycle. World poses are recomputed on every query by walking up to the root.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use nalgebra::{Matrix3, Matrix4, Unit, Vector3};

use crate::mesh::FrameMesh;
use crate::pose::Pose;
use crate::Result;

/// Shared handle to a frame
pub type FrameRef = Rc<Frame>;

/// A named node in a transform tree
pub struct Frame {
    name: RefCell<String>,
    local_pose: Cell<Pose>,
    mesh: RefCell<FrameMesh>,
    parent: RefCell<Weak<Frame>>,
    children: RefCell<Vec<FrameRef>>,
}

impl Frame {
    /// Create a root frame with an identity pose
    pub fn new(name: impl Into<String>) -> FrameRef {
        Self::with_pose(name, Pose::identity())
    }

    /// Create a root frame with an initial local pose
    pub fn with_pose(name: impl Into<String>, pose: Pose) -> FrameRef {
        Rc::new(Self {
            name: RefCell::new(name.into()),
            local_pose: Cell::new(pose),
            mesh: RefCell::new(FrameMesh::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
    }

    /// The parent frame, if it is still alive
    pub fn parent(&self) -> Option<FrameRef> {
        self.parent.borrow().upgrade()
    }

    /// Children in insertion order
    pub fn children(&self) -> Vec<FrameRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Attach `child` below this frame.
    ///
    /// `None` is ignored. The child's parent link is overwritten and the child
    /// is appended even if it is already attached here; callers must not
    /// attach an ancestor, which would create a cycle.
    pub fn add_child(self: &Rc<Self>, child: impl Into<Option<FrameRef>>) {
        let Some(child) = child.into() else {
            return;
        };
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
    }

    pub fn local_pose(&self) -> Pose {
        self.local_pose.get()
    }

    pub fn set_local_pose(&self, pose: Pose) {
        self.local_pose.set(pose);
    }

    fn update_pose(&self, update: impl FnOnce(&mut Pose)) {
        let mut pose = self.local_pose.get();
        update(&mut pose);
        self.local_pose.set(pose);
    }

    /// Local pose as a homogeneous matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        self.local_pose().matrix()
    }

    pub fn set_matrix(&self, matrix: &Matrix4<f32>) {
        self.set_local_pose(Pose::from_matrix(matrix));
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.local_pose().translation()
    }

    pub fn set_translation(&self, translation: Vector3<f32>) {
        self.update_pose(|pose| pose.set_translation(translation));
    }

    pub fn rotation(&self) -> Matrix3<f32> {
        self.local_pose().rotation_matrix()
    }

    pub fn set_rotation(&self, rotation: &Matrix3<f32>) {
        self.update_pose(|pose| pose.set_rotation_matrix(rotation));
    }

    /// Local rotation as `[w, x, y, z]`
    pub fn quaternion(&self) -> [f32; 4] {
        self.local_pose().quaternion_wxyz()
    }

    pub fn set_quaternion(&self, wxyz: [f32; 4]) -> Result<()> {
        let mut pose = self.local_pose();
        pose.set_quaternion_wxyz(wxyz)?;
        self.set_local_pose(pose);
        Ok(())
    }

    /// Move the frame by `delta` expressed in the parent's axes
    pub fn translate(&self, delta: Vector3<f32>) {
        self.update_pose(|pose| pose.pretranslate(delta));
    }

    /// Rotate the frame about `axis` expressed in its own axes
    pub fn rotate(&self, axis: &Unit<Vector3<f32>>, angle: f32) {
        self.update_pose(|pose| pose.rotate(axis, angle));
    }

    /// Pose relative to the root of the tree.
    ///
    /// Composes local poses from the root down to this frame; nothing is
    /// cached, so pose edits anywhere above are visible immediately.
    pub fn world_pose(&self) -> Pose {
        let mut pose = self.local_pose();
        let mut ancestor = self.parent();
        while let Some(frame) = ancestor {
            pose = frame.local_pose() * pose;
            ancestor = frame.parent();
        }
        pose
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world_pose().matrix()
    }

    pub fn world_translation(&self) -> Vector3<f32> {
        self.world_pose().translation()
    }

    pub fn world_rotation(&self) -> Matrix3<f32> {
        self.world_pose().rotation_matrix()
    }

    /// World rotation as `[w, x, y, z]`
    pub fn world_quaternion(&self) -> [f32; 4] {
        self.world_pose().quaternion_wxyz()
    }

    pub fn mesh(&self) -> Ref<'_, FrameMesh> {
        self.mesh.borrow()
    }

    pub fn set_mesh(&self, mesh: FrameMesh) {
        *self.mesh.borrow_mut() = mesh;
    }

    /// This frame followed by all of its descendants, depth-first
    pub fn descendants(self: &Rc<Self>) -> Vec<FrameRef> {
        let mut out = Vec::new();
        let mut stack = vec![Rc::clone(self)];
        while let Some(frame) = stack.pop() {
            stack.extend(frame.children.borrow().iter().rev().cloned());
            out.push(frame);
        }
        out
    }

    /// First frame named `name` in this subtree, depth-first
    pub fn find(self: &Rc<Self>, name: &str) -> Option<FrameRef> {
        self.descendants()
            .into_iter()
            .find(|frame| *frame.name.borrow() == name)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = self
            .parent()
            .map(|p| p.name())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "Frame(name={}, parent={}, children={})",
            self.name.borrow(),
            parent,
            self.child_count()
        )
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("name", &*self.name.borrow())
            .field("local_pose", &self.local_pose())
            .field("parent", &self.parent().map(|p| p.name()))
            .field("children", &self.child_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_root_world_pose_is_local_pose() {
        let pose = Pose::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let root = Frame::with_pose("root", pose);
        assert_eq!(root.world_pose(), pose);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_add_none_is_noop() {
        let root = Frame::new("root");
        root.add_child(None::<FrameRef>);
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_add_child_links_parent() {
        let root = Frame::new("root");
        let child = Frame::new("child");
        root.add_child(Rc::clone(&child));

        assert_eq!(root.child_count(), 1);
        let parent = child.parent().expect("child should have a parent");
        assert!(Rc::ptr_eq(&parent, &root));
        assert!(Rc::ptr_eq(&root.children()[0], &child));
    }

    #[test]
    fn test_duplicate_add_appends_twice() {
        let root = Frame::new("root");
        let child = Frame::new("child");
        root.add_child(Rc::clone(&child));
        root.add_child(Rc::clone(&child));
        assert_eq!(root.child_count(), 2);
    }

    #[test]
    fn test_child_follows_parent_translation() {
        let root = Frame::new("root");
        let child = Frame::with_pose("child", Pose::from_translation(Vector3::new(1.0, 0.0, 0.0)));
        root.add_child(Rc::clone(&child));
        root.set_translation(Vector3::new(0.0, 2.0, 0.0));

        assert_relative_eq!(child.world_translation(), Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_parent_dropped_leaves_root() {
        let child = Frame::new("child");
        {
            let root = Frame::new("root");
            root.add_child(Rc::clone(&child));
            assert!(child.parent().is_some());
        }
        assert!(child.parent().is_none());
        assert_eq!(child.world_pose(), child.local_pose());
    }

    #[test]
    fn test_dropping_root_frees_subtree() {
        let root = Frame::new("root");
        let child = Frame::new("child");
        root.add_child(Rc::clone(&child));
        let weak_child = Rc::downgrade(&child);
        drop(child);

        assert!(weak_child.upgrade().is_some());
        drop(root);
        assert!(weak_child.upgrade().is_none());
    }

    #[test]
    fn test_display() {
        let root = Frame::new("base");
        let link = Frame::new("link_1");
        root.add_child(Rc::clone(&link));

        assert_eq!(root.to_string(), "Frame(name=base, parent=None, children=1)");
        assert_eq!(link.to_string(), "Frame(name=link_1, parent=base, children=0)");
    }

    #[test]
    fn test_rename() {
        let frame = Frame::new("a");
        frame.set_name("b");
        assert_eq!(frame.name(), "b");
    }

    #[test]
    fn test_descendants_preorder_and_find() {
        let root = Frame::new("root");
        let a = Frame::new("a");
        let b = Frame::new("b");
        let a1 = Frame::new("a1");
        root.add_child(Rc::clone(&a));
        root.add_child(Rc::clone(&b));
        a.add_child(Rc::clone(&a1));

        let names: Vec<String> = root.descendants().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["root", "a", "a1", "b"]);

        let found = root.find("a1").expect("a1 is in the subtree");
        assert!(Rc::ptr_eq(&found, &a1));
        assert!(a.find("b").is_none());
    }

    #[test]
    fn test_set_mesh() {
        let frame = Frame::new("mesh");
        assert!(frame.mesh().is_empty());
        frame.set_mesh(FrameMesh::line_segments(vec![
            nalgebra::Point3::origin(),
            nalgebra::Point3::new(1.0, 0.0, 0.0),
        ]));
        assert_eq!(frame.mesh().vertex_count(), 2);
    }
}
