//! Integration tests for world pose composition across frame chains

use std::rc::Rc;

use approx::assert_relative_eq;
use framecrate_core::{Frame, FrameRef, Pose};
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_pose(rng: &mut StdRng) -> Pose {
    let translation = Vector3::new(
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
    );
    let rotation = UnitQuaternion::from_euler_angles(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-3.0..3.0),
    );
    Pose::from_parts(translation, rotation)
}

/// Build a straight chain root -> ... -> leaf and return every frame in order
fn build_chain(poses: &[Pose]) -> Vec<FrameRef> {
    let frames: Vec<FrameRef> = poses
        .iter()
        .enumerate()
        .map(|(i, pose)| Frame::with_pose(format!("link_{}", i), *pose))
        .collect();
    for pair in frames.windows(2) {
        pair[0].add_child(Rc::clone(&pair[1]));
    }
    frames
}

#[test]
fn test_three_link_chain() {
    let pr = Pose::from_translation(Vector3::new(1.0, 0.0, 0.0));
    let pa = Pose::from_parts(
        Vector3::new(0.0, 1.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5),
    );
    let pb = Pose::from_parts(
        Vector3::new(0.0, 0.0, 1.0),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.25),
    );
    let chain = build_chain(&[pr, pa, pb]);

    let expected = pr * pa * pb;
    assert_relative_eq!(chain[2].world_matrix(), expected.matrix(), epsilon = 1e-6);
}

#[test]
fn test_random_chains_compose_root_to_leaf() {
    let mut rng = StdRng::seed_from_u64(7);

    for depth in 1..=12 {
        let poses: Vec<Pose> = (0..depth).map(|_| random_pose(&mut rng)).collect();
        let chain = build_chain(&poses);

        let mut expected = Pose::identity();
        for (pose, frame) in poses.iter().zip(&chain) {
            expected = expected * *pose;
            assert_relative_eq!(frame.world_matrix(), expected.matrix(), epsilon = 1e-4);
        }
    }
}

#[test]
fn test_ancestor_edit_is_visible_immediately() {
    let mut rng = StdRng::seed_from_u64(11);
    let poses: Vec<Pose> = (0..5).map(|_| random_pose(&mut rng)).collect();
    let chain = build_chain(&poses);
    let leaf = chain.last().unwrap();
    let before = leaf.world_translation();

    chain[0].translate(Vector3::new(0.0, 0.0, 10.0));

    assert_relative_eq!(
        leaf.world_translation(),
        before + Vector3::new(0.0, 0.0, 10.0),
        epsilon = 1e-4
    );
}

#[test]
fn test_translate_then_rotate_order() {
    // translate is world-relative, rotate is local-relative
    let frame = Frame::new("tool");
    frame.rotate(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
    frame.translate(Vector3::new(1.0, 0.0, 0.0));
    frame.rotate(&Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0)), std::f32::consts::FRAC_PI_2);

    assert_relative_eq!(frame.translation(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    let tip = frame.local_pose().transform_point(&Point3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(tip, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-6);
}

#[test]
fn test_matrix_and_quaternion_accessors() {
    let frame = Frame::new("demo");

    let mut m = Matrix4::identity();
    m[(0, 3)] = 1.0;
    m[(1, 3)] = 2.0;
    m[(2, 3)] = 3.0;
    frame.set_matrix(&m);
    assert_relative_eq!(frame.translation(), Vector3::new(1.0, 2.0, 3.0));

    frame.set_translation(Vector3::new(5.0, 5.0, 5.0));
    assert_relative_eq!(frame.matrix()[(0, 3)], 5.0);

    frame.set_quaternion([0.0, 0.0, 1.0, 0.0]).unwrap();
    frame.translate(Vector3::new(1.0, 2.0, 3.0));
    assert_relative_eq!(frame.translation(), Vector3::new(6.0, 7.0, 8.0));
    assert_relative_eq!(frame.rotation()[(0, 0)], -1.0, epsilon = 1e-6);
    assert_relative_eq!(frame.rotation()[(1, 1)], 1.0, epsilon = 1e-6);

    assert!(frame.set_quaternion([0.0, 0.0, 0.0, 0.0]).is_err());
}

#[test]
fn test_world_accessors_match_world_pose() {
    let root = Frame::with_pose(
        "root",
        Pose::from_parts(
            Vector3::new(0.0, 0.0, 1.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2),
        ),
    );
    let child = Frame::with_pose("child", Pose::from_translation(Vector3::new(2.0, 0.0, 0.0)));
    root.add_child(Rc::clone(&child));

    let world = child.world_pose();
    assert_relative_eq!(child.world_translation(), Vector3::new(0.0, 2.0, 1.0), epsilon = 1e-6);
    assert_relative_eq!(child.world_rotation(), world.rotation_matrix());
    assert_eq!(child.world_quaternion(), world.quaternion_wxyz());
    assert_relative_eq!(child.world_matrix(), world.matrix());
}
