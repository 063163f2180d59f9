//! Rigid 3D poses

use nalgebra::{
    Isometry3, Matrix3, Matrix4, Point3, Quaternion, Translation3, Unit, UnitQuaternion, Vector3,
};

use crate::{Error, Result};

/// A rigid transformation (rotation followed by translation).
///
/// Poses compose left to right in parent-to-child order: `parent * child`
/// maps points from the child frame into the parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    isometry: Isometry3<f32>,
}

impl Pose {
    /// Create an identity pose
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Create a pure translation
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), UnitQuaternion::identity()),
        }
    }

    /// Create a pose from a translation and a rotation
    pub fn from_parts(translation: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    /// Wrap an existing isometry
    pub fn from_isometry(isometry: Isometry3<f32>) -> Self {
        Self { isometry }
    }

    /// Create a pose from a homogeneous 4x4 matrix.
    ///
    /// The translation is read from the last column. The upper-left 3x3 block
    /// is projected onto the nearest rotation, so slightly non-orthonormal
    /// input (e.g. accumulated float error) is accepted. The bottom row is
    /// ignored.
    pub fn from_matrix(matrix: &Matrix4<f32>) -> Self {
        let translation = matrix.fixed_view::<3, 1>(0, 3).into_owned();
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        Self::from_parts(translation, UnitQuaternion::from_matrix(&linear))
    }

    /// The underlying nalgebra isometry
    pub fn isometry(&self) -> &Isometry3<f32> {
        &self.isometry
    }

    /// Homogeneous 4x4 matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        self.isometry.to_homogeneous()
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.isometry.translation.vector
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        self.isometry.rotation.to_rotation_matrix().into_inner()
    }

    pub fn quaternion(&self) -> UnitQuaternion<f32> {
        self.isometry.rotation
    }

    /// Rotation as `[w, x, y, z]`
    pub fn quaternion_wxyz(&self) -> [f32; 4] {
        let q = self.isometry.rotation;
        [q.w, q.i, q.j, q.k]
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.isometry.translation = Translation3::from(translation);
    }

    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.isometry.rotation = rotation;
    }

    /// Replace the rotation with the nearest rotation to `rotation`
    pub fn set_rotation_matrix(&mut self, rotation: &Matrix3<f32>) {
        self.isometry.rotation = UnitQuaternion::from_matrix(rotation);
    }

    /// Replace the rotation from a `[w, x, y, z]` quaternion, normalizing it.
    ///
    /// A quaternion with (near) zero norm does not describe a rotation and is
    /// rejected; the pose is left unchanged.
    pub fn set_quaternion_wxyz(&mut self, wxyz: [f32; 4]) -> Result<()> {
        let [w, x, y, z] = wxyz;
        let rotation = UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f32::EPSILON)
            .ok_or_else(|| Error::InvalidData(format!("quaternion {:?} has zero norm", wxyz)))?;
        self.isometry.rotation = rotation;
        Ok(())
    }

    /// Apply a translation expressed in the parent (outer) frame.
    ///
    /// Equivalent to `T(delta) * self`: the rotation is untouched and `delta`
    /// is added to the translation as-is.
    pub fn pretranslate(&mut self, delta: Vector3<f32>) {
        self.isometry.translation.vector += delta;
    }

    /// Apply a rotation expressed in this pose's own (local) frame.
    ///
    /// Equivalent to `self * R(axis, angle)`: the translation is untouched.
    pub fn rotate(&mut self, axis: &Unit<Vector3<f32>>, angle: f32) {
        self.isometry.rotation *= UnitQuaternion::from_axis_angle(axis, angle);
    }

    /// Compose this pose with another (`self * other`)
    pub fn compose(self, other: Self) -> Self {
        Self {
            isometry: self.isometry * other.isometry,
        }
    }

    pub fn inverse(self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }

    /// Apply the pose to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.isometry.transform_point(point)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Pose {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Isometry3<f32>> for Pose {
    fn from(isometry: Isometry3<f32>) -> Self {
        Self::from_isometry(isometry)
    }
}

impl From<Pose> for Isometry3<f32> {
    fn from(pose: Pose) -> Self {
        pose.isometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_matrix() {
        assert_relative_eq!(Pose::identity().matrix(), Matrix4::identity());
        assert_eq!(Pose::default(), Pose::identity());
    }

    #[test]
    fn test_pretranslate_ignores_rotation() {
        let mut pose = Pose::identity();
        pose.rotate(&Vector3::z_axis(), FRAC_PI_2);
        pose.pretranslate(Vector3::new(1.0, 0.0, 0.0));

        // World-relative: the delta is not rotated into the local frame
        assert_relative_eq!(pose.translation(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotate_is_local() {
        let mut pose = Pose::from_translation(Vector3::new(0.0, 0.0, 3.0));
        pose.rotate(&Vector3::z_axis(), FRAC_PI_2);
        pose.rotate(&Vector3::x_axis(), FRAC_PI_2);

        // Translation untouched, rotations applied on the right
        assert_relative_eq!(pose.translation(), Vector3::new(0.0, 0.0, 3.0));
        let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        assert_relative_eq!(pose.rotation_matrix(), expected.to_rotation_matrix().into_inner(), epsilon = 1e-6);

        // Local x now maps onto world y after the yaw
        let p = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_round_trip() {
        let pose = Pose::from_parts(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1),
        );
        let back = Pose::from_matrix(&pose.matrix());
        assert_relative_eq!(back.matrix(), pose.matrix(), epsilon = 1e-5);
    }

    #[test]
    fn test_quaternion_wxyz_order() {
        let mut pose = Pose::identity();
        assert_eq!(pose.quaternion_wxyz(), [1.0, 0.0, 0.0, 0.0]);

        // 180 degrees about y, not normalized on input
        pose.set_quaternion_wxyz([0.0, 0.0, 2.0, 0.0]).unwrap();
        let [w, x, y, z] = pose.quaternion_wxyz();
        assert_relative_eq!(w, 0.0);
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y.abs(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(z, 0.0);
    }

    #[test]
    fn test_zero_quaternion_rejected() {
        let mut pose = Pose::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let before = pose;
        assert!(pose.set_quaternion_wxyz([0.0; 4]).is_err());
        assert_eq!(pose, before);
    }

    #[test]
    fn test_compose_and_inverse() {
        let a = Pose::from_parts(
            Vector3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let b = Pose::from_translation(Vector3::new(1.0, 0.0, 0.0));

        // b's x offset is rotated by a's yaw
        assert_relative_eq!((a * b).translation(), Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!((a * a.inverse()).matrix(), Matrix4::identity(), epsilon = 1e-6);
    }
}
