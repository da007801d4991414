//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental types used throughout the library
//! and helpers for building rigid transforms and converting between the
//! pose representation (isometry) and the storage representation
//! (translation + Euler angles in degrees).

use nalgebra::{Isometry3, Matrix3, Point3, Translation3, UnitQuaternion, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Build a rigid transform placing a camera at `eye`, facing `target`.
///
/// Follows the OpenGL convention: the camera looks down its local `-Z`
/// axis, with `up` giving the approximate local `+Y`. This is the model
/// transform of the camera, i.e. the inverse of a view matrix.
pub fn look_at_rigid(eye: &Vec3, target: &Vec3, up: &Vec3) -> Iso3 {
    Iso3::look_at_rh(&Pt3::from(*eye), &Pt3::from(*target), up).inverse()
}

/// Extract a pose's orientation as Euler angles in degrees (roll, pitch, yaw).
pub fn euler_degrees(pose: &Iso3) -> Vec3 {
    let (roll, pitch, yaw) = pose.rotation.euler_angles();
    Vec3::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}

/// Rebuild a pose from a translation and Euler angles in degrees.
///
/// Inverse of [`euler_degrees`] combined with the pose translation.
pub fn pose_from_parts(translation: Vec3, euler_deg: Vec3) -> Iso3 {
    Iso3::from_parts(
        Translation3::from(translation),
        UnitQuaternion::from_euler_angles(
            euler_deg.x.to_radians(),
            euler_deg.y.to_radians(),
            euler_deg.z.to_radians(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_camera_at_target() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let pose = look_at_rigid(&eye, &Vec3::zeros(), &Vec3::y());

        assert!((pose.translation.vector - eye).norm() < 1e-12);

        // Local -Z maps to the unit vector from eye toward the target.
        let forward = pose.rotation * Vec3::new(0.0, 0.0, -1.0);
        let expected = (-eye).normalize();
        assert!((forward - expected).norm() < 1e-12);
    }

    #[test]
    fn euler_degrees_roundtrip() {
        let pose = pose_from_parts(Vec3::new(0.5, -0.1, 2.0), Vec3::new(10.0, -35.0, 78.0));
        let rebuilt = pose_from_parts(pose.translation.vector, euler_degrees(&pose));

        assert!((rebuilt.translation.vector - pose.translation.vector).norm() < 1e-12);
        assert!(rebuilt.rotation.angle_to(&pose.rotation) < 1e-9);
    }
}
