//! Rig calibration from tracker-space reference samples.
//!
//! The operator marks three physical reference points with the tracker
//! (world origin, a point along the +X axis, and an altitude point roughly
//! toward +Z) plus one look-direction sample. From these the calibrator
//! derives two rigid transforms:
//!
//! - `basis`: maps raw tracker-space points into the calibrated world, with
//!   the origin sample landing at the world origin,
//! - `direction`: re-orients the tracker's reported axes to the camera
//!   look-direction convention.
//!
//! Both transforms default to identity, which is a valid uncalibrated
//! state: raw poses pass through unchanged.

use nalgebra::{Rotation3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{look_at_rigid, Iso3, Mat3, Real, Vec3};

/// Sine-of-angle threshold below which reference points count as collinear.
const COLLINEAR_EPS: Real = 1e-9;

#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Reference points are collinear or coincident; no basis can be built.
    #[error("calibration reference points are collinear or coincident")]
    DegenerateCalibration,
}

/// Process-wide calibration state.
///
/// Holds the three raw reference points that produced the basis transform
/// together with the two derived transforms. Mutated only by explicit
/// calibration actions; survives across sessions via persisted settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    /// Raw tracker-space translation of the world-origin sample.
    pub origin: Vec3,
    /// Raw tracker-space translation of the +X axis sample.
    pub axis_x: Vec3,
    /// Raw tracker-space translation of the altitude sample.
    pub altitude: Vec3,
    /// Origin/basis calibration transform (tracker space → world).
    pub basis: Iso3,
    /// Direction calibration transform (camera-local look-direction
    /// correction).
    pub direction: Iso3,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            origin: Vec3::zeros(),
            axis_x: Vec3::x(),
            altitude: Vec3::z(),
            basis: Iso3::identity(),
            direction: Iso3::identity(),
        }
    }
}

impl CalibrationState {
    /// Capture the current raw pose translation as the world-origin sample
    /// and recompute the basis transform.
    pub fn set_origin(&mut self, raw: &Iso3) -> Result<(), CalibrationError> {
        self.origin = raw.translation.vector;
        self.recompute_basis()
    }

    /// Capture the current raw pose translation as the +X axis sample and
    /// recompute the basis transform.
    pub fn set_axis_x(&mut self, raw: &Iso3) -> Result<(), CalibrationError> {
        self.axis_x = raw.translation.vector;
        self.recompute_basis()
    }

    /// Capture the current raw pose translation as the altitude sample and
    /// recompute the basis transform.
    pub fn set_altitude(&mut self, raw: &Iso3) -> Result<(), CalibrationError> {
        self.altitude = raw.translation.vector;
        self.recompute_basis()
    }

    /// Rebuild the origin/basis transform from the three reference points.
    ///
    /// Constructs a right-handed orthonormal frame: `x` along the axis
    /// sample, `z` re-orthogonalized from the altitude sample, `y = z₀ × x`.
    /// The stored transform is the inverse of that frame, so applying it
    /// maps tracker-space points into the world basis with the origin
    /// sample at the world origin.
    ///
    /// On [`CalibrationError::DegenerateCalibration`] the prior transform
    /// is retained; the captured points keep their new values so the
    /// operator can re-sample just the offending one.
    pub fn recompute_basis(&mut self) -> Result<(), CalibrationError> {
        let to_x = self.axis_x - self.origin;
        let to_alt = self.altitude - self.origin;

        let scale = to_x.norm() * to_alt.norm();
        if scale < COLLINEAR_EPS || to_x.cross(&to_alt).norm() < COLLINEAR_EPS * scale {
            return Err(CalibrationError::DegenerateCalibration);
        }

        let axis_x = to_x.normalize();
        let axis_z0 = to_alt.normalize();
        let axis_y = axis_z0.cross(&axis_x).normalize();
        // Re-orthogonalize z: the altitude sample need not be perpendicular
        // to the x axis.
        let axis_z = axis_x.cross(&axis_y).normalize();

        let rot = Mat3::from_columns(&[axis_x, axis_y, axis_z]);
        let frame = Iso3::from_parts(
            Translation3::from(self.origin),
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rot)),
        );

        self.basis = frame.inverse();
        Ok(())
    }

    /// Derive the direction transform from a raw look-direction sample.
    ///
    /// Builds a look-at transform from the sample's translation toward the
    /// world origin, using the sample's negated local Z axis as up, then
    /// applies a 180° yaw flip (the tracker's forward convention is
    /// mirrored relative to the camera's):
    /// `direction = raw⁻¹ ∘ look_at ∘ flip`.
    ///
    /// The result is a pure rotation about the camera (zero translation);
    /// it composes on the camera-local side of a raw pose and never moves
    /// calibrated positions.
    ///
    /// A sample sitting exactly on the world origin leaves no look
    /// direction to derive and is rejected.
    pub fn set_direction(&mut self, raw: &Iso3) -> Result<(), CalibrationError> {
        let eye = raw.translation.vector;
        if eye.norm() < COLLINEAR_EPS {
            return Err(CalibrationError::DegenerateCalibration);
        }

        let up = -(raw.rotation * Vec3::z());
        let cam_dir = look_at_rigid(&eye, &Vec3::zeros(), &up);
        let flip = Iso3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vec3::y_axis(), std::f64::consts::PI),
        );

        self.direction = raw.inverse() * (cam_dir * flip);
        Ok(())
    }
}
