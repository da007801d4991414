//! Raw-to-calibrated pose mapping.

use crate::calib::CalibrationState;
use crate::math::Iso3;

/// Map a raw tracker pose into the calibrated world frame.
///
/// `calibrated = basis ∘ (raw ∘ direction)`: the origin/basis transform
/// maps tracker space into the world on the left, while the direction
/// transform corrects the camera's local axes on the right. Pure and
/// stateless given the current calibration; with the default (identity)
/// calibration the raw pose passes through unchanged.
pub fn calibrated_pose(calib: &CalibrationState, raw: &Iso3) -> Iso3 {
    calib.basis * (raw * calib.direction)
}
