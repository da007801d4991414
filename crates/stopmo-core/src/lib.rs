//! Core pose math and rig calibration for `stopmo`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Iso3`, ...),
//! - the rig calibrator ([`CalibrationState`]): derives a world basis from
//!   three tracker-space reference points plus a look-direction sample,
//! - the pose pipeline ([`calibrated_pose`]): maps raw tracker poses into
//!   the calibrated world frame.
//!
//! Pose pipeline:
//! `calibrated = basis ∘ (raw ∘ direction)`

/// Rig calibration state and recompute operations.
pub mod calib;
/// Linear algebra type aliases and transform helpers.
pub mod math;
/// Raw-to-calibrated pose mapping.
pub mod pose;

pub use calib::{CalibrationError, CalibrationState};
pub use math::*;
pub use pose::calibrated_pose;
