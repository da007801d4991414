//! The owning session controller.
//!
//! A [`Session`] holds the only mutable copies of the calibration state and
//! the frame sheet. Events are folded in one at a time; per-event problems
//! (an invalid frame number, an unreadable file) are surfaced as operator
//! warnings and never abort the loop.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};
use nalgebra::{Quaternion, Translation3, UnitQuaternion};

use stopmo_core::{calibrated_pose, euler_degrees, CalibrationError, Iso3};
use stopmo_sheet::{file_digest, reconcile, FrameSheet, ReconcileReport};

use crate::event::{CaptureEvent, TrackerEvent};
use crate::persist::{load_scene, save_scene, SceneDoc, Settings};

const SETTINGS_FILE: &str = "settings.json";

/// All mutable state of one capture session.
#[derive(Debug)]
pub struct Session {
    pub settings: Settings,
    /// Latest raw tracker pose, assembled piecewise from the feed.
    pub raw_pose: Iso3,
    pub tracker_visible: bool,
    pub sheet: FrameSheet,
    /// Directory the capture app writes image files into, learned from
    /// `FileReady` events or the persisted scene document.
    pub capture_dir: Option<PathBuf>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            raw_pose: Iso3::identity(),
            tracker_visible: false,
            sheet: FrameSheet::new(),
            capture_dir: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted session: global settings plus the current
    /// scene's sheet, if one was saved.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let settings = Settings::load(&config_dir.join(SETTINGS_FILE))?;
        let mut session = Session {
            settings,
            ..Session::default()
        };

        if !session.settings.current_scene.is_empty() {
            if let Some(doc) = load_scene(config_dir, &session.settings.current_scene)? {
                session.sheet = FrameSheet::from_frames(doc.frames);
                session.capture_dir = doc.capture_dir;
            }
        }
        Ok(session)
    }

    /// Persist settings and the current scene's sheet.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        self.settings.save(&config_dir.join(SETTINGS_FILE))?;
        if !self.settings.current_scene.is_empty() {
            let doc = SceneDoc {
                frames: self.sheet.frames().to_vec(),
                capture_dir: self.capture_dir.clone(),
            };
            save_scene(config_dir, &self.settings.current_scene, &doc)?;
        }
        Ok(())
    }

    /// Current raw pose mapped through the calibration transforms.
    pub fn calibrated_pose(&self) -> Iso3 {
        calibrated_pose(&self.settings.calibration, &self.raw_pose)
    }

    /// Fold one tracker message into the live raw pose.
    pub fn apply_tracker_event(&mut self, event: &TrackerEvent) {
        match *event {
            TrackerEvent::Position { x, y, z } => {
                self.raw_pose.translation = Translation3::new(x, y, z);
            }
            TrackerEvent::Orientation { w, x, y, z } => {
                self.raw_pose.rotation =
                    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));
            }
            TrackerEvent::Visibility { visible } => {
                self.tracker_visible = visible;
            }
        }
    }

    /// Fold one capture message into the sheet and scene bookkeeping.
    pub fn apply_capture_event(&mut self, event: &CaptureEvent) {
        match event {
            CaptureEvent::FrameAdvance { frame, scene: _ } => {
                self.sheet.ensure_len(*frame as usize);
                self.settings.current_frame = *frame;
            }
            CaptureEvent::Shot { frame, scene } => {
                // The capture app names the scene; adopt it.
                self.settings.current_scene = scene.clone();

                let pose = self.calibrated_pose();
                if let Err(err) = self.sheet.set_frame(
                    *frame,
                    pose.translation.vector,
                    euler_degrees(&pose),
                    true,
                ) {
                    warn!("shot event rejected: {err}");
                }
            }
            CaptureEvent::FileReady {
                frame,
                scene: _,
                path,
            } => match file_digest(path) {
                Ok(hash) => {
                    if let Err(err) = self.sheet.stamp_hash(*frame, &hash) {
                        warn!("file-ready event rejected: {err}");
                        return;
                    }
                    self.capture_dir = path.parent().map(Path::to_path_buf);
                }
                Err(err) => warn!("cannot hash capture file {}: {err}", path.display()),
            },
            CaptureEvent::Conform => {
                self.conform();
            }
        }
    }

    /// Per-tick update: mirror the calibrated pose into the current
    /// frame's record as a live preview, without marking it captured.
    ///
    /// A no-op before the first `FrameAdvance` (frame number 0 addresses
    /// no slot).
    pub fn tick(&mut self) {
        let frame = self.settings.current_frame;
        if frame == 0 {
            return;
        }
        let pose = self.calibrated_pose();
        if let Err(err) =
            self.sheet
                .set_frame(frame, pose.translation.vector, euler_degrees(&pose), false)
        {
            warn!("live pose update rejected: {err}");
        }
    }

    /// Rebuild the sheet from the capture directory, swapping it in only
    /// when the pass succeeds. Returns the pass report when one ran.
    pub fn conform(&mut self) -> Option<ReconcileReport> {
        let Some(dir) = self.capture_dir.clone() else {
            warn!("conform requested before any capture directory is known");
            return None;
        };
        match reconcile(&dir, &self.sheet) {
            Ok(outcome) => {
                info!(
                    "conformed {} files, {} matched",
                    outcome.report.files_seen, outcome.report.matched
                );
                self.sheet = outcome.sheet;
                Some(outcome.report)
            }
            Err(err) => {
                // Prior sheet stays authoritative.
                warn!("conform skipped: {err}");
                None
            }
        }
    }

    /// Capture the current raw pose as the world-origin reference.
    pub fn calibrate_origin(&mut self) -> Result<(), CalibrationError> {
        self.settings.calibration.set_origin(&self.raw_pose)
    }

    /// Capture the current raw pose as the +X axis reference.
    pub fn calibrate_axis_x(&mut self) -> Result<(), CalibrationError> {
        self.settings.calibration.set_axis_x(&self.raw_pose)
    }

    /// Capture the current raw pose as the altitude reference.
    pub fn calibrate_altitude(&mut self) -> Result<(), CalibrationError> {
        self.settings.calibration.set_altitude(&self.raw_pose)
    }

    /// Capture the current raw pose as the look-direction sample.
    pub fn calibrate_direction(&mut self) -> Result<(), CalibrationError> {
        self.settings.calibration.set_direction(&self.raw_pose)
    }
}
