//! Consumed event schema.
//!
//! Two decoupled feeds reach the session: the positional tracker reporting
//! pose components and visibility, and the frame-capture application
//! reporting shutter activity tied to files on disk. Transport-level
//! parsing lives outside this crate; these enums are the abstract messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use stopmo_core::Real;

/// Messages from the positional tracker feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// Raw pose translation update.
    Position { x: Real, y: Real, z: Real },
    /// Raw pose orientation update (unit quaternion).
    Orientation { w: Real, x: Real, y: Real, z: Real },
    /// Tracker visibility changed.
    Visibility { visible: bool },
}

/// Messages from the frame-capture application feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaptureEvent {
    /// The capture app moved to another frame number.
    FrameAdvance { frame: u32, scene: String },
    /// The shutter fired for a frame.
    Shot { frame: u32, scene: String },
    /// A captured image file finished writing to disk.
    FileReady {
        frame: u32,
        scene: String,
        path: PathBuf,
    },
    /// Request to reconcile the sheet against the capture directory.
    Conform,
}
