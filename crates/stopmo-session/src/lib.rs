//! Session controller for `stopmo`.
//!
//! Owns all mutable state of a capture session: the calibration, the live
//! raw tracker pose, the frame sheet, and scene bookkeeping. Tracker and
//! capture events arrive as discrete, ordered messages (transport parsing
//! is out of scope) and are folded into that state one at a time on a
//! single thread.

/// Consumed event schema (tracker feed and capture feed).
pub mod event;
/// JSON persistence of settings and scene sheets.
pub mod persist;
/// The owning session controller.
pub mod session;

pub use event::{CaptureEvent, TrackerEvent};
pub use persist::{load_scene, save_scene, scene_file_name, SceneDoc, Settings};
pub use session::Session;
