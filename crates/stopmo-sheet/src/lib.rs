//! Frame sheet and capture-directory reconciliation for `stopmo`.
//!
//! The sheet is an ordered, 1-indexed, sparse collection of per-frame pose
//! records built from the capture event stream. The image files on disk are
//! the ground truth for which frames exist and in what order; reconciliation
//! joins the two using content hashes of the captured files.

/// Streaming content hashing of capture files.
pub mod digest;
/// Frame records and the growable frame sheet.
pub mod frame;
/// Rebuilding the sheet from an on-disk capture directory.
pub mod reconcile;

pub use digest::file_digest;
pub use frame::{Frame, FrameSheet, SheetError};
pub use reconcile::{
    reconcile, sequence_number, ReconcileError, ReconcileReport, Reconciliation,
    CAPTURE_EXTENSIONS,
};
