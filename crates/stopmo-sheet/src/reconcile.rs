//! Rebuilding the sheet from an on-disk capture directory.
//!
//! The capture application and the tracker are decoupled feeds: files on
//! disk are authoritative for which frames exist and in what order, while
//! the current sheet is authoritative for which pose belongs to which
//! content hash. A reconciliation pass lists the directory, orders files by
//! the numeric sequence suffix in their names, hashes each file, and builds
//! a fresh sheet carrying the matched records. The caller swaps the result
//! in wholesale, so readers never observe a partial sheet.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::digest::file_digest;
use crate::frame::{Frame, FrameSheet};

/// File extensions considered capture output.
pub const CAPTURE_EXTENSIONS: [&str; 3] = ["png", "jpg", "tiff"];

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Capture directory is missing; the pass is a no-op and the caller
    /// keeps the prior sheet.
    #[error("capture directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    /// Listing the directory failed.
    #[error("failed to list capture directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-pass summary of what reconciliation saw and decided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Capture files hashed during the pass.
    pub files_seen: usize,
    /// Files whose hash matched a recorded frame.
    pub matched: usize,
    /// Files whose hash matched no recorded frame (positions left empty).
    pub unmatched: Vec<String>,
    /// Files skipped for an unparseable or invalid sequence suffix, or an
    /// unreadable body.
    pub skipped: Vec<String>,
}

/// Result of a reconciliation pass: the rebuilt sheet plus its report.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub sheet: FrameSheet,
    pub report: ReconcileReport,
}

/// Parse the sequence number from a capture file's stem.
///
/// The capture application appends a zero-padded counter, so the last four
/// characters of the base name are read as an unsigned integer
/// (`shot_0042` → 42). Stems shorter than four characters are parsed
/// whole.
pub fn sequence_number(stem: &str) -> Option<u32> {
    let start = stem
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    stem[start..].parse().ok()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Rebuild the frame ordering from the capture directory.
///
/// Files are matched to recorded frames by content hash. Gaps in the
/// on-disk sequence stay as empty frames, and unmatched positions also
/// leave an empty frame behind, so the rebuilt sheet's length always
/// tracks the largest sequence number seen. The input sheet is never
/// mutated; on any error the caller keeps it as-is.
pub fn reconcile(dir: &Path, current: &FrameSheet) -> Result<Reconciliation, ReconcileError> {
    if !dir.is_dir() {
        return Err(ReconcileError::DirectoryNotFound(dir.to_path_buf()));
    }

    let list_err = |source| ReconcileError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut report = ReconcileReport::default();
    let mut files: Vec<(u32, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !CAPTURE_EXTENSIONS.iter().any(|c| c.eq_ignore_ascii_case(ext)) {
            continue;
        }
        let seq = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(sequence_number);
        match seq {
            // Sequence numbers are frame numbers: 1-based.
            Some(seq) if seq > 0 => files.push((seq, path)),
            _ => {
                warn!("no usable sequence suffix in {}, skipping", file_label(&path));
                report.skipped.push(file_label(&path));
            }
        }
    }

    files.sort();

    let recorded = current.hash_index();
    let mut frames: Vec<Frame> = Vec::new();

    for (seq, path) in files {
        let hash = match file_digest(&path) {
            Ok(hash) => hash,
            Err(err) => {
                warn!("failed to hash {}: {err}, skipping", file_label(&path));
                report.skipped.push(file_label(&path));
                continue;
            }
        };

        report.files_seen += 1;
        // Preserve gaps for missing or unshot frames. seq is validated
        // positive above, so seq - 1 always lands inside the grown arena.
        let slot = seq as usize - 1;
        if frames.len() <= slot {
            frames.resize_with(slot + 1, Frame::default);
        }

        match recorded.get(&hash) {
            Some(frame) => {
                debug!("{} -> frame {seq} ({hash})", file_label(&path));
                frames[slot] = frame.clone();
                report.matched += 1;
            }
            None => {
                warn!("unmatched content hash for {}", file_label(&path));
                report.unmatched.push(file_label(&path));
            }
        }
    }

    Ok(Reconciliation {
        sheet: FrameSheet::from_frames(frames),
        report,
    })
}
