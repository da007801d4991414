//! Frame records and the growable frame sheet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stopmo_core::Vec3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    /// Frame numbers are 1-based; zero is never a valid frame.
    #[error("frame numbers are 1-based, got {0}")]
    InvalidFrameIndex(u32),
}

/// One stop-motion exposure's recorded pose and capture metadata.
///
/// Frames start out empty and stay empty until a capture event or a
/// reconciliation match assigns real data. The content hash identifies the
/// exact bytes of the image file captured for this frame; it arrives
/// asynchronously after the pose and may be stamped on a still-empty frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// True until a capture or reconciliation assigns real data.
    pub empty: bool,
    /// Calibrated pose translation at time of capture.
    pub position: Vec3,
    /// Calibrated pose orientation as Euler angles in degrees.
    pub rotation: Vec3,
    /// Digest of the captured image file's bytes; empty until stamped.
    #[serde(default)]
    pub content_hash: String,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            empty: true,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            content_hash: String::new(),
        }
    }
}

/// Ordered, 1-indexed, sparse sequence of [`Frame`] records.
///
/// Stored as a value arena: frames are addressed by index and copied by
/// value across rebuilds, so no caller can hold a dangling frame reference
/// after reconciliation swaps the sheet. Growth is monotonic except during
/// a wholesale rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSheet {
    frames: Vec<Frame>,
}

impl FrameSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a sheet from persisted frame records.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Grow the sheet with empty frames until its length is at least `n`.
    ///
    /// Never shrinks; idempotent when `n` is at or below the current length.
    pub fn ensure_len(&mut self, n: usize) {
        if n > self.frames.len() {
            self.frames.resize_with(n, Frame::default);
        }
    }

    /// Look up the frame for a 1-based frame number.
    pub fn get(&self, number: u32) -> Option<&Frame> {
        number
            .checked_sub(1)
            .and_then(|i| self.frames.get(i as usize))
    }

    fn slot(&mut self, number: u32) -> Result<&mut Frame, SheetError> {
        if number == 0 {
            return Err(SheetError::InvalidFrameIndex(number));
        }
        self.ensure_len(number as usize);
        Ok(&mut self.frames[number as usize - 1])
    }

    /// Write a pose at the given frame number, growing the sheet as needed.
    ///
    /// With `mark_captured` the frame stops being empty; without it the
    /// pose is only mirrored (live preview of the current frame).
    pub fn set_frame(
        &mut self,
        number: u32,
        position: Vec3,
        rotation: Vec3,
        mark_captured: bool,
    ) -> Result<(), SheetError> {
        let frame = self.slot(number)?;
        frame.position = position;
        frame.rotation = rotation;
        if mark_captured {
            frame.empty = false;
        }
        Ok(())
    }

    /// Stamp a content hash at the given frame number.
    ///
    /// The hash feed is decoupled from the pose feed, so stamping a
    /// still-empty frame is allowed and does not clear its emptiness.
    pub fn stamp_hash(&mut self, number: u32, hash: &str) -> Result<(), SheetError> {
        let frame = self.slot(number)?;
        frame.content_hash = hash.to_owned();
        Ok(())
    }

    /// Map every non-empty frame's content hash to a copy of its record.
    ///
    /// Last writer wins if two frames share a hash; distinct captures
    /// colliding is an assumed-impossible precondition of the digest.
    pub fn hash_index(&self) -> HashMap<String, Frame> {
        self.frames
            .iter()
            .filter(|f| !f.empty && !f.content_hash.is_empty())
            .map(|f| (f.content_hash.clone(), f.clone()))
            .collect()
    }

    /// Number of the closest non-empty frame strictly before `number`.
    pub fn last_captured_before(&self, number: u32) -> Option<u32> {
        let upper = (number.saturating_sub(1) as usize).min(self.frames.len());
        (0..upper)
            .rev()
            .find(|&i| !self.frames[i].empty)
            .map(|i| i as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_len_grows_and_is_idempotent() {
        let mut sheet = FrameSheet::new();
        sheet.ensure_len(4);
        assert_eq!(sheet.len(), 4);
        assert!(sheet.frames().iter().all(|f| f.empty));

        let before = sheet.clone();
        sheet.ensure_len(4);
        sheet.ensure_len(2);
        assert_eq!(sheet, before);
    }

    #[test]
    fn set_frame_grows_and_marks_captured() {
        let mut sheet = FrameSheet::new();
        sheet
            .set_frame(5, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 90.0, 0.0), true)
            .unwrap();

        assert_eq!(sheet.len(), 5);
        let frame = sheet.get(5).unwrap();
        assert!(!frame.empty);
        assert_eq!(frame.position, Vec3::new(1.0, 2.0, 3.0));
        for n in 1..=4 {
            assert!(sheet.get(n).unwrap().empty, "frame {n} should stay empty");
        }
    }

    #[test]
    fn set_frame_without_capture_keeps_frame_empty() {
        let mut sheet = FrameSheet::new();
        sheet
            .set_frame(2, Vec3::x(), Vec3::zeros(), false)
            .unwrap();
        let frame = sheet.get(2).unwrap();
        assert!(frame.empty);
        assert_eq!(frame.position, Vec3::x());
    }

    #[test]
    fn frame_zero_is_rejected() {
        let mut sheet = FrameSheet::new();
        let err = sheet.set_frame(0, Vec3::zeros(), Vec3::zeros(), true);
        assert!(matches!(err, Err(SheetError::InvalidFrameIndex(0))));
        assert!(sheet.is_empty());

        assert!(sheet.stamp_hash(0, "abc").is_err());
        assert!(sheet.is_empty());
    }

    #[test]
    fn stamp_hash_on_empty_frame_does_not_capture() {
        let mut sheet = FrameSheet::new();
        sheet.stamp_hash(3, "cafe").unwrap();

        assert_eq!(sheet.len(), 3);
        let frame = sheet.get(3).unwrap();
        assert!(frame.empty);
        assert_eq!(frame.content_hash, "cafe");
    }

    #[test]
    fn hash_index_skips_empty_and_unhashed_frames() {
        let mut sheet = FrameSheet::new();
        sheet.set_frame(1, Vec3::x(), Vec3::zeros(), true).unwrap();
        sheet.stamp_hash(1, "aa").unwrap();
        sheet.set_frame(2, Vec3::y(), Vec3::zeros(), true).unwrap(); // no hash yet
        sheet.stamp_hash(3, "cc").unwrap(); // still empty

        let index = sheet.hash_index();
        assert_eq!(index.len(), 1);
        assert_eq!(index["aa"].position, Vec3::x());
    }

    #[test]
    fn last_captured_before_scans_downward() {
        let mut sheet = FrameSheet::new();
        sheet.set_frame(2, Vec3::x(), Vec3::zeros(), true).unwrap();
        sheet.ensure_len(6);

        assert_eq!(sheet.last_captured_before(6), Some(2));
        assert_eq!(sheet.last_captured_before(2), None);
        assert_eq!(sheet.last_captured_before(0), None);
    }

    #[test]
    fn sheet_json_roundtrip() {
        let mut sheet = FrameSheet::new();
        sheet
            .set_frame(2, Vec3::new(0.1, 0.2, 0.3), Vec3::new(1.0, 2.0, 3.0), true)
            .unwrap();
        sheet.stamp_hash(2, "deadbeef").unwrap();

        let json = serde_json::to_string(&sheet).unwrap();
        let de: FrameSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(de, sheet);
    }
}
