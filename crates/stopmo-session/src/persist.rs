//! JSON persistence of global settings and per-scene sheets.
//!
//! The persistence boundary is a plain key/value document per file:
//! `settings.json` for process-wide state and `scene_<name>.json` for each
//! scene's frame records. Documents are pretty-printed JSON in a
//! caller-supplied config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stopmo_core::{CalibrationState, Real};
use stopmo_sheet::Frame;

/// Process-wide persisted state.
///
/// Operator preferences plus the calibration that must survive across
/// sessions. Unknown or missing keys fall back to defaults so older
/// documents keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Follow the last shot position with the preview camera.
    pub auto_cam: bool,
    /// Preview camera distance behind the last shot position.
    pub auto_cam_distance: Real,
    /// How many trailing frames the motion graphs sample.
    pub sample_frames: u32,
    /// Display poses in raw tracker space instead of the calibrated world.
    pub show_raw_pose: bool,
    /// Scene the session is currently working on.
    pub current_scene: String,
    /// Frame number the capture app last advanced to (0 = none yet).
    pub current_frame: u32,
    /// Reference points and derived calibration transforms.
    pub calibration: CalibrationState,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_cam: false,
            auto_cam_distance: 1.0,
            sample_frames: 10,
            show_raw_pose: false,
            current_scene: String::new(),
            current_frame: 0,
            calibration: CalibrationState::default(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("malformed settings document {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write settings {}", path.display()))
    }
}

/// Persisted per-scene document: the frame records plus the capture
/// directory the scene's image files land in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDoc {
    pub frames: Vec<Frame>,
    pub capture_dir: Option<PathBuf>,
}

/// File name a scene persists under.
pub fn scene_file_name(scene: &str) -> String {
    format!("scene_{scene}.json")
}

/// Load a scene document; `Ok(None)` when it was never saved.
pub fn load_scene(config_dir: &Path, scene: &str) -> Result<Option<SceneDoc>> {
    let path = config_dir.join(scene_file_name(scene));
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    let doc = serde_json::from_str(&data)
        .with_context(|| format!("malformed scene document {}", path.display()))?;
    Ok(Some(doc))
}

pub fn save_scene(config_dir: &Path, scene: &str, doc: &SceneDoc) -> Result<()> {
    let path = config_dir.join(scene_file_name(scene));
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(&path, json).with_context(|| format!("failed to write scene {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stopmo_core::Iso3;

    #[test]
    fn settings_default_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_roundtrip_preserves_calibration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings {
            auto_cam: true,
            auto_cam_distance: 0.75,
            sample_frames: 24,
            current_scene: "desk_shoot".into(),
            current_frame: 42,
            ..Settings::default()
        };
        settings
            .calibration
            .set_origin(&Iso3::translation(0.1, 0.2, 0.3))
            .unwrap();

        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn settings_tolerate_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"current_scene": "old_doc", "current_frame": 3}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.current_scene, "old_doc");
        assert_eq!(settings.current_frame, 3);
        assert_eq!(settings.sample_frames, 10);
    }

    #[test]
    fn scene_roundtrip_and_absence() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_scene(dir.path(), "nope").unwrap().is_none());

        let doc = SceneDoc {
            frames: vec![Frame::default(), Frame::default()],
            capture_dir: Some(PathBuf::from("/takes")),
        };
        save_scene(dir.path(), "desk_shoot", &doc).unwrap();

        let loaded = load_scene(dir.path(), "desk_shoot").unwrap().unwrap();
        assert_eq!(loaded, doc);
        assert!(dir.path().join("scene_desk_shoot.json").exists());
    }
}
