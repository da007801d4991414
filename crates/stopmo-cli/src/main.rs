use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use stopmo_session::{load_scene, save_scene, SceneDoc};
use stopmo_sheet::{reconcile, FrameSheet};

/// Operator CLI for stop-motion scene sheets.
#[derive(Debug, Parser)]
#[command(name = "stopmo", version, about = "Stop-motion scene sheet tools")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile a scene's sheet against its capture directory.
    Conform(ConformArgs),
    /// Print a summary of a scene's sheet.
    Show(ShowArgs),
}

#[derive(Debug, Parser)]
struct ConformArgs {
    /// Scene name (loads scene_<name>.json).
    #[arg(long)]
    scene: String,

    /// Directory holding the settings and scene documents.
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Capture directory override; defaults to the one stored in the scene.
    #[arg(long)]
    capture_dir: Option<PathBuf>,

    /// Report what would change without rewriting the scene document.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Parser)]
struct ShowArgs {
    /// Scene name (loads scene_<name>.json).
    #[arg(long)]
    scene: String,

    /// Directory holding the settings and scene documents.
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct SceneSummary {
    scene: String,
    frames: usize,
    captured: usize,
    hashed: usize,
    capture_dir: Option<PathBuf>,
}

fn cmd_conform(args: ConformArgs) -> Result<String> {
    let doc = load_scene(&args.config_dir, &args.scene)?
        .with_context(|| format!("scene '{}' has never been saved", args.scene))?;

    let Some(dir) = args.capture_dir.clone().or_else(|| doc.capture_dir.clone()) else {
        bail!("scene '{}' has no capture directory on record; pass --capture-dir", args.scene);
    };

    let sheet = FrameSheet::from_frames(doc.frames);
    let outcome = reconcile(&dir, &sheet)?;

    if !args.dry_run {
        let rebuilt = SceneDoc {
            frames: outcome.sheet.into_frames(),
            capture_dir: Some(dir),
        };
        save_scene(&args.config_dir, &args.scene, &rebuilt)?;
    }

    Ok(serde_json::to_string_pretty(&outcome.report)?)
}

fn cmd_show(args: ShowArgs) -> Result<String> {
    let doc = load_scene(&args.config_dir, &args.scene)?
        .with_context(|| format!("scene '{}' has never been saved", args.scene))?;

    let summary = SceneSummary {
        scene: args.scene,
        frames: doc.frames.len(),
        captured: doc.frames.iter().filter(|f| !f.empty).count(),
        hashed: doc
            .frames
            .iter()
            .filter(|f| !f.content_hash.is_empty())
            .count(),
        capture_dir: doc.capture_dir,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let json = match cli.cmd {
        Command::Conform(args) => cmd_conform(args)?,
        Command::Show(args) => cmd_show(args)?,
    };
    println!("{json}");
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use stopmo_core::Vec3;
    use stopmo_sheet::file_digest;

    fn seeded_scene(config: &std::path::Path, takes: &std::path::Path) -> SceneDoc {
        let mut sheet = FrameSheet::new();
        for (frame, body) in [(1u32, b"one".as_slice()), (3, b"three".as_slice())] {
            let path = takes.join(format!("shot_{frame:04}.png"));
            fs::write(&path, body).unwrap();
            sheet
                .set_frame(frame, Vec3::new(frame as f64, 0.0, 0.0), Vec3::zeros(), true)
                .unwrap();
            sheet
                .stamp_hash(frame, &file_digest(&path).unwrap())
                .unwrap();
        }

        let doc = SceneDoc {
            frames: sheet.into_frames(),
            capture_dir: Some(takes.to_path_buf()),
        };
        save_scene(config, "smoke", &doc).unwrap();
        doc
    }

    #[test]
    fn conform_rewrites_scene_and_reports() {
        let config = tempfile::tempdir().unwrap();
        let takes = tempfile::tempdir().unwrap();
        seeded_scene(config.path(), takes.path());

        let json = cmd_conform(ConformArgs {
            scene: "smoke".into(),
            config_dir: config.path().to_path_buf(),
            capture_dir: None,
            dry_run: false,
        })
        .unwrap();

        let report: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["matched"], 2);

        let rewritten = load_scene(config.path(), "smoke").unwrap().unwrap();
        assert_eq!(rewritten.frames.len(), 3);
        assert!(rewritten.frames[1].empty, "gap frame 2 stays empty");
    }

    #[test]
    fn dry_run_leaves_scene_document_alone() {
        let config = tempfile::tempdir().unwrap();
        let takes = tempfile::tempdir().unwrap();
        let original = seeded_scene(config.path(), takes.path());

        cmd_conform(ConformArgs {
            scene: "smoke".into(),
            config_dir: config.path().to_path_buf(),
            capture_dir: None,
            dry_run: true,
        })
        .unwrap();

        let untouched = load_scene(config.path(), "smoke").unwrap().unwrap();
        assert_eq!(untouched, original);
    }

    #[test]
    fn show_summarizes_the_sheet() {
        let config = tempfile::tempdir().unwrap();
        let takes = tempfile::tempdir().unwrap();
        seeded_scene(config.path(), takes.path());

        let json = cmd_show(ShowArgs {
            scene: "smoke".into(),
            config_dir: config.path().to_path_buf(),
        })
        .unwrap();

        let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(summary["frames"], 3);
        assert_eq!(summary["captured"], 2);
        assert_eq!(summary["hashed"], 2);
    }

    #[test]
    fn unknown_scene_is_an_error() {
        let config = tempfile::tempdir().unwrap();
        let err = cmd_show(ShowArgs {
            scene: "missing".into(),
            config_dir: config.path().to_path_buf(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("never been saved"));
    }
}
