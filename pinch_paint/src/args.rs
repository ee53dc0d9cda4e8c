use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hand_landmarks::Mirror;
use pinch_ink::AppMode;

use crate::app::{AppConfig, SourceKind};
use crate::detector::DetectorCommand;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Skip the interactive setup
    #[arg(long)]
    pub quick: bool,

    /// Configuration file (JSON); missing file means defaults
    #[arg(long, default_value = AppConfig::DEFAULT_PATH)]
    pub config: PathBuf,

    /// External hand detector command, e.g. "python3 hand_detect.py"
    #[arg(long)]
    pub detector: Option<String>,

    /// Use a LeapMotion controller (build with --features leap)
    #[arg(long, conflicts_with = "detector")]
    pub leap: bool,

    /// Starting mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Do not mirror the camera horizontally
    #[arg(long, default_value_t = false)]
    pub no_mirror: bool,

    /// PNG to drag around in drag mode
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Draw,
    Drag,
}

impl From<ModeArg> for AppMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Draw => AppMode::Draw,
            ModeArg::Drag => AppMode::Drag,
        }
    }
}

impl Args {
    /// Command-line flags take precedence over the config file.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(line) = &self.detector {
            if let Some(cmd) = DetectorCommand::parse(line) {
                cfg.detector = DetectorCommand { min_score: cfg.detector.min_score, ..cmd };
                cfg.source   = SourceKind::Detector;
            }
        }
        if self.leap {
            cfg.source = SourceKind::Leap;
        }
        if let Some(mode) = self.mode {
            cfg.mode = mode.into();
        }
        if self.no_mirror {
            cfg.pipeline.mirror = Mirror::None;
        }
        if let Some(image) = &self.image {
            cfg.image_path = Some(image.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_config_alone() {
        let args = Args::try_parse_from(["pinch_paint"]).unwrap();
        assert_eq!(args.config, PathBuf::from("pinch_paint.json"));
        let mut cfg = AppConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "pinch_paint", "--quick", "--detector", "python3 detect.py --camera 1",
            "--mode", "drag", "--no-mirror", "--image", "cat.png",
        ]).unwrap();
        assert!(args.quick);

        let mut cfg = AppConfig::default();
        cfg.detector.min_score = 0.8;
        args.apply(&mut cfg);
        assert_eq!(cfg.source, SourceKind::Detector);
        assert_eq!(cfg.detector.program, "python3");
        assert_eq!(cfg.detector.args, vec!["detect.py", "--camera", "1"]);
        assert_eq!(cfg.detector.min_score, 0.8);
        assert_eq!(cfg.mode, AppMode::Drag);
        assert_eq!(cfg.pipeline.mirror, Mirror::None);
        assert_eq!(cfg.image_path, Some(PathBuf::from("cat.png")));
    }

    #[test]
    fn leap_conflicts_with_detector() {
        assert!(Args::try_parse_from(["pinch_paint", "--leap", "--detector", "x"]).is_err());
        let args = Args::try_parse_from(["pinch_paint", "--leap"]).unwrap();
        let mut cfg = AppConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.source, SourceKind::Leap);
    }
}
