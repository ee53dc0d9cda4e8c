//! Top-level application state.
//!
//! `AppState` owns the detection [`Session`] (and through it the pipeline),
//! the ink layer and the draggable image.  It turns window commands into
//! session/pipeline calls, runs one pipeline frame per tick, and keeps the
//! status line current from the pipeline's mode events.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::time::Instant;

use anyhow::{Context, Result};
use hand_landmarks::{LandmarkSource, SourceError};
use pinch_ink::{
    AppMode, Brush, FrameOutcome, InkLayer, ModeEvent, Pipeline, PipelineConfig, Session, Tool,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::detector::{DetectorCommand, DetectorProcess};
use crate::sim::{SimInput, SimLandmarkSource};
use crate::sprite::Sprite;
use crate::visualizer::{Scene, UiCommand, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where landmarks come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Mouse and keyboard stand in for the hand.
    #[default]
    Sim,
    /// External detector process (webcam + landmark model).
    Detector,
    /// LeapMotion controller; needs the `leap` feature.
    Leap,
}

impl SourceKind {
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Sim      => "simulation",
            SourceKind::Detector => "detector",
            SourceKind::Leap     => "LeapMotion",
        }
    }
}

/// Configuration for the full application, stored as `pinch_paint.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline:   PipelineConfig,
    pub mode:       AppMode,
    pub source:     SourceKind,
    pub detector:   DetectorCommand,
    /// PNG dragged around in drag mode; a checkerboard when unset.
    pub image_path: Option<PathBuf>,
    /// Longest side of the image on the canvas, pixels.
    pub image_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            pipeline:   PipelineConfig::default(),
            mode:       AppMode::Draw,
            source:     SourceKind::Sim,
            detector:   DetectorCommand::default(),
            image_path: None,
            image_size: 160,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "pinch_paint.json";

    /// Read `path`; a missing file yields the defaults.  Fields absent from
    /// the file keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── pipeline ──────────────────────────────────────────────────────────
    session:  Session,
    ink:      InkLayer,
    last:     FrameOutcome,

    // ── image ─────────────────────────────────────────────────────────────
    sprite:   Sprite,

    // ── landmark source ───────────────────────────────────────────────────
    source:   SourceKind,
    detector: DetectorCommand,
    /// Sender for a just-started simulation source, collected by the window.
    sim_tx:   Option<Sender<SimInput>>,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Result<Self> {
        cfg.pipeline.validate().context("invalid pipeline configuration")?;
        let brush = Brush {
            width: cfg.pipeline.stroke_width,
            color: cfg.pipeline.stroke_argb()?,
        };
        let ink = InkLayer::new(cfg.pipeline.canvas_width, cfg.pipeline.canvas_height, brush);

        let sprite = match &cfg.image_path {
            Some(path) => Sprite::load(path, cfg.image_size)?,
            None       => Sprite::placeholder(cfg.image_size as usize),
        };

        let pipeline = Pipeline::with_mode(cfg.pipeline, cfg.mode);
        Ok(AppState {
            session:  Session::new(pipeline),
            ink,
            last:     FrameOutcome::default(),
            sprite,
            source:   cfg.source,
            detector: cfg.detector,
            sim_tx:   None,
            status:   format!("Ready ({} source, {} mode): press S to start", cfg.source.name(), cfg.mode.name()),
        })
    }

    // ── commands ──────────────────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::ToggleDetection => {
                if self.session.is_detecting() {
                    self.stop_detection();
                } else {
                    self.start_detection();
                }
            }
            UiCommand::SwitchMode => {
                let next = self.session.pipeline().mode().other();
                let events = self.session.pipeline_mut().switch_mode(next, &mut self.ink);
                self.report(&events);
            }
            UiCommand::Clear => {
                let ev = self.session.pipeline_mut().clear(&mut self.ink);
                self.report(&[ev]);
            }
            UiCommand::Quit => { /* handled in run loop */ }
        }
    }

    pub fn start_detection(&mut self) {
        let kind     = self.source;
        let detector = self.detector.clone();
        let config   = self.session.pipeline().config().clone();
        let mut sim_tx = None;

        let started = self.session.start(|| open_source(kind, &detector, &config, &mut sim_tx));
        match started {
            Ok(()) => {
                self.sim_tx = sim_tx;
                self.last   = FrameOutcome::default();
                self.status = format!("Detecting with {}: pinch to toggle the {}", kind.name(),
                                      tool_noun(self.session.pipeline().mode().active_tool()));
            }
            Err(e) => {
                error!(error = %e, source = kind.name(), "start failed");
                self.status = format!("Error: {e}");
            }
        }
    }

    pub fn stop_detection(&mut self) {
        if self.session.stop() {
            self.last   = FrameOutcome::default();
            self.status = format!("Detection stopped after {} frames", self.session.frames());
        }
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        match self.session.frame(now, &mut self.ink) {
            Ok(Some(outcome)) => {
                self.report(&outcome.events);
                self.last = outcome;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "detection failed");
                self.last   = FrameOutcome::default();
                self.status = format!("Error: {e}");
            }
        }
    }

    fn report(&mut self, events: &[ModeEvent]) {
        if let Some(last) = events.last() {
            self.status = describe(*last);
        }
    }

    /// Hand the window the sender of a newly started simulation source.
    pub fn take_sim_sender(&mut self) -> Option<Sender<SimInput>> { self.sim_tx.take() }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn session(&self) -> &Session   { &self.session }
    pub fn ink(&self)     -> &InkLayer  { &self.ink }
    pub fn last(&self)    -> &FrameOutcome { &self.last }

    pub fn scene(&self) -> Scene<'_> {
        let pipeline = self.session.pipeline();
        Scene {
            ink:       &self.ink,
            sprite:    (pipeline.mode() == AppMode::Drag).then(|| (&self.sprite, pipeline.drag_position())),
            fingertip: self.last.fingertip,
            pinched:   self.last.pinched,
            mode:      pipeline.mode(),
            tool:      pipeline.tool(),
            detecting: self.session.is_detecting(),
            status:    &self.status,
        }
    }
}

fn open_source(
    kind:     SourceKind,
    detector: &DetectorCommand,
    config:   &PipelineConfig,
    sim_tx:   &mut Option<Sender<SimInput>>,
) -> Result<Box<dyn LandmarkSource>, SourceError> {
    match kind {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            *sim_tx = Some(tx);
            Ok(Box::new(SimLandmarkSource::new(rx, config.mirror, config.canvas_width, config.canvas_height)))
        }
        SourceKind::Detector => Ok(Box::new(DetectorProcess::spawn(detector, config.max_hands)?)),
        #[cfg(feature = "leap")]
        SourceKind::Leap => Ok(Box::new(crate::leap::LeapLandmarkSource::open(config.max_hands)?)),
        #[cfg(not(feature = "leap"))]
        SourceKind::Leap => Err(SourceError::Acquire {
            what:   "LeapMotion",
            reason: "built without the `leap` feature".to_string(),
        }),
    }
}

fn tool_noun(tool: Tool) -> &'static str {
    match tool {
        Tool::Pen  => "pen",
        Tool::Drag => "image drag",
        Tool::Off  => "tool",
    }
}

fn describe(event: ModeEvent) -> String {
    match event {
        ModeEvent::ToolChanged { to: Tool::Pen, .. }  => "Pen ON: draw with your index finger".to_string(),
        ModeEvent::ToolChanged { to: Tool::Drag, .. } => "Drag ON: the image follows your finger".to_string(),
        ModeEvent::ToolChanged { from, to: Tool::Off } => format!("{} OFF", capitalise(tool_noun(from))),
        ModeEvent::Cleared                            => "Canvas cleared".to_string(),
        ModeEvent::ModeSwitched(mode)                 => format!("Mode: {}", mode.name()),
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None        => String::new(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the window and the app state, then drives the input → detect →
/// render loop at ~60 fps until the window closes or `Q` is pressed.
/// Detection is released on every exit path.
pub fn run(cfg: AppConfig) -> Result<()> {
    let (w, h) = (cfg.pipeline.canvas_width, cfg.pipeline.canvas_height);
    let mut app = AppState::new(cfg)?;
    let mut vis = Visualizer::new(w, h)?;

    'frames: while vis.is_open() {
        // 1. Window input
        for cmd in vis.poll_input() {
            if cmd == UiCommand::Quit { break 'frames; }
            app.handle_command(cmd);
        }
        if let Some(tx) = app.take_sim_sender() {
            vis.attach_sim(tx);
        }

        // 2. Detect + pipeline
        app.tick(Instant::now());

        // 3. Render
        vis.render(&app.scene());
    }

    app.stop_detection();
    if !app.ink().is_blank() {
        info!(pixels = app.ink().inked_pixels(), "closing with ink on the canvas");
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.pipeline.canvas_width  = 200;
        cfg.pipeline.canvas_height = 100;
        cfg.image_size = 32;
        cfg
    }

    fn make_app() -> AppState { AppState::new(small_config()).unwrap() }

    fn started_sim(app: &mut AppState) -> Sender<SimInput> {
        app.handle_command(UiCommand::ToggleDetection);
        assert!(app.session().is_detecting());
        app.take_sim_sender().unwrap()
    }

    #[test]
    fn starts_idle() {
        let mut app = make_app();
        assert!(!app.session().is_detecting());
        app.tick(Instant::now());
        assert!(app.last().fingertip.is_none());
    }

    #[test]
    fn config_file_subset_keeps_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"source": "detector", "pipeline": {"pinch_threshold": 0.05}}"#,
        ).unwrap();
        assert_eq!(cfg.source, SourceKind::Detector);
        assert_eq!(cfg.pipeline.pinch_threshold, 0.05);
        assert_eq!(cfg.pipeline.draw_cooldown_ms, 300);
        assert_eq!(cfg.image_size, 160);
        assert_eq!(cfg.detector, DetectorCommand::default());
    }

    #[test]
    fn missing_config_file_is_default() {
        let cfg = AppConfig::load(Path::new("/nonexistent/pinch_paint.json")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn invalid_colour_is_rejected() {
        let mut cfg = small_config();
        cfg.pipeline.stroke_color = "pink".to_string();
        assert!(AppState::new(cfg).is_err());
    }

    #[test]
    fn sim_pinch_draws_on_ink() {
        let mut app = make_app();
        let tx = started_sim(&mut app);
        let t0 = Instant::now();

        tx.send(SimInput::Pointer { x: 40.0, y: 50.0 }).unwrap();
        tx.send(SimInput::Pinch(true)).unwrap();
        app.tick(t0);
        assert_eq!(app.session().pipeline().tool(), Tool::Pen);
        assert!(app.status.starts_with("Pen ON"));

        for (i, x) in [60.0, 80.0, 100.0, 120.0].into_iter().enumerate() {
            tx.send(SimInput::Pointer { x, y: 50.0 }).unwrap();
            app.tick(t0 + std::time::Duration::from_millis(16 * (i as u64 + 1)));
        }
        assert!(!app.ink().is_blank());
        // Pinch still held: no second toggle.
        assert_eq!(app.session().pipeline().tool(), Tool::Pen);

        let tip = app.last().fingertip.unwrap();
        assert!((tip.x - 120.0).abs() < 1e-3 && (tip.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn stop_turns_tool_off_and_keeps_ink() {
        let mut app = make_app();
        let tx = started_sim(&mut app);
        let t0 = Instant::now();
        tx.send(SimInput::Pointer { x: 10.0, y: 10.0 }).unwrap();
        tx.send(SimInput::Pinch(true)).unwrap();
        app.tick(t0);
        tx.send(SimInput::Pointer { x: 60.0, y: 60.0 }).unwrap();
        app.tick(t0 + std::time::Duration::from_millis(16));
        assert!(!app.ink().is_blank());

        app.handle_command(UiCommand::ToggleDetection);
        assert!(!app.session().is_detecting());
        assert_eq!(app.session().pipeline().tool(), Tool::Off);
        assert!(!app.ink().is_blank());
        assert_eq!(app.status, "Detection stopped after 2 frames");
    }

    #[test]
    fn switch_mode_clears_and_shows_image() {
        let mut app = make_app();
        let tx = started_sim(&mut app);
        let t0 = Instant::now();
        tx.send(SimInput::Pointer { x: 10.0, y: 10.0 }).unwrap();
        tx.send(SimInput::Pinch(true)).unwrap();
        app.tick(t0);
        tx.send(SimInput::Pointer { x: 60.0, y: 60.0 }).unwrap();
        app.tick(t0 + std::time::Duration::from_millis(16));

        assert!(app.scene().sprite.is_none());
        app.handle_command(UiCommand::SwitchMode);
        assert_eq!(app.session().pipeline().mode(), AppMode::Drag);
        assert_eq!(app.session().pipeline().tool(), Tool::Off);
        assert!(app.ink().is_blank());
        assert_eq!(app.status, "Mode: drag");
        assert!(app.scene().sprite.is_some());
    }

    #[test]
    fn drag_moves_image_centre() {
        let mut cfg = small_config();
        cfg.mode = AppMode::Drag;
        let mut app = AppState::new(cfg).unwrap();
        let tx = started_sim(&mut app);
        let t0 = Instant::now();

        tx.send(SimInput::Pointer { x: 30.0, y: 20.0 }).unwrap();
        tx.send(SimInput::Pinch(true)).unwrap();
        app.tick(t0);
        assert_eq!(app.session().pipeline().tool(), Tool::Drag);
        for i in 1..=10u64 {
            app.tick(t0 + std::time::Duration::from_millis(16 * i));
        }
        let centre = app.scene().sprite.unwrap().1;
        assert!((centre.x - 30.0).abs() < 0.5 && (centre.y - 20.0).abs() < 0.5);
        assert!(app.ink().is_blank());
    }

    #[test]
    fn clear_command_wipes_ink() {
        let mut app = make_app();
        let tx = started_sim(&mut app);
        let t0 = Instant::now();
        tx.send(SimInput::Pointer { x: 10.0, y: 10.0 }).unwrap();
        tx.send(SimInput::Pinch(true)).unwrap();
        app.tick(t0);
        tx.send(SimInput::Pointer { x: 60.0, y: 60.0 }).unwrap();
        app.tick(t0 + std::time::Duration::from_millis(16));

        app.handle_command(UiCommand::Clear);
        assert!(app.ink().is_blank());
        assert_eq!(app.status, "Canvas cleared");
    }

    #[test]
    fn failed_detector_start_stays_idle() {
        let mut cfg = small_config();
        cfg.source = SourceKind::Detector;
        cfg.detector.program = "/nonexistent/hand-detector".to_string();
        let mut app = AppState::new(cfg).unwrap();

        app.handle_command(UiCommand::ToggleDetection);
        assert!(!app.session().is_detecting());
        assert!(app.status.starts_with("Error: could not start detection"));
    }

    #[cfg(not(feature = "leap"))]
    #[test]
    fn leap_without_feature_reports_error() {
        let mut cfg = small_config();
        cfg.source = SourceKind::Leap;
        let mut app = AppState::new(cfg).unwrap();
        app.handle_command(UiCommand::ToggleDetection);
        assert!(!app.session().is_detecting());
        assert!(app.status.contains("leap"));
    }

    #[test]
    fn describe_tool_changes() {
        assert_eq!(describe(ModeEvent::ToolChanged { from: Tool::Pen, to: Tool::Off }), "Pen OFF");
        assert_eq!(describe(ModeEvent::ToolChanged { from: Tool::Drag, to: Tool::Off }), "Image drag OFF");
    }
}
