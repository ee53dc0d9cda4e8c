//! Mode/state controller — the per-frame pipeline.
//!
//! `Pipeline` owns every piece of per-frame state (pinch state, smoothing
//! window, stroke origin, drag position).  The frame loop hands it one
//! [`DetectionResult`] per frame by `&mut`; only tool and mode transitions
//! are reported back for the UI, through [`FrameOutcome::events`].
//!
//! | Mode | Pinch toggles | While on |
//! |---|---|---|
//! | `Draw` | `Off ⇄ Pen` | smoothed fingertip extends the stroke |
//! | `Drag` | `Off ⇄ Drag` | smoothed fingertip becomes the image centre |

use std::time::Instant;

use hand_landmarks::{DetectionResult, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::pinch::{PinchDetector, PinchState};
use crate::smoother::PointSmoother;
use crate::stroke::{InkSurface, QuadSegment, StrokePath, StrokeRenderer};

// ════════════════════════════════════════════════════════════════════════════
// Modes and tools
// ════════════════════════════════════════════════════════════════════════════

/// What the application is doing with the hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Draw,
    #[serde(alias = "drag_image")]
    Drag,
}

impl AppMode {
    /// Tool a pinch switches on in this mode.
    pub fn active_tool(self) -> Tool {
        match self {
            AppMode::Draw => Tool::Pen,
            AppMode::Drag => Tool::Drag,
        }
    }

    pub fn other(self) -> AppMode {
        match self {
            AppMode::Draw => AppMode::Drag,
            AppMode::Drag => AppMode::Draw,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AppMode::Draw => "draw",
            AppMode::Drag => "drag",
        }
    }
}

/// Enabled tool.  Pen and drag are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Off,
    Pen,
    Drag,
}

/// UI-observable transitions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModeEvent {
    ToolChanged { from: Tool, to: Tool },
    Cleared,
    ModeSwitched(AppMode),
}

/// Result of one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    pub events:         Vec<ModeEvent>,
    /// Raw fingertip in canvas pixels (mirroring applied).
    pub fingertip:      Option<Point>,
    pub pinch_distance: Option<f32>,
    pub pinched:        bool,
    /// Segment added to the stroke path this frame.
    pub drawn:          Option<QuadSegment>,
}

// ════════════════════════════════════════════════════════════════════════════
// Pipeline
// ════════════════════════════════════════════════════════════════════════════

pub struct Pipeline {
    config:   PipelineConfig,
    mode:     AppMode,
    tool:     Tool,
    pinch:    PinchDetector,
    smoother: PointSmoother,
    renderer: StrokeRenderer,
    /// Centre of the draggable image, canvas pixels.
    drag_pos: Point,
    /// Frame at which the hand was first missing, while it stays missing.
    hand_lost_at: Option<Instant>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline::with_mode(config, AppMode::Draw)
    }

    pub fn with_mode(config: PipelineConfig, mode: AppMode) -> Self {
        let cooldown = match mode {
            AppMode::Draw => config.draw_cooldown(),
            AppMode::Drag => config.drag_cooldown(),
        };
        let pinch    = PinchDetector::new(config.pinch_threshold, cooldown);
        let smoother = PointSmoother::new(config.point_memory, config.smoothing_factor);
        let drag_pos = Point::new(config.canvas_width as f32 * 0.5, config.canvas_height as f32 * 0.5);
        Pipeline {
            config,
            mode,
            tool: Tool::Off,
            pinch,
            smoother,
            renderer: StrokeRenderer::new(),
            drag_pos,
            hand_lost_at: None,
        }
    }

    // ── per-frame ─────────────────────────────────────────────────────────

    /// Run the gesture → smoothing → render chain for one frame.
    pub fn process_frame<S: InkSurface + ?Sized>(
        &mut self,
        detection: &DetectionResult,
        now:       Instant,
        surface:   &mut S,
    ) -> FrameOutcome {
        let hand    = detection.primary();
        let reading = self.pinch.update(hand, now);

        let mut outcome = FrameOutcome {
            pinch_distance: reading.distance,
            pinched:        reading.pinched,
            ..FrameOutcome::default()
        };

        if reading.toggled {
            let next = if self.tool == Tool::Off { self.mode.active_tool() } else { Tool::Off };
            if let Some(ev) = self.set_tool(next) {
                outcome.events.push(ev);
            }
        }

        // No hand: nothing to draw or move this frame.
        let Some(hand) = hand else {
            self.hand_lost_at.get_or_insert(now);
            return outcome;
        };

        // A hand back after longer than the cooldown starts a fresh stroke.
        if let Some(lost) = self.hand_lost_at.take() {
            if now.saturating_duration_since(lost) > self.pinch.cooldown() {
                self.smoother.clear();
                self.renderer.lift();
                debug!("hand returned after a gap, stroke lifted");
            }
        }

        let tip = self.config.mirror.to_canvas(
            hand.index_tip(),
            self.config.canvas_width as f32,
            self.config.canvas_height as f32,
        );
        outcome.fingertip = Some(tip);

        match self.tool {
            Tool::Pen => {
                let smoothed = self.smoother.smooth(tip);
                outcome.drawn = self.renderer.render(smoothed, surface);
            }
            Tool::Drag => {
                let smoothed = self.smoother.smooth(tip);
                self.drag_pos = self.clamp_to_canvas(smoothed);
            }
            Tool::Off => {}
        }

        outcome
    }

    // ── transitions ───────────────────────────────────────────────────────

    /// Change tool.  Any change ends the current stroke and empties the
    /// smoothing window.
    fn set_tool(&mut self, to: Tool) -> Option<ModeEvent> {
        let from = self.tool;
        if from == to { return None; }
        self.tool = to;
        self.smoother.clear();
        self.renderer.lift();
        debug!(?from, ?to, "tool changed");
        Some(ModeEvent::ToolChanged { from, to })
    }

    /// Wipe the canvas.  Smoothing window and stroke origin go with it.
    pub fn clear<S: InkSurface + ?Sized>(&mut self, surface: &mut S) -> ModeEvent {
        self.renderer.clear(surface);
        self.smoother.clear();
        ModeEvent::Cleared
    }

    /// Switch application mode: tool forced off, canvas cleared, cooldown
    /// swapped for the new mode.
    pub fn switch_mode<S: InkSurface + ?Sized>(&mut self, mode: AppMode, surface: &mut S) -> Vec<ModeEvent> {
        let mut events = Vec::new();
        if let Some(ev) = self.set_tool(Tool::Off) {
            events.push(ev);
        }
        events.push(self.clear(surface));

        self.mode = mode;
        self.pinch.set_cooldown(match mode {
            AppMode::Draw => self.config.draw_cooldown(),
            AppMode::Drag => self.config.drag_cooldown(),
        });
        info!(mode = mode.name(), "mode switched");
        events.push(ModeEvent::ModeSwitched(mode));
        events
    }

    /// Detection stopped: tool off, pinch state and smoothing forgotten.
    /// Drawn content stays.
    pub fn end_session(&mut self) -> Option<ModeEvent> {
        let ev = self.set_tool(Tool::Off);
        self.pinch.reset();
        self.smoother.clear();
        self.renderer.lift();
        self.hand_lost_at = None;
        ev
    }

    fn clamp_to_canvas(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.config.canvas_width as f32),
            p.y.clamp(0.0, self.config.canvas_height as f32),
        )
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn config(&self)        -> &PipelineConfig { &self.config }
    pub fn mode(&self)          -> AppMode         { self.mode }
    pub fn tool(&self)          -> Tool            { self.tool }
    pub fn pen_enabled(&self)   -> bool            { self.tool == Tool::Pen }
    pub fn drag_enabled(&self)  -> bool            { self.tool == Tool::Drag }
    pub fn drag_position(&self) -> Point           { self.drag_pos }
    pub fn pinch_state(&self)   -> PinchState      { self.pinch.state() }
    pub fn smoothing_len(&self) -> usize           { self.smoother.len() }
    pub fn stroke_path(&self)   -> &StrokePath     { self.renderer.path() }
    pub fn pen_position(&self)  -> Option<Point>   { self.renderer.previous() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
