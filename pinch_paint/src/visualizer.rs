//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                                                          │
//! │  canvas: image (drag mode) · ink layer · fingertip ring  │
//! │                                                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  status line                              mode / tool    │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The window also produces [`SimInput`] for the simulation landmark source
//! while one is attached.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use hand_landmarks::Point;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use pinch_ink::{AppMode, InkLayer, Tool};

use crate::sim::SimInput;
use crate::sprite::Sprite;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const STATUS_H:  usize = 34;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const STATUS_BG:     u32   = 0xFF0F3460;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const LEGEND_COLOR:  u32   = 0xFF888888;
const CURSOR_IDLE:   u32   = 0xFFAADDFF;
const CURSOR_PINCH:  u32   = 0xFFFFD700;  // gold
const PEN_COLOR:     u32   = 0xFF7CFC00;
const DRAG_COLOR:    u32   = 0xFFFF8C00;
const CURSOR_RADIUS: f32   = 9.0;

const LEGEND: &str =
    "S=start/stop  M=mode  C=clear  Q=quit   mouse=fingertip  click/space=pinch  H=hide hand";

/// Window commands for the app loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    ToggleDetection,
    SwitchMode,
    Clear,
}

/// Everything drawn in one frame.
pub struct Scene<'a> {
    pub ink:       &'a InkLayer,
    /// Image and its centre, shown in drag mode.
    pub sprite:    Option<(&'a Sprite, Point)>,
    pub fingertip: Option<Point>,
    pub pinched:   bool,
    pub mode:      AppMode,
    pub tool:      Tool,
    pub detecting: bool,
    pub status:    &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Framebuffer
// ════════════════════════════════════════════════════════════════════════════

/// ARGB pixel buffer with the drawing primitives.
pub struct Framebuffer {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Framebuffer {
    pub fn new(w: usize, h: usize) -> Self {
        Framebuffer { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    fn set_pixel_i(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// One-pixel circle outline.
    pub fn draw_ring(&mut self, c: Point, r: f32, color: u32) {
        let steps = ((r * 8.0) as usize).max(16);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            let x = (c.x + r * a.cos()).round() as isize;
            let y = (c.y + r * a.sin()).round() as isize;
            self.set_pixel_i(x, y, color);
        }
    }

    pub fn fill_disc(&mut self, c: Point, r: f32, color: u32) {
        let ri = r.ceil() as isize;
        let (cx, cy) = (c.x.round() as isize, c.y.round() as isize);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f32) <= r * r {
                    self.set_pixel_i(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draw `text` in the 3×5 bitmap font, each font pixel `scale`×`scale`.
    /// Stops at the right edge.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let advance = GLYPH_ADVANCE * scale;
        for (i, ch) in text.chars().enumerate() {
            let gx = x + i * advance;
            if gx + advance > self.w { break; }
            let Some(bits) = glyph(ch) else { continue };
            for bit in 0..15 {
                if bits & (1 << (14 - bit)) == 0 { continue; }
                let (row, col) = (bit / 3, bit % 3);
                self.fill_rect(gx + col * scale, y + row * scale, scale, scale, color);
            }
        }
    }
}

/// Width in pixels of `text` in the bitmap font.
fn label_width(text: &str, scale: usize) -> usize { text.chars().count() * GLYPH_ADVANCE * scale }

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    fb:       Framebuffer,
    canvas_w: usize,
    canvas_h: usize,

    // ── simulation input ──────────────────────────────────────────────────
    sim_tx:       Option<Sender<SimInput>>,
    last_pointer: Option<(f32, f32)>,
    last_pinch:   Option<bool>,
    hand_visible: bool,
}

impl Visualizer {
    pub fn new(canvas_w: usize, canvas_h: usize) -> Result<Self> {
        let win_h = canvas_h + STATUS_H;
        let mut window = Window::new(
            "Pinch Paint",
            canvas_w, win_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("failed to create window: {e}"))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            fb: Framebuffer::new(canvas_w, win_h),
            canvas_w,
            canvas_h,
            sim_tx:       None,
            last_pointer: None,
            last_pinch:   None,
            hand_visible: true,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Route window input to a freshly started simulation source.
    pub fn attach_sim(&mut self, tx: Sender<SimInput>) {
        self.sim_tx       = Some(tx);
        self.last_pointer = None;
        self.last_pinch   = None;
        self.hand_visible = true;
    }

    /// Poll keyboard and mouse.  Returns the commands for the app; pointer
    /// and pinch changes go to the attached simulation source.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        if !self.window.is_open() {
            commands.push(UiCommand::Quit);
            return commands;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) { commands.push(UiCommand::Quit); }
        if one_shot(Key::S) { commands.push(UiCommand::ToggleDetection); }
        if one_shot(Key::M) { commands.push(UiCommand::SwitchMode); }
        if one_shot(Key::C) { commands.push(UiCommand::Clear); }
        let toggle_hand = one_shot(Key::H);

        if toggle_hand { self.hand_visible = !self.hand_visible; }
        self.forward_sim_input(toggle_hand);
        commands
    }

    fn forward_sim_input(&mut self, visibility_changed: bool) {
        let Some(tx) = self.sim_tx.as_ref() else { return };

        let mut inputs = Vec::new();
        if visibility_changed {
            inputs.push(SimInput::HandVisible(self.hand_visible));
        }

        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Discard) {
            if y < self.canvas_h as f32 && self.last_pointer != Some((x, y)) {
                self.last_pointer = Some((x, y));
                inputs.push(SimInput::Pointer { x, y });
            }
        }

        let pinch = self.window.get_mouse_down(MouseButton::Left)
                 || self.window.is_key_down(Key::Space);
        if self.last_pinch != Some(pinch) {
            self.last_pinch = Some(pinch);
            inputs.push(SimInput::Pinch(pinch));
        }

        for input in inputs {
            if tx.send(input).is_err() {
                // Source stopped; wait for the next attach.
                self.sim_tx = None;
                break;
            }
        }
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene<'_>) {
        draw_scene(&mut self.fb, self.canvas_w, self.canvas_h, scene);
        self.window.update_with_buffer(&self.fb.buf, self.fb.w, self.fb.h).ok();
    }
}

/// Compose a full frame into `fb`.  The canvas occupies the top
/// `canvas_w`×`canvas_h` pixels; the status bar sits below it.
pub fn draw_scene(fb: &mut Framebuffer, canvas_w: usize, canvas_h: usize, scene: &Scene<'_>) {
    fb.buf.fill(BG_COLOR);

    // ── Image (under the ink) ─────────────────────────────────────────────
    if let Some((sprite, centre)) = scene.sprite {
        sprite.blit_centered(&mut fb.buf[..canvas_w * canvas_h], canvas_w, canvas_h, centre.x, centre.y);
    }

    // ── Ink ───────────────────────────────────────────────────────────────
    if scene.ink.width() == canvas_w && scene.ink.height() == canvas_h {
        scene.ink.composite_onto(&mut fb.buf[..canvas_w * canvas_h]);
    }

    // ── Fingertip ─────────────────────────────────────────────────────────
    if let Some(tip) = scene.fingertip {
        let ring = if scene.pinched { CURSOR_PINCH } else { CURSOR_IDLE };
        fb.draw_ring(tip, CURSOR_RADIUS, ring);
        match scene.tool {
            Tool::Pen  => fb.fill_disc(tip, 2.5, PEN_COLOR),
            Tool::Drag => fb.fill_disc(tip, 2.5, DRAG_COLOR),
            Tool::Off  => {}
        }
    }

    // ── Status bar ────────────────────────────────────────────────────────
    let bar_y = canvas_h;
    fb.fill_rect(0, bar_y, fb.w, STATUS_H, STATUS_BG);
    fb.draw_label(scene.status, 10, bar_y + 4, 2, TEXT_COLOR);

    let hud = format!(
        "{}  mode={}  tool={}",
        if scene.detecting { "DETECTING" } else { "IDLE" },
        scene.mode.name(),
        tool_name(scene.tool),
    );
    let hud_x = fb.w.saturating_sub(label_width(&hud, 2) + 10);
    let hud_color = match scene.tool {
        Tool::Pen  => PEN_COLOR,
        Tool::Drag => DRAG_COLOR,
        Tool::Off  => TEXT_COLOR,
    };
    fb.draw_label(&hud, hud_x, bar_y + 4, 2, hud_color);

    fb.draw_label(LEGEND, 10, bar_y + STATUS_H - 9, 1, LEGEND_COLOR);
}

fn tool_name(tool: Tool) -> &'static str {
    match tool {
        Tool::Off  => "off",
        Tool::Pen  => "pen",
        Tool::Drag => "drag",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Glyph width plus one column of spacing.
const GLYPH_ADVANCE: usize = 4;

/// Rows top to bottom, three bits each, packed MSB first into 15 bits.
/// Letters are stored upper-case; lower-case maps onto them.
const GLYPHS: &[(char, u16)] = &[
    ('0', 0x7B6F), ('1', 0x2C97), ('2', 0x73E7), ('3', 0x73CF), ('4', 0x5BC9), ('5', 0x79CF),
    ('6', 0x79EF), ('7', 0x7249), ('8', 0x7BEF), ('9', 0x7BCF), ('A', 0x7BED), ('B', 0x6BAE),
    ('C', 0x7927), ('D', 0x6B6E), ('E', 0x79E7), ('F', 0x79E4), ('G', 0x796F), ('H', 0x5BED),
    ('I', 0x7497), ('J', 0x126F), ('K', 0x5BAD), ('L', 0x4927), ('M', 0x5F6D), ('N', 0x7B6D),
    ('O', 0x7B6F), ('P', 0x7BE4), ('Q', 0x7B79), ('R', 0x6BAD), ('S', 0x79CF), ('T', 0x7492),
    ('U', 0x5B6F), ('V', 0x5B52), ('W', 0x5B7D), ('X', 0x5AAD), ('Y', 0x5BD2), ('Z', 0x72A7),
    ('/', 0x12A4), ('-', 0x01C0), ('.', 0x0002), (',', 0x0014), (':', 0x0410), ('=', 0x0E38),
    ('+', 0x05D0), ('(', 0x2922), (')', 0x224A), ('!', 0x2482),
];

/// Unknown characters render as a centre dot.
const FALLBACK_GLYPH: u16 = 0x0080;

/// `None` for blanks.
fn glyph(c: char) -> Option<u16> {
    if c.is_whitespace() { return None; }
    let c = c.to_ascii_uppercase();
    let bits = GLYPHS.iter().find(|(g, _)| *g == c).map_or(FALLBACK_GLYPH, |&(_, b)| b);
    Some(bits)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
