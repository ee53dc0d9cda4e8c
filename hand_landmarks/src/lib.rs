//! # hand_landmarks
//!
//! The vocabulary shared by every stage of the pinch-paint pipeline:
//!
//! * [`Point`] — a plain 2D value, normalized or in pixels depending on stage.
//! * [`Hand`] — exactly [`LANDMARK_COUNT`] landmarks in the MediaPipe order.
//! * [`DetectionResult`] — zero or more hands seen in one video frame.
//! * [`LandmarkSource`] — anything that can produce a `DetectionResult` per frame.
//! * [`Mirror`] — the single horizontal-mirroring policy used at ingestion.
//!
//! Landmark coordinates are normalized to `[0, 1]` of the *unmirrored* source
//! frame, origin top-left, x growing to the right.
//!
//! ## Landmark layout
//!
//! | Index | Landmark | Index | Landmark |
//! |---|---|---|---|
//! | 0 | wrist | 4 | thumb tip |
//! | 1–3 | thumb CMC, MCP, IP | 8 | index fingertip |
//! | 5–7 | index MCP, PIP, DIP | 12 | middle fingertip |
//! | 9–11 | middle MCP, PIP, DIP | 16 | ring fingertip |
//! | 13–15 | ring MCP, PIP, DIP | 20 | pinky tip |
//! | 17–19 | pinky MCP, PIP, DIP | | |

pub mod source;
pub mod wire;

pub use source::{LandmarkSource, SourceError};

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in every [`Hand`].
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (MediaPipe hand landmark convention).
pub mod landmark {
    pub const WRIST:             usize = 0;
    pub const THUMB_CMC:         usize = 1;
    pub const THUMB_MCP:         usize = 2;
    pub const THUMB_IP:          usize = 3;
    pub const THUMB_TIP:         usize = 4;
    pub const INDEX_FINGER_MCP:  usize = 5;
    pub const INDEX_FINGER_PIP:  usize = 6;
    pub const INDEX_FINGER_DIP:  usize = 7;
    pub const INDEX_FINGER_TIP:  usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP:   usize = 13;
    pub const RING_FINGER_PIP:   usize = 14;
    pub const RING_FINGER_DIP:   usize = 15;
    pub const RING_FINGER_TIP:   usize = 16;
    pub const PINKY_MCP:         usize = 17;
    pub const PINKY_PIP:         usize = 18;
    pub const PINKY_DIP:         usize = 19;
    pub const PINKY_TIP:         usize = 20;
}

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2D point.  Normalized `[0, 1]` while it is a landmark, pixels once it
/// has been mapped onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Linear interpolation: `t = 0` → `self`, `t = 1` → `other`.
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn scale(self, k: f32) -> Point { Point::new(self.x * k, self.y * k) }

    pub fn add(self, other: Point) -> Point { Point::new(self.x + other.x, self.y + other.y) }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// Which hand the detector believes it saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Parse the detector's free-form label ("Left", "right", …).
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Handedness::Left,
            "right" => Handedness::Right,
            _       => Handedness::Unknown,
        }
    }
}

/// One detected hand: exactly [`LANDMARK_COUNT`] normalized landmarks.
///
/// The fixed-size array makes the 21-point invariant a type-level fact; the
/// pipeline only ever reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    landmarks: [Point; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Detector confidence, 0.0–1.0.
    pub score: f32,
}

impl Hand {
    pub fn new(landmarks: [Point; LANDMARK_COUNT]) -> Self {
        Hand { landmarks, handedness: Handedness::Unknown, score: 1.0 }
    }

    /// Build a hand from a slice, rejecting anything that is not exactly
    /// [`LANDMARK_COUNT`] points long.
    pub fn from_slice(points: &[Point]) -> Option<Self> {
        let landmarks: [Point; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Hand::new(landmarks))
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn landmarks(&self) -> &[Point; LANDMARK_COUNT] { &self.landmarks }

    /// Landmark `index`; see [`landmark`] for the names.
    pub fn get(&self, index: usize) -> Option<Point> { self.landmarks.get(index).copied() }

    pub fn thumb_tip(&self) -> Point { self.landmarks[landmark::THUMB_TIP] }

    pub fn index_tip(&self) -> Point { self.landmarks[landmark::INDEX_FINGER_TIP] }

    /// Distance between thumb tip and index fingertip, in normalized units.
    pub fn pinch_distance(&self) -> f32 { self.thumb_tip().distance(self.index_tip()) }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionResult
// ════════════════════════════════════════════════════════════════════════════

/// Everything the landmark source saw in one frame.  Empty is normal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionResult {
    pub hands: Vec<Hand>,
}

impl DetectionResult {
    pub fn empty() -> Self { DetectionResult::default() }

    pub fn single(hand: Hand) -> Self { DetectionResult { hands: vec![hand] } }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }

    /// The hand that drives the pipeline (slot 0).
    pub fn primary(&self) -> Option<&Hand> { self.hands.first() }
}

// ════════════════════════════════════════════════════════════════════════════
// Mirror
// ════════════════════════════════════════════════════════════════════════════

/// Horizontal mirroring applied once, when landmarks enter canvas space.
///
/// A selfie-style preview is mirrored, so `Horizontal` makes the stroke
/// follow the hand on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mirror {
    None,
    #[default]
    Horizontal,
}

impl Mirror {
    /// Map a normalized landmark into canvas pixels.
    pub fn to_canvas(self, p: Point, width: f32, height: f32) -> Point {
        let x = match self {
            Mirror::None       => p.x,
            Mirror::Horizontal => 1.0 - p.x,
        };
        Point::new(x * width, p.y * height)
    }

    /// Inverse of [`Mirror::to_canvas`]: canvas pixels → normalized source
    /// coordinates.  Used by sources that are driven from the canvas.
    pub fn from_canvas(self, p: Point, width: f32, height: f32) -> Point {
        let nx = if width  > 0.0 { p.x / width  } else { 0.0 };
        let ny = if height > 0.0 { p.y / height } else { 0.0 };
        let x = match self {
            Mirror::None       => nx,
            Mirror::Horizontal => 1.0 - nx,
        };
        Point::new(x, ny)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

    #[test]
    fn point_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!(approx(a.distance(b), 5.0));
        assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn hand_from_slice_requires_21_points() {
        assert!(Hand::from_slice(&[Point::default(); 20]).is_none());
        assert!(Hand::from_slice(&[Point::default(); 22]).is_none());
        assert!(Hand::from_slice(&[Point::default(); 21]).is_some());
    }

    #[test]
    fn pinch_distance_uses_thumb_and_index_tips() {
        let mut pts = [Point::new(0.5, 0.5); LANDMARK_COUNT];
        pts[landmark::THUMB_TIP]        = Point::new(0.10, 0.10);
        pts[landmark::INDEX_FINGER_TIP] = Point::new(0.13, 0.14);
        let hand = Hand::new(pts);
        assert!(approx(hand.pinch_distance(), 0.05));
    }

    #[test]
    fn coincident_tips_have_zero_distance() {
        let hand = Hand::new([Point::new(0.3, 0.3); LANDMARK_COUNT]);
        assert_eq!(hand.pinch_distance(), 0.0);
    }

    #[test]
    fn mirror_horizontal_flips_x_only() {
        let p = Mirror::Horizontal.to_canvas(Point::new(0.25, 0.5), 800.0, 600.0);
        assert!(approx(p.x, 600.0));
        assert!(approx(p.y, 300.0));
        let q = Mirror::None.to_canvas(Point::new(0.25, 0.5), 800.0, 600.0);
        assert!(approx(q.x, 200.0));
    }

    #[test]
    fn mirror_from_canvas_inverts_to_canvas() {
        for mirror in [Mirror::None, Mirror::Horizontal] {
            let src = Point::new(0.7, 0.2);
            let back = mirror.from_canvas(mirror.to_canvas(src, 640.0, 480.0), 640.0, 480.0);
            assert!(approx(back.x, src.x) && approx(back.y, src.y));
        }
    }

    #[test]
    fn handedness_labels() {
        assert_eq!(Handedness::from_label("Left"),  Handedness::Left);
        assert_eq!(Handedness::from_label(" right"), Handedness::Right);
        assert_eq!(Handedness::from_label("?"),     Handedness::Unknown);
    }
}
