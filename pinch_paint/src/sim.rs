//! Mouse/keyboard simulation of a tracked hand.
//!
//! The visualizer forwards window input as [`SimInput`] over a channel; this
//! source turns the latest pointer position and pinch button into a
//! synthetic 21-point hand.  The pipeline cannot tell it from a real
//! detector.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use hand_landmarks::{
    landmark, DetectionResult, Hand, Handedness, LandmarkSource, Mirror, Point, SourceError,
    LANDMARK_COUNT,
};

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer position in canvas pixels.
    Pointer { x: f32, y: f32 },
    /// Pinch button (left mouse / Space) held or released.
    Pinch(bool),
    /// `H` hides or shows the hand.
    HandVisible(bool),
}

/// Thumb offset from the index tip when not pinching (normalized units).
const THUMB_SPREAD: Point = Point::new(-0.07, 0.06);

pub struct SimLandmarkSource {
    rx:      Receiver<SimInput>,
    mirror:  Mirror,
    width:   f32,
    height:  f32,
    pointer: Option<Point>,
    pinched: bool,
    visible: bool,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>, mirror: Mirror, width: usize, height: usize) -> Self {
        SimLandmarkSource {
            rx,
            mirror,
            width:   width as f32,
            height:  height as f32,
            pointer: None,
            pinched: false,
            visible: true,
        }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pointer { x, y } => self.pointer = Some(Point::new(x, y)),
            SimInput::Pinch(on)        => self.pinched = on,
            SimInput::HandVisible(on)  => self.visible = on,
        }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn name(&self) -> &str { "simulation" }

    fn detect(&mut self, _timestamp: Instant) -> Result<DetectionResult, SourceError> {
        loop {
            match self.rx.try_recv() {
                Ok(input)                       => self.apply(input),
                Err(TryRecvError::Empty)        => break,
                // Window gone: keep the last state, the session is about to stop.
                Err(TryRecvError::Disconnected) => break,
            }
        }

        let Some(pointer) = self.pointer.filter(|_| self.visible) else {
            return Ok(DetectionResult::empty());
        };

        // The pointer lives in the (mirrored) canvas; landmarks are reported
        // in the unmirrored source frame like a camera detector would.
        let tip = self.mirror.from_canvas(pointer, self.width, self.height);
        Ok(DetectionResult::single(synthetic_hand(tip, self.pinched)))
    }
}

/// A plausible open hand whose index fingertip sits at `tip`.
pub fn synthetic_hand(tip: Point, pinched: bool) -> Hand {
    let wrist = tip.add(Point::new(0.0, 0.30));
    let mut pts = [wrist; LANDMARK_COUNT];

    // Finger bases fan out across the palm; joints interpolate towards the tip.
    let fingers: [(usize, f32, f32); 4] = [
        (landmark::INDEX_FINGER_MCP,  0.00, 0.00),
        (landmark::MIDDLE_FINGER_MCP, 0.04, 0.01),
        (landmark::RING_FINGER_MCP,   0.08, 0.03),
        (landmark::PINKY_MCP,         0.12, 0.06),
    ];
    for (mcp, dx, drop) in fingers {
        let base       = wrist.add(Point::new(dx, -0.14));
        let finger_tip = tip.add(Point::new(dx, drop));
        for j in 0..3 {
            pts[mcp + j] = base.lerp(finger_tip, j as f32 / 3.0);
        }
        pts[mcp + 3] = finger_tip;
    }

    let thumb_tip = if pinched { tip } else { tip.add(THUMB_SPREAD) };
    let thumb_cmc = wrist.add(Point::new(-0.05, -0.04));
    for j in 0..3 {
        pts[landmark::THUMB_CMC + j] = thumb_cmc.lerp(thumb_tip, j as f32 / 3.0);
    }
    pts[landmark::THUMB_TIP] = thumb_tip;

    Hand::new(pts).with_handedness(Handedness::Right)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn synthetic_hand_tips() {
        let tip = Point::new(0.4, 0.3);
        let open = synthetic_hand(tip, false);
        assert_eq!(open.index_tip(), tip);
        assert!(open.pinch_distance() > 0.05);
        let closed = synthetic_hand(tip, true);
        assert_eq!(closed.pinch_distance(), 0.0);
    }

    #[test]
    fn no_pointer_means_no_hand() {
        let (_tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx, Mirror::None, 100, 100);
        assert!(src.detect(Instant::now()).unwrap().is_empty());
    }

    #[test]
    fn pointer_round_trips_through_mirror() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx, Mirror::Horizontal, 200, 100);
        tx.send(SimInput::Pointer { x: 50.0, y: 25.0 }).unwrap();
        let result = src.detect(Instant::now()).unwrap();
        let tip = result.primary().unwrap().index_tip();
        let canvas = Mirror::Horizontal.to_canvas(tip, 200.0, 100.0);
        assert!((canvas.x - 50.0).abs() < 1e-3 && (canvas.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn hidden_hand_and_pinch() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx, Mirror::None, 100, 100);
        tx.send(SimInput::Pointer { x: 10.0, y: 10.0 }).unwrap();
        tx.send(SimInput::Pinch(true)).unwrap();
        let hand = src.detect(Instant::now()).unwrap();
        assert_eq!(hand.primary().unwrap().pinch_distance(), 0.0);

        tx.send(SimInput::HandVisible(false)).unwrap();
        assert!(src.detect(Instant::now()).unwrap().is_empty());
    }
}
