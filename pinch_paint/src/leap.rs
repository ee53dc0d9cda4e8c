//! LeapMotion hand source (feature = "leap").
//!
//! Requires the LeapC shared library installed on the system.
//!
//! Leap reports joints in millimetres above the device.  They are projected
//! into the normalized landmark frame through a fixed interaction box:
//!
//! * x: −200 … +200 mm → 1 … 0.  Inverted so the hand behaves like an
//!   *unmirrored* camera image of the user; the pipeline's mirror policy then
//!   puts it back under the user's hand on screen.
//! * y: 380 … 80 mm (height above device) → 0 … 1.
//!
//! Leap's thumb has a zero-length metacarpal, so landmarks 1–4 start at the
//! proximal bone; the other fingers use metacarpal-end, proximal-end,
//! intermediate-end and distal tip, matching the MediaPipe order.

use std::time::Instant;

use hand_landmarks::{DetectionResult, Hand, Handedness, LandmarkSource, Point, SourceError, LANDMARK_COUNT};
use leaprs::*;
use tracing::debug;

const BOX_HALF_WIDTH_MM: f32 = 200.0;
const BOX_TOP_MM:        f32 = 380.0;
const BOX_BOTTOM_MM:     f32 = 80.0;
/// Polls per `detect` before reporting an empty frame.
const POLLS_PER_FRAME:   u32 = 4;
const POLL_TIMEOUT_MS:   u32 = 10;

pub struct LeapLandmarkSource {
    connection: Option<Connection>,
    max_hands:  usize,
}

impl LeapLandmarkSource {
    pub fn open(max_hands: usize) -> Result<Self, SourceError> {
        let acquire = |reason: String| SourceError::Acquire { what: "LeapMotion", reason };
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| acquire(format!("{e:?}")))?;
        connection.open().map_err(|e| acquire(format!("{e:?}")))?;
        Ok(LeapLandmarkSource { connection: Some(connection), max_hands })
    }
}

fn project(x_mm: f32, y_mm: f32) -> Point {
    let nx = 1.0 - (x_mm + BOX_HALF_WIDTH_MM) / (2.0 * BOX_HALF_WIDTH_MM);
    let ny = (BOX_TOP_MM - y_mm) / (BOX_TOP_MM - BOX_BOTTOM_MM);
    Point::new(nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
}

fn to_landmarks(hand: &leaprs::Hand) -> Option<Hand> {
    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 { return None; }

    let wrist = hand.arm().next_joint();
    let mut pts = [project(wrist.x, wrist.y); LANDMARK_COUNT];

    let thumb = &digits[0];
    let joints = [
        thumb.proximal().prev_joint(),
        thumb.intermediate().prev_joint(),
        thumb.distal().prev_joint(),
        thumb.distal().next_joint(),
    ];
    for (j, v) in joints.iter().enumerate() {
        pts[1 + j] = project(v.x, v.y);
    }

    for (f, digit) in digits.iter().enumerate().skip(1) {
        let joints = [
            digit.metacarpal().next_joint(),
            digit.proximal().next_joint(),
            digit.intermediate().next_joint(),
            digit.distal().next_joint(),
        ];
        for (j, v) in joints.iter().enumerate() {
            pts[1 + 4 * f + j] = project(v.x, v.y);
        }
    }

    let handedness = if hand.hand_type() == HandType::Left {
        Handedness::Left
    } else {
        Handedness::Right
    };
    Some(Hand::new(pts).with_handedness(handedness))
}

impl LandmarkSource for LeapLandmarkSource {
    fn name(&self) -> &str { "LeapMotion" }

    fn detect(&mut self, _timestamp: Instant) -> Result<DetectionResult, SourceError> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(SourceError::Disconnected);
        };

        for _ in 0..POLLS_PER_FRAME {
            let msg = match connection.poll(POLL_TIMEOUT_MS) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<Hand> = frame.hands()
                    .filter_map(|h| to_landmarks(&h))
                    .take(self.max_hands)
                    .collect();
                return Ok(DetectionResult { hands });
            }
        }
        Ok(DetectionResult::empty())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        if self.connection.take().is_some() {
            debug!("LeapC connection closed");
        }
        Ok(())
    }
}
