//! JSON-lines format spoken by external hand detectors.
//!
//! The detector prints `READY` once, then one object per processed frame:
//!
//! ```text
//! {"timestamp_ms": 1234,
//!  "hands": [{"handedness": "Right", "score": 0.97,
//!             "landmarks": [{"x": 0.41, "y": 0.52, "z": -0.01}, … 21 entries]}],
//!  "error": null}
//! ```
//!
//! Everything except `hands[].landmarks[].x/y` is optional.

use serde::Deserialize;
use tracing::warn;

use crate::{DetectionResult, Hand, Handedness, Point, SourceError, LANDMARK_COUNT};

/// Line the detector prints once its model is loaded.
pub const READY_LINE: &str = "READY";

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: Option<String>,
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

fn full_score() -> f32 { 1.0 }

#[derive(Deserialize, Debug)]
struct FrameJson {
    #[serde(default)]
    timestamp_ms: Option<u64>,
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// One decoded detector line.
#[derive(Clone, Debug, PartialEq)]
pub struct WireFrame {
    /// Detector-side timestamp, if it sent one.
    pub timestamp_ms: Option<u64>,
    pub result:       DetectionResult,
}

/// Filters applied while decoding.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// Keep at most this many hands (slot order preserved).
    pub max_hands: usize,
    /// Drop hands scored below this.
    pub min_score: f32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions { max_hands: 1, min_score: 0.0 }
    }
}

/// Decode one JSON line.
///
/// Hands with the wrong landmark count are skipped with a warning rather than
/// failing the whole frame.  A frame carrying `error` decodes to no hands.
pub fn decode_line(line: &str, opts: DecodeOptions) -> Result<WireFrame, SourceError> {
    let frame: FrameJson = serde_json::from_str(line.trim())
        .map_err(|e| SourceError::Malformed(format!("{e}: {}", line.trim())))?;

    if let Some(error) = frame.error {
        warn!(%error, "detector reported an error frame");
        return Ok(WireFrame { timestamp_ms: frame.timestamp_ms, result: DetectionResult::empty() });
    }

    let mut hands = Vec::new();
    for hand in frame.hands {
        if hands.len() >= opts.max_hands { break; }
        if hand.score < opts.min_score { continue; }
        if hand.landmarks.len() != LANDMARK_COUNT {
            warn!(count = hand.landmarks.len(), "expected {LANDMARK_COUNT} landmarks; hand skipped");
            continue;
        }
        let points: Vec<Point> = hand.landmarks.iter().map(|lm| Point::new(lm.x, lm.y)).collect();
        if let Some(h) = Hand::from_slice(&points) {
            let handedness = hand.handedness
                .as_deref()
                .map(Handedness::from_label)
                .unwrap_or_default();
            hands.push(h.with_handedness(handedness).with_score(hand.score));
        }
    }

    Ok(WireFrame { timestamp_ms: frame.timestamp_ms, result: DetectionResult { hands } })
}

/// True for the detector's start-up handshake line.
pub fn is_ready_line(line: &str) -> bool { line.trim() == READY_LINE }

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(n: usize, score: f32) -> String {
        let lms: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"x":{},"y":0.5}}"#, i as f32 / 100.0))
            .collect();
        format!(r#"{{"handedness":"Left","score":{score},"landmarks":[{}]}}"#, lms.join(","))
    }

    #[test]
    fn decodes_single_hand() {
        let line = format!(r#"{{"timestamp_ms":42,"hands":[{}]}}"#, hand_json(21, 0.9));
        let frame = decode_line(&line, DecodeOptions::default()).unwrap();
        assert_eq!(frame.timestamp_ms, Some(42));
        let hand = frame.result.primary().unwrap();
        assert_eq!(hand.handedness, Handedness::Left);
        assert_eq!(hand.index_tip(), Point::new(0.08, 0.5));
        assert_eq!(hand.landmarks()[0], Point::new(0.0, 0.5));
        assert!(hand.landmarks().iter().all(|p| p.y == 0.5));
    }

    #[test]
    fn empty_hands_is_not_an_error() {
        let frame = decode_line(r#"{"hands":[]}"#, DecodeOptions::default()).unwrap();
        assert!(frame.result.is_empty());
    }

    #[test]
    fn wrong_landmark_count_is_skipped() {
        let line = format!(r#"{{"hands":[{},{}]}}"#, hand_json(20, 1.0), hand_json(21, 1.0));
        let opts = DecodeOptions { max_hands: 2, min_score: 0.0 };
        let frame = decode_line(&line, opts).unwrap();
        assert_eq!(frame.result.hands.len(), 1);
    }

    #[test]
    fn max_hands_and_min_score_filter() {
        let line = format!(
            r#"{{"hands":[{},{},{}]}}"#,
            hand_json(21, 0.2), hand_json(21, 0.8), hand_json(21, 0.9),
        );
        let frame = decode_line(&line, DecodeOptions { max_hands: 1, min_score: 0.5 }).unwrap();
        assert_eq!(frame.result.hands.len(), 1);
        assert!((frame.result.hands[0].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn error_frame_decodes_to_no_hands() {
        let frame = decode_line(r#"{"hands":[],"error":"camera busy"}"#, DecodeOptions::default()).unwrap();
        assert!(frame.result.is_empty());
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_line("not json", DecodeOptions::default()),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn ready_handshake() {
        assert!(is_ready_line("READY\n"));
        assert!(!is_ready_line("{}"));
    }
}
